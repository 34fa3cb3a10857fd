//! Enterprise Portal - Dioxus Application
//!
//! Employee portal with login, a policy dashboard and account settings.
//! Authentication and profile data come from a hosted identity/table
//! backend; the app keeps the session state and guards protected routes.

mod api;
mod components;
mod config;
mod models;
mod routes;
mod state;

use std::rc::Rc;

use dioxus::prelude::*;

use api::storage::SessionStorage;
use api::{ApiClient, GoTrueBackend, RestProfileStore};
use config::PortalConfig;
use routes::Route;
use state::{use_auth_provider, SessionManager};

fn main() {
    #[cfg(target_arch = "wasm32")]
    let config = PortalConfig::from_build();

    #[cfg(not(target_arch = "wasm32"))]
    let config = {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        let mut filter = tracing_subscriber::EnvFilter::from_default_env();
        if let Ok(directive) = "enterprise_portal=info".parse() {
            filter = filter.add_directive(directive);
        }
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();

        // Load environment variables
        dotenvy::dotenv().ok();

        match PortalConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Configuration error: {:#}", e);
                std::process::exit(1);
            }
        }
    };

    tracing::info!("Starting portal against {}", config.backend_url);

    dioxus::LaunchBuilder::new()
        .with_context(config)
        .launch(App);
}

fn session_storage() -> Rc<dyn SessionStorage> {
    #[cfg(target_arch = "wasm32")]
    {
        Rc::new(api::storage::BrowserSessionStorage)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Rc::new(api::storage::MemorySessionStorage::default())
    }
}

#[component]
fn App() -> Element {
    let config = use_context::<PortalConfig>();

    use_auth_provider(move || {
        let client = ApiClient::new(&config.backend_url, &config.anon_key);
        let backend = Rc::new(GoTrueBackend::new(client.clone(), session_storage()));
        let profiles = Rc::new(RestProfileStore::new(client));
        SessionManager::new(backend, profiles)
    });

    rsx! {
        // Global styles
        style { {include_str!("../assets/styles.css")} }

        Router::<Route> {}
    }
}
