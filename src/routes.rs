use dioxus::prelude::*;

use crate::components::{
    dashboard::DashboardPage,
    header::EnterpriseHeader,
    login::LoginTabs,
    protected::ProtectedRoute,
};
use crate::config::PortalConfig;
use crate::state::AuthContext;

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    // Entry point with the login tabs
    #[route("/")]
    Index {},

    // Everything below requires a signed-in user
    #[layout(ProtectedRoute)]
        #[route("/dashboard")]
        Dashboard {},
    #[end_layout]

    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

#[component]
fn Index() -> Element {
    let auth = use_context::<AuthContext>();
    let config = use_context::<PortalConfig>();
    let nav = navigator();

    // Signed-in visitors (restored session or fresh sign-in) go straight on
    use_effect(move || {
        let state = auth.state();
        if !state.is_loading() && state.is_authenticated() {
            nav.replace(Route::Dashboard {});
        }
    });

    rsx! {
        div { class: "min-h-screen flex flex-col portal-background",
            EnterpriseHeader { company_name: config.company_name.clone() }

            main { class: "flex-1 flex items-center justify-center px-4 py-8 md:py-12",
                div { class: "w-full max-w-md",
                    div { class: "text-center mb-8",
                        h2 { class: "text-2xl md:text-3xl font-semibold text-enterprise-primary mb-2",
                            "Welcome Back"
                        }
                        p { class: "text-gray-600 text-sm md:text-base",
                            "Sign in to access your enterprise portal"
                        }
                    }

                    LoginTabs {}

                    div { class: "text-center mt-8",
                        p { class: "text-xs text-gray-500",
                            "Secure enterprise portal \u{2022} Protected by advanced authentication"
                        }
                    }
                }
            }

            footer { class: "bg-white border-t border-gray-200 py-4",
                div { class: "max-w-7xl mx-auto px-4 text-center",
                    p { class: "text-xs text-gray-500",
                        "\u{00A9} {config.company_name}. All rights reserved. \u{2022} Enterprise Portal"
                    }
                }
            }
        }
    }
}

#[component]
fn Dashboard() -> Element {
    rsx! { DashboardPage {} }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let nav = navigator();
    tracing::debug!("Unknown path /{}, redirecting to entry point", segments.join("/"));

    use_effect(move || {
        nav.replace(Route::Index {});
    });

    rsx! {}
}
