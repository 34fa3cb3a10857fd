use dioxus::prelude::*;

use crate::components::common::LoadingScreen;
use crate::routes::Route;
use crate::state::{decide, AuthContext, GateDecision};

/// Layout guarding every route nested under it
#[component]
pub fn ProtectedRoute() -> Element {
    let auth = use_context::<AuthContext>();
    let nav = navigator();
    let decision = decide(&auth.state());

    use_effect(move || {
        if decide(&auth.state()) == GateDecision::Redirect {
            nav.replace(Route::Index {});
        }
    });

    match decision {
        GateDecision::Wait => rsx! { LoadingScreen {} },
        // Nothing protected is built while the redirect is pending
        GateDecision::Redirect => rsx! {},
        GateDecision::Render => rsx! { Outlet::<Route> {} },
    }
}
