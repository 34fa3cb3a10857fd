use dioxus::prelude::*;

#[component]
pub fn LoadingSpinner() -> Element {
    rsx! {
        div { class: "flex items-center justify-center p-4",
            div { class: "animate-spin rounded-full h-8 w-8 border-b-2 border-enterprise-primary" }
        }
    }
}

/// Full-page neutral indicator shown while the session is being restored
#[component]
pub fn LoadingScreen() -> Element {
    rsx! {
        div { class: "min-h-screen portal-background flex flex-col items-center justify-center",
            LoadingSpinner {}
            div { class: "text-enterprise-primary", "Loading..." }
        }
    }
}

#[component]
pub fn ErrorMessage(message: String) -> Element {
    rsx! {
        div { class: "border border-red-200 bg-red-50 text-red-700 text-sm px-4 py-3 rounded",
            p { "{message}" }
        }
    }
}

#[component]
pub fn Card(children: Element, #[props(default = "".to_string())] class: String) -> Element {
    rsx! {
        div { class: "bg-white rounded-lg shadow-md enterprise-shadow {class}",
            {children}
        }
    }
}

#[component]
pub fn CardTitle(icon: String, title: String) -> Element {
    rsx! {
        h3 { class: "flex items-center gap-2 text-lg font-semibold text-enterprise-primary",
            span { "{icon}" }
            "{title}"
        }
    }
}
