use dioxus::prelude::*;

use crate::components::common::{Card, ErrorMessage};
use crate::config::PortalConfig;
use crate::state::AuthContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    Employee,
    Admin,
}

impl LoginKind {
    fn tab_label(&self) -> &'static str {
        match self {
            LoginKind::Employee => "Employee Login",
            LoginKind::Admin => "Admin Login",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            LoginKind::Employee => "Employee Access",
            LoginKind::Admin => "Administrator Access",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            LoginKind::Employee => "Enter your employee credentials to access the portal",
            LoginKind::Admin => "For Admin, Superadmin, and SuperadminIT roles",
        }
    }

    fn submit_label(&self) -> &'static str {
        match self {
            LoginKind::Employee => "Sign In",
            LoginKind::Admin => "Sign In as Admin",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            LoginKind::Employee => "employee",
            LoginKind::Admin => "admin",
        }
    }
}

/// Both fields are required; the employee id may not be blank.
pub fn validate_login(employee_id: &str, password: &str) -> Result<(), &'static str> {
    if employee_id.trim().is_empty() || password.is_empty() {
        return Err("Please fill in all fields");
    }
    Ok(())
}

#[component]
pub fn LoginTabs() -> Element {
    let mut active = use_signal(|| LoginKind::Employee);

    rsx! {
        div { class: "w-full max-w-md mx-auto",
            div { class: "grid grid-cols-2 mb-6 bg-enterprise-light rounded-lg p-1",
                for kind in [LoginKind::Employee, LoginKind::Admin] {
                    button {
                        key: "{kind.id_prefix()}",
                        r#type: "button",
                        class: "py-2 rounded-md font-medium transition-colors",
                        class: if active() == kind { "bg-enterprise-primary text-white" } else { "text-gray-600 hover:text-gray-800" },
                        onclick: move |_| active.set(kind),
                        "{kind.tab_label()}"
                    }
                }
            }

            // Each tab keeps its own form state
            match active() {
                LoginKind::Employee => rsx! { LoginForm { key: "{LoginKind::Employee.id_prefix()}", kind: LoginKind::Employee } },
                LoginKind::Admin => rsx! { LoginForm { key: "{LoginKind::Admin.id_prefix()}", kind: LoginKind::Admin } },
            }
        }
    }
}

#[component]
fn LoginForm(kind: LoginKind) -> Element {
    let auth = use_context::<AuthContext>();
    let config = use_context::<PortalConfig>();
    let mut employee_id = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut show_password = use_signal(|| false);
    let mut is_loading = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let mut login = move || {
        let id = employee_id();
        let pass = password();

        error.set(None);
        if let Err(message) = validate_login(&id, &pass) {
            error.set(Some(message.to_string()));
            return;
        }
        if is_loading() {
            return;
        }

        is_loading.set(true);
        let identifier = config.backend_identifier(&id);
        let handle = auth.handle().clone();

        // The index page moves on to the dashboard once the sign-in
        // notification has updated the auth state.
        spawn(async move {
            if let Err(e) = handle.sign_in_with_password(&identifier, &pass).await {
                error.set(Some(e.user_message().to_string()));
            }
            is_loading.set(false);
        });
    };

    let prefix = kind.id_prefix();
    let password_type = if show_password() { "text" } else { "password" };

    rsx! {
        Card { class: "border border-gray-200",
            div { class: "text-center pt-6 pb-4 px-6",
                h2 { class: "text-enterprise-primary font-semibold text-lg", "{kind.title()}" }
                p { class: "text-gray-600 text-sm", "{kind.description()}" }
            }

            form {
                class: "space-y-4 px-6 pb-6",
                onsubmit: move |e| {
                    e.prevent_default();
                    login();
                },

                div { class: "space-y-2",
                    label { class: "text-sm font-medium text-gray-700", r#for: "{prefix}-id", "Employee ID" }
                    input {
                        id: "{prefix}-id",
                        class: "w-full px-4 py-2 border border-gray-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-enterprise-primary",
                        r#type: "text",
                        placeholder: "Enter your Employee ID",
                        value: "{employee_id}",
                        oninput: move |e| employee_id.set(e.value()),
                        disabled: is_loading(),
                    }
                }

                div { class: "space-y-2",
                    label { class: "text-sm font-medium text-gray-700", r#for: "{prefix}-password", "Password" }
                    div { class: "relative",
                        input {
                            id: "{prefix}-password",
                            class: "w-full px-4 py-2 pr-10 border border-gray-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-enterprise-primary",
                            r#type: "{password_type}",
                            placeholder: "Enter your password",
                            value: "{password}",
                            oninput: move |e| password.set(e.value()),
                            disabled: is_loading(),
                        }
                        button {
                            r#type: "button",
                            class: "absolute right-3 top-2 text-gray-400 hover:text-gray-600",
                            onclick: move |_| show_password.toggle(),
                            if show_password() { "Hide" } else { "Show" }
                        }
                    }
                }

                if let Some(message) = error() {
                    ErrorMessage { message }
                }

                button {
                    class: "w-full py-2.5 bg-enterprise-primary hover:bg-enterprise-dark text-white rounded-lg font-medium transition-colors disabled:opacity-50",
                    r#type: "submit",
                    disabled: is_loading(),
                    if is_loading() { "Signing In..." } else { "{kind.submit_label()}" }
                }
            }
        }
    }
}
