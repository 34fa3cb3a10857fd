mod policies;
mod settings;
mod welcome;

pub use policies::{NewlyAddedPolicies, PolicyList};
pub use settings::SettingsSection;
pub use welcome::WelcomeSection;

use dioxus::prelude::*;

use crate::components::header::EnterpriseHeader;
use crate::config::PortalConfig;
use crate::models::{Profile, UNKNOWN_NAME};
use crate::routes::Route;
use crate::state::AuthContext;

const PENDING_EMPLOYEE_ID: &str = "\u{2014}";

/// What the dashboard widgets show about the signed-in employee
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub name: String,
    pub first_name: String,
    pub initials: String,
    pub employee_id: String,
    pub role: Option<String>,
    pub is_admin: bool,
    pub picture: Option<String>,
}

impl EmployeeSummary {
    /// A missing profile (still loading or lookup failed) renders as a
    /// placeholder instead of blocking the dashboard.
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        match profile {
            Some(profile) => EmployeeSummary {
                name: profile.name.clone(),
                first_name: profile.first_name().to_string(),
                initials: profile.initials(),
                employee_id: profile.employee_id.clone(),
                role: Some(profile.role_label().to_string()),
                is_admin: profile.is_admin(),
                picture: profile.profile_pic.clone(),
            },
            None => EmployeeSummary {
                name: UNKNOWN_NAME.to_string(),
                first_name: UNKNOWN_NAME.to_string(),
                initials: "?".to_string(),
                employee_id: PENDING_EMPLOYEE_ID.to_string(),
                role: None,
                is_admin: false,
                picture: None,
            },
        }
    }
}

#[component]
pub fn DashboardPage() -> Element {
    let auth = use_context::<AuthContext>();
    let config = use_context::<PortalConfig>();
    let nav = navigator();
    let mut show_new_policies = use_signal(|| true);
    let mut signing_out = use_signal(|| false);

    let employee = EmployeeSummary::from_profile(auth.state().profile());

    let handle = auth.handle().clone();
    let logout = move |_: ()| {
        if signing_out() {
            return;
        }
        signing_out.set(true);
        let handle = handle.clone();
        spawn(async move {
            if let Err(e) = handle.sign_out().await {
                tracing::error!("Sign-out request failed: {}", e);
            }
            signing_out.set(false);
            nav.replace(Route::Index {});
        });
    };

    rsx! {
        div { class: "min-h-screen portal-background",
            EnterpriseHeader { company_name: config.company_name.clone() }

            main { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-6 md:py-8",
                div { class: "space-y-6 md:space-y-8",
                    WelcomeSection { employee: employee.clone() }

                    if show_new_policies() {
                        NewlyAddedPolicies { on_dismiss: move |_| show_new_policies.set(false) }
                    }

                    div { class: "grid grid-cols-1 lg:grid-cols-3 gap-6 md:gap-8",
                        div { class: "lg:col-span-2",
                            PolicyList {}
                        }
                        div { class: "lg:col-span-1",
                            SettingsSection {
                                employee_id: employee.employee_id.clone(),
                                signing_out: signing_out(),
                                on_logout: logout,
                            }
                        }
                    }
                }
            }
        }
    }
}
