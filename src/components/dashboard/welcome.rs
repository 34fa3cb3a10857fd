use dioxus::prelude::*;

use super::EmployeeSummary;
use crate::components::common::Card;

#[component]
pub fn WelcomeSection(employee: EmployeeSummary) -> Element {
    let today = chrono::Local::now().format("%A, %B %-d, %Y").to_string();

    rsx! {
        Card { class: "p-6 md:p-8",
            div { class: "flex flex-col sm:flex-row items-start sm:items-center gap-4",
                // Avatar
                if let Some(picture) = employee.picture.clone() {
                    img {
                        class: "h-16 w-16 md:h-20 md:w-20 rounded-full object-cover",
                        src: "{picture}",
                        alt: "{employee.name}",
                    }
                } else {
                    div { class: "h-16 w-16 md:h-20 md:w-20 rounded-full bg-enterprise-primary text-white text-lg md:text-xl font-semibold flex items-center justify-center",
                        "{employee.initials}"
                    }
                }

                div { class: "flex-1",
                    h1 { class: "text-2xl md:text-3xl font-bold text-enterprise-primary mb-2",
                        "Welcome back, {employee.first_name}!"
                    }
                    div { class: "flex flex-col sm:flex-row sm:items-center gap-2 text-gray-600",
                        span { "\u{1F464} Employee ID: {employee.employee_id}" }
                        if let Some(role) = employee.role.clone() {
                            span {
                                class: "inline-flex items-center px-2.5 py-0.5 rounded-full text-xs font-medium",
                                class: if employee.is_admin { "bg-enterprise-primary text-white" } else { "bg-enterprise-light text-enterprise-primary" },
                                "{role}"
                            }
                        }
                    }
                }

                div { class: "hidden md:block text-right text-sm text-gray-500",
                    "Last login: {today}"
                }
            }
        }
    }
}
