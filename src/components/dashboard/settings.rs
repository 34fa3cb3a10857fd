use dioxus::prelude::*;

use crate::components::common::{Card, CardTitle};

const PORTAL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[component]
pub fn SettingsSection(employee_id: String, signing_out: bool, on_logout: EventHandler<()>) -> Element {
    let today = chrono::Local::now().format("%x").to_string();

    // Profile editing lives with HR for now; only logout is wired up.
    let pending_options = [
        ("\u{1F512}", "Change Password", "Update your account password"),
        ("\u{1F4F7}", "Update Profile Picture", "Upload a new profile photo"),
        ("\u{1F464}", "Edit Personal Details", "Update your profile information"),
    ];

    rsx! {
        Card { class: "h-fit p-6",
            CardTitle { icon: "\u{2699}", title: "Account Settings" }

            div { class: "space-y-3 mt-4",
                for (icon, label, description) in pending_options {
                    button {
                        key: "{label}",
                        class: "w-full flex items-start gap-3 p-4 text-left border border-gray-200 rounded-lg opacity-60 cursor-not-allowed",
                        disabled: true,
                        span { class: "text-lg", "{icon}" }
                        div { class: "flex-1",
                            div { class: "font-semibold text-sm mb-1", "{label}" }
                            div { class: "text-xs opacity-70", "{description}" }
                        }
                    }
                }

                button {
                    class: "w-full flex items-start gap-3 p-4 text-left rounded-lg bg-red-600 hover:bg-red-700 text-white disabled:opacity-50",
                    disabled: signing_out,
                    onclick: move |_| on_logout.call(()),
                    span { class: "text-lg", "\u{1F6AA}" }
                    div { class: "flex-1",
                        div { class: "font-semibold text-sm mb-1",
                            if signing_out { "Signing out..." } else { "Logout" }
                        }
                        div { class: "text-xs opacity-70", "Sign out of your account" }
                    }
                }
            }

            div { class: "mt-6 pt-4 border-t border-gray-200 text-xs text-gray-500 space-y-1",
                div { "Employee ID: {employee_id}" }
                div { "Portal Version: {PORTAL_VERSION}" }
                div { "Last Updated: {today}" }
            }
        }
    }
}
