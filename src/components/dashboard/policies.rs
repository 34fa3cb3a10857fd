use dioxus::prelude::*;

use crate::components::common::{Card, CardTitle};
use crate::models::{newly_added_policies, policy_catalog};

#[component]
pub fn NewlyAddedPolicies(on_dismiss: EventHandler<()>) -> Element {
    let policies = newly_added_policies();

    rsx! {
        Card { class: "p-6 border border-enterprise-accent",
            div { class: "flex items-center justify-between pb-4",
                CardTitle { icon: "\u{1F4C4}", title: "Newly Added Policies" }
                button {
                    class: "h-6 w-6 rounded hover:bg-enterprise-light text-gray-500",
                    title: "Dismiss",
                    onclick: move |_| on_dismiss.call(()),
                    "\u{2715}"
                }
            }

            div { class: "space-y-3",
                for policy in policies {
                    div {
                        key: "{policy.id}",
                        class: "flex items-start gap-3 p-3 bg-white rounded-lg border border-gray-200",
                        span { class: "text-enterprise-accent mt-1", "\u{1F552}" }
                        div { class: "flex-1 min-w-0",
                            div { class: "flex flex-col sm:flex-row sm:items-center sm:justify-between gap-1",
                                h4 { class: "font-semibold text-enterprise-primary text-sm", "{policy.title}" }
                                span { class: "text-xs text-gray-500",
                                    "Added {policy.added_label()}"
                                }
                            }
                            p { class: "text-xs text-gray-600 mt-1", "{policy.description}" }
                            div { class: "flex items-center justify-between mt-2",
                                span { class: "text-xs text-enterprise-accent font-medium", "{policy.category}" }
                                a {
                                    class: "text-xs text-enterprise-primary hover:text-enterprise-accent font-medium underline",
                                    href: "#",
                                    "View Document"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Toggle a category in the expanded list.
pub fn toggle_category(expanded: &mut Vec<&'static str>, category: &'static str) {
    if let Some(pos) = expanded.iter().position(|c| *c == category) {
        expanded.remove(pos);
    } else {
        expanded.push(category);
    }
}

#[component]
pub fn PolicyList() -> Element {
    let catalog = use_hook(policy_catalog);
    let first = catalog.first().map(|c| c.name);
    let mut expanded = use_signal(move || first.into_iter().collect::<Vec<&'static str>>());

    rsx! {
        Card { class: "p-6",
            CardTitle { icon: "\u{1F4DA}", title: "Policy Documents" }

            div { class: "space-y-4 mt-4",
                for category in catalog {
                    div {
                        key: "{category.name}",
                        class: "border border-gray-200 rounded-lg overflow-hidden",
                        button {
                            class: "w-full flex items-center justify-between px-4 py-3 bg-gray-50 hover:bg-gray-100 text-left",
                            onclick: move |_| toggle_category(&mut *expanded.write(), category.name),
                            span { class: "font-semibold text-enterprise-primary", "{category.name}" }
                            span { class: "text-sm text-gray-500",
                                "{category.policies.len()} "
                                if expanded.read().contains(&category.name) { "\u{25BE}" } else { "\u{25B8}" }
                            }
                        }

                        if expanded.read().contains(&category.name) {
                            div { class: "divide-y divide-gray-100",
                                for policy in category.policies {
                                    div {
                                        key: "{policy.id}",
                                        class: "px-4 py-3",
                                        a {
                                            class: "font-medium text-sm text-enterprise-primary hover:underline",
                                            href: "{policy.link}",
                                            "{policy.title}"
                                        }
                                        p { class: "text-xs text-gray-600 mt-1", "{policy.description}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
