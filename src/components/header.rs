use dioxus::prelude::*;

#[component]
pub fn EnterpriseHeader(company_name: String, #[props(default)] logo_url: Option<String>) -> Element {
    rsx! {
        header { class: "w-full bg-white border-b border-gray-200 shadow-sm",
            div { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8",
                div { class: "relative flex items-center justify-between h-16 md:h-20",
                    // Logo
                    div { class: "flex items-center",
                        if let Some(url) = logo_url {
                            img {
                                class: "h-8 md:h-12 w-auto object-contain",
                                src: "{url}",
                                alt: "{company_name} Logo",
                            }
                        } else {
                            div { class: "flex items-center justify-center w-8 h-8 md:w-12 md:h-12 bg-enterprise-primary rounded-lg text-white",
                                "\u{1F3E2}"
                            }
                        }
                    }

                    div { class: "absolute left-1/2 -translate-x-1/2",
                        h1 { class: "text-xl md:text-3xl font-bold text-enterprise-primary tracking-wide",
                            "{company_name}"
                        }
                    }

                    div { class: "w-8 md:w-12" }
                }
            }
        }
    }
}
