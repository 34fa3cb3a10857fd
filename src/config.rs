//! Portal configuration
//!
//! Native builds read the environment (after loading `.env`), web builds use
//! values baked in at compile time and fall back to the page origin.

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:54321";
pub const DEFAULT_IDENTIFIER_DOMAIN: &str = "company.com";
pub const DEFAULT_COMPANY_NAME: &str = "PROSTARM";

#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    /// Base URL of the identity and profile backend
    pub backend_url: String,
    /// Public API key sent as the `apikey` header
    pub anon_key: String,
    /// Domain appended to employee ids to form backend identifiers
    pub identifier_domain: String,
    pub company_name: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        PortalConfig {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            anon_key: String::new(),
            identifier_domain: DEFAULT_IDENTIFIER_DOMAIN.to_string(),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
        }
    }
}

impl PortalConfig {
    /// Map an employee id to the identifier the identity backend expects.
    pub fn backend_identifier(&self, employee_id: &str) -> String {
        format!("{}@{}", employee_id.trim(), self.identifier_domain)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = PortalConfig::default();
        let value = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let config = PortalConfig {
            backend_url: value("PORTAL_BACKEND_URL", defaults.backend_url),
            anon_key: value("PORTAL_ANON_KEY", defaults.anon_key),
            identifier_domain: value("PORTAL_IDENTIFIER_DOMAIN", defaults.identifier_domain),
            company_name: value("PORTAL_COMPANY_NAME", defaults.company_name),
        };

        config.validate().context("invalid PORTAL_BACKEND_URL")?;
        Ok(config)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_build() -> Self {
        let origin = web_sys::window().and_then(|w| w.location().origin().ok());
        let backend_url = option_env!("PORTAL_BACKEND_URL")
            .map(str::to_string)
            .or(origin)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        PortalConfig {
            backend_url,
            anon_key: option_env!("PORTAL_ANON_KEY").unwrap_or_default().to_string(),
            identifier_domain: option_env!("PORTAL_IDENTIFIER_DOMAIN")
                .unwrap_or(DEFAULT_IDENTIFIER_DOMAIN)
                .to_string(),
            company_name: option_env!("PORTAL_COMPANY_NAME")
                .unwrap_or(DEFAULT_COMPANY_NAME)
                .to_string(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn validate(&self) -> anyhow::Result<()> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            anyhow::bail!("expected an http(s) URL, got {:?}", self.backend_url);
        }
        Ok(())
    }
}
