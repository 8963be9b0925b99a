use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openrouter/deepseek-3.1-v";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_APP_TITLE: &str = "Synapse Monitor";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Everything the client needs to reach the provider.
///
/// Built once at startup (config file, then environment) and handed to
/// [`crate::OpenRouterClient::new`]. Nothing in this crate reads the
/// environment on its own.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    /// Sent as `HTTP-Referer` for provider attribution.
    pub site_url: String,
    /// Sent as `X-Title`.
    pub app_title: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("site_url", &self.site_url)
            .field("app_title", &self.app_title)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    /// Apply `OPENROUTER_*` overrides looked up through `var`.
    /// Empty values are ignored.
    ///
    /// Site URL priority: `OPENROUTER_SITE_URL` > `OPENROUTER_REFERRER` >
    /// `https://$VERCEL_URL` > configured value.
    pub fn with_env_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENROUTER_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = get("OPENROUTER_MODEL") {
            self.model = model;
        }
        if let Some(url) = get("OPENROUTER_API_URL") {
            self.api_url = url;
        }
        if let Some(site) = get("OPENROUTER_SITE_URL")
            .or_else(|| get("OPENROUTER_REFERRER"))
            .or_else(|| get("VERCEL_URL").map(|host| format!("https://{host}")))
        {
            self.site_url = site;
        }
        if let Some(title) = get("OPENROUTER_APP_TITLE") {
            self.app_title = title;
        }
        self
    }

    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|k| std::env::var(k).ok())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
