//! Search server configuration (`[search]` section)

use serde::{Deserialize, Serialize};

/// Raw search configuration from TOML
///
/// The weather key is normally supplied through `OPENWEATHER_API_KEY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSearchConfig {
    pub bind: String,
    /// HTML endpoint scraped for link search
    pub search_url: String,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_api_key: Option<String>,
    pub weather_url: String,
    pub weather_timeout_secs: u64,
}

impl Default for FileSearchConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            search_url: "https://html.duckduckgo.com/html/".to_string(),
            fetch_timeout_secs: 10,
            user_agent: "Mozilla/5.0 (compatible; kowalski/0.1)".to_string(),
            weather_api_key: None,
            weather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            weather_timeout_secs: 10,
        }
    }
}
