//! Search tools exposed through [`ToolProvider`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kowalski_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    provider::{ProviderError, ToolProvider},
    value_objects::{ToolError, ToolResult},
};
use serde_json::Value;

use super::error::SearchError;
use super::fetch::PageFetcher;
use super::links::DuckDuckGoSearch;
use super::service::SearchService;
use super::weather::WeatherClient;
use crate::config::FileSearchConfig;

pub const GET_LINKS: &str = "get_links";
pub const SEARCH: &str = "search";
pub const GET_PAGE_CONTENT: &str = "get_page_content";
pub const GET_WEATHER: &str = "get_weather";

pub struct SearchToolProvider {
    service: SearchService,
}

impl SearchToolProvider {
    pub fn new(service: SearchService) -> Self {
        Self { service }
    }

    pub fn from_config(config: &FileSearchConfig) -> Result<Self, SearchError> {
        let timeout = Duration::from_secs(config.fetch_timeout_secs);
        let links = DuckDuckGoSearch::new(&config.search_url, timeout, &config.user_agent)?;
        let fetcher = PageFetcher::new(timeout, &config.user_agent)?;
        let weather = WeatherClient::new(
            &config.weather_url,
            config.weather_api_key.clone(),
            Duration::from_secs(config.weather_timeout_secs),
        )?;
        if config.weather_api_key.is_none() {
            tracing::warn!("OPENWEATHER_API_KEY not set; get_weather will report an error");
        }
        Ok(Self::new(SearchService::new(Arc::new(links), fetcher, weather)))
    }

    fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                GET_LINKS,
                "Retrieve only titles and URLs of web results. Use when a list of sources is \
                 needed, not their content.",
            )
            .with_parameter(ToolParameter::new("query", "What to search for", true))
            .with_parameter(
                ToolParameter::new("max_results", "How many links to return (default 3)", false)
                    .with_type("integer"),
            ),
            ToolDefinition::new(
                SEARCH,
                "Search the web and return snippets plus the beginning of each page's text. \
                 Use for facts, news and other information.",
            )
            .with_parameter(ToolParameter::new("query", "What to search for", true))
            .with_parameter(
                ToolParameter::new("max_results", "How many results to fetch (default 1)", false)
                    .with_type("integer"),
            )
            .with_parameter(
                ToolParameter::new(
                    "character_lookup",
                    "Characters of page text to return per result (default 1000)",
                    false,
                )
                .with_type("integer"),
            ),
            ToolDefinition::new(
                GET_PAGE_CONTENT,
                "Fetch the full cleaned text of a web page whose URL is already known.",
            )
            .with_parameter(ToolParameter::new("link", "URL of the page", true)),
            ToolDefinition::new(GET_WEATHER, "Get the current weather for a city.")
                .with_parameter(ToolParameter::new("city", "City name", true)),
        ]
    }

    fn count(call: &ToolCall, key: &str, default: usize) -> usize {
        call.get_i64(key)
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(default)
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let arg = |key: &str| call.require_string(key).map_err(ToolError::invalid_argument);

        match call.tool_name.as_str() {
            GET_LINKS => self
                .service
                .get_links(arg("query")?, Self::count(call, "max_results", 3))
                .await
                .map_err(|e| ToolError::execution_failed(format!("get_links failed: {}", e))),
            SEARCH => self
                .service
                .search(
                    arg("query")?,
                    Self::count(call, "max_results", 1),
                    Self::count(call, "character_lookup", 1000),
                )
                .await
                .map_err(|e| ToolError::execution_failed(format!("search failed: {}", e))),
            GET_PAGE_CONTENT => Ok(self.service.get_page_content(arg("link")?).await),
            GET_WEATHER => self
                .service
                .get_weather(arg("city")?)
                .await
                .map_err(|e| match e {
                    SearchError::MissingApiKey => ToolError::unavailable(e.to_string()),
                    other => ToolError::execution_failed(other.to_string()),
                }),
            other => Err(ToolError::not_found(format!("Tool not found: {}", other))),
        }
    }
}

#[async_trait]
impl ToolProvider for SearchToolProvider {
    fn id(&self) -> &str {
        "search"
    }

    fn display_name(&self) -> &str {
        "Search Service"
    }

    async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, ProviderError> {
        Ok(Self::definitions())
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.dispatch(call).await {
            Ok(output) => ToolResult::success(&call.tool_name, output),
            Err(error) => ToolResult::failure(&call.tool_name, error),
        }
    }
}
