//! Search service
//!
//! Link search, concurrent page fetching with text extraction, and current
//! weather. [`SearchToolProvider`] exposes it as the `get_links`, `search`,
//! `get_page_content` and `get_weather` tools.

mod error;
mod fetch;
mod html;
mod links;
mod provider;
mod service;
mod weather;

pub use error::SearchError;
pub use fetch::PageFetcher;
pub use html::{html_to_text, truncate_chars};
pub use links::{DuckDuckGoSearch, LinkSearch, SearchHit};
pub use provider::SearchToolProvider;
pub use service::SearchService;
pub use weather::WeatherClient;
