use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::error::SearchError;
use super::fetch::PageFetcher;
use super::html::truncate_chars;
use super::links::LinkSearch;
use super::weather::WeatherClient;

pub struct SearchService {
    links: Arc<dyn LinkSearch>,
    fetcher: PageFetcher,
    weather: WeatherClient,
}

impl SearchService {
    pub fn new(links: Arc<dyn LinkSearch>, fetcher: PageFetcher, weather: WeatherClient) -> Self {
        Self {
            links,
            fetcher,
            weather,
        }
    }

    /// `{"results": [{title, url}]}`
    pub async fn get_links(&self, query: &str, max_results: usize) -> Result<Value, SearchError> {
        let hits = self.links.links(query, max_results).await?;
        let results: Vec<Value> = hits
            .into_iter()
            .map(|hit| json!({ "title": hit.title, "url": hit.url }))
            .collect();
        Ok(json!({ "results": results }))
    }

    /// Link search followed by a concurrent fetch of every hit.
    ///
    /// Each entry carries either `content` (at most `character_lookup`
    /// characters) or `error`; one failed page does not affect the others.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        character_lookup: usize,
    ) -> Result<Value, SearchError> {
        let hits = self.links.links(query, max_results).await?;
        debug!(query, hits = hits.len(), "Fetching search hits");

        let pages = join_all(hits.iter().map(|hit| self.fetcher.fetch_text(&hit.url))).await;

        let results: Vec<Value> = hits
            .into_iter()
            .zip(pages)
            .map(|(hit, page)| {
                let mut entry = Map::new();
                entry.insert("title".into(), hit.title.into());
                entry.insert("url".into(), hit.url.into());
                entry.insert("snippet".into(), hit.snippet.into());
                match page {
                    Ok(text) => {
                        entry.insert(
                            "content".into(),
                            truncate_chars(&text, character_lookup).into(),
                        );
                    }
                    Err(e) => {
                        entry.insert("error".into(), format!("Failed to fetch page: {}", e).into());
                    }
                }
                Value::Object(entry)
            })
            .collect();

        Ok(json!({ "results": results }))
    }

    /// `{url, data}` on success, `{url, error}` otherwise.
    pub async fn get_page_content(&self, link: &str) -> Value {
        match self.fetcher.fetch_text(link).await {
            Ok(data) => json!({ "url": link, "data": data }),
            Err(e) => json!({ "url": link, "error": format!("get_page_content failed: {}", e) }),
        }
    }

    pub async fn get_weather(&self, city: &str) -> Result<Value, SearchError> {
        self.weather.current(city).await
    }
}
