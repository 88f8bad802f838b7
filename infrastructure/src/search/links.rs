//! Link search backends.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;

use super::error::SearchError;

/// One ranked hit from a link search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Source of ranked links for a query
#[async_trait]
pub trait LinkSearch: Send + Sync {
    async fn links(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// Scrapes the DuckDuckGo HTML endpoint.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl LinkSearch for DuckDuckGoSearch {
    async fn links(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("kl", "us-en")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::from_status(status));
        }
        let body = response.text().await?;
        Ok(parse_results(&body, max_results))
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Extract organic results from a DuckDuckGo HTML results page.
pub(crate) fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let (Some(result_sel), Some(link_sel), Some(snippet_sel)) = (
        selector("div.result"),
        selector("a.result__a"),
        selector(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&result_sel)
        .filter(|r| !r.value().classes().any(|c| c == "result--ad"))
        .filter_map(|result| {
            let link = result.select(&link_sel).next()?;
            let url = resolve_href(link.value().attr("href")?)?;
            let title = link.text().collect::<String>().trim().to_string();
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            Some(SearchHit {
                title,
                url,
                snippet,
            })
        })
        .take(max_results)
        .collect()
}

/// Result links are redirects carrying the target in `uddg`.
fn resolve_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    let parsed = reqwest::Url::parse(&absolute).ok()?;
    let target = parsed
        .query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.into_owned());
    match target {
        Some(target) => Some(target),
        None if parsed.scheme() == "http" || parsed.scheme() == "https" => Some(absolute),
        None => None,
    }
}
