use std::time::Duration;

use super::error::SearchError;
use super::html::html_to_text;

/// Maximum response body size (5 MB)
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Fetches pages and reduces them to readable text.
///
/// One client is shared by every fetch, carrying the configured timeout
/// and user agent.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String, SearchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::from_status(status));
        }
        if response.content_length().unwrap_or(0) > MAX_BODY_SIZE as u64 {
            return Err(too_large());
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);
        let body = read_capped(response).await?;

        if is_html {
            Ok(html_to_text(&body))
        } else {
            Ok(body.split_whitespace().collect::<Vec<_>>().join(" "))
        }
    }
}

fn too_large() -> SearchError {
    SearchError::Parse(format!("response larger than {} bytes", MAX_BODY_SIZE))
}

/// Read the body chunk by chunk, giving up once it passes the cap.
async fn read_capped(mut response: reqwest::Response) -> Result<String, SearchError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > MAX_BODY_SIZE {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, routing::get};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_chunked_body_is_capped() {
        let app = Router::new().route(
            "/big",
            get(|| async {
                let chunk = vec![b'a'; 1024 * 1024];
                let chunks = (0..8).map(move |_| Ok::<_, std::io::Error>(chunk.clone()));
                Body::from_stream(futures::stream::iter(chunks))
            }),
        );
        let base = serve(app).await;
        let fetcher = PageFetcher::new(Duration::from_secs(5), "kowalski-test").unwrap();

        let err = fetcher.fetch_text(&format!("{}/big", base)).await.unwrap_err();
        assert!(err.to_string().contains("larger than"), "{err}");
    }

    #[tokio::test]
    async fn test_small_body_reduced_to_text() {
        let app = Router::new().route(
            "/page",
            get(|| async {
                axum::response::Html("<html><body><p>Hello   <b>there</b></p></body></html>")
            }),
        );
        let base = serve(app).await;
        let fetcher = PageFetcher::new(Duration::from_secs(5), "kowalski-test").unwrap();

        let text = fetcher.fetch_text(&format!("{}/page", base)).await.unwrap();
        assert_eq!(text, "Hello there");
    }
}
