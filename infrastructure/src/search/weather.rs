use std::time::Duration;

use serde_json::{Value, json};

use super::error::SearchError;

/// OpenWeather current-conditions client (`units=metric`)
pub struct WeatherClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Current weather for `city`.
    ///
    /// Upstream refusals (`cod` other than 200) come back as
    /// `{"error": <upstream message>}` rather than as an `Err`.
    pub async fn current(&self, city: &str) -> Result<Value, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;
        let body: Value = self
            .client
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await?
            .json()
            .await?;
        summarize(&body)
    }
}

fn summarize(body: &Value) -> Result<Value, SearchError> {
    // `cod` is a number on success and sometimes a string on failure.
    let cod = match &body["cod"] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    if cod != Some(200) {
        let message = body["message"]
            .as_str()
            .unwrap_or("Failed to fetch weather");
        return Ok(json!({ "error": message }));
    }

    let field = |value: &Value, what: &str| -> Result<Value, SearchError> {
        if value.is_null() {
            Err(SearchError::Parse(format!("missing {}", what)))
        } else {
            Ok(value.clone())
        }
    };

    Ok(json!({
        "city": field(&body["name"], "name")?,
        "temperature": field(&body["main"]["temp"], "main.temp")?,
        "feels_like": field(&body["main"]["feels_like"], "main.feels_like")?,
        "humidity": field(&body["main"]["humidity"], "main.humidity")?,
        "weather": field(&body["weather"][0]["description"], "weather description")?,
        "wind_speed": field(&body["wind"]["speed"], "wind.speed")?,
    }))
}
