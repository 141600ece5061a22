use std::time::Duration;

use log::info;
use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;

pub const NEOWS_FEED_URL: &str = "https://api.nasa.gov/neo/rest/v1/feed";
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";
pub const API_KEY_ENV: &str = "NASA_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Blocking client for the NeoWs `feed` endpoint.
pub struct FeedClient {
    client: Client,
    url: String,
    api_key: String,
}

impl FeedClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(concat!("neo-tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(FeedClient {
            client,
            url: NEOWS_FEED_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Reads the key from `NASA_API_KEY`, falling back to the public demo key.
    pub fn from_env() -> Result<Self, FeedError> {
        let key = std::env::var(API_KEY_ENV).unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
        Self::new(key)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Fetches one window (`YYYY-MM-DD` bounds, inclusive).
    pub fn fetch_window(&self, start_date: &str, end_date: &str) -> Result<Value, FeedError> {
        info!("Fetching NEO feed {start_date} -> {end_date}");
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("start_date", start_date),
                ("end_date", end_date),
                ("api_key", self.api_key.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response.text().unwrap_or_default().chars().take(500).collect();
            return Err(FeedError::Status { status, body });
        }
        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves one canned response and returns the request line it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/feed", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut header = String::new();
            while reader.read_line(&mut header).unwrap() > 2 {
                header.clear();
            }
            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            request_line
        });
        (url, handle)
    }

    #[test]
    fn error_status_is_reported_with_body() {
        let (url, server) = serve_once("429 Too Many Requests", r#"{"error":"OVER_RATE_LIMIT"}"#);
        let client = FeedClient::new("KEY").unwrap().with_url(url);

        let err = client.fetch_window("2024-01-01", "2024-01-07").unwrap_err();
        server.join().unwrap();
        match err {
            FeedError::Status { status, body } => {
                assert_eq!(status, reqwest::StatusCode::TOO_MANY_REQUESTS);
                assert!(body.contains("OVER_RATE_LIMIT"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn window_and_key_are_sent_as_query() {
        let (url, server) = serve_once("200 OK", r#"{"near_earth_objects":{}}"#);
        let client = FeedClient::new("KEY").unwrap().with_url(url);

        let payload = client.fetch_window("2024-01-01", "2024-01-07").unwrap();
        let request_line = server.join().unwrap();
        assert!(payload["near_earth_objects"].is_object());
        assert!(request_line.starts_with("GET /feed?"));
        assert!(request_line.contains("start_date=2024-01-01"));
        assert!(request_line.contains("end_date=2024-01-07"));
        assert!(request_line.contains("api_key=KEY"));
    }
}
