use crate::{Params, Resource};
use log::debug;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// The league's deployed Apps Script endpoint.
pub const DEFAULT_API_URL: &str = "https://script.google.com/macros/s/AKfycbyZK-Aa-VPsXVqiNe5dNdhydmMLjP3ogR7ZNyo9-b5-LzUCJAxHZgF4uuqSeMUP4KHW/exec";

/// Left in template deployments that were never pointed at a real script.
const UNCONFIGURED_MARKER: &str = "YOUR_DEPLOYMENT_ID";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),

    #[error("HTTP {0} for {1}")]
    Status(StatusCode, String),

    #[error("Parse error for {1}: {0}")]
    Parse(#[source] serde_json::Error, String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of [`ApiError`]. A bad status and a dropped
/// connection are both network failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    Config,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(..) | ApiError::Status(..) => ErrorKind::Network,
            ApiError::Parse(..) => ErrorKind::Parse,
            ApiError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Thin HTTP transport for the league API. Every resource lives behind the
/// same URL and is selected with the `endpoint` query parameter.
#[derive(Debug, Clone)]
pub struct BglApi {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl BglApi {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .user_agent("bgltui/0.1 (terminal standings viewer)")
            .build()
            .map_err(|e| ApiError::Config(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            timeout: Duration::from_secs(10),
        })
    }

    /// The exact URL requested for `resource` with `params`.
    pub fn request_url(&self, resource: Resource, params: &Params) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("endpoint", resource.as_str());
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url
    }

    /// GET one resource and parse the body as JSON.
    pub async fn fetch(&self, resource: Resource, params: &Params) -> ApiResult<Value> {
        let url = self.request_url(resource, params);
        debug!("fetching {resource} from {url}");

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status, url.to_string()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e, url.to_string()))
    }
}

fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::Config("API base URL is not set".into()));
    }
    if raw.contains(UNCONFIGURED_MARKER) {
        return Err(ApiError::Config(format!(
            "API base URL still contains the {UNCONFIGURED_MARKER} placeholder"
        )));
    }
    let url = Url::parse(raw).map_err(|e| ApiError::Config(format!("invalid API URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::Config(format!(
            "unsupported API URL scheme {other:?} in {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use mockito::Matcher;

    #[test]
    fn default_url_is_accepted() {
        assert!(BglApi::new(DEFAULT_API_URL).is_ok());
    }

    #[test]
    fn placeholder_and_empty_urls_are_config_errors() {
        for raw in [
            "",
            "   ",
            "https://script.google.com/macros/s/YOUR_DEPLOYMENT_ID/exec",
            "not a url",
            "ftp://example.com/feed",
        ] {
            let err = BglApi::new(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{raw:?} should be rejected");
        }
    }

    #[test]
    fn request_url_carries_endpoint_then_params() {
        let api = BglApi::new("https://example.com/exec").unwrap();
        let url = api.request_url(Resource::Weekly, &params([("week", "2".to_string())]));
        assert_eq!(url.as_str(), "https://example.com/exec?endpoint=weekly&week=2");
    }

    #[tokio::test]
    async fn fetch_returns_parsed_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("endpoint".into(), "stats".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"totalTeams": 8, "totalPlayers": 16}"#)
            .create_async()
            .await;

        let api = BglApi::new(&server.url()).unwrap();
        let value = api.fetch(Resource::Stats, &Params::new()).await.unwrap();
        assert_eq!(value["totalTeams"], 8);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_a_network_kind() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let api = BglApi::new(&server.url()).unwrap();
        let err = api.fetch(Resource::Teams, &Params::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR, _)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn html_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>Sign in</html>")
            .create_async()
            .await;

        let api = BglApi::new(&server.url()).unwrap();
        let err = api.fetch(Resource::Standings, &Params::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
