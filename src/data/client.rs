//! Fantasy premier league API client
//!
//! Fetches the bootstrap and fixture documents that make up a [`LeagueData`]
//! payload, and exposes a raw pass-through used by the proxy service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{Bootstrap, Fixture, LeagueData};

/// Base URL for the public fantasy premier league API
pub const DEFAULT_API_BASE_URL: &str = "https://fantasy.premierleague.com/api";

/// Errors that can occur when talking to the upstream API
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered 429 Too Many Requests
    #[error("Upstream rate limit reached (HTTP 429)")]
    RateLimited,

    /// Any other non-success status
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }
}

/// Source of league data for the refresh controller
///
/// Implemented by [`FplClient`] for the real API; tests substitute scripted
/// implementations.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetch the complete dashboard payload
    async fn fetch_league(&self) -> Result<LeagueData, FetchError>;
}

/// An upstream response passed through untouched
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Client for the fantasy premier league API
#[derive(Debug, Clone)]
pub struct FplClient {
    client: Client,
    base_url: String,
}

impl Default for FplClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FplClient {
    /// Create a new FplClient pointing at the public API
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Create a new FplClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Build a client with a user agent and an optional request timeout
    pub fn build(user_agent: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?))
    }

    /// Point the client at another base URL (mirrors, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path such as `bootstrap-static/`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Fetch the bootstrap document (events, teams, players)
    pub async fn fetch_bootstrap(&self) -> Result<Bootstrap, FetchError> {
        self.get_json("bootstrap-static/").await
    }

    /// Fetch every fixture of the season
    pub async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, FetchError> {
        self.get_json("fixtures/").await
    }

    /// Forward a GET to upstream and return status, content type and body as-is
    pub async fn get_raw(&self, endpoint: &str) -> Result<RawResponse, FetchError> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!(%url, "forwarding request upstream");

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let url = self.endpoint_url(endpoint);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Upstream for FplClient {
    async fn fetch_league(&self) -> Result<LeagueData, FetchError> {
        let (bootstrap, fixtures) =
            futures::future::join(self.fetch_bootstrap(), self.fetch_fixtures()).await;

        // A 429 on either document outranks any other failure
        let rate_limited =
            |error: Option<&FetchError>| error.is_some_and(FetchError::is_rate_limited);
        if rate_limited(bootstrap.as_ref().err()) || rate_limited(fixtures.as_ref().err()) {
            return Err(FetchError::RateLimited);
        }

        Ok(LeagueData::from_parts(bootstrap?, fixtures?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOOTSTRAP: &str = r#"{
        "events": [{"id": 9, "name": "Gameweek 9", "deadline_time": "2026-10-24T10:00:00Z",
                    "finished": false, "is_current": false, "is_next": true}],
        "teams": [{"id": 1, "name": "Arsenal", "short_name": "ARS"},
                  {"id": 2, "name": "Brentford", "short_name": "BRE"}],
        "elements": [{"id": 10, "web_name": "Saka", "team": 1, "element_type": 3,
                      "now_cost": 101, "cost_change_event": 1, "selected_by_percent": "40.1",
                      "transfers_in_event": 50000, "transfers_out_event": 1000}],
        "element_types": [{"id": 3, "singular_name_short": "MID"}],
        "total_players": 10000000
    }"#;

    const FIXTURES: &str = r#"[
        {"id": 1, "event": 9, "kickoff_time": "2026-10-24T14:00:00Z", "team_h": 1, "team_a": 2,
         "team_h_score": null, "team_a_score": null, "team_h_difficulty": 2,
         "team_a_difficulty": 4, "started": false, "finished": false, "minutes": 0, "stats": []}
    ]"#;

    fn client_for(server: &MockServer) -> FplClient {
        FplClient::new().with_base_url(server.uri())
    }

    #[test]
    fn test_endpoint_url_joins_without_double_slash() {
        let client = FplClient::new().with_base_url("http://localhost:9000/api/");
        assert_eq!(
            client.endpoint_url("/bootstrap-static/"),
            "http://localhost:9000/api/bootstrap-static/"
        );
        assert_eq!(client.base_url(), "http://localhost:9000/api");
    }

    #[tokio::test]
    async fn test_fetch_league_combines_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bootstrap-static/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BOOTSTRAP))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fixtures/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURES))
            .mount(&server)
            .await;

        let league = client_for(&server)
            .fetch_league()
            .await
            .expect("fetch should succeed");

        assert_eq!(league.teams.len(), 2);
        assert_eq!(league.elements[0].web_name, "Saka");
        assert_eq!(league.fixtures.len(), 1);
        assert_eq!(league.fixtures[0].team_a_difficulty, 4);
        assert_eq!(league.next_event().map(|e| e.id), Some(9));
    }

    #[tokio::test]
    async fn test_429_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_league().await;

        assert!(matches!(result, Err(FetchError::RateLimited)));
    }

    #[tokio::test]
    async fn test_slow_429_outranks_fast_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bootstrap-static/"))
            .respond_with(ResponseTemplate::new(429).set_delay(Duration::from_millis(200)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fixtures/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_league().await;

        assert!(matches!(result, Err(FetchError::RateLimited)), "got {:?}", result);
    }

    #[tokio::test]
    async fn test_fixture_429_with_good_bootstrap_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bootstrap-static/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BOOTSTRAP))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fixtures/"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_league().await;

        assert!(matches!(result, Err(FetchError::RateLimited)));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_bootstrap().await;

        match result {
            Err(FetchError::Status(code)) => assert_eq!(code, 503),
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fixtures/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_fixtures().await;

        assert!(matches!(result, Err(FetchError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_get_raw_passes_status_and_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event/9/live/"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw(r#"{"detail":"Not found."}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let raw = client_for(&server)
            .get_raw("event/9/live/")
            .await
            .expect("raw fetch should succeed");

        assert_eq!(raw.status, 404);
        assert_eq!(raw.content_type.as_deref(), Some("application/json"));
        assert_eq!(raw.body, br#"{"detail":"Not found."}"#.to_vec());
    }
}
