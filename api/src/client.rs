use crate::wire::Envelope;
use crate::{LeagueEntry, Match, TeamStatistics};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const API_FOOTBALL_URL: &str = "https://api-football-v1.p.rapidapi.com/v3";
pub const API_FOOTBALL_HOST: &str = "api-football-v1.p.rapidapi.com";

/// Connection settings for the API-Football endpoints.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub host: String,
    pub key: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: API_FOOTBALL_URL.to_string(),
            host: API_FOOTBALL_HOST.to_string(),
            key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Which slice of a league's fixtures to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureWindow {
    /// The most recent N fixtures.
    Last(u16),
    /// The next N fixtures.
    Next(u16),
}

impl Default for FixtureWindow {
    fn default() -> Self {
        FixtureWindow::Last(15)
    }
}

impl FixtureWindow {
    fn query(&self) -> (&'static str, u16) {
        match self {
            FixtureWindow::Last(n) => ("last", *n),
            FixtureWindow::Next(n) => ("next", *n),
        }
    }
}

impl fmt::Display for FixtureWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, n) = self.query();
        write!(f, "{name}={n}")
    }
}

impl FromStr for FixtureWindow {
    type Err = String;

    /// Accepts "last=15", "next:10" or "next 10".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let (name, count) = s
            .split_once(['=', ':', ' '])
            .ok_or_else(|| format!("expected last=N or next=N, got {s:?}"))?;
        let count: u16 = count
            .trim()
            .parse()
            .map_err(|e| format!("bad fixture count {count:?}: {e}"))?;
        if count == 0 {
            return Err("fixture count must be at least 1".into());
        }
        match name.trim() {
            "last" => Ok(FixtureWindow::Last(count)),
            "next" => Ok(FixtureWindow::Next(count)),
            other => Err(format!("unknown fixture window {other:?}")),
        }
    }
}

/// API-Football client (RapidAPI flavour).
#[derive(Debug, Clone)]
pub struct FootballApi {
    client: Client,
    config: ApiConfig,
}

impl Default for FootballApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Decode(serde_json::Error, String),
    /// The API answered 200 but listed errors in the envelope.
    Rejected(String, String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Decode(e, url) => write!(f, "Unexpected response shape for {url}: {e}"),
            ApiError::Rejected(msg, url) => write!(f, "Request rejected for {url}: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl FootballApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("kickoff/0.1 (terminal fixtures viewer)")
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fixtures for a league season.
    pub async fn fetch_fixtures(
        &self,
        league: u64,
        season: u16,
        window: FixtureWindow,
    ) -> ApiResult<Vec<Match>> {
        let (name, count) = window.query();
        let url = format!(
            "{}/fixtures?league={league}&season={season}&{name}={count}",
            self.base()
        );
        self.get(&url).await
    }

    /// League descriptions (with country and season coverage).
    pub async fn fetch_leagues(&self, league: u64, season: u16) -> ApiResult<Vec<LeagueEntry>> {
        let url = format!("{}/leagues?id={league}&season={season}", self.base());
        self.get(&url).await
    }

    /// Season aggregates for one team within a league.
    pub async fn fetch_team_statistics(
        &self,
        team: u64,
        league: u64,
        season: u16,
    ) -> ApiResult<TeamStatistics> {
        let url = format!(
            "{}/teams/statistics?league={league}&season={season}&team={team}",
            self.base()
        );
        self.get(&url).await
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", &self.config.key)
            .header("X-RapidAPI-Host", &self.config.host)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let envelope = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?
            .json::<Envelope<serde_json::Value>>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))?;

        // Check errors before decoding: a rejected request carries `[]` even
        // where the endpoint normally returns an object.
        if let Some(message) = envelope.error_message() {
            return Err(ApiError::Rejected(message, url.to_owned()));
        }

        serde_json::from_value(envelope.response).map_err(|e| ApiError::Decode(e, url.to_owned()))
    }
}
