use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use football_api::client::{ApiError, FixtureWindow, FootballApi};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs API requests off the UI loop, one at a time, and reports results
/// back as `NetworkResponse`s.
pub struct NetworkWorker {
    client: FootballApi,
    league: u64,
    season: u16,
    fixtures: FixtureWindow,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        settings: &AppSettings,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: FootballApi::new(settings.api.clone()),
            league: settings.league,
            season: settings.season,
            fixtures: settings.fixtures,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::LoadFixtures => self.handle_load_fixtures().await,
                NetworkRequest::LoadLeagues => self.handle_load_leagues().await,
                NetworkRequest::LoadTeamStatistics { fixture_id, side, team_id, league_id, season } => {
                    self.handle_load_team_statistics(fixture_id, side, team_id, league_id, season)
                        .await
                }
            };

            debug!("network request complete");
            self.stop_loading_animation().await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_fixtures(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading fixtures for league {} season {} ({})", self.league, self.season, self.fixtures);
        let matches = self.client.fetch_fixtures(self.league, self.season, self.fixtures).await?;
        info!("loaded {} fixtures", matches.len());
        Ok(NetworkResponse::FixturesLoaded { matches })
    }

    async fn handle_load_leagues(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading leagues for league {} season {}", self.league, self.season);
        let leagues = self.client.fetch_leagues(self.league, self.season).await?;
        info!("loaded {} leagues", leagues.len());
        Ok(NetworkResponse::LeaguesLoaded { leagues })
    }

    async fn handle_load_team_statistics(
        &self,
        fixture_id: u64,
        side: crate::state::app_state::Side,
        team_id: u64,
        league_id: u64,
        season: u16,
    ) -> Result<NetworkResponse, ApiError> {
        debug!("loading statistics for team {team_id} (league {league_id}, season {season})");
        let statistics = self
            .client
            .fetch_team_statistics(team_id, league_id, season)
            .await?;
        Ok(NetworkResponse::TeamStatisticsLoaded {
            fixture_id,
            side,
            statistics: Box::new(statistics),
        })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state: LoadingState::default() })
            .await;
    }
}
