use crate::state::app_state::Side;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use football_api::{LeagueEntry, Match, TeamStatistics};

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadFixtures,
    LoadLeagues,
    LoadTeamStatistics {
        fixture_id: u64,
        side: Side,
        team_id: u64,
        league_id: u64,
        season: u16,
    },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    FixturesLoaded { matches: Vec<Match> },
    LeaguesLoaded { leagues: Vec<LeagueEntry> },
    /// Statistics for one side of the match whose detail was opened.
    TeamStatisticsLoaded {
        fixture_id: u64,
        side: Side,
        statistics: Box<TeamStatistics>,
    },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
