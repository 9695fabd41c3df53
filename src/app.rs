use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, ListCursor, Side, display_order};
use crate::state::favorites::FavoritesStore;
use crate::state::messages::NetworkRequest;
use crate::state::reminders::ReminderEvent;
use football_api::{LeagueEntry, Match, TeamStatistics};
use log::{debug, error, info};
use tokio::sync::watch;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Matches,
    Favorites,
    Leagues,
    LeagueDetail,
    MatchDetail,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub favorites: FavoritesStore,
    /// Latest favorites list, read by the reminder scheduler.
    favorites_tx: watch::Sender<Vec<Match>>,
}

impl App {
    pub fn new(
        settings: AppSettings,
        favorites: FavoritesStore,
        favorites_tx: watch::Sender<Vec<Match>>,
    ) -> Self {
        favorites_tx.send_replace(favorites.all().to_vec());
        Self {
            state: AppState::new(),
            settings,
            favorites,
            favorites_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_fixtures_loaded(&mut self, matches: Vec<Match>) {
        self.state.matches = matches;
        let len = self.state.matches.len();
        self.state.matches_cursor.clamp(len);
    }

    pub fn on_leagues_loaded(&mut self, leagues: Vec<LeagueEntry>) {
        self.state.leagues = leagues;
        let len = self.state.leagues.len();
        self.state.leagues_cursor.clamp(len);
    }

    pub fn on_team_statistics_loaded(
        &mut self,
        fixture_id: u64,
        side: Side,
        statistics: TeamStatistics,
    ) {
        self.state.match_detail.accept(fixture_id, side, statistics);
    }

    /// Returns true when the terminal bell should ring.
    pub fn on_reminder(&mut self, event: ReminderEvent) -> bool {
        match event {
            ReminderEvent::Vibrate { fixture_id } => {
                debug!("ringing bell for fixture {fixture_id}");
                true
            }
            ReminderEvent::Notify(reminder) => {
                info!(
                    "Match starting soon: {} is starting soon! ({})",
                    reminder.title, reminder.league
                );
                if !self.state.alerts.iter().any(|a| a.fixture_id == reminder.fixture_id) {
                    self.state.alerts.push(reminder);
                }
                false
            }
        }
    }

    pub fn dismiss_alert(&mut self) -> bool {
        if self.state.alerts.is_empty() {
            return false;
        }
        self.state.alerts.remove(0);
        true
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    /// Esc: leave a detail screen.
    pub fn go_back(&mut self) {
        match self.state.active_tab {
            MenuItem::Help => self.exit_help(),
            MenuItem::MatchDetail => self.update_tab(self.state.match_detail.origin),
            MenuItem::LeagueDetail => self.update_tab(MenuItem::Leagues),
            _ => {}
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    /// Matches on the active list screen, in display order.
    pub fn visible_matches(&self) -> Vec<&Match> {
        match self.state.active_tab {
            MenuItem::Matches => display_order(&self.state.matches),
            MenuItem::Favorites => display_order(self.favorites.all()),
            MenuItem::LeagueDetail => match self.state.league_id {
                Some(id) => display_order(self.state.league_matches(id)),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn cursor(&self) -> Option<ListCursor> {
        match self.state.active_tab {
            MenuItem::Matches => Some(self.state.matches_cursor),
            MenuItem::Favorites => Some(self.state.favorites_cursor),
            MenuItem::Leagues => Some(self.state.leagues_cursor),
            MenuItem::LeagueDetail => Some(self.state.league_matches_cursor),
            _ => None,
        }
    }

    fn cursor_mut(&mut self) -> Option<&mut ListCursor> {
        match self.state.active_tab {
            MenuItem::Matches => Some(&mut self.state.matches_cursor),
            MenuItem::Favorites => Some(&mut self.state.favorites_cursor),
            MenuItem::Leagues => Some(&mut self.state.leagues_cursor),
            MenuItem::LeagueDetail => Some(&mut self.state.league_matches_cursor),
            _ => None,
        }
    }

    pub fn selected_index(&self) -> usize {
        self.cursor().map(|c| c.selected).unwrap_or_default()
    }

    fn list_len(&self) -> usize {
        match self.state.active_tab {
            MenuItem::Leagues => self.state.leagues.len(),
            _ => self.visible_matches().len(),
        }
    }

    pub fn select_next(&mut self) {
        if self.state.active_tab == MenuItem::MatchDetail {
            self.state.match_detail.scroll_offset =
                self.state.match_detail.scroll_offset.saturating_add(1);
            return;
        }
        let len = self.list_len();
        if let Some(cursor) = self.cursor_mut() {
            cursor.down(len);
        }
    }

    pub fn select_prev(&mut self) {
        if self.state.active_tab == MenuItem::MatchDetail {
            self.state.match_detail.scroll_offset =
                self.state.match_detail.scroll_offset.saturating_sub(1);
            return;
        }
        if let Some(cursor) = self.cursor_mut() {
            cursor.up();
        }
    }

    pub fn selected_match(&self) -> Option<&Match> {
        if self.state.active_tab == MenuItem::MatchDetail {
            return self.state.match_detail.current.as_ref();
        }
        self.visible_matches().get(self.selected_index()).copied()
    }

    // -----------------------------------------------------------------------
    // Favorites
    // -----------------------------------------------------------------------

    /// Star or unstar the selected match, persist, and publish the new list.
    pub fn toggle_selected_favorite(&mut self) {
        let Some(selected) = self.selected_match().cloned() else {
            return;
        };
        match self.favorites.toggle(&selected) {
            Ok(true) => info!("added {} to favorites", selected.title()),
            Ok(false) => info!("removed {} from favorites", selected.title()),
            Err(e) => error!("could not save favorites: {e:#}"),
        }
        self.favorites_tx.send_replace(self.favorites.all().to_vec());

        let len = self.favorites.all().len();
        self.state.favorites_cursor.clamp(len);
    }

    pub fn is_favorite(&self, m: &Match) -> bool {
        self.favorites.contains(m.id())
    }

    // -----------------------------------------------------------------------
    // Opening detail screens
    // -----------------------------------------------------------------------

    /// Enter on a list row. Returns the requests needed to fill the screen
    /// that was opened.
    pub fn open_selected(&mut self) -> Vec<NetworkRequest> {
        match self.state.active_tab {
            MenuItem::Leagues => {
                let Some(entry) = self.state.leagues.get(self.state.leagues_cursor.selected) else {
                    return Vec::new();
                };
                self.state.league_id = Some(entry.league.id);
                self.state.league_matches_cursor = ListCursor::default();
                self.update_tab(MenuItem::LeagueDetail);
                Vec::new()
            }
            MenuItem::Matches | MenuItem::Favorites | MenuItem::LeagueDetail => {
                let Some(m) = self.selected_match().cloned() else {
                    return Vec::new();
                };
                let requests = statistics_requests(&m);
                self.state.match_detail.open(m);
                self.state.match_detail.origin = self.state.active_tab;
                self.update_tab(MenuItem::MatchDetail);
                requests
            }
            _ => Vec::new(),
        }
    }
}

fn statistics_requests(m: &Match) -> Vec<NetworkRequest> {
    [(Side::Home, m.teams.home.id), (Side::Away, m.teams.away.id)]
        .into_iter()
        .map(|(side, team_id)| NetworkRequest::LoadTeamStatistics {
            fixture_id: m.id(),
            side,
            team_id,
            league_id: m.league.id,
            season: m.league.season,
        })
        .collect()
}
