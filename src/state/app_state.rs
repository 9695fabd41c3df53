use crate::app::MenuItem;
use crate::state::reminders::Reminder;
use chrono::{NaiveDate, TimeDelta};
use football_api::{LeagueEntry, Match, TeamStatistics};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Day grouping shared by every match list
// ---------------------------------------------------------------------------

/// Matches that kick off on the same UTC day.
#[derive(Debug)]
pub struct DayGroup<'a> {
    pub day: NaiveDate,
    pub matches: Vec<&'a Match>,
}

/// Group by kickoff day, days ascending. Matches keep their input order
/// within a day.
pub fn group_by_day<'a>(matches: impl IntoIterator<Item = &'a Match>) -> Vec<DayGroup<'a>> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a Match>> = BTreeMap::new();
    for m in matches {
        days.entry(m.kickoff_date()).or_default().push(m);
    }
    days.into_iter()
        .map(|(day, matches)| DayGroup { day, matches })
        .collect()
}

/// The order matches appear on screen once grouped, used to resolve a
/// cursor position into a match.
pub fn display_order<'a>(matches: impl IntoIterator<Item = &'a Match>) -> Vec<&'a Match> {
    group_by_day(matches)
        .into_iter()
        .flat_map(|group| group.matches)
        .collect()
}

/// "Today", "Tomorrow", otherwise e.g. "10 Jan".
pub fn day_title(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if today.checked_add_signed(TimeDelta::days(1)) == Some(day) {
        "Tomorrow".to_string()
    } else {
        day.format("%d %b").to_string()
    }
}

// ---------------------------------------------------------------------------
// List cursors
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
pub struct ListCursor {
    pub selected: usize,
}

impl ListCursor {
    pub fn down(&mut self, len: usize) {
        let max = len.saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Default)]
pub struct MatchDetailState {
    pub current: Option<Match>,
    /// List screen the detail was opened from; Esc returns there.
    pub origin: MenuItem,
    pub home: Option<TeamStatistics>,
    pub away: Option<TeamStatistics>,
    pub scroll_offset: u16,
}

impl MatchDetailState {
    pub fn open(&mut self, m: Match) {
        let same = self.current.as_ref().map(Match::id) == Some(m.id());
        if !same {
            self.home = None;
            self.away = None;
            self.scroll_offset = 0;
        }
        self.current = Some(m);
    }

    /// Store statistics if they belong to the match currently shown.
    /// Late answers for a match the user already left are dropped.
    pub fn accept(&mut self, fixture_id: u64, side: Side, statistics: TeamStatistics) -> bool {
        if self.current.as_ref().map(Match::id) != Some(fixture_id) {
            return false;
        }
        match side {
            Side::Home => self.home = Some(statistics),
            Side::Away => self.away = Some(statistics),
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub matches: Vec<Match>,
    pub leagues: Vec<LeagueEntry>,
    pub matches_cursor: ListCursor,
    pub favorites_cursor: ListCursor,
    pub leagues_cursor: ListCursor,
    pub league_matches_cursor: ListCursor,
    /// League opened from the Leagues tab.
    pub league_id: Option<u64>,
    pub match_detail: MatchDetailState,
    /// Reminders waiting to be acknowledged, oldest first.
    pub alerts: Vec<Reminder>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn league(&self, league_id: u64) -> Option<&LeagueEntry> {
        self.leagues.iter().find(|l| l.league.id == league_id)
    }

    pub fn league_matches(&self, league_id: u64) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.league.id == league_id)
    }
}
