pub mod client;
pub mod wire;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Fixtures — one record per scheduled match, as API-Football returns them
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub fixture: Fixture,
    pub league: League,
    pub teams: Teams,
    pub goals: Goals,
    pub score: Score,
}

impl Match {
    /// Fixture id, the identity of a match.
    pub fn id(&self) -> u64 {
        self.fixture.id
    }

    pub fn kickoff(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.fixture.timestamp, 0).unwrap_or_default()
    }

    /// Calendar day of kickoff in UTC.
    pub fn kickoff_date(&self) -> NaiveDate {
        self.kickoff().date_naive()
    }

    pub fn title(&self) -> String {
        format!("{} vs {}", self.teams.home.name, self.teams.away.name)
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.fixture.status.short.as_str(),
            "FT" | "AET" | "PEN" | "AWD" | "WO"
        )
    }

    pub fn is_live(&self) -> bool {
        matches!(
            self.fixture.status.short.as_str(),
            "1H" | "HT" | "2H" | "ET" | "BT" | "P" | "LIVE" | "INT"
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u64,
    pub referee: Option<String>,
    #[serde(default)]
    pub timezone: String,
    /// ISO 8601 kickoff, e.g. "2024-01-10T20:00:00+00:00".
    #[serde(default)]
    pub date: String,
    /// Kickoff as unix seconds.
    pub timestamp: i64,
    #[serde(default)]
    pub venue: Venue,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub city: Option<String>,
}

impl Venue {
    pub fn label(&self) -> Option<String> {
        match (&self.name, &self.city) {
            (Some(name), Some(city)) => Some(format!("{name}, {city}")),
            (Some(name), None) => Some(name.clone()),
            (None, Some(city)) => Some(city.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub long: String,
    pub short: String,
    pub elapsed: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub logo: String,
    pub flag: Option<String>,
    pub season: u16,
    #[serde(default)]
    pub round: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    pub home: Team,
    pub away: Team,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo: String,
    pub winner: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub home: Option<u16>,
    pub away: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub halftime: ScoreDetail,
    #[serde(default)]
    pub fulltime: ScoreDetail,
    pub extratime: Option<ScoreDetail>,
    pub penalty: Option<ScoreDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub home: Option<u16>,
    pub away: Option<u16>,
}

impl ScoreDetail {
    /// "2 - 1", or None while either side is unknown.
    pub fn display(&self) -> Option<String> {
        Some(format!("{} - {}", self.home?, self.away?))
    }
}

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueEntry {
    pub league: LeagueInfo,
    pub country: Country,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

impl LeagueEntry {
    pub fn current_season(&self) -> Option<&Season> {
        self.seasons
            .iter()
            .find(|s| s.current)
            .or_else(|| self.seasons.iter().max_by_key(|s| s.year))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub logo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: Option<String>,
    pub flag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub year: u16,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub current: bool,
    pub coverage: Option<Coverage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    #[serde(default)]
    pub fixtures: FixtureCoverage,
    #[serde(default)]
    pub standings: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureCoverage {
    #[serde(default)]
    pub events: bool,
    #[serde(default)]
    pub lineups: bool,
}

// ---------------------------------------------------------------------------
// Team statistics — season aggregates for one team in one league
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub league: StatisticsLeague,
    pub team: TeamInfo,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub fixtures: FixtureTotals,
    #[serde(default)]
    pub goals: TeamGoals,
    #[serde(default)]
    pub biggest: Biggest,
    #[serde(default)]
    pub clean_sheet: HomeAwayTotal,
    #[serde(default)]
    pub failed_to_score: HomeAwayTotal,
    #[serde(default)]
    pub penalty: Penalty,
    #[serde(default)]
    pub lineups: Vec<Lineup>,
    #[serde(default)]
    pub cards: Cards,
}

impl TeamStatistics {
    /// The form string ("WDLLW...") as individual results, oldest first.
    pub fn form_results(&self) -> Vec<FormResult> {
        self.form
            .as_deref()
            .unwrap_or_default()
            .chars()
            .map(FormResult::from)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
    Unknown,
}

impl From<char> for FormResult {
    fn from(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'W' => FormResult::Win,
            'D' => FormResult::Draw,
            'L' => FormResult::Loss,
            _ => FormResult::Unknown,
        }
    }
}

impl FormResult {
    pub fn letter(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
            FormResult::Unknown => '?',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsLeague {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub logo: String,
    pub flag: Option<String>,
    pub season: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeAwayTotal {
    #[serde(default)]
    pub home: u32,
    #[serde(default)]
    pub away: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureTotals {
    #[serde(default)]
    pub played: HomeAwayTotal,
    #[serde(default)]
    pub wins: HomeAwayTotal,
    #[serde(default)]
    pub draws: HomeAwayTotal,
    #[serde(default)]
    pub loses: HomeAwayTotal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamGoals {
    #[serde(rename = "for", default)]
    pub scored: GoalSplit,
    #[serde(default)]
    pub against: GoalSplit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSplit {
    #[serde(default)]
    pub total: HomeAwayTotal,
    #[serde(default)]
    pub average: Average,
    #[serde(default)]
    pub minute: MinuteBuckets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Average {
    pub home: Option<String>,
    pub away: Option<String>,
    pub total: Option<String>,
}

/// Timing buckets keyed by the API's range label ("0-15", "16-30", ...).
pub type MinuteBuckets = BTreeMap<String, MinuteBucket>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinuteBucket {
    pub total: Option<u32>,
    pub percentage: Option<String>,
}

/// Buckets in match order. Lexical order would put "106-120" before "16-30".
pub fn ordered_buckets(buckets: &MinuteBuckets) -> Vec<(&str, &MinuteBucket)> {
    let mut ordered: Vec<(&str, &MinuteBucket)> =
        buckets.iter().map(|(k, v)| (k.as_str(), v)).collect();
    ordered.sort_by_key(|(label, _)| bucket_start(label));
    ordered
}

fn bucket_start(label: &str) -> u32 {
    label
        .split('-')
        .next()
        .and_then(|start| start.trim().parse().ok())
        .unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Biggest {
    #[serde(default)]
    pub streak: Streak,
    #[serde(default)]
    pub wins: HomeAwayScore,
    #[serde(default)]
    pub loses: HomeAwayScore,
    #[serde(default)]
    pub goals: BiggestGoals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub loses: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeAwayScore {
    pub home: Option<String>,
    pub away: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiggestGoals {
    #[serde(rename = "for", default)]
    pub scored: HomeAwayCount,
    #[serde(default)]
    pub against: HomeAwayCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeAwayCount {
    #[serde(default)]
    pub home: u32,
    #[serde(default)]
    pub away: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    #[serde(default)]
    pub scored: PenaltyOutcome,
    #[serde(default)]
    pub missed: PenaltyOutcome,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyOutcome {
    #[serde(default)]
    pub total: u32,
    pub percentage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub formation: String,
    pub played: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cards {
    #[serde(default)]
    pub yellow: MinuteBuckets,
    #[serde(default)]
    pub red: MinuteBuckets,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_buckets_sort_by_start_minute() {
        let mut buckets = MinuteBuckets::new();
        for label in ["106-120", "0-15", "91-105", "16-30", "46-60"] {
            buckets.insert(label.to_string(), MinuteBucket::default());
        }
        let labels: Vec<&str> = ordered_buckets(&buckets).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["0-15", "16-30", "46-60", "91-105", "106-120"]);
    }

    #[test]
    fn unparseable_bucket_labels_sort_last() {
        let mut buckets = MinuteBuckets::new();
        buckets.insert(String::new(), MinuteBucket::default());
        buckets.insert("76-90".to_string(), MinuteBucket::default());
        let labels: Vec<&str> = ordered_buckets(&buckets).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["76-90", ""]);
    }

    #[test]
    fn form_string_parses_case_insensitively() {
        let stats = TeamStatistics {
            form: Some("WdLx".into()),
            ..Default::default()
        };
        assert_eq!(
            stats.form_results(),
            vec![FormResult::Win, FormResult::Draw, FormResult::Loss, FormResult::Unknown]
        );
    }

    #[test]
    fn missing_form_is_empty() {
        assert!(TeamStatistics::default().form_results().is_empty());
    }

    #[test]
    fn kickoff_comes_from_unix_timestamp() {
        let mut m = Match::default();
        m.fixture.timestamp = 1_704_886_560;
        assert_eq!(m.kickoff().to_rfc3339(), "2024-01-10T11:36:00+00:00");
        assert_eq!(m.kickoff_date(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn score_detail_needs_both_sides() {
        let full = ScoreDetail { home: Some(3), away: Some(2) };
        let half = ScoreDetail { home: Some(1), away: None };
        assert_eq!(full.display().as_deref(), Some("3 - 2"));
        assert_eq!(half.display(), None);
    }

    #[test]
    fn current_season_prefers_flag_then_latest_year() {
        let entry = LeagueEntry {
            seasons: vec![
                Season { year: 2022, ..Default::default() },
                Season { year: 2023, current: true, ..Default::default() },
                Season { year: 2024, ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(entry.current_season().map(|s| s.year), Some(2023));

        let no_flag = LeagueEntry {
            seasons: vec![Season { year: 2021, ..Default::default() }, Season { year: 2020, ..Default::default() }],
            ..Default::default()
        };
        assert_eq!(no_flag.current_season().map(|s| s.year), Some(2021));
    }

    #[test]
    fn match_deserializes_from_api_shape() {
        let json = r#"{
            "fixture": {"id": 50, "referee": null, "timezone": "UTC", "date": "2024-01-10T11:36:00+00:00",
                        "timestamp": 1704886560, "venue": {"id": 1, "name": "Old Trafford", "city": "Manchester"},
                        "status": {"long": "Match Finished", "short": "FT", "elapsed": 90}},
            "league": {"id": 39, "name": "Premier League", "country": "England", "logo": "l.png",
                       "flag": null, "season": 2023, "round": "Regular Season - 1"},
            "teams": {"home": {"id": 33, "name": "Manchester United", "logo": "h.png", "winner": true},
                      "away": {"id": 66, "name": "Aston Villa", "logo": "a.png", "winner": false}},
            "goals": {"home": 3, "away": 2},
            "score": {"halftime": {"home": 1, "away": 1}, "fulltime": {"home": 3, "away": 2},
                      "extratime": {"home": null, "away": null}, "penalty": {"home": null, "away": null}}
        }"#;
        let m: Match = serde_json::from_str(json).unwrap();
        assert_eq!(m.id(), 50);
        assert_eq!(m.title(), "Manchester United vs Aston Villa");
        assert!(m.is_finished());
        assert!(!m.is_live());
        assert_eq!(m.fixture.venue.label().as_deref(), Some("Old Trafford, Manchester"));
        assert_eq!(m.score.extratime.and_then(|s| s.display()), None);
    }
}
