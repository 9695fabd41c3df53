use football_api::client::{API_FOOTBALL_HOST, API_FOOTBALL_URL, ApiConfig, FixtureWindow};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LEAGUE: u64 = 39;
pub const DEFAULT_SEASON: u16 = 2023;
pub const DEFAULT_REMINDER_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_REMINDER_POLL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    pub api: ApiConfig,
    pub league: u64,
    pub season: u16,
    pub fixtures: FixtureWindow,
    /// Where favorites and fired reminders are persisted.
    pub data_dir: PathBuf,
    /// How far ahead of kickoff a reminder fires.
    pub reminder_window: Duration,
    pub reminder_poll: Duration,
    /// Whether the user allows notifications. Vibration (the terminal bell)
    /// is not gated on this.
    pub notifications: bool,
    /// Problems found while reading the environment. Settings are read
    /// before any logger exists, so these are reported once one does.
    pub warnings: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: LevelFilter::Info,
            api: ApiConfig::default(),
            league: DEFAULT_LEAGUE,
            season: DEFAULT_SEASON,
            fixtures: FixtureWindow::default(),
            data_dir: PathBuf::from("kickoff"),
            reminder_window: DEFAULT_REMINDER_WINDOW,
            reminder_poll: DEFAULT_REMINDER_POLL,
            notifications: true,
            warnings: Vec::new(),
        }
    }
}

impl AppSettings {
    /// Read settings from `KICKOFF_*` environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut warnings = Vec::new();
        let mut settings = Self {
            data_dir: default_data_dir(&var),
            ..Self::default()
        };

        if let Some(key) = var("KICKOFF_API_KEY") {
            settings.api.key = key;
        }
        settings.api.host = var("KICKOFF_API_HOST").unwrap_or_else(|| API_FOOTBALL_HOST.into());
        settings.api.base_url = var("KICKOFF_API_URL").unwrap_or_else(|| API_FOOTBALL_URL.into());

        let w = &mut warnings;
        settings.league = parse_or(w, "KICKOFF_LEAGUE", var("KICKOFF_LEAGUE"), DEFAULT_LEAGUE);
        settings.season = parse_or(w, "KICKOFF_SEASON", var("KICKOFF_SEASON"), DEFAULT_SEASON);
        settings.fixtures =
            parse_or(w, "KICKOFF_FIXTURES", var("KICKOFF_FIXTURES"), settings.fixtures);
        settings.log_level = parse_or(w, "KICKOFF_LOG", var("KICKOFF_LOG"), settings.log_level);

        let window: u64 = parse_or(
            &mut warnings,
            "KICKOFF_REMINDER_WINDOW",
            var("KICKOFF_REMINDER_WINDOW"),
            DEFAULT_REMINDER_WINDOW.as_secs(),
        );
        settings.reminder_window = Duration::from_secs(window);

        let poll: u64 = parse_or(
            &mut warnings,
            "KICKOFF_REMINDER_POLL",
            var("KICKOFF_REMINDER_POLL"),
            DEFAULT_REMINDER_POLL.as_secs(),
        );
        settings.reminder_poll = Duration::from_secs(poll.max(1));

        if let Some(notify) = var("KICKOFF_NOTIFY") {
            settings.notifications =
                !matches!(notify.to_lowercase().as_str(), "0" | "false" | "off" | "no");
        }

        settings.warnings = warnings;
        settings
    }
}

fn parse_or<T: FromStr>(
    warnings: &mut Vec<String>,
    name: &str,
    raw: Option<String>,
    default: T,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warnings.push(format!("invalid {name}={raw:?}, using default"));
            default
        }
    }
}

fn default_data_dir(var: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = var("KICKOFF_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(config_dir) = var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_dir).join("kickoff");
    }
    if let Some(home) = var("HOME") {
        return PathBuf::from(home).join(".config").join("kickoff");
    }
    PathBuf::from("kickoff")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> AppSettings {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let s = settings_from(&[]);
        assert_eq!(s.league, 39);
        assert_eq!(s.season, 2023);
        assert_eq!(s.fixtures, FixtureWindow::Last(15));
        assert_eq!(s.reminder_window, Duration::from_secs(60));
        assert_eq!(s.reminder_poll, Duration::from_secs(3));
        assert!(s.notifications);
        assert_eq!(s.api.base_url, API_FOOTBALL_URL);
        assert!(s.api.key.is_empty());
        assert_eq!(s.data_dir, PathBuf::from("kickoff"));
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn environment_overrides_apply() {
        let s = settings_from(&[
            ("KICKOFF_API_KEY", "secret"),
            ("KICKOFF_API_URL", "http://localhost:8080/v3"),
            ("KICKOFF_LEAGUE", "140"),
            ("KICKOFF_SEASON", "2024"),
            ("KICKOFF_FIXTURES", "next=10"),
            ("KICKOFF_REMINDER_WINDOW", "120"),
            ("KICKOFF_REMINDER_POLL", "5"),
            ("KICKOFF_NOTIFY", "off"),
            ("KICKOFF_LOG", "debug"),
            ("KICKOFF_DATA_DIR", "/tmp/kickoff-data"),
        ]);
        assert_eq!(s.api.key, "secret");
        assert_eq!(s.api.base_url, "http://localhost:8080/v3");
        assert_eq!(s.league, 140);
        assert_eq!(s.season, 2024);
        assert_eq!(s.fixtures, FixtureWindow::Next(10));
        assert_eq!(s.reminder_window, Duration::from_secs(120));
        assert_eq!(s.reminder_poll, Duration::from_secs(5));
        assert!(!s.notifications);
        assert_eq!(s.log_level, LevelFilter::Debug);
        assert_eq!(s.data_dir, PathBuf::from("/tmp/kickoff-data"));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let s = settings_from(&[
            ("KICKOFF_LEAGUE", "premier"),
            ("KICKOFF_FIXTURES", "someday"),
            ("KICKOFF_REMINDER_POLL", "0"),
            ("KICKOFF_NOTIFY", "yes"),
        ]);
        assert_eq!(s.league, DEFAULT_LEAGUE);
        assert_eq!(s.fixtures, FixtureWindow::Last(15));
        assert_eq!(s.reminder_poll, Duration::from_secs(1));
        assert!(s.notifications);
        assert_eq!(s.warnings.len(), 2);
        assert!(s.warnings[0].contains("KICKOFF_LEAGUE"), "{:?}", s.warnings);
        assert!(s.warnings[1].contains("KICKOFF_FIXTURES"), "{:?}", s.warnings);
    }

    #[test]
    fn unparseable_window_is_reported() {
        let s = settings_from(&[("KICKOFF_REMINDER_WINDOW", "soon")]);
        assert_eq!(s.reminder_window, DEFAULT_REMINDER_WINDOW);
        assert_eq!(s.warnings, vec![r#"invalid KICKOFF_REMINDER_WINDOW="soon", using default"#]);
    }

    #[test]
    fn data_dir_follows_xdg_then_home() {
        let xdg = settings_from(&[("XDG_CONFIG_HOME", "/cfg"), ("HOME", "/home/fan")]);
        assert_eq!(xdg.data_dir, PathBuf::from("/cfg/kickoff"));

        let home = settings_from(&[("HOME", "/home/fan")]);
        assert_eq!(home.data_dir, PathBuf::from("/home/fan/.config/kickoff"));
    }
}
