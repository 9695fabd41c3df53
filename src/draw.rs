use chrono::{NaiveDate, Utc};
use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::state::app_state::{day_title, group_by_day};
use crate::state::network::LoadingState;
use crate::state::reminders::Reminder;
use crate::ui::layout::LayoutAreas;
use football_api::{FormResult, HomeAwayTotal, Match, MinuteBuckets, TeamStatistics, ordered_buckets};

static TABS: &[&str; 3] = &["Matches", "Favorites", "Leagues"];

const HELP_LINES: &[(&str, &str)] = &[
    ("1 / 2 / 3", "Matches, Favorites, Leagues"),
    ("j / k, ↓ / ↑", "move selection, scroll match detail"),
    ("Enter", "open match or league"),
    ("Esc", "back"),
    ("s / space", "star or unstar the selected match"),
    ("x", "dismiss reminder"),
    ("\"", "show logs"),
    ("f", "full screen"),
    ("?", "this help"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);
    let today = Utc::now().date_naive();

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Matches => draw_match_list(f, layout.main, app, " Matches ", today),
            MenuItem::Favorites => draw_match_list(f, layout.main, app, " Favorites ", today),
            MenuItem::Leagues => draw_leagues(f, layout.main, app),
            MenuItem::LeagueDetail => draw_league_detail(f, layout.main, app, today),
            MenuItem::MatchDetail => draw_match_detail(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }

        if let Some(alert) = app.state.alerts.first() {
            draw_alert(f, f.area(), alert, app.state.alerts.len());
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn tab_index(active: MenuItem, previous: MenuItem) -> usize {
    match active {
        MenuItem::Matches => 0,
        MenuItem::Favorites => 1,
        MenuItem::Leagues | MenuItem::LeagueDetail => 2,
        MenuItem::MatchDetail | MenuItem::Help => match previous {
            MenuItem::Favorites => 1,
            MenuItem::Leagues | MenuItem::LeagueDetail => 2,
            _ => 0,
        },
    }
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index(app.state.active_tab, app.state.previous_tab))
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Match lists
// ---------------------------------------------------------------------------

/// Day headers followed by one row per match. Returns the lines and the line
/// index of the selected row.
fn match_list_lines(
    matches: &[&Match],
    selected: usize,
    today: NaiveDate,
    is_favorite: impl Fn(&Match) -> bool,
) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::with_capacity(matches.len() * 2);
    let mut selected_line = 0;
    let mut row = 0;

    for group in group_by_day(matches.iter().copied()) {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            day_title(group.day, today),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));

        for m in group.matches {
            let is_selected = row == selected;
            if is_selected {
                selected_line = lines.len();
            }
            lines.push(match_row(m, is_selected, is_favorite(m)));
            row += 1;
        }
    }

    (lines, selected_line)
}

fn match_row(m: &Match, selected: bool, favorite: bool) -> Line<'static> {
    let marker = if selected { ">" } else { " " };
    let star = if favorite { "★" } else { "☆" };
    let star_style = if favorite {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::raw(format!("{marker} ")),
        Span::styled(star, star_style),
        Span::raw(format!(" {}  ", m.kickoff().format("%H:%M"))),
        Span::raw(m.title()),
        Span::styled(format!("  {}", match_state(m)), state_style(m)),
    ]);

    if selected {
        line.style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
    } else {
        line
    }
}

/// Score for started matches, otherwise the short status.
fn match_state(m: &Match) -> String {
    let score = match (m.goals.home, m.goals.away) {
        (Some(home), Some(away)) if m.is_finished() || m.is_live() => Some(format!("{home} - {away}")),
        _ => None,
    };
    match (score, m.fixture.status.elapsed) {
        (Some(score), Some(elapsed)) if m.is_live() => format!("{score}  {elapsed}'"),
        (Some(score), _) => format!("{score}  {}", m.fixture.status.short),
        (None, _) => m.fixture.status.short.clone(),
    }
}

fn state_style(m: &Match) -> Style {
    if m.is_live() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Scroll so the selected line stays on screen.
fn list_scroll(selected_line: usize, height: u16) -> u16 {
    let visible = usize::from(height.max(1));
    u16::try_from(selected_line.saturating_sub(visible - 1)).unwrap_or(u16::MAX)
}

fn draw_match_list(f: &mut Frame, area: Rect, app: &App, title: &str, today: NaiveDate) {
    let block = default_border(Color::White).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let matches = app.visible_matches();
    if matches.is_empty() {
        let msg = match app.state.active_tab {
            MenuItem::Favorites => "No favorites yet. Press s on a match to star it.",
            _ => "No matches loaded",
        };
        f.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let (lines, selected_line) =
        match_list_lines(&matches, app.selected_index(), today, |m| app.is_favorite(m));
    f.render_widget(
        Paragraph::new(lines).scroll((list_scroll(selected_line, inner.height), 0)),
        inner,
    );
}

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

fn draw_leagues(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Leagues ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.leagues.is_empty() {
        f.render_widget(
            Paragraph::new("No leagues loaded").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let selected = app.state.leagues_cursor.selected;
    let lines: Vec<Line> = app
        .state
        .leagues
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let marker = if idx == selected { ">" } else { " " };
            let season = entry
                .current_season()
                .map(|s| s.year.to_string())
                .unwrap_or_else(|| "-".to_string());
            let line = Line::from(vec![
                Span::raw(format!("{marker} {}", entry.league.name)),
                Span::styled(
                    format!("  {} · {season}", entry.country.name),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            if idx == selected {
                line.style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            } else {
                line
            }
        })
        .collect();

    f.render_widget(
        Paragraph::new(lines).scroll((list_scroll(selected, inner.height), 0)),
        inner,
    );
}

fn draw_league_detail(f: &mut Frame, area: Rect, app: &App, today: NaiveDate) {
    let entry = app.state.league_id.and_then(|id| app.state.league(id));
    let title = entry
        .map(|e| format!(" {} ", e.league.name))
        .unwrap_or_else(|| " League ".to_string());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::new();
    if let Some(entry) = entry {
        let mut header = format!("{} · {}", entry.country.name, entry.league.kind);
        if let Some(season) = entry.current_season() {
            header.push_str(&format!(" · season {} ({} to {})", season.year, season.start, season.end));
        }
        lines.push(Line::from(Span::styled(header, Style::default().fg(Color::DarkGray))));
        lines.push(Line::default());
    }
    let header_len = lines.len();

    let matches = app.visible_matches();
    if matches.is_empty() {
        lines.push(Line::from("No loaded fixtures for this league"));
        f.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let (list, selected_line) =
        match_list_lines(&matches, app.selected_index(), today, |m| app.is_favorite(m));
    lines.extend(list);
    f.render_widget(
        Paragraph::new(lines)
            .scroll((list_scroll(selected_line + header_len, inner.height), 0)),
        inner,
    );
}

// ---------------------------------------------------------------------------
// Match detail
// ---------------------------------------------------------------------------

fn draw_match_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Match ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let detail = &app.state.match_detail;
    let Some(m) = detail.current.as_ref() else {
        f.render_widget(Paragraph::new("Select a match and press Enter"), inner);
        return;
    };

    let mut lines = match_header_lines(m, app.is_favorite(m));
    for (name, stats) in [
        (&m.teams.home.name, detail.home.as_ref()),
        (&m.teams.away.name, detail.away.as_ref()),
    ] {
        lines.push(Line::default());
        match stats {
            Some(stats) => lines.extend(statistics_lines(name, stats)),
            None => {
                lines.push(section_title(name));
                lines.push(Line::from(Span::styled(
                    "  loading statistics…",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((detail.scroll_offset, 0)),
        inner,
    );
}

fn match_header_lines(m: &Match, favorite: bool) -> Vec<Line<'static>> {
    let star = if favorite { " ★" } else { "" };
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}{star}", m.title()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} · {}", m.league.name, m.league.round)),
        Line::from(format!("Kickoff {}", m.kickoff().format("%a %d %b %Y %H:%M UTC"))),
    ];
    if let Some(venue) = m.fixture.venue.label() {
        lines.push(Line::from(format!("Venue   {venue}")));
    }
    if let Some(referee) = m.fixture.referee.as_deref() {
        lines.push(Line::from(format!("Referee {referee}")));
    }

    let status = match m.fixture.status.elapsed {
        Some(elapsed) if m.is_live() => format!("{} ({elapsed}')", m.fixture.status.long),
        _ => m.fixture.status.long.clone(),
    };
    lines.push(Line::from(Span::styled(status, state_style(m))));

    if let (Some(home), Some(away)) = (m.goals.home, m.goals.away) {
        lines.push(Line::from(Span::styled(
            format!("Score   {home} - {away}"),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    let breakdown = [
        ("Half time", Some(&m.score.halftime)),
        ("Full time", Some(&m.score.fulltime)),
        ("Extra time", m.score.extratime.as_ref()),
        ("Penalties", m.score.penalty.as_ref()),
    ];
    for (label, detail) in breakdown {
        if let Some(score) = detail.and_then(|d| d.display()) {
            lines.push(Line::from(format!("  {label:<10} {score}")));
        }
    }
    lines
}

fn section_title(name: &str) -> Line<'static> {
    Line::from(Span::styled(
        name.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn form_color(result: FormResult) -> Color {
    match result {
        FormResult::Win => Color::Green,
        FormResult::Draw => Color::Yellow,
        FormResult::Loss => Color::Red,
        FormResult::Unknown => Color::DarkGray,
    }
}

fn totals(label: &str, t: &HomeAwayTotal) -> Line<'static> {
    Line::from(format!("  {label:<16} {:>3}  (home {}, away {})", t.total, t.home, t.away))
}

fn bucket_line(label: &str, buckets: &MinuteBuckets) -> Option<Line<'static>> {
    let parts: Vec<String> = ordered_buckets(buckets)
        .into_iter()
        .filter_map(|(minutes, bucket)| bucket.total.map(|n| format!("{minutes}: {n}")))
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(Line::from(format!("  {label:<16} {}", parts.join("  "))))
}

fn statistics_lines(name: &str, stats: &TeamStatistics) -> Vec<Line<'static>> {
    let mut lines = vec![section_title(name)];

    let results = stats.form_results();
    if !results.is_empty() {
        let mut spans = vec![Span::raw(format!("  {:<16} ", "Form"))];
        spans.extend(results.into_iter().map(|r| {
            Span::styled(
                r.letter().to_string(),
                Style::default().fg(form_color(r)).add_modifier(Modifier::BOLD),
            )
        }));
        lines.push(Line::from(spans));
    }

    let fixtures = &stats.fixtures;
    lines.push(totals("Played", &fixtures.played));
    lines.push(totals("Wins", &fixtures.wins));
    lines.push(totals("Draws", &fixtures.draws));
    lines.push(totals("Losses", &fixtures.loses));

    lines.push(totals("Goals for", &stats.goals.scored.total));
    lines.push(totals("Goals against", &stats.goals.against.total));
    if let Some(avg) = stats.goals.scored.average.total.as_deref() {
        let against = stats.goals.against.average.total.as_deref().unwrap_or("-");
        lines.push(Line::from(format!("  {:<16} {avg} for, {against} against", "Per match")));
    }
    lines.extend(bucket_line("Scored by minute", &stats.goals.scored.minute));
    lines.extend(bucket_line("Conceded by min.", &stats.goals.against.minute));

    lines.push(totals("Clean sheets", &stats.clean_sheet));
    lines.push(totals("Failed to score", &stats.failed_to_score));

    let penalty = &stats.penalty;
    if penalty.total > 0 {
        lines.push(Line::from(format!(
            "  {:<16} {} scored, {} missed of {}",
            "Penalties", penalty.scored.total, penalty.missed.total, penalty.total
        )));
    }

    let streak = &stats.biggest.streak;
    lines.push(Line::from(format!(
        "  {:<16} {} wins, {} draws, {} losses",
        "Longest streak", streak.wins, streak.draws, streak.loses
    )));

    if !stats.lineups.is_empty() {
        let formations: Vec<String> = stats
            .lineups
            .iter()
            .map(|l| format!("{} ({})", l.formation, l.played))
            .collect();
        lines.push(Line::from(format!("  {:<16} {}", "Lineups", formations.join(", "))));
    }

    lines.extend(bucket_line("Yellow cards", &stats.cards.yellow));
    lines.extend(bucket_line("Red cards", &stats.cards.red));
    lines
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{keys:>14}  "), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::White))
        .output_file(false)
        .output_line(false);
    f.render_widget(logs, area);
}

/// A rect of at most `width` x `height` centred in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_alert(f: &mut Frame, area: Rect, alert: &Reminder, pending: usize) {
    let popup = centered(area, 52, 7);
    f.render_widget(Clear, popup);

    let title = if pending > 1 {
        format!(" Match starting soon (+{}) ", pending - 1)
    } else {
        " Match starting soon ".to_string()
    };
    let lines = vec![
        Line::from(Span::styled(
            format!("{} is starting soon!", alert.title),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} · kickoff {}", alert.league, alert.kickoff.format("%H:%M"))),
        Line::default(),
        Line::from(Span::styled("x to dismiss", Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(default_border(Color::Yellow).title(title)),
        popup,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading {
        return;
    }
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::White));
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
