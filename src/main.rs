mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::{day_title, group_by_day};
use crate::state::favorites::FavoritesStore;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::reminders::{ChannelAlertSink, ReminderEvent, ReminderScheduler, TriggeredSet};
use crate::state::store::JsonStore;
use chrono::Utc;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info, warn};
use std::io::{Stdout, Write};
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc, watch};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = AppSettings::load();

    if handle_cli_args(&settings) {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(settings.log_level)?;
    tui_logger::set_default_level(settings.log_level);
    for warning in &settings.warnings {
        warn!("{warning}");
    }

    let kv = JsonStore::new(&settings.data_dir);
    info!("storing favorites in {}", kv.dir().display());
    let favorites = FavoritesStore::load(kv.clone());
    let mut triggered = TriggeredSet::load(kv);
    if let Err(e) = triggered.retain_favorites(favorites.all()) {
        error!("could not prune reminder state: {e:#}");
    }

    let (favorites_tx, favorites_rx) = watch::channel(Vec::new());
    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (reminder_tx, reminder_rx) = mpsc::unbounded_channel::<ReminderEvent>();

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(&settings, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Kickoff reminders, polling the published favorites list
    let scheduler = ReminderScheduler::new(
        favorites_rx,
        triggered,
        ChannelAlertSink::new(reminder_tx),
        settings.reminder_window,
        settings.reminder_poll,
        settings.notifications,
    );
    let reminder_task = tokio::spawn(scheduler.run());

    let app = Arc::new(Mutex::new(App::new(settings, favorites, favorites_tx)));

    // Load fixtures and leagues on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
        reminder_rx,
    )
    .await;

    input_handler.abort();
    network_task.abort();
    reminder_task.abort();

    Ok(())
}

fn handle_cli_args(settings: &AppSettings) -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("kickoff {}", env!("CARGO_PKG_VERSION"));
            true
        }
        "--favorites" => {
            if let Err(e) = print_favorites(settings) {
                eprintln!("kickoff: {e:#}");
                std::process::exit(1);
            }
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

/// Dump the stored favorites grouped by day, without touching the network.
/// No logger runs on this path, so problems go to stderr.
fn print_favorites(settings: &AppSettings) -> anyhow::Result<()> {
    for warning in &settings.warnings {
        eprintln!("kickoff: {warning}");
    }

    let favorites = FavoritesStore::try_load(JsonStore::new(&settings.data_dir))?;
    if favorites.all().is_empty() {
        println!("No favorites saved in {}", settings.data_dir.display());
        return Ok(());
    }

    let today = Utc::now().date_naive();
    for group in group_by_day(favorites.all()) {
        println!("{}", day_title(group.day, today));
        for m in group.matches {
            println!("  {}  {}  ({})", m.kickoff().format("%H:%M"), m.title(), m.league.name);
        }
    }
    Ok(())
}

fn usage_text() -> &'static str {
    "kickoff - football fixtures with kickoff reminders

Usage:
  kickoff
  kickoff --favorites
  kickoff --help
  kickoff --version

Environment (also read from .env):
  KICKOFF_API_KEY          RapidAPI key for API-Football
  KICKOFF_API_HOST         RapidAPI host header (default api-football-v1.p.rapidapi.com)
  KICKOFF_API_URL          API base URL
  KICKOFF_LEAGUE           League id (default 39)
  KICKOFF_SEASON           Season year (default 2023)
  KICKOFF_FIXTURES         last=N or next=N (default last=15)
  KICKOFF_DATA_DIR         Where favorites are stored (default ~/.config/kickoff)
  KICKOFF_REMINDER_WINDOW  Seconds before kickoff to remind (default 60)
  KICKOFF_REMINDER_POLL    Seconds between reminder checks (default 3)
  KICKOFF_NOTIFY           off to only ring the bell
  KICKOFF_LOG              error|warn|info|debug|trace (default info)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    mut reminder_events: mpsc::UnboundedReceiver<ReminderEvent>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(event) = reminder_events.recv() => {
                let ring = app.lock().await.on_reminder(event);
                if ring {
                    ring_bell();
                }
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            for request in [NetworkRequest::LoadFixtures, NetworkRequest::LoadLeagues] {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::FixturesLoaded { matches } => {
            app.lock().await.on_fixtures_loaded(matches);
        }
        NetworkResponse::LeaguesLoaded { leagues } => {
            app.lock().await.on_leagues_loaded(leagues);
        }
        NetworkResponse::TeamStatisticsLoaded { fixture_id, side, statistics } => {
            app.lock()
                .await
                .on_team_statistics_loaded(fixture_id, side, *statistics);
        }
        NetworkResponse::Error { message } => {
            // Logged only; whatever is on screen stays as it was.
            error!("Network error: {message}");
        }
    }
    !loading.is_loading
}

/// Stand-in for device vibration.
fn ring_bell() {
    let mut stdout = io::stdout();
    if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
        error!("could not ring bell: {e}");
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::Hide,
        terminal::EnterAlternateScreen,
        terminal::Clear(terminal::ClearType::All)
    )?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, so failures are ignored.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::All),
        terminal::LeaveAlternateScreen,
        cursor::Show
    );
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
