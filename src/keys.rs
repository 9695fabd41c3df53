use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::error;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let mut requests = Vec::new();

    // A pending reminder swallows everything but quit and dismiss.
    if !guard.state.alerts.is_empty() {
        match (key_event.code, key_event.modifiers) {
            (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) => quit(),
            (Char('x') | KeyCode::Esc | KeyCode::Enter, _) => {
                guard.dismiss_alert();
            }
            _ => {}
        }
        return;
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => quit(),

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Favorites),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Leagues),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),
        (_, KeyCode::Esc, _) => guard.go_back(),

        // Lists and detail scrolling
        (_, Char('j') | KeyCode::Down, _) => guard.select_next(),
        (_, Char('k') | KeyCode::Up, _) => guard.select_prev(),
        (_, KeyCode::Enter, _) => requests = guard.open_selected(),

        // Favorites
        (
            MenuItem::Matches | MenuItem::Favorites | MenuItem::LeagueDetail | MenuItem::MatchDetail,
            Char('s') | Char(' '),
            _,
        ) => guard.toggle_selected_favorite(),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    drop(guard);
    for request in requests {
        if let Err(e) = network_requests.send(request).await {
            error!("network worker is gone: {e}");
        }
    }
}

fn quit() -> ! {
    crate::cleanup_terminal();
    std::process::exit(0);
}
