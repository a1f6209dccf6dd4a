use crate::app::App;
use crate::state::messages::NetworkRequest;
use crate::state::view::View;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    let request = match (guard.state.show_help, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Help overlay
        (_, Char('?'), _) => {
            guard.toggle_help();
            None
        }
        (true, KeyCode::Esc, _) => {
            guard.exit_help();
            None
        }

        // View switching
        (_, Char('1'), _) => Some(guard.update_tab(View::Standings)),
        (_, Char('2'), _) => Some(guard.update_tab(View::Weekly)),
        (_, Char('3'), _) => Some(guard.update_tab(View::Teams)),
        (_, Char('4'), _) => Some(guard.update_tab(View::Stats)),
        (_, KeyCode::Tab, _) => Some(guard.next_view()),
        (_, KeyCode::BackTab, _) => Some(guard.prev_view()),

        // Week dropdown of the active view
        (_, Char('l') | KeyCode::Right, _) => guard.step_selector(1),
        (_, Char('h') | KeyCode::Left, _) => guard.step_selector(-1),

        (_, Char('r'), _) => Some(guard.reload()),

        // Global
        (_, Char('f'), _) => {
            guard.toggle_full_screen();
            None
        }
        (_, Char('"'), _) => {
            guard.toggle_show_logs();
            None
        }

        _ => None,
    };

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(NetworkRequest::Load(request)).await;
    }
}
