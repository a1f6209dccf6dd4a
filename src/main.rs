mod app;
mod draw;
mod keys;
mod print;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PhaseTicker;
use crate::state::view::View;
use anyhow::Context;
use bgl_api::LeagueClient;
use chrono::Local;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{debug, error};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

enum Command {
    Tui,
    Print { view: String, week: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(command) = handle_cli_args()? else {
        return Ok(());
    };

    let settings = AppSettings::load().context("invalid BGL_* environment settings")?;
    let mut client = LeagueClient::new(&settings.api_url, settings.cache_ttl)
        .with_context(|| format!("cannot use league API at {:?}", settings.api_url))?;

    if let Command::Print { view, week } = command {
        let text = print::print_view(&mut client, settings.total_weeks, &view, week.as_deref()).await?;
        println!("{text}");
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread, sole owner of the response cache
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Season phase ticker (every 60s)
    let phase_ticker = PhaseTicker::new(ui_event_tx.clone());
    let phase_task = tokio::spawn(phase_ticker.run());

    // Load standings on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    phase_task.abort();

    Ok(())
}

/// `None` when the arguments were fully handled (help, version).
fn handle_cli_args() -> anyhow::Result<Option<Command>> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(Some(Command::Tui));
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            Ok(None)
        }
        "-V" | "--version" => {
            println!("bgltui {}", env!("CARGO_PKG_VERSION"));
            Ok(None)
        }
        "-p" | "--print" => {
            let view = args
                .next()
                .with_context(|| format!("--print needs a view name\n\n{}", usage_text()))?;
            let week = args.next();
            if let Some(extra) = args.next() {
                anyhow::bail!("unexpected argument: {extra}\n\n{}", usage_text());
            }
            Ok(Some(Command::Print { view, week }))
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "bgltui - league standings in the terminal

Usage:
  bgltui
  bgltui --print <standings|weekly|teams|stats> [week]
  bgltui --help
  bgltui --version

Environment:
  BGL_API_URL          League API endpoint (default: the league's deployment)
  BGL_TOTAL_WEEKS      Number of competition weeks (default 4)
  BGL_CACHE_TTL_SECS   Seconds a fetched response stays fresh (default 300)
  BGL_LOG_LEVEL        error, warn, info, debug or trace (default error)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
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
            let mut guard = app.lock().await;
            guard.on_phase_tick(Local::now().naive_local());
            let request = guard.update_tab(View::Standings);
            drop(guard);
            let _ = network_requests.send(NetworkRequest::Load(request)).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::PhaseTick => {
            let mut guard = app.lock().await;
            guard.on_phase_tick(Local::now().naive_local());
            debug!("season phase: {}", guard.state.phase_label());
            true
        }
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
        NetworkResponse::Loaded { request, result } => {
            let mut guard = app.lock().await;
            guard.on_view_loaded(&request, result);
        }
    }
    !loading.is_loading
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

fn setup_terminal() {
    let mut stdout = io::stdout();
    let result = execute!(
        stdout,
        cursor::Hide,
        terminal::EnterAlternateScreen,
        terminal::Clear(terminal::ClearType::All)
    )
    .and_then(|_| terminal::enable_raw_mode());
    if let Err(e) = result {
        error!("failed to set up terminal: {e}");
    }
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let result = execute!(
        stdout,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::All),
        terminal::LeaveAlternateScreen,
        cursor::Show
    )
    .and_then(|_| terminal::disable_raw_mode());
    if let Err(e) = result {
        eprintln!("failed to restore terminal: {e}");
    }
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
