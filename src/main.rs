use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use math_runner::build_info;
use math_runner::config::GameConfig;
use math_runner::constants::LOG_FILENAME;
use math_runner::input::{map_key, InputResult, PlayState};
use math_runner::persistence;
use math_runner::stats::Dashboard;
use math_runner::store::ProfileStore;
use math_runner::ui::dashboard_scene::{render_dashboard, text_report};
use math_runner::ui::play_scene::render_play_scene;
use math_runner::ui::player_select::{PlayerSelectScreen, SelectAction};
use math_runner::ui::ensure_min_size;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const POLL_INTERVAL_MS: u64 = 50;

enum Screen {
    PlayerSelect,
    Game,
    Dashboard,
}

/// Log to a file in the data directory; the terminal belongs to the TUI.
fn init_logging() {
    let file = persistence::data_path(LOG_FILENAME).and_then(|path| {
        OpenOptions::new().create(true).append(true).open(path)
    });
    let Ok(file) = file else {
        return;
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "math_runner=info".into());
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    // Ignore a second init (e.g. a subscriber set up by an embedding test)
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();
}

fn print_help() {
    println!("Math Runner - timed arithmetic practice\n");
    println!("Usage: math-runner [command]\n");
    println!("Commands:");
    println!("  stats <player>  Print a player's stats dashboard");
    println!("  --version       Show version information");
    println!("  --help          Show this help message");
}

fn print_stats(player: &str) -> i32 {
    let store = match ProfileStore::new() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not open data directory: {}", e);
            return 1;
        }
    };
    if !store.exists(player) {
        eprintln!("No saved player named '{}'.", player);
        return 1;
    }
    match store.load(player) {
        Ok(data) => {
            println!("{}", text_report(&data.profile.name, &data.dashboard()));
            0
        }
        Err(e) => {
            eprintln!("Could not read player '{}': {}", player, e);
            1
        }
    }
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" | "-v" => {
                println!("{}", build_info::version_line());
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "stats" => match args.get(2) {
                Some(player) => std::process::exit(print_stats(player)),
                None => {
                    eprintln!("Usage: math-runner stats <player>");
                    std::process::exit(1);
                }
            },
            other => {
                eprintln!("Unknown command: {}", other);
                eprintln!("Run 'math-runner --help' for usage.");
                std::process::exit(1);
            }
        }
    }

    init_logging();
    let config = GameConfig::load();
    let store = ProfileStore::new()?;
    tracing::info!(dir = %store.dir().display(), "starting");

    let players = store.list_players().unwrap_or_default();
    let mut select_screen = PlayerSelectScreen::new(players.len());
    let mut current_screen = Screen::PlayerSelect;
    let mut play: Option<PlayState<ProfileStore>> = None;
    let mut dashboard: Option<Dashboard> = None;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();

    'main: loop {
        match current_screen {
            Screen::PlayerSelect => {
                let players = store.list_players().unwrap_or_default();
                if select_screen.selected_index >= players.len() {
                    select_screen.selected_index = players.len().saturating_sub(1);
                }

                terminal.draw(|f| {
                    let area = f.size();
                    select_screen.draw(f, area, &players);
                })?;

                if event::poll(Duration::from_millis(POLL_INTERVAL_MS))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        match select_screen.handle_key(key.code, &players) {
                            SelectAction::Play(name) => match store.load_or_create(&name) {
                                Ok(data) => {
                                    tracing::info!(player = %data.profile.name, "session start");
                                    play = Some(PlayState::new(
                                        config,
                                        &data.profile.name,
                                        Some(data.profile.clone()),
                                        store.clone(),
                                    ));
                                    select_screen = PlayerSelectScreen::new(1);
                                    last_tick = Instant::now();
                                    current_screen = Screen::Game;
                                }
                                Err(e) => {
                                    select_screen.validation_error =
                                        Some(format!("Could not load player: {}", e));
                                }
                            },
                            SelectAction::Quit => break 'main,
                            SelectAction::None => {}
                        }
                    }
                }
            }

            Screen::Game => {
                let Some(state) = play.as_mut() else {
                    current_screen = Screen::PlayerSelect;
                    continue;
                };

                terminal.draw(|f| {
                    let area = f.size();
                    if ensure_min_size(f, area) {
                        render_play_scene(f, area, state);
                    }
                })?;

                if event::poll(Duration::from_millis(POLL_INTERVAL_MS))? {
                    if let Event::Key(key) = event::read()? {
                        match state.process_input(map_key(key)) {
                            InputResult::Continue => {}
                            InputResult::OpenDashboard => {
                                dashboard = store
                                    .load(state.game.player())
                                    .map(|data| data.dashboard())
                                    .ok();
                                current_screen = Screen::Dashboard;
                            }
                            InputResult::Quit => break 'main,
                        }
                    }
                }

                let since = last_tick.elapsed();
                if since >= Duration::from_millis(config.tick_interval_ms) {
                    state.tick(since.as_millis() as u64);
                    last_tick = Instant::now();
                }
            }

            Screen::Dashboard => {
                let player = play
                    .as_ref()
                    .map(|p| p.game.player().to_string())
                    .unwrap_or_default();
                let empty = Dashboard::from_records(&[]);
                let shown = dashboard.as_ref().unwrap_or(&empty);

                terminal.draw(|f| {
                    let area = f.size();
                    render_dashboard(f, area, &player, shown);
                })?;

                if event::poll(Duration::from_millis(POLL_INTERVAL_MS))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        match key.code {
                            KeyCode::Enter => {
                                if let Some(state) = play.as_mut() {
                                    state.process_input(map_key(key));
                                }
                                last_tick = Instant::now();
                                current_screen = Screen::Game;
                            }
                            KeyCode::Esc => {
                                play = None;
                                dashboard = None;
                                current_screen = Screen::PlayerSelect;
                            }
                            KeyCode::Char('q') | KeyCode::Char('Q') => break 'main,
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;

    println!("Thanks for practicing!");

    Ok(())
}
