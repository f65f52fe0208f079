pub mod app_dirs;
pub mod config;
pub mod game;
pub mod pool;
pub mod runtime;
pub mod scorelog;
pub mod summary;
pub mod ui;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    game::{EndPolicy, GameConfig, GameSession},
    pool::WordPool,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner, Ticker},
    scorelog::{ScoreEntry, ScoreLog},
    summary::SummaryHandoff,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};
use webbrowser::Browser;

/// One countdown unit; the session timer moves once per tick.
const TICK_RATE_MS: u64 = 1000;

/// fast-paced word guessing tui with one-tap scoring and timed rounds
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A fast-paced word guessing TUI: one word at a time from a shuffled pool, mark it correct or skip it, beat the clock, then chase your personal best."
)]
pub struct Cli {
    /// number of seconds in a round
    #[clap(short = 's', long)]
    session_secs: Option<u64>,

    /// word pool to draw from
    #[clap(short = 'p', long, value_enum)]
    word_pool: Option<SupportedPool>,

    /// end the round when the queue empties instead of reshuffling
    #[clap(long)]
    end_on_empty: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum SupportedPool {
    Classic,
    Animals,
    Foods,
}

impl SupportedPool {
    fn as_pool(&self) -> WordPool {
        WordPool::new(self.to_string().to_lowercase())
    }

    fn from_name(name: &str) -> Self {
        match name {
            "animals" => SupportedPool::Animals,
            "foods" => SupportedPool::Foods,
            _ => SupportedPool::Classic,
        }
    }

    fn next(&self) -> Self {
        match self {
            SupportedPool::Classic => SupportedPool::Animals,
            SupportedPool::Animals => SupportedPool::Foods,
            SupportedPool::Foods => SupportedPool::Classic,
        }
    }
}

/// Effective settings for the running app: CLI arguments win over the
/// persisted config, which supplies the defaults.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub session_secs: u64,
    pub word_pool: SupportedPool,
    pub end_on_empty: bool,
}

impl RuntimeSettings {
    pub fn merge(cli: &Cli, cfg: &Config) -> Self {
        Self {
            session_secs: cli.session_secs.unwrap_or(cfg.session_secs).max(1),
            word_pool: cli
                .word_pool
                .unwrap_or_else(|| SupportedPool::from_name(&cfg.word_pool)),
            end_on_empty: cli.end_on_empty || cfg.end_on_empty,
        }
    }
}

impl From<&RuntimeSettings> for Config {
    fn from(rs: &RuntimeSettings) -> Self {
        Self {
            session_secs: rs.session_secs,
            word_pool: rs.word_pool.to_string().to_lowercase(),
            end_on_empty: rs.end_on_empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Playing,
    Summary,
}

#[derive(Debug)]
pub struct App {
    pub session: GameSession,
    pub handoff: Option<SummaryHandoff>,
    pub state: AppState,
    pub runtime_settings: RuntimeSettings,
    pub score_log: ScoreLog,
    pub previous_best: Option<ScoreEntry>,
    pub recent_form: String,
}

impl App {
    pub fn new(runtime_settings: RuntimeSettings, score_log: ScoreLog) -> Self {
        let session = Self::new_session(&runtime_settings);
        Self {
            session,
            handoff: None,
            state: AppState::Playing,
            runtime_settings,
            score_log,
            previous_best: None,
            recent_form: String::new(),
        }
    }

    fn new_session(settings: &RuntimeSettings) -> GameSession {
        let config = GameConfig {
            session_ticks: settings.session_secs,
            end_policy: if settings.end_on_empty {
                EndPolicy::FinishOnEmpty
            } else {
                EndPolicy::Refill
            },
        };
        let mut session = GameSession::new(settings.word_pool.as_pool(), config);
        session.start();
        session
    }

    /// Discards the handoff and begins a fresh round with the current
    /// settings. The old session is disposed before it is replaced.
    pub fn reset(&mut self) {
        self.session.dispose();
        self.session = Self::new_session(&self.runtime_settings);
        self.handoff = None;
        self.previous_best = None;
        self.recent_form = String::new();
        self.state = AppState::Playing;
    }

    pub fn on_tick(&mut self) {
        self.session.on_tick();
        self.check_finished();
    }

    pub fn mark_correct(&mut self) {
        self.session.mark_correct();
        self.check_finished();
    }

    pub fn mark_skip(&mut self) {
        self.session.mark_skip();
        self.check_finished();
    }

    pub fn cycle_pool(&mut self) {
        self.runtime_settings.word_pool = self.runtime_settings.word_pool.next();
    }

    /// Reacts to a pending finished event exactly once: capture the score,
    /// consume the flag, dispose the session, and hand off to the summary.
    fn check_finished(&mut self) {
        if !self.session.finished() {
            return;
        }
        let final_score = self.session.score();
        self.session.consume_finished();
        self.session.dispose();

        // Snapshot the history before this round lands in it, so the summary
        // can compare against the previous best.
        self.previous_best = self.score_log.personal_best();
        self.recent_form = self.score_log.recent_form(5);
        let _ = self.score_log.append(
            &self.runtime_settings.word_pool.to_string().to_lowercase(),
            self.runtime_settings.session_secs,
            final_score,
        );

        self.handoff = Some(SummaryHandoff::new(final_score));
        self.state = AppState::Summary;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let settings = RuntimeSettings::merge(&cli, &store.load());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, ScoreLog::new());
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let res = run_app(&mut terminal, &mut app, &runner, &store);

    app.session.dispose();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

#[derive(Debug, PartialEq)]
enum ExitType {
    Restart,
    Quit,
}

fn run_app<B: Backend, E: GameEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    store: &dyn ConfigStore,
) -> Result<(), Box<dyn Error>> {
    loop {
        let mut exit_type = ExitType::Quit;

        loop {
            terminal.draw(|f| ui(app, f))?;

            match runner.step() {
                GameEvent::Tick => {
                    app.on_tick();
                }
                GameEvent::Resize => {}
                GameEvent::Key(key) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        break;
                    }

                    match key.code {
                        KeyCode::Esc => {
                            break;
                        }
                        _ => match app.state {
                            AppState::Playing => handle_playing_key(key, app),
                            AppState::Summary => {
                                if let Some(exit) = handle_summary_key(key, app, store) {
                                    exit_type = exit;
                                    break;
                                }
                            }
                        },
                    }
                }
            }
        }

        match exit_type {
            ExitType::Restart => {
                app.reset();
            }
            ExitType::Quit => {
                app.session.dispose();
                break;
            }
        }
    }

    Ok(())
}

fn handle_playing_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Right | KeyCode::Char('y') => app.mark_correct(),
        KeyCode::Left | KeyCode::Char('n') => app.mark_skip(),
        _ => {}
    }
}

fn handle_summary_key(key: KeyEvent, app: &mut App, store: &dyn ConfigStore) -> Option<ExitType> {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => {
            if let Some(handoff) = app.handoff.as_mut() {
                handoff.request_restart();
            }
        }
        KeyCode::Char('p') => {
            app.cycle_pool();
            let _ = store.save(&Config::from(&app.runtime_settings));
        }
        KeyCode::Char('t') => {
            if Browser::is_available() {
                if let Some(handoff) = app.handoff.as_ref() {
                    webbrowser::open(&format!(
                        "https://twitter.com/intent/tweet?text={}%20points%20in%20one%20round%20of%20gissa%0A%0Ahttps%3A%2F%2Fgithub.com%2Fmartintrojer%2Fgissa",
                        handoff.final_score()
                    ))
                    .unwrap_or_default();
                }
            }
        }
        _ => {}
    }

    // React to a pending restart exactly once: consume, then rebuild.
    if let Some(handoff) = app.handoff.as_mut() {
        if handoff.restart_requested() {
            handoff.consume_restart();
            return Some(ExitType::Restart);
        }
    }

    None
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    fn test_settings(secs: u64) -> RuntimeSettings {
        RuntimeSettings {
            session_secs: secs,
            word_pool: SupportedPool::Classic,
            end_on_empty: false,
        }
    }

    fn test_app(secs: u64) -> (App, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let log = ScoreLog::with_path(dir.path().join("scores.csv"));
        (App::new(test_settings(secs), log), dir)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["gissa"]);

        assert_eq!(cli.session_secs, None);
        assert_eq!(cli.word_pool, None);
        assert!(!cli.end_on_empty);
    }

    #[test]
    fn test_cli_session_secs() {
        let cli = Cli::parse_from(["gissa", "-s", "30"]);
        assert_eq!(cli.session_secs, Some(30));

        let cli = Cli::parse_from(["gissa", "--session-secs", "90"]);
        assert_eq!(cli.session_secs, Some(90));
    }

    #[test]
    fn test_cli_word_pool() {
        let cli = Cli::parse_from(["gissa", "-p", "classic"]);
        assert_eq!(cli.word_pool, Some(SupportedPool::Classic));

        let cli = Cli::parse_from(["gissa", "--word-pool", "animals"]);
        assert_eq!(cli.word_pool, Some(SupportedPool::Animals));

        let cli = Cli::parse_from(["gissa", "--word-pool", "foods"]);
        assert_eq!(cli.word_pool, Some(SupportedPool::Foods));
    }

    #[test]
    fn test_cli_end_on_empty() {
        let cli = Cli::parse_from(["gissa", "--end-on-empty"]);
        assert!(cli.end_on_empty);
    }

    #[test]
    fn test_supported_pool_as_pool() {
        let classic = SupportedPool::Classic.as_pool();
        assert_eq!(classic.name, "classic");

        let animals = SupportedPool::Animals.as_pool();
        assert_eq!(animals.name, "animals");

        let foods = SupportedPool::Foods.as_pool();
        assert_eq!(foods.name, "foods");
    }

    #[test]
    fn test_supported_pool_display() {
        assert_eq!(SupportedPool::Classic.to_string(), "Classic");
        assert_eq!(SupportedPool::Animals.to_string(), "Animals");
        assert_eq!(SupportedPool::Foods.to_string(), "Foods");
    }

    #[test]
    fn test_supported_pool_from_name() {
        assert_eq!(SupportedPool::from_name("animals"), SupportedPool::Animals);
        assert_eq!(SupportedPool::from_name("foods"), SupportedPool::Foods);
        assert_eq!(SupportedPool::from_name("classic"), SupportedPool::Classic);
        assert_eq!(SupportedPool::from_name("bogus"), SupportedPool::Classic);
    }

    #[test]
    fn test_supported_pool_cycle() {
        assert_eq!(SupportedPool::Classic.next(), SupportedPool::Animals);
        assert_eq!(SupportedPool::Animals.next(), SupportedPool::Foods);
        assert_eq!(SupportedPool::Foods.next(), SupportedPool::Classic);
    }

    #[test]
    fn test_settings_merge_cli_wins() {
        let cli = Cli::parse_from(["gissa", "-s", "30", "-p", "foods"]);
        let cfg = Config {
            session_secs: 60,
            word_pool: "animals".into(),
            end_on_empty: false,
        };

        let settings = RuntimeSettings::merge(&cli, &cfg);

        assert_eq!(settings.session_secs, 30);
        assert_eq!(settings.word_pool, SupportedPool::Foods);
        assert!(!settings.end_on_empty);
    }

    #[test]
    fn test_settings_merge_config_fills_gaps() {
        let cli = Cli::parse_from(["gissa"]);
        let cfg = Config {
            session_secs: 45,
            word_pool: "animals".into(),
            end_on_empty: true,
        };

        let settings = RuntimeSettings::merge(&cli, &cfg);

        assert_eq!(settings.session_secs, 45);
        assert_eq!(settings.word_pool, SupportedPool::Animals);
        assert!(settings.end_on_empty);
    }

    #[test]
    fn test_settings_merge_clamps_zero_secs() {
        let cli = Cli::parse_from(["gissa", "-s", "0"]);
        let settings = RuntimeSettings::merge(&cli, &Config::default());

        assert_eq!(settings.session_secs, 1);
    }

    #[test]
    fn test_settings_to_config_round_trip() {
        let settings = RuntimeSettings {
            session_secs: 75,
            word_pool: SupportedPool::Animals,
            end_on_empty: true,
        };

        let cfg = Config::from(&settings);

        assert_eq!(cfg.session_secs, 75);
        assert_eq!(cfg.word_pool, "animals");
        assert!(cfg.end_on_empty);
    }

    #[test]
    fn test_app_new_starts_playing() {
        let (app, _dir) = test_app(60);

        assert_eq!(app.state, AppState::Playing);
        assert!(app.session.is_active());
        assert!(app.handoff.is_none());
        assert!(!app.session.current_word().is_empty());
        assert_eq!(app.session.remaining_ticks(), 60);
    }

    #[test]
    fn test_app_expiry_hands_off_to_summary() {
        let (mut app, _dir) = test_app(2);

        app.mark_correct();
        app.mark_correct();
        app.mark_skip();
        app.on_tick();
        assert_eq!(app.state, AppState::Playing);

        app.on_tick();
        assert_eq!(app.state, AppState::Summary);

        let handoff = app.handoff.as_ref().expect("handoff after expiry");
        assert_eq!(handoff.final_score(), 1);
        // The finished event was consumed during the handoff.
        assert!(!app.session.finished());
        assert!(!app.session.is_active());
    }

    #[test]
    fn test_app_expiry_appends_score_log() {
        let (mut app, _dir) = test_app(1);

        app.mark_correct();
        app.on_tick();

        let entries = app.score_log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 1);
        assert_eq!(entries[0].pool, "classic");
        assert_eq!(entries[0].secs, 1);
    }

    #[test]
    fn test_app_snapshot_precedes_append() {
        let (mut app, _dir) = test_app(1);
        app.score_log.append("classic", 1, 9).unwrap();

        app.on_tick();

        // The summary compares against the best before this round landed.
        assert_eq!(app.previous_best.as_ref().unwrap().score, 9);
        assert_eq!(app.score_log.entries().len(), 2);
    }

    #[test]
    fn test_app_late_ticks_after_summary_are_harmless() {
        let (mut app, _dir) = test_app(1);

        app.on_tick();
        assert_eq!(app.state, AppState::Summary);
        let score = app.handoff.as_ref().unwrap().final_score();

        app.on_tick();
        app.on_tick();

        assert_eq!(app.state, AppState::Summary);
        assert_eq!(app.handoff.as_ref().unwrap().final_score(), score);
        assert_eq!(app.score_log.entries().len(), 1);
    }

    #[test]
    fn test_app_reset_builds_fresh_round() {
        let (mut app, _dir) = test_app(1);

        app.mark_skip();
        app.on_tick();
        assert_eq!(app.state, AppState::Summary);

        app.reset();

        assert_eq!(app.state, AppState::Playing);
        assert!(app.handoff.is_none());
        assert!(app.session.is_active());
        assert_eq!(app.session.score(), 0);
        assert_eq!(app.session.remaining_ticks(), 1);
    }

    #[test]
    fn test_app_cycle_pool() {
        let (mut app, _dir) = test_app(60);

        app.cycle_pool();
        assert_eq!(app.runtime_settings.word_pool, SupportedPool::Animals);

        app.cycle_pool();
        app.cycle_pool();
        assert_eq!(app.runtime_settings.word_pool, SupportedPool::Classic);
    }

    #[test]
    fn test_restart_key_consumes_one_pending_event() {
        let (mut app, dir) = test_app(1);
        app.on_tick();
        assert_eq!(app.state, AppState::Summary);

        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let key = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);

        let exit = handle_summary_key(key, &mut app, &store);
        assert_eq!(exit, Some(ExitType::Restart));
        assert!(!app.handoff.as_ref().unwrap().restart_requested());

        // No pending event left; a non-restart key does not re-trigger it.
        let other = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(handle_summary_key(other, &mut app, &store), None);
    }

    #[test]
    fn test_pool_key_persists_config() {
        let (mut app, dir) = test_app(1);
        app.on_tick();

        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let key = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE);

        assert_eq!(handle_summary_key(key, &mut app, &store), None);
        assert_eq!(app.runtime_settings.word_pool, SupportedPool::Animals);
        assert_eq!(store.load().word_pool, "animals");
    }

    #[test]
    fn test_playing_keys_drive_the_session() {
        let (mut app, _dir) = test_app(60);

        handle_playing_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE), &mut app);
        handle_playing_key(
            KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE),
            &mut app,
        );
        handle_playing_key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE), &mut app);
        handle_playing_key(
            KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE),
            &mut app,
        );
        handle_playing_key(
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            &mut app,
        );

        assert_eq!(app.session.score(), 0);
        assert_eq!(app.state, AppState::Playing);
    }

    #[test]
    fn test_end_on_empty_round_reaches_summary_without_ticks() {
        let dir = tempdir().unwrap();
        let log = ScoreLog::with_path(dir.path().join("scores.csv"));
        let settings = RuntimeSettings {
            session_secs: 60,
            word_pool: SupportedPool::Classic,
            end_on_empty: true,
        };
        let mut app = App::new(settings, log);

        // Drain the whole 21-word queue; the next advance ends the round.
        for _ in 0..21 {
            assert_eq!(app.state, AppState::Playing);
            app.mark_correct();
        }

        assert_eq!(app.state, AppState::Summary);
        assert_eq!(app.handoff.as_ref().unwrap().final_score(), 21);
    }

    #[test]
    fn test_tick_rate_constant() {
        // One tick per second is the countdown unit.
        assert_eq!(TICK_RATE_MS, 1000);

        const _: () = assert!(TICK_RATE_MS > 0);
        const _: () = assert!(TICK_RATE_MS <= 1000);
    }

    #[test]
    fn test_exit_type_debug() {
        assert_eq!(format!("{:?}", ExitType::Restart), "Restart");
        assert_eq!(format!("{:?}", ExitType::Quit), "Quit");
    }

    #[test]
    fn test_app_state_variants() {
        assert_eq!(AppState::Playing, AppState::Playing);
        assert_eq!(AppState::Summary, AppState::Summary);
        assert_ne!(AppState::Playing, AppState::Summary);
    }
}
