mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use multidrill::{
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, GameConfig},
    runtime::{CrosstermEventSource, DrillEvent, FixedTicker, Runner},
    store::{BestStreakStore, FileBestStreakStore, InMemoryStore},
    view::ViewState,
    Command, Controller, Screen,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 50;

/// terminal multiplication drill with a per-question countdown
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Answer multiplication problems before the countdown runs out. Consecutive correct answers shorten the time per question; the best streak per level is kept between runs."
)]
pub struct Cli {
    /// seed the problem generator for a reproducible drill
    #[clap(long)]
    seed: Option<u64>,

    /// number of recent problems to avoid repeating
    #[clap(long)]
    history_size: Option<usize>,

    /// allow a problem to repeat immediately
    #[clap(long, conflicts_with = "history_size")]
    no_history: bool,

    /// read game configuration from this JSON file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// keep best streaks for this run only
    #[clap(long)]
    no_save: bool,

    /// erase stored best streaks before starting
    #[clap(long)]
    reset_records: bool,
}

impl Cli {
    fn game_config(&self) -> GameConfig {
        let store = match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };
        log::debug!("reading config from {}", store.path().display());
        let mut cfg = store.load();
        if self.no_history {
            cfg.history_size = 0;
        } else if let Some(size) = self.history_size {
            cfg.history_size = size;
        }
        cfg
    }

    fn best_streak_store(&self) -> Box<dyn BestStreakStore> {
        if self.no_save {
            Box::new(InMemoryStore::new())
        } else {
            let store = FileBestStreakStore::new();
            log::debug!("best streaks kept in {}", store.path().display());
            Box::new(store)
        }
    }
}

pub type DrillController = Controller<ViewState, Box<dyn BestStreakStore>>;

pub struct App {
    pub controller: DrillController,
    /// Highlighted row on the level list and in the options dialog
    pub level_cursor: usize,
    started_at: Instant,
}

impl App {
    pub fn new(config: GameConfig, store: Box<dyn BestStreakStore>, seed: Option<u64>) -> Self {
        let view = ViewState::new(config.max_answer_digits);
        Self {
            controller: Controller::with_seed(config, view, store, seed),
            level_cursor: 0,
            started_at: Instant::now(),
        }
    }

    /// Brings the game clock up to wall-clock time.
    pub fn on_tick(&mut self) {
        let elapsed = self.started_at.elapsed().as_millis() as u64;
        self.controller.advance_to(elapsed);
    }

    /// Returns false when the player asked to quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return false;
        }

        let session = self.controller.session();
        let (screen, options_open, active_level) =
            (session.screen, session.options_open, session.active_level);
        match (screen, options_open) {
            (Screen::Startup, _) => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.controller.dispatch(Command::StartGame),
                KeyCode::Esc | KeyCode::Char('q') => return false,
                _ => {}
            },
            (Screen::LevelSelect, _) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return false,
                code => self.on_level_key(code),
            },
            (Screen::Playing, true) => match key.code {
                KeyCode::Esc | KeyCode::Tab | KeyCode::Char('o') => {
                    self.controller.dispatch(Command::CloseOptions)
                }
                code => self.on_level_key(code),
            },
            (Screen::Playing, false) => match key.code {
                KeyCode::Esc => return false,
                KeyCode::Tab | KeyCode::Char('o') => {
                    self.level_cursor = active_level;
                    self.controller.dispatch(Command::OpenOptions);
                }
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if self.controller.session().input_enabled
                        && self.controller.presenter_mut().answer.push(c)
                    {
                        self.controller.dispatch(Command::EditAnswer);
                    }
                }
                KeyCode::Backspace => {
                    if self.controller.session().input_enabled
                        && self.controller.presenter_mut().answer.backspace()
                    {
                        self.controller.dispatch(Command::EditAnswer);
                    }
                }
                KeyCode::Enter => {
                    let text = self.controller.presenter().answer.as_str().to_string();
                    self.controller.dispatch(Command::SubmitAnswer(text));
                }
                _ => {}
            },
        }
        true
    }

    fn on_level_key(&mut self, code: KeyCode) {
        let count = self.controller.config().level_count();
        match code {
            KeyCode::Up => self.level_cursor = self.level_cursor.saturating_sub(1),
            KeyCode::Down => self.level_cursor = (self.level_cursor + 1).min(count.saturating_sub(1)),
            KeyCode::Enter => self
                .controller
                .dispatch(Command::SelectLevel(self.level_cursor)),
            KeyCode::Char(c) => {
                if let Some(level) = c.to_digit(10).filter(|d| *d >= 1).map(|d| d as usize - 1) {
                    if level < count {
                        self.level_cursor = level;
                        self.controller.dispatch(Command::SelectLevel(level));
                    }
                }
            }
            _ => {}
        }
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = cli.best_streak_store();
    if cli.reset_records {
        store.clear()?;
        log::info!("best streaks erased");
    }
    let mut app = App::new(cli.game_config(), store, cli.seed);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let event = runner.step();
        app.on_tick();
        match event {
            DrillEvent::Tick | DrillEvent::Resize => {}
            DrillEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
            DrillEvent::Closed => {
                log::error!("terminal input closed, leaving");
                return Err("terminal input closed".into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use multidrill::FeedbackKind;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(GameConfig::default(), Box::new(InMemoryStore::new()), Some(5))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_answer(app: &mut App) {
        let answer = app.controller.session().current_problem.unwrap().answer();
        for c in answer.to_string().chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui::draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["multidrill"]);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.history_size, None);
        assert!(!cli.no_history);
        assert!(!cli.no_save);
        assert!(!cli.reset_records);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_history_overrides() {
        let cli = Cli::parse_from(["multidrill", "--no-history", "-c", "/nonexistent/cfg.json"]);
        assert_eq!(cli.game_config().history_size, 0);

        let cli = Cli::parse_from(["multidrill", "--history-size", "9", "-c", "/nonexistent/cfg.json"]);
        assert_eq!(cli.game_config().history_size, 9);

        let cli = Cli::parse_from(["multidrill", "-c", "/nonexistent/cfg.json"]);
        assert_eq!(cli.game_config(), GameConfig::default());
    }

    #[test]
    fn test_cli_history_flags_conflict() {
        let res = Cli::try_parse_from(["multidrill", "--no-history", "--history-size", "3"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_seed() {
        let cli = Cli::parse_from(["multidrill", "--seed", "42", "--no-save"]);
        assert_eq!(cli.seed, Some(42));
        assert!(cli.no_save);
    }

    #[test]
    fn test_keys_drive_a_full_question() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Enter));
        assert_eq!(app.controller.session().screen, Screen::LevelSelect);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.controller.session().screen, Screen::Playing);
        assert_eq!(app.controller.session().active_level, 1);

        type_answer(&mut app);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.controller.session().streak, 1);
        assert_eq!(app.controller.presenter().feedback, FeedbackKind::Correct);
    }

    #[test]
    fn test_digit_selects_level() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.controller.session().active_level, 4);
        assert_eq!(app.level_cursor, 4);
    }

    #[test]
    fn test_answer_keys_are_ignored_while_paused() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Tab);
        assert!(app.controller.session().options_open);

        press(&mut app, KeyCode::Char('9'));
        assert!(app.controller.presenter().answer.is_empty());

        assert!(press(&mut app, KeyCode::Esc));
        assert!(!app.controller.session().options_open);
        assert!(app.controller.session().input_enabled);
    }

    #[test]
    fn test_options_dialog_changes_level() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('3'));
        assert!(!app.controller.session().options_open);
        assert_eq!(app.controller.session().active_level, 2);
        assert!(app.controller.timer().is_running());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(!app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!press(&mut app, KeyCode::Esc));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        assert!(!press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_ui_renders_each_screen() {
        let mut app = app();
        assert!(render(&app).contains("Multiplication Drill"));

        press(&mut app, KeyCode::Enter);
        assert!(render(&app).contains("Basic (1-3)"));

        press(&mut app, KeyCode::Char('1'));
        let (a, b) = app.controller.presenter().problem.unwrap();
        assert!(render(&app).contains(&format!("{a} x {b} = ?")));

        press(&mut app, KeyCode::Tab);
        assert!(render(&app).contains("Paused"));
    }

    #[test]
    fn test_ui_level_hints_follow_configured_levels() {
        let mut config = GameConfig::default();
        config.levels.truncate(3);
        let mut app = App::new(config, Box::new(InMemoryStore::new()), Some(5));

        press(&mut app, KeyCode::Enter);
        let screen = render(&app);
        assert!(screen.contains("(1-3) or"));
        assert!(!screen.contains("(1-5)"));

        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.controller.session().screen, Screen::LevelSelect);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Tab);
        assert!(render(&app).contains("(1-3) change level"));
    }

    #[test]
    fn test_ui_renders_feedback_text() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);
        assert!(render(&app).contains("Enter an answer!"));
    }

    #[test]
    fn test_tick_rate_constant() {
        const _: () = assert!(TICK_RATE_MS > 0);
        const _: () = assert!(TICK_RATE_MS < 1000);
    }
}
