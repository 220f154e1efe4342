//! Session controller: the single place where game state changes.
//!
//! Player input arrives as [`Command`]s through [`Controller::dispatch`];
//! the passage of time arrives through [`Controller::advance_to`], which
//! replays due [`Wake`]s from the owned [`Scheduler`]. Every transition runs
//! to completion before the next one starts.

use crate::clock::{Clock, Scheduler, TimerHandle, Wake};
use crate::config::GameConfig;
use crate::problem::ProblemGenerator;
use crate::session::{Command, FeedbackKind, Presenter, Screen, Session};
use crate::store::{BestStreakStore, BestStreaks};
use crate::timer::{TimerEngine, TimerSignal};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct Controller<P: Presenter, S: BestStreakStore> {
    config: GameConfig,
    session: Session,
    timer: TimerEngine,
    generator: ProblemGenerator,
    clock: Scheduler,
    /// Pending end of the feedback window, if one is open
    feedback_window: Option<TimerHandle>,
    presenter: P,
    store: S,
    rng: StdRng,
}

impl<P: Presenter, S: BestStreakStore> Controller<P, S> {
    pub fn new(config: GameConfig, mut presenter: P, store: S, rng: StdRng) -> Self {
        let best_streaks = BestStreaks::load(&store, config.level_count());
        let timer = TimerEngine::new(config.streak_time_tiers.clone(), config.tick_interval_ms);
        let generator = ProblemGenerator::new(config.history_size, config.max_generation_attempts);

        presenter.set_screen(Screen::Startup);
        presenter.set_input_enabled(false);
        log::info!(
            "drill ready: {} levels, history of {}",
            config.level_count(),
            config.history_size
        );

        Self {
            config,
            session: Session::new(best_streaks),
            timer,
            generator,
            clock: Scheduler::new(),
            feedback_window: None,
            presenter,
            store,
            rng,
        }
    }

    /// Seeded for reproducible drills, otherwise from OS entropy.
    pub fn with_seed(config: GameConfig, presenter: P, store: S, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, presenter, store, rng)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn pending_callbacks(&self) -> usize {
        self.clock.pending()
    }

    pub fn in_feedback_window(&self) -> bool {
        self.feedback_window.is_some()
    }

    pub fn dispatch(&mut self, command: Command) {
        log::trace!("dispatch {:?} on {}", command, self.session.screen);
        match command {
            Command::StartGame => self.start_game(),
            Command::SelectLevel(level) => self.select_level(level),
            Command::SubmitAnswer(text) => self.submit_answer(&text),
            Command::OpenOptions => self.open_options(),
            Command::CloseOptions => self.close_options(),
            Command::EditAnswer => self.edit_answer(),
        }
    }

    /// Runs every callback due up to `now_ms`, in order.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some(wake) = self.clock.pop_due(now_ms) {
            self.on_wake(wake);
        }
        self.clock.settle(now_ms);
    }

    pub fn advance_by(&mut self, ms: u64) {
        self.advance_to(self.clock.now_ms() + ms);
    }

    fn on_wake(&mut self, wake: Wake) {
        match wake {
            Wake::Tick => match self.timer.tick(&mut self.clock) {
                Some(signal) => self.apply_timer_signal(signal),
                None => log::debug!("stale tick ignored"),
            },
            Wake::FeedbackElapsed => {
                self.feedback_window = None;
                if self.session.is_playing() {
                    self.next_problem();
                }
            }
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn start_game(&mut self) {
        if self.session.screen != Screen::Startup {
            log::debug!("start ignored on {}", self.session.screen);
            return;
        }
        self.set_screen(Screen::LevelSelect);
    }

    fn select_level(&mut self, level: usize) {
        if level >= self.config.level_count() {
            log::debug!("level {} out of range", level);
            return;
        }
        match self.session.screen {
            Screen::Startup => log::debug!("level select ignored before start"),
            Screen::LevelSelect => self.enter_level(level),
            Screen::Playing if !self.session.options_open => {
                log::debug!("level select ignored outside the options dialog")
            }
            Screen::Playing if level == self.session.active_level => self.close_options(),
            Screen::Playing => self.enter_level(level),
        }
    }

    /// Fresh start on `level`: streak, pause, history and any pending
    /// feedback are all dropped.
    fn enter_level(&mut self, level: usize) {
        self.timer.stop(&mut self.clock);
        self.timer.clear_pause();
        self.cancel_feedback_window();

        self.session.active_level = level;
        self.session.streak = 0;
        self.session.options_open = false;
        self.presenter.set_options_open(false);
        self.generator.clear_history();

        log::info!("playing level {}", self.config.levels[level].name);
        self.set_screen(Screen::Playing);
        self.next_problem();
    }

    fn next_problem(&mut self) {
        if !self.session.is_playing() {
            return;
        }
        let level = &self.config.levels[self.session.active_level];
        let problem = self.generator.next(level, &mut self.rng);
        self.session.current_problem = Some(problem);
        self.presenter.render_problem(problem.a, problem.b);

        self.cancel_feedback_window();
        self.show_feedback(FeedbackKind::None, "");
        self.render_scores();

        if self.timer.is_paused_by_user() {
            // The options dialog is open; the countdown starts on resume.
            self.timer.prepare(self.session.streak);
            self.set_input_enabled(false);
            self.presenter
                .render_timer_progress(self.timer.fraction_remaining());
        } else {
            self.set_input_enabled(true);
            let signal = self.timer.start(&mut self.clock, self.session.streak, true);
            self.apply_timer_signal(signal);
        }
    }

    fn submit_answer(&mut self, text: &str) {
        if !self.session.is_playing() || !self.session.input_enabled {
            log::debug!("answer ignored while input is disabled");
            return;
        }
        if self.feedback_window.is_some() || self.timer.seconds_remaining() == 0 {
            return;
        }
        let Some(problem) = self.session.current_problem else {
            return;
        };

        self.timer.stop(&mut self.clock);
        self.timer.clear_pause();
        self.set_input_enabled(false);

        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.show_feedback(FeedbackKind::Info, "Enter an answer!");
            self.continue_question();
            return;
        }
        let value: i64 = match trimmed.parse() {
            Ok(value) => value,
            Err(_) => {
                self.show_feedback(FeedbackKind::Info, "Numbers only!");
                self.presenter.clear_answer();
                self.continue_question();
                return;
            }
        };

        if u64::try_from(value).is_ok_and(|v| v == problem.answer()) {
            self.session.streak += 1;
            self.show_feedback(FeedbackKind::Correct, "Correct!");
            let level = self.session.active_level;
            if self
                .session
                .best_streaks
                .record(&self.store, level, self.session.streak)
            {
                log::info!(
                    "new best streak {} on level {}",
                    self.session.streak,
                    self.config.levels[level].name
                );
            }
        } else {
            self.session.streak = 0;
            let text = format!("Incorrect. It was {}", problem.answer());
            self.show_feedback(FeedbackKind::Incorrect, &text);
        }

        self.render_scores();
        self.open_feedback_window();
    }

    fn handle_time_up(&mut self) {
        if !self.session.is_playing() || self.session.feedback == FeedbackKind::Timeout {
            return;
        }
        self.timer.stop(&mut self.clock);
        self.timer.clear_pause();
        self.set_input_enabled(false);

        let answer = self.session.current_problem.map(|p| p.answer()).unwrap_or_default();
        self.show_feedback(FeedbackKind::Timeout, &format!("Time's up! It was {}", answer));
        log::debug!("time up, streak of {} lost", self.session.streak);

        self.session.streak = 0;
        self.render_scores();
        self.presenter.render_timer_progress(0.0);
        self.open_feedback_window();
    }

    fn open_options(&mut self) {
        if !self.session.is_playing() || self.session.options_open {
            return;
        }
        self.session.options_open = true;
        self.presenter.set_options_open(true);
        self.timer.pause(&mut self.clock);
        self.set_input_enabled(false);
    }

    fn close_options(&mut self) {
        if !self.session.options_open {
            return;
        }
        self.session.options_open = false;
        self.presenter.set_options_open(false);
        self.resume();
    }

    fn resume(&mut self) {
        if self.feedback_window.is_some() {
            // The next problem arrives with its own fresh countdown.
            self.timer.clear_pause();
            return;
        }
        match self.timer.resume(&mut self.clock, self.session.is_playing()) {
            Some(TimerSignal::Progress(fraction)) => {
                self.set_input_enabled(true);
                self.presenter.render_timer_progress(fraction);
            }
            Some(TimerSignal::Expired) => self.handle_time_up(),
            None => {}
        }
    }

    fn edit_answer(&mut self) {
        if self.session.input_enabled && self.session.feedback == FeedbackKind::Info {
            self.show_feedback(FeedbackKind::None, "");
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Resumes the current question after a rejected submission.
    fn continue_question(&mut self) {
        self.set_input_enabled(true);
        let signal = self.timer.start(&mut self.clock, self.session.streak, false);
        self.apply_timer_signal(signal);
    }

    fn apply_timer_signal(&mut self, signal: TimerSignal) {
        match signal {
            TimerSignal::Progress(fraction) => self.presenter.render_timer_progress(fraction),
            TimerSignal::Expired => self.handle_time_up(),
        }
    }

    fn open_feedback_window(&mut self) {
        self.cancel_feedback_window();
        self.feedback_window = Some(
            self.clock
                .schedule_once(self.config.feedback_delay_ms, Wake::FeedbackElapsed),
        );
    }

    fn cancel_feedback_window(&mut self) {
        if let Some(handle) = self.feedback_window.take() {
            self.clock.cancel(handle);
        }
    }

    fn show_feedback(&mut self, kind: FeedbackKind, text: &str) {
        self.session.feedback = kind;
        self.presenter.render_feedback(kind, text);
    }

    fn render_scores(&mut self) {
        let level = &self.config.levels[self.session.active_level];
        self.presenter.render_streak(self.session.streak);
        self.presenter
            .render_best_streak(&level.name, self.session.best_streak());
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.session.input_enabled = enabled;
        self.presenter.set_input_enabled(enabled);
    }

    fn set_screen(&mut self, screen: Screen) {
        self.session.screen = screen;
        self.presenter.set_screen(screen);
    }
}
