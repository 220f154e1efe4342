use crate::session::{FeedbackKind, Presenter, Screen};

/// The answer field: digits only, capped length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerInput {
    text: String,
    max_digits: usize,
}

impl AnswerInput {
    pub fn new(max_digits: usize) -> Self {
        Self {
            text: String::new(),
            max_digits,
        }
    }

    /// Returns whether the character was accepted.
    pub fn push(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() || self.text.len() >= self.max_digits {
            return false;
        }
        self.text.push(c);
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Presenter that keeps the latest value of everything rendered.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub screen: Screen,
    pub problem: Option<(u32, u32)>,
    pub feedback: FeedbackKind,
    pub feedback_text: String,
    pub streak: u32,
    pub best_label: String,
    pub best_streak: u32,
    pub timer_progress: f64,
    pub input_enabled: bool,
    pub options_open: bool,
    pub answer: AnswerInput,
}

impl ViewState {
    pub fn new(max_answer_digits: usize) -> Self {
        Self {
            screen: Screen::Startup,
            problem: None,
            feedback: FeedbackKind::None,
            feedback_text: String::new(),
            streak: 0,
            best_label: String::new(),
            best_streak: 0,
            timer_progress: 1.0,
            input_enabled: false,
            options_open: false,
            answer: AnswerInput::new(max_answer_digits),
        }
    }
}

impl Presenter for ViewState {
    fn render_problem(&mut self, a: u32, b: u32) {
        self.problem = Some((a, b));
        self.answer.clear();
    }

    fn render_feedback(&mut self, kind: FeedbackKind, text: &str) {
        self.feedback = kind;
        self.feedback_text = text.to_string();
    }

    fn render_streak(&mut self, streak: u32) {
        self.streak = streak;
    }

    fn render_best_streak(&mut self, level_name: &str, best: u32) {
        self.best_label = level_name.to_string();
        self.best_streak = best;
    }

    fn render_timer_progress(&mut self, fraction: f64) {
        self.timer_progress = fraction.clamp(0.0, 1.0);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    fn set_options_open(&mut self, open: bool) {
        self.options_open = open;
    }

    fn clear_answer(&mut self) {
        self.answer.clear();
    }
}
