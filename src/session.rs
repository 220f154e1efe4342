use crate::problem::Problem;
use crate::store::BestStreaks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Screen {
    Startup,
    LevelSelect,
    Playing,
}

/// Everything the player can ask of the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartGame,
    SelectLevel(usize),
    /// Raw answer text. After trimming it must be a whole integer; text
    /// with trailing junk such as `"12abc"` or `"5 5"` is rejected as
    /// non-numeric rather than read up to the first non-digit.
    SubmitAnswer(String),
    OpenOptions,
    CloseOptions,
    /// The answer field changed; clears a transient validation message
    EditAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackKind {
    #[default]
    None,
    Correct,
    Incorrect,
    Timeout,
    /// Transient validation message for an empty or non-numeric answer
    Info,
}

/// Rendering side of the game. Every call carries the full current value,
/// so an implementation only needs to remember the latest one.
pub trait Presenter {
    fn render_problem(&mut self, a: u32, b: u32);
    fn render_feedback(&mut self, kind: FeedbackKind, text: &str);
    fn render_streak(&mut self, streak: u32);
    fn render_best_streak(&mut self, level_name: &str, best: u32);
    fn render_timer_progress(&mut self, fraction: f64);
    fn set_input_enabled(&mut self, enabled: bool);
    fn set_screen(&mut self, screen: Screen);
    fn set_options_open(&mut self, _open: bool) {}
    fn clear_answer(&mut self) {}
}

/// Mutable game state owned by the controller.
#[derive(Debug, Clone)]
pub struct Session {
    pub screen: Screen,
    pub active_level: usize,
    pub streak: u32,
    pub current_problem: Option<Problem>,
    pub best_streaks: BestStreaks,
    pub options_open: bool,
    pub input_enabled: bool,
    /// Kind of message currently on screen
    pub feedback: FeedbackKind,
}

impl Session {
    pub fn new(best_streaks: BestStreaks) -> Self {
        Self {
            screen: Screen::Startup,
            active_level: 0,
            streak: 0,
            current_problem: None,
            best_streaks,
            options_open: false,
            input_enabled: false,
            feedback: FeedbackKind::None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.screen == Screen::Playing
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streaks.get(self.active_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_idle() {
        let session = Session::new(BestStreaks::zeroed(5));
        assert_eq!(session.screen, Screen::Startup);
        assert_eq!(session.streak, 0);
        assert!(session.current_problem.is_none());
        assert!(!session.is_playing());
        assert!(!session.input_enabled);
        assert_eq!(session.feedback, FeedbackKind::None);
    }

    #[test]
    fn screen_display() {
        assert_eq!(Screen::Startup.to_string(), "Startup");
        assert_eq!(Screen::LevelSelect.to_string(), "LevelSelect");
        assert_eq!(Screen::Playing.to_string(), "Playing");
    }
}
