// Library surface for the terminal front-end and headless/integration tests.
// Keep this free of terminal rendering; that lives in the binary.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod problem;
pub mod runtime;
pub mod session;
pub mod store;
pub mod timer;
pub mod view;

pub use controller::Controller;
pub use session::{Command, FeedbackKind, Presenter, Screen};
