//! Ratatui front-end: a connect screen while disconnected and a profile table
//! with modal add/edit/delete forms once a session is open.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
