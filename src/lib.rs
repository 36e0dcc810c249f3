pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod marks;
pub mod model;
pub mod parser;
pub mod reconcile;
pub mod session;
pub mod state;
pub mod submit;
pub mod timer;
pub mod tui;
pub mod ui;
