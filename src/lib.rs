pub mod app;
pub mod attempts;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod state;
pub mod views;

pub use app::{build_app, serve};
pub use state::AppState;
