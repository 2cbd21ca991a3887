//! Terminal dashboard.

pub mod app;
mod dashboard;

pub use app::App;
