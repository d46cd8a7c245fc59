pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod services;
pub mod session;
pub mod views;

pub use app::App;
pub use error::ApiError;
