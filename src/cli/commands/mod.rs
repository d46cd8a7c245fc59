pub mod audit;
pub mod auth;
pub mod charts;
pub mod personas;
pub mod watch;
