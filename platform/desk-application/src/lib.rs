pub mod config;
pub mod control;
pub mod polling;
pub mod state;
