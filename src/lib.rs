// Public API for integration tests and potential library usage

pub mod api;
pub mod catalog;
pub mod config;
pub mod countries;
pub mod engine;
pub mod live;
pub mod protocol;
pub mod state;
pub mod types;
pub mod ws;
