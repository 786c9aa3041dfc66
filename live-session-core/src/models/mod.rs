pub mod config;
pub mod error;
pub mod failure;
pub mod media_models;
pub mod session_summary;
pub mod state;
