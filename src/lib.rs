pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reaction;
pub mod render;
pub mod review;
pub mod sources;
pub mod sponsor;
