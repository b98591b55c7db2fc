pub mod admin;
pub mod commands;
pub mod config;
pub mod engine;
pub mod keyboard;
pub mod questions;
pub mod registry;
pub mod runner;
pub mod schema;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
