pub mod cli;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod parallel;
pub mod server;

pub use config::EngineConfig;
pub use engine::output::{EngineOutput, ResultRow};
pub use engine::Engine;
