pub mod backend;
pub mod client;
pub mod orchestrator;
pub mod prompt;
