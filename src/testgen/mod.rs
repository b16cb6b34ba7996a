pub mod file;
pub mod runner;
