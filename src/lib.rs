pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod figures;
pub mod measurements;
pub mod plot;
pub mod store;
pub mod timelog;
