pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod export;
pub mod server;
