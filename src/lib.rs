pub mod config;
pub mod error;
pub mod isa;
pub mod memory;
pub mod trace;
pub mod engine;
pub mod loader;
pub mod listing;
pub mod batch;
