pub mod config;
pub mod dataset;
pub mod export;
pub mod figures;
pub mod metrics;
pub mod page;
pub mod server;
