//! Port traits (hexagonal architecture boundaries).

pub mod config_port;
pub mod data_port;
pub mod report_port;
pub mod strategy_store_port;
