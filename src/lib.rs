pub mod alerts;
pub mod board;
pub mod config;
pub mod error;
pub mod features;
pub mod forest;
pub mod history;
pub mod logging;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod rolling;
pub mod stats;
pub mod store;
pub mod tables;
