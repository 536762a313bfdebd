pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod outputs;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod runner;
pub mod table;
pub mod util;
