//! Scan result tracking for static-analysis runs: stable issue identity,
//! history diffing, suppression rules, completion/regression tracking,
//! checksum-based drift monitoring, and a readiness score.

pub mod cli;
pub mod completed;
pub mod config;
pub mod core;
pub mod history;
pub mod monitor;
pub mod pipeline;
pub mod rules;
pub mod score;
pub mod structure;
