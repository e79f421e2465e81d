//! Domain data types for the pipeline.

pub mod article;
pub mod cluster;
pub mod config;
pub mod record;
pub mod report;
