//! # Query Sheriff Library
//!
//! Inspection engine for captured SQL query batches.

pub mod aggregate;
pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod error;
pub mod output;
pub mod record;
pub mod report;
