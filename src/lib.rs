//! Impulse Insights
//!
//! Descriptive statistics for bank transaction spreadsheets in which each
//! transaction carries an impulse-purchase label and supporting signal
//! columns (weekend, evening, post-salary, merchant and category risk).
//!
//! This crate provides the core implementation for the
//! `impulse-insights` CLI tool: decoding CSV / XLSX uploads, computing
//! KPIs and breakdowns, and writing JSON reports and table snapshots.
//!
//! ## Getting Started
//!
//! ```bash
//! impulse-insights analyze --input transactions.xlsx --summary
//! impulse-insights --help
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
