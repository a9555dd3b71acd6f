//! Retail Dashboard - sales data preparation and aggregation core
//!
//! Loads a transaction file, cleans it into a [`data::CleanTable`] and turns
//! filtered tables into the summary views rendered by the desktop host.

pub mod config;
pub mod data;
pub mod stats;
