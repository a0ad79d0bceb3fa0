//! Core of the U.S. population dashboard: loading the wide-format source,
//! per-year metrics and the aggregate views consumed by the UI.

pub mod config;
pub mod data;
