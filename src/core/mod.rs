//! Core building blocks: filter configuration and run parameters (`params`)
//! and the fixed-column record filter (`filter`). Consumed by the high-level
//! `api` module.
pub mod filter;
pub mod params;
