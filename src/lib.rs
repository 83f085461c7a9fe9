// Core infrastructure modules
pub mod core;

// Datasets and the demo driver built on top of them
pub mod config;
pub mod datasets;
pub mod demo;
pub mod report;

#[cfg(test)]
mod test_utils;
