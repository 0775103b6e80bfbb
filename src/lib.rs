pub mod color_utils;
pub mod config;
pub mod error;
pub mod grid;
pub mod model;
pub mod storage;
pub mod store;

#[cfg(feature = "tui")]
pub mod tui;
