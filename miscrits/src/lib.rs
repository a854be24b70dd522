pub mod action;
pub mod api;
pub mod catalog;
pub mod config;
pub mod effect;
pub mod encoder;
pub mod logging;
pub mod moves;
pub mod patch;
pub mod reducer;
pub mod sprite;
pub mod state;
pub mod ui;
