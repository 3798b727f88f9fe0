//! Terminal dashboard for a FarmVibes.AI service: browse workflows, submit
//! and monitor runs, inspect outputs and compare results.

pub mod api;
pub mod commands;
pub mod config;
pub mod logging;
pub mod polling;
pub mod submission;
pub mod version;
pub mod views;
