//! Bulk Upgrade Library
//!
//! Schedules or aborts software upgrades across a fleet of SD-WAN devices
//! from a CSV manifest.

pub mod app;
pub mod catalog;
pub mod controller;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod manifest;
pub mod storage;
pub mod upgrade;
pub mod utils;
