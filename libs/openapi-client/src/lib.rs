//! Wire models for the SD-WAN controller API

pub mod models;
