//! Run controller

pub mod login;
pub mod options;
pub mod run;
