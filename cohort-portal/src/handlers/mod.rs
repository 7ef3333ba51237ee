//! HTTP handlers for the admin API

pub mod campaign;
pub mod units;
pub mod users;
