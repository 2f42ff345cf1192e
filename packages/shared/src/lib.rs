//! Shared utilities for the beango server.

pub mod logger;
pub mod time;
