//! beango chat server library.
//!
//! A pattern-matching request router with cookie-session authentication, a
//! buffered response writer and per-chat Server-Sent Events fan-out, plus the
//! in-memory chat backend built on top of them.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
