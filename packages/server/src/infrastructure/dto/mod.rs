//! Data Transfer Objects (DTOs) for the chat server.
//!
//! - `http`: JSON request bodies and response payloads of the HTTP API
//! - `conversion`: domain entity → DTO conversions

pub mod conversion;
pub mod http;
