//! Infrastructure layer: storage, real-time push and transfer objects.

pub mod dto;
pub mod message_pusher;
pub mod repository;
