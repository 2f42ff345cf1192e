//! HTTP surface of the chat server.

pub mod handler;
pub mod routes;
pub mod routing;
mod server;
mod signal;
pub mod state;

pub use routes::build_router;
pub use server::Server;
pub use state::AppState;
