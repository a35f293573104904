//! Model Context Protocol server exposing the bridge's tool catalog.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
