//! JSON-RPC surface over HTTP.

pub mod handlers;
pub mod server;
pub mod auth;

pub use handlers::{RpcDeps, RpcHandler};
pub use server::RpcServer;
pub use auth::AuthConfig;
