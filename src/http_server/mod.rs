//! # HTTP Server
//!
//! Exposes the router over HTTP. A request path is read as the path of a
//! content URI under the configured authority:
//!
//! - `GET /notes/7` queries `content://<authority>/notes/7`
//! - `POST /notes` inserts the JSON body
//! - `PATCH /notes/7` updates with the JSON body
//! - `DELETE /notes/7` deletes

pub mod config;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use routes::{resource_routes, ResourceState};
pub use server::HttpServer;
