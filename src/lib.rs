//! tablerouter - URI-addressed access to relational tables
//!
//! A content URI such as `content://com.example.app/notes/7` names a table,
//! a row, or the rows whose column has a given value. The router resolves
//! the table segment to a registered handler, which turns the URI shape
//! into a filter and runs the operation against the store.

pub mod cli;
pub mod config;
pub mod errors;
pub mod http_server;
pub mod notify;
pub mod router;
pub mod selection;
pub mod store;
pub mod table;
pub mod uri;

pub use errors::{ProviderError, ProviderResult};
pub use router::{TableRegistry, TableRouter};
pub use uri::{ResourceUri, UriMatch};
