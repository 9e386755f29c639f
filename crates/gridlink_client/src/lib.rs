//! # GridLink Client
//!
//! The client replica runtime for GridLink: a connection that subscribes to
//! server-side queries, mirrors the matching rows in local caches, invokes
//! reducers, and notifies row observers as committed events stream in.
//!
//! The client never writes rows directly. All mutation happens on the server
//! through reducers; the caches converge on the server's state by applying
//! snapshot and delta frames in arrival order.
//!
//! ```
//! use gridlink_client::{Connection, ConnectionConfig, MockTransport};
//!
//! let config = ConnectionConfig::new("wss://grid.example.com", "game");
//! let mut conn = Connection::new(config, MockTransport::new());
//! conn.on_insert("users", |_event, row| println!("new user: {row:?}"));
//! conn.subscribe(vec!["SELECT * FROM users".into()]).unwrap();
//! assert!(!conn.advance().unwrap()); // no frame pending yet
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod callbacks;
mod config;
mod connection;
mod error;
mod pending;
mod state;
mod transport;

pub use cache::{row_key, DeleteOutcome, InsertOutcome, TableCache};
pub use callbacks::{CallbackId, EventContext, RowCallback, TableCallbacks, UpdateCallback};
pub use config::ConnectionConfig;
pub use connection::Connection;
pub use error::{ClientError, ClientResult};
pub use pending::{CallOutcome, CallResultCallback, CallToken, PendingCalls};
pub use state::ConnectionState;
pub use transport::{FrameTransport, MockTransport};
