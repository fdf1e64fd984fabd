//! # mhconfig-client
//!
//! Client runtime for the mhconfig versioned configuration service.
//!
//! ## Features
//! - **Multiplexed watch**: every subscription of a client shares one
//!   bidirectional stream, with values pushed as the server publishes them
//! - **Content-addressed cache**: identical documents are decoded and stored
//!   once, keyed by the server checksum
//! - **Consistent reads**: [`Session`] pins one namespace version for all reads
//! - **Self cleaning**: idle subscriptions and values are swept periodically
//!
//! ## Quick Start
//! ```no_run
//! use mhconfig_client::{Client, ConfigKey, NamespaceKey};
//!
//! # async fn run() -> mhconfig_client::Result<()> {
//! let client = Client::builder("http://127.0.0.1:2222").build().await?;
//! let namespace = NamespaceKey::new("/srv/config", ["prod"]);
//!
//! let mut session = client.new_session(namespace);
//! let (status, database) = session.get(&ConfigKey::document("database")).await?;
//! println!("{status}: {:?}", database.map(|c| c.value().to_string()));
//!
//! client.close().await
//! # }
//! ```

mod cache;
mod client;
mod config;
mod constants;
mod element;
mod errors;
mod network;
pub mod proto;

pub use cache::*;
pub use client::*;
pub use config::*;
pub use element::*;
pub use errors::*;
pub use network::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
