//! Client-side cache data model.
//!
//! [`Context`] owns every [`NamespaceContext`], indexes subscriptions by id and
//! decoded values by checksum. Values are shared [`SpecificConfig`]s: replies
//! carrying an already known checksum resolve to the same object, whatever
//! document or namespace they belong to.

mod config;
mod context;
mod event;
mod keys;
mod namespace_context;
mod specific_config;

pub use config::*;
pub use context::*;
pub use event::*;
pub use keys::*;
pub use namespace_context::*;
pub use specific_config::*;
