//! Shared helpers for unit tests: a scriptable in-memory transport and
//! builders for wire replies.
mod common;
mod fake_transport;

pub(crate) use common::*;
pub(crate) use fake_transport::*;
