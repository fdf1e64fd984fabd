//! Protocol Buffer definitions and client stub for the configuration service.
//!
//! `build.rs` generates `src/generated/mhconfig.rs` from `proto/mhconfig.proto`.

#[allow(clippy::all)]
mod mhconfig {
    include!("../generated/mhconfig.rs");
}

pub use mhconfig::*;
