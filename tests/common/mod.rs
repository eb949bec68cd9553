//! Shared test utilities and fixtures.
//!
//! The canonical helper implementations live in `talpa::testing`; this
//! module just re-exports them for the integration and property suites.

#![allow(unused_imports)]

pub use talpa::testing::{ids, index_from_texts, postings};
