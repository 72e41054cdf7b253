//! Flow Units
//!
//! Content-bearing records that move between pipeline stages. A flow unit carries an
//! ordered attribute map and a reference to an immutable payload held by a content store.

pub mod attributes;
pub mod session;
pub mod unit;

pub use session::{ProcessSession, Relationship};
pub use unit::{Attributes, FlowUnit};
