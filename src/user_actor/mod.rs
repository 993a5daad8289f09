//! User records, consulted only to attribute orders.

pub mod entity;
pub mod error;

pub use error::*;
