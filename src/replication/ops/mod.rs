//! # Operations
//!
//! The four replication entry points, one module each.

mod clearing;
mod deletion;
mod merge;
mod projection;
