//! Session store and Reference Data Cache for fleetops
//!
//! Lookup lists (types, statuses, motives, departments, vehicles) are
//! fetched once per session and read many times. The cache is
//! populate-on-miss and manually invalidated only — never time-based —
//! and is agnostic about the keyed store backing it: anything that can
//! `get`/`set`/`clear` works, in-memory or durable.

#![deny(unsafe_code)]

mod cache;
mod session;

pub use cache::*;
pub use session::*;
