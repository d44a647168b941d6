//! Deterministic JSON for files written by the client.
//!
//! Output uses 2-space indentation and ends with a newline so stored
//! sessions diff cleanly and are easy to inspect by hand.

mod json;

pub use json::*;
