//! surge-metrics — request counting for the compute service.
//!
//! A single type, [`RequestLog`], records one timestamp per served
//! request and answers rolling-window counts. The count is recomputed
//! from the retained timestamps on every read; nothing is cached.

pub mod window;

pub use window::{DEFAULT_WINDOW, RequestLog};
