//! Core primitives shared by every component (simulated time)

pub mod time;

pub use time::{minutes_to_hours, SimClock};
