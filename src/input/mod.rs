//! Input handling

pub mod coalescer;
