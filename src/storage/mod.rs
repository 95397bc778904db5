//! Storage helpers for Orbit
//!
//! Atomic writes for the settings file and backup containers.

pub mod file_io;

pub use file_io::{read_json_required, write_bytes_atomic, write_json_atomic};
