//! Response shaping shared by every handler

pub mod envelope;

pub use envelope::{ApiResponse, Envelope};
