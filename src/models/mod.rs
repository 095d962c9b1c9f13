//! Data models for the Hostel Finder application.
//!
//! Field names serialize in camelCase to match the frontend TypeScript interfaces.

mod booking;
mod hostel;

pub use booking::*;
pub use hostel::*;
