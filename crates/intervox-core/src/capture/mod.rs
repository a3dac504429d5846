//! Local device capture domain module.
//!
//! Owns the acquisition and release of the candidate's camera and
//! microphone streams for one interview session.
//!
//! # Module Structure
//!
//! - `model`: Device selection and capture state types
//! - `backend`: Port traits for the platform capture subsystem
//! - `manager`: The capture manager (`CaptureManager`)

mod backend;
mod manager;
mod model;

// Re-export public API
pub use backend::{CaptureBackend, MediaStream};
pub use manager::CaptureManager;
pub use model::{CaptureState, DeviceSelection};
