//! Streaming avatar domain module.
//!
//! Owns the lifecycle of one remote streaming-avatar session: create,
//! receive the inbound media stream, issue speak commands, terminate.
//!
//! # Module Structure
//!
//! - `model`: Session configuration and handles
//! - `transport`: Port trait for the remote streaming provider
//! - `controller`: The session state machine (`AvatarController`)

mod controller;
mod model;
mod transport;

// Re-export public API
pub use controller::{AvatarController, AvatarPhase};
pub use model::{AvatarConfig, CreatedSession, RemoteStreamHandle};
pub use transport::AvatarTransport;
