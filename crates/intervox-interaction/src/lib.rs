//! Remote service clients for the Intervox interview stack.
//!
//! Implements the core's port traits against the real HTTP services: the
//! dialogue-generation backend, the streaming-avatar provider, and the
//! interview directory that hands out interview ids and question lists.

pub mod avatar_api;
pub mod config;
pub mod dialogue_api;
pub mod directory_api;

pub use avatar_api::StreamingAvatarClient;
pub use config::InteractionConfig;
pub use dialogue_api::DialogueApiClient;
pub use directory_api::InterviewDirectoryClient;
