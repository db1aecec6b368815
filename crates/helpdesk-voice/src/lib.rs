//! Voice session access for the help desk.
//!
//! Callers reach the assistant through a LiveKit room. The speech pipeline
//! (STT, LLM, TTS) runs in an external agent worker that joins the same
//! room; this crate only mints the access tokens a browser or phone bridge
//! needs to join.

pub mod config;
pub mod error;
pub mod service;

pub use config::{LiveKitConfig, DEV_LIVEKIT_API_KEY, DEV_LIVEKIT_API_SECRET, DEV_LIVEKIT_URL};
pub use error::VoiceError;
pub use service::VoiceService;
