//! Business logic for the meeting bot platform.
//!
//! The modules here own every rule the data layer cannot express: the bot
//! state machine and its side effects, the recording and async-transcription
//! sub-engines, the credit ledger, webhook dispatch, credential encryption
//! and the public identifier scheme. Binaries talk to this crate and to
//! `service`; they never reach into `entity_api` directly.

pub use entity::Id;

pub mod alert;
pub mod async_transcription;
pub mod bot;
pub mod credentials;
pub mod credit;
pub mod encryption;
pub mod error;
pub mod object_id;
pub mod recording;
pub mod transcription_settings;
pub mod transition;
pub mod webhook;
