//! # cookie-types
//!
//! Wire format types for the Cookie Cloud sync protocol.
//!
//! This crate provides the foundational types used across all Cookie Cloud crates:
//! - [`RemoteId`] - Privacy-preserving record identifier sent to the store
//! - [`Envelope`] - Encrypted, signed payload wrapper
//! - [`GetRequest`], [`GetResponse`], [`StoredRecord`] - The `/get` round trip
//! - [`DecryptedPayload`], [`CookieItem`] - What an envelope carries
//! - [`WireError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod envelope;
mod error;
mod ids;
mod messages;
mod payload;

pub use envelope::{Envelope, SignedFields};
pub use error::WireError;
pub use ids::RemoteId;
pub use messages::{GetRequest, GetResponse, StoredRecord};
pub use payload::{CookieItem, DecryptedPayload};
