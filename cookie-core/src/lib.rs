//! # cookie-core
//!
//! Pure logic for Cookie Cloud (no I/O, instant tests).
//!
//! This crate holds the parts of cookie and header resolution that do not
//! touch the network, the clock or the disk:
//! - [`scope`] - which cookie-domain scopes a request domain can see
//! - [`cookie`] - cookie path matching and `Cookie` header assembly
//! - [`pattern`] - scanning `!{..}` / `${..}` placeholders and rendering
//!   their replacements
//!
//! The actual I/O (fetching, caching, decrypting) is performed by
//! `cookie-client`, which drives these functions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cookie;
pub mod pattern;
pub mod scope;

pub use cookie::{format_cookie_header, path_matches};
pub use pattern::{distinct_tokens, render, scan, FetchMode, Grammar, Segment, Token};
pub use scope::{cookie_scopes, normalize_domain, registrable_domain};
