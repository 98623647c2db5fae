//! Placeholder substitution for outgoing request headers.
//!
//! The scanning itself is pure and lives in [`cookie_core::pattern`]; this
//! module answers each token from the [`DomainCache`].

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use cookie_core::{distinct_tokens, render, scan, FetchMode, Grammar, Segment, Token};

use crate::cache::DomainCache;
use crate::transport::Transport;

/// A request header as `(name, value)`.
pub type Header = (String, String);

/// Errors from request rewriting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// URL did not parse or has no host
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

/// Rewrites header values that carry `!{..}` / `${..}` placeholders.
pub struct PatternResolver<T: Transport> {
    cache: Arc<DomainCache<T>>,
}

impl<T: Transport> PatternResolver<T> {
    /// Create a resolver over `cache`.
    pub fn new(cache: Arc<DomainCache<T>>) -> Self {
        Self { cache }
    }

    /// The cache tokens are answered from.
    pub fn cache(&self) -> &Arc<DomainCache<T>> {
        &self.cache
    }

    /// Resolve a `Cookie` header value. `None` if the value is unchanged.
    pub async fn resolve_cookie(&self, value: &str, domain: &str, path: &str) -> Option<String> {
        let segments = scan(value, Grammar::Cookie);
        let mut values = HashMap::new();
        for token in ordered_tokens(&segments) {
            let resolved = self
                .cache
                .get_http_cookie(token.peer, domain, path, token.mode.use_cache())
                .await;
            values.insert(token, resolved);
        }
        changed(value, render(&segments, &values))
    }

    /// Resolve any other header value. `None` if the value is unchanged.
    ///
    /// A token without `|key` looks up the header named `name`. Headers the
    /// peer does not have resolve to an empty string.
    pub async fn resolve_header(&self, name: &str, value: &str, domain: &str) -> Option<String> {
        let segments = scan(value, Grammar::Header);
        let mut values = HashMap::new();
        for token in ordered_tokens(&segments) {
            let key = token.key.unwrap_or(name);
            let resolved = self
                .cache
                .get_http_header(token.peer, domain, key, token.mode.use_cache())
                .await
                .unwrap_or_default();
            values.insert(token, resolved);
        }
        changed(value, render(&segments, &values))
    }

    /// Rewrite the headers of a request to `url`.
    ///
    /// Returns the complete header list, in the original order, when any
    /// value changed. Returns `Ok(None)` when nothing changed or sync is
    /// disabled.
    pub async fn rewrite_request(
        &self,
        url: &str,
        headers: &[Header],
    ) -> Result<Option<Vec<Header>>, ResolveError> {
        if !self.cache.settings().enabled() {
            return Ok(None);
        }

        let parsed = Url::parse(url).map_err(|e| ResolveError::InvalidUrl(format!("{url}: {e}")))?;
        let domain = parsed
            .host_str()
            .ok_or_else(|| ResolveError::InvalidUrl(format!("{url}: no host")))?;
        let path = match parsed.path() {
            "" => "/",
            p => p,
        };

        let mut rewritten = headers.to_vec();
        let mut any_changed = false;
        for (name, value) in rewritten.iter_mut() {
            let replacement = if name.eq_ignore_ascii_case("cookie") {
                self.resolve_cookie(value, domain, path).await
            } else if !value.is_empty() {
                self.resolve_header(name, value, domain).await
            } else {
                None
            };

            if let Some(new_value) = replacement {
                info!("Rewrote header {} for {}", name, domain);
                debug!("{}: {} -> {}", name, value, new_value);
                *value = new_value;
                any_changed = true;
            }
        }

        Ok(any_changed.then_some(rewritten))
    }
}

/// Forced tokens first, then cached, each in order of appearance.
fn ordered_tokens<'a>(segments: &[Segment<'a>]) -> Vec<Token<'a>> {
    let (mut forced, cached): (Vec<_>, Vec<_>) = distinct_tokens(segments)
        .into_iter()
        .partition(|t| t.mode == FetchMode::Forced);
    forced.extend(cached);
    forced
}

fn changed(original: &str, output: String) -> Option<String> {
    (output != original).then_some(output)
}
