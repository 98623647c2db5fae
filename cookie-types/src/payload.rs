//! Decrypted payload types.
//!
//! These are what an [`crate::Envelope`] carries once opened: the cookies
//! and headers a peer captured for one domain scope.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::WireError;

/// Cookies and headers for one domain scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecryptedPayload {
    /// Cookies, in the order the peer captured them
    #[serde(default)]
    pub cookies: Vec<CookieItem>,
    /// Header name → value
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl DecryptedPayload {
    /// Look up a header, preferring an exact name match over an
    /// ASCII case-insensitive one.
    pub fn header(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.headers.get(name) {
            return Some(value);
        }
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON bytes.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Deserialization)
    }
}

/// A browser cookie as exported by the capturing peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieItem {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie domain attribute (leading dot = domain and subdomains)
    #[serde(default)]
    pub domain: String,
    /// Cookie path attribute
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiry, seconds since the Unix epoch (absent for session cookies)
    #[serde(rename = "expirationDate", default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    /// Secure flag
    #[serde(default)]
    pub secure: bool,
    /// HttpOnly flag
    #[serde(default)]
    pub http_only: bool,
    /// Host-only flag
    #[serde(default)]
    pub host_only: bool,
    /// SameSite policy as reported by the browser
    #[serde(default)]
    pub same_site: String,
    /// Session cookie flag
    #[serde(default)]
    pub session: bool,
    /// Browser cookie store id
    #[serde(default)]
    pub store_id: String,
}

fn default_path() -> String {
    "/".to_string()
}

impl CookieItem {
    /// A cookie with only a name, value and domain set.
    pub fn new(name: &str, value: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: default_path(),
            expires: None,
            secure: false,
            http_only: false,
            host_only: false,
            same_site: String::new(),
            session: false,
            store_id: String::new(),
        }
    }

    /// Set the path attribute.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// `name=value`, as sent in a `Cookie` header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_browser_export() {
        let json = r#"{
            "cookies": [{
                "name": "sid", "value": "abc", "domain": ".qq.com", "path": "/",
                "expirationDate": 1767225600.5, "secure": true, "httpOnly": true,
                "hostOnly": false, "sameSite": "lax", "session": false, "storeId": "0"
            }],
            "headers": {"Authorization": "Bearer t"}
        }"#;
        let payload = DecryptedPayload::from_json_bytes(json.as_bytes()).unwrap();

        let cookie = &payload.cookies[0];
        assert_eq!(cookie.pair(), "sid=abc");
        assert_eq!(cookie.expires, Some(1767225600.5));
        assert!(cookie.secure && cookie.http_only && !cookie.host_only);
        assert_eq!(cookie.same_site, "lax");
        assert_eq!(cookie.store_id, "0");
        assert_eq!(payload.header("Authorization"), Some("Bearer t"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let json = r#"{"cookies":[{"name":"a","value":"1"}]}"#;
        let payload = DecryptedPayload::from_json_bytes(json.as_bytes()).unwrap();
        assert_eq!(payload.cookies[0].path, "/");
        assert_eq!(payload.cookies[0].expires, None);
        assert!(payload.headers.is_empty());
    }

    #[test]
    fn empty_object_is_empty_payload() {
        let payload = DecryptedPayload::from_json_bytes(b"{}").unwrap();
        assert_eq!(payload, DecryptedPayload::default());
    }

    #[test]
    fn header_lookup_prefers_exact_case() {
        let mut payload = DecryptedPayload::default();
        payload.headers.insert("x-token".into(), "lower".into());
        payload.headers.insert("X-Token".into(), "exact".into());

        assert_eq!(payload.header("X-Token"), Some("exact"));
        assert_eq!(payload.header("x-token"), Some("lower"));
        assert!(payload.header("X-TOKEN").is_some());
        assert_eq!(payload.header("missing"), None);
    }

    #[test]
    fn cookie_serializes_with_browser_field_names() {
        let cookie = CookieItem::new("a", "1", "x.com").with_path("/app");
        let json = serde_json::to_string(&cookie).unwrap();
        assert!(json.contains("\"httpOnly\":false"));
        assert!(json.contains("\"path\":\"/app\""));
        assert!(!json.contains("expirationDate"));
    }
}
