//! Cookie-domain scope expansion.
//!
//! A cookie stored for `.qq.com` is visible to `www.qq.com`, and so is one
//! stored for `www.qq.com` itself. Payloads on the store are keyed by these
//! scope strings, so looking up a request domain means looking up every
//! scope that could hold cookies for it.

use std::net::IpAddr;

/// Canonical form of a request domain: trimmed, lowercase, one trailing
/// dot removed.
pub fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().to_ascii_lowercase();
    match domain.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => domain,
    }
}

/// The registrable domain (public suffix plus one label) of `domain`.
///
/// Returns `None` for IP addresses and for names that are themselves a
/// public suffix.
pub fn registrable_domain(domain: &str) -> Option<String> {
    if is_ip_literal(domain) {
        return None;
    }
    psl::domain_str(domain).map(str::to_string)
}

/// Candidate scopes for `domain`, most specific first, de-duplicated.
///
/// The order is `D`, `.D`, `.R`, then `.` + each ancestor of `D` below `R`
/// from the shortest up, where `R` is the registrable domain.
///
/// # Example
///
/// ```
/// use cookie_core::cookie_scopes;
///
/// assert_eq!(
///     cookie_scopes("www.qq.com"),
///     vec!["www.qq.com", ".www.qq.com", ".qq.com"]
/// );
/// ```
pub fn cookie_scopes(domain: &str) -> Vec<String> {
    let domain = normalize_domain(domain);
    if domain.is_empty() {
        return Vec::new();
    }

    let mut scopes = vec![domain.clone(), format!(".{}", domain)];

    let registrable = match registrable_domain(&domain) {
        Some(r) if r != domain => r,
        _ => return scopes,
    };
    scopes.push(format!(".{}", registrable));

    // Labels left of the registrable domain, nearest first
    let prefix = domain
        .strip_suffix(registrable.as_str())
        .and_then(|p| p.strip_suffix('.'))
        .unwrap_or_default();
    let mut ancestor = registrable.clone();
    for label in prefix.rsplit('.').filter(|l| !l.is_empty()) {
        ancestor = format!("{}.{}", label, ancestor);
        push_unique(&mut scopes, format!(".{}", ancestor));
    }

    scopes
}

fn push_unique(scopes: &mut Vec<String>, scope: String) {
    if !scopes.contains(&scope) {
        scopes.push(scope);
    }
}

fn is_ip_literal(domain: &str) -> bool {
    let bare = domain
        .strip_prefix('[')
        .and_then(|d| d.strip_suffix(']'))
        .unwrap_or(domain);
    bare.parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn www_qq_com_expands_to_three_scopes() {
        assert_eq!(
            cookie_scopes("www.qq.com"),
            vec!["www.qq.com", ".www.qq.com", ".qq.com"]
        );
    }

    #[test]
    fn deep_subdomain_includes_every_ancestor() {
        assert_eq!(
            cookie_scopes("a.b.c.example.com"),
            vec![
                "a.b.c.example.com",
                ".a.b.c.example.com",
                ".example.com",
                ".c.example.com",
                ".b.c.example.com",
            ]
        );
    }

    #[test]
    fn multi_label_public_suffix() {
        assert_eq!(registrable_domain("shop.bbc.co.uk").as_deref(), Some("bbc.co.uk"));
        assert_eq!(
            cookie_scopes("shop.bbc.co.uk"),
            vec!["shop.bbc.co.uk", ".shop.bbc.co.uk", ".bbc.co.uk"]
        );
    }

    #[test]
    fn registrable_domain_itself_has_two_scopes() {
        assert_eq!(cookie_scopes("qq.com"), vec!["qq.com", ".qq.com"]);
    }

    #[test]
    fn ip_addresses_have_two_scopes() {
        assert_eq!(cookie_scopes("127.0.0.1"), vec!["127.0.0.1", ".127.0.0.1"]);
        assert_eq!(cookie_scopes("[::1]"), vec!["[::1]", ".[::1]"]);
        assert_eq!(registrable_domain("10.0.0.8"), None);
    }

    #[test]
    fn bare_public_suffix_has_two_scopes() {
        assert_eq!(cookie_scopes("com"), vec!["com", ".com"]);
    }

    #[test]
    fn input_is_normalized() {
        assert_eq!(normalize_domain("  WWW.QQ.com. "), "www.qq.com");
        assert_eq!(cookie_scopes("WWW.QQ.COM."), cookie_scopes("www.qq.com"));
    }

    #[test]
    fn empty_domain_has_no_scopes() {
        assert!(cookie_scopes("").is_empty());
        assert!(cookie_scopes("   ").is_empty());
    }

    #[test]
    fn scopes_are_unique() {
        let scopes = cookie_scopes("x.y.z.example.org");
        let mut deduped = scopes.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), scopes.len());
    }
}
