//! Cookie path matching and `Cookie` header assembly.

use cookie_types::CookieItem;

/// Whether a cookie stored with `cookie_path` is sent for `request_path`.
///
/// Prefix match on the raw path. A `/` cookie path matches everything,
/// including an empty request path.
pub fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    cookie_path == "/" || request_path.starts_with(cookie_path)
}

/// Join the cookies visible at `request_path` into a `Cookie` header value.
///
/// Input order is preserved. Returns an empty string when nothing matches.
pub fn format_cookie_header<'a, I>(cookies: I, request_path: &str) -> String
where
    I: IntoIterator<Item = &'a CookieItem>,
{
    cookies
        .into_iter()
        .filter(|c| path_matches(request_path, &c.path))
        .map(CookieItem::pair)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_matches_everything() {
        assert!(path_matches("/", "/"));
        assert!(path_matches("/deep/path", "/"));
        assert!(path_matches("", "/"));
    }

    #[test]
    fn prefix_match() {
        assert!(path_matches("/app/settings", "/app"));
        assert!(path_matches("/app", "/app"));
        assert!(!path_matches("/other", "/app"));
        assert!(!path_matches("/", "/app"));
    }

    #[test]
    fn header_keeps_order_and_filters_paths() {
        let cookies = vec![
            CookieItem::new("a", "1", ".x.com"),
            CookieItem::new("b", "2", ".x.com").with_path("/admin"),
            CookieItem::new("c", "3", "x.com").with_path("/app"),
        ];
        assert_eq!(format_cookie_header(&cookies, "/app/home"), "a=1; c=3");
        assert_eq!(format_cookie_header(&cookies, "/admin"), "a=1; b=2");
    }

    #[test]
    fn no_cookies_is_empty_string() {
        let cookies: Vec<CookieItem> = Vec::new();
        assert_eq!(format_cookie_header(&cookies, "/"), "");
    }
}
