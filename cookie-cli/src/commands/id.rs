//! Print the remote ids a lookup for a domain would request.

use anyhow::{Context, Result};
use cookie_client::{HttpTransport, RemoteSyncClient, Settings};
use cookie_core::cookie_scopes;

/// `(scope, remote id)` for every cookie scope of `domain`.
pub fn scope_ids(settings: &Settings, peer: &str, domain: &str) -> Result<Vec<(String, String)>> {
    let peer = settings
        .resolve_peer(peer)
        .with_context(|| format!("No peer named '{}'", peer))?;

    let scopes = cookie_scopes(domain);
    if scopes.is_empty() {
        anyhow::bail!("Empty domain");
    }

    Ok(scopes
        .into_iter()
        .map(|scope| {
            let id = RemoteSyncClient::<HttpTransport>::calculate_id(peer, &scope);
            (scope, id.to_string())
        })
        .collect())
}

/// Run the id command.
pub fn run(settings: &Settings, peer: &str, domain: &str) -> Result<()> {
    for (scope, id) in scope_ids(settings, peer, domain)? {
        println!("{:<24} {}", scope, id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookie_client::Peer;
    use cookie_types::RemoteId;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings
            .add_peer(Peer::new("a", "alice", "0x02abcdef"))
            .unwrap();
        settings
    }

    #[test]
    fn one_id_per_scope() {
        let ids = scope_ids(&settings(), "a", "www.qq.com").unwrap();
        let scopes: Vec<_> = ids.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(scopes, vec!["www.qq.com", ".www.qq.com", ".qq.com"]);
        assert_eq!(
            ids[2].1,
            RemoteId::calculate("02abcdef", ".qq.com", "alice").to_string()
        );
    }

    #[test]
    fn empty_alias_uses_first_peer() {
        assert_eq!(
            scope_ids(&settings(), "", "x.com").unwrap(),
            scope_ids(&settings(), "a", "x.com").unwrap()
        );
    }

    #[test]
    fn unknown_peer_and_empty_domain_fail() {
        assert!(scope_ids(&settings(), "nobody", "x.com").is_err());
        assert!(scope_ids(&settings(), "a", "  ").is_err());
    }
}
