//! Shared test fixtures: a mock store with published peer records.

use std::sync::Arc;

use cookie_types::{CookieItem, DecryptedPayload, RemoteId, StoredRecord};

use crate::cache::DomainCache;
use crate::client::RemoteSyncClient;
use crate::config::{Peer, Settings, SettingsHandle};
use crate::crypto::{seal_for_recipients, LocalKey};
use crate::transport::MockTransport;

pub(crate) struct Fixture {
    pub settings: SettingsHandle,
    pub transport: MockTransport,
    pub local: LocalKey,
    peers: Vec<(Peer, LocalKey)>,
}

impl Fixture {
    /// Settings with an endpoint, a local key and one peer per alias.
    pub fn new(aliases: &[&str]) -> Self {
        let local = LocalKey::generate().unwrap();
        let mut settings = Settings {
            enabled: true,
            endpoint: "https://store.test/".into(),
            ..Settings::default()
        };
        settings.set_local_private_key(&local.to_hex());

        let mut peers = Vec::new();
        for alias in aliases {
            let key = LocalKey::generate().unwrap();
            let peer = Peer::new(alias, &format!("{}-browser", alias), &key.public_key_hex());
            settings.add_peer(peer.clone()).unwrap();
            peers.push((peer, key));
        }

        Self {
            settings: SettingsHandle::new(settings),
            transport: MockTransport::new(),
            local,
            peers,
        }
    }

    fn peer(&self, alias: &str) -> &(Peer, LocalKey) {
        self.peers.iter().find(|(p, _)| p.name == alias).unwrap()
    }

    pub fn client(&self) -> Arc<RemoteSyncClient<MockTransport>> {
        Arc::new(RemoteSyncClient::new(self.settings.clone(), self.transport.clone()))
    }

    pub fn cache(&self) -> Arc<DomainCache<MockTransport>> {
        Arc::new(DomainCache::new(self.client()))
    }

    pub fn remote_id(&self, alias: &str, domain: &str) -> RemoteId {
        RemoteSyncClient::<MockTransport>::calculate_id(&self.peer(alias).0, domain)
    }

    /// Store `payload` as `alias`'s record for `domain`.
    pub fn publish(&self, alias: &str, domain: &str, payload: &DecryptedPayload) {
        self.publish_as(alias, alias, domain, payload);
    }

    /// Store a record under `owner`'s id but signed with `signer`'s key.
    pub fn publish_as(&self, signer: &str, owner: &str, domain: &str, payload: &DecryptedPayload) {
        let json = payload.to_json().unwrap();
        let envelope =
            seal_for_recipients(json.as_bytes(), &[self.local.public_key()], &self.peer(signer).1)
                .unwrap();
        self.transport.put_record(
            self.remote_id(owner, domain).as_str(),
            StoredRecord {
                data: envelope.to_json().unwrap(),
                update: 1_705_000_000_000,
            },
        );
    }
}

pub(crate) fn cookie_payload(cookies: &[(&str, &str)]) -> DecryptedPayload {
    DecryptedPayload {
        cookies: cookies
            .iter()
            .map(|(name, value)| CookieItem::new(name, value, ""))
            .collect(),
        ..DecryptedPayload::default()
    }
}

pub(crate) fn header_payload(headers: &[(&str, &str)]) -> DecryptedPayload {
    DecryptedPayload {
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        ..DecryptedPayload::default()
    }
}
