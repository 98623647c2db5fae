//! CLI command implementations.

pub mod fetch;
pub mod id;
pub mod keys;
pub mod peer;
pub mod resolve;
pub mod seal;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing {
    //! A configured settings file and a mock store holding one peer's records.

    use cookie_client::{seal_for_recipients, LocalKey, MockTransport, Peer, RemoteSyncClient, Settings};
    use cookie_types::{DecryptedPayload, StoredRecord};

    pub struct Store {
        pub settings: Settings,
        pub transport: MockTransport,
        pub peer: Peer,
        pub peer_key: LocalKey,
    }

    impl Store {
        pub fn new() -> Self {
            let local = LocalKey::generate().unwrap();
            let peer_key = LocalKey::generate().unwrap();
            let peer = Peer::new("alice", "alice-chrome", &peer_key.public_key_hex());

            let mut settings = Settings {
                enabled: true,
                endpoint: "https://store.test".into(),
                ..Settings::default()
            };
            settings.set_local_private_key(&local.to_hex());
            settings.add_peer(peer.clone()).unwrap();

            Self {
                settings,
                transport: MockTransport::new(),
                peer,
                peer_key,
            }
        }

        pub fn publish(&self, domain: &str, payload: &DecryptedPayload) {
            let local = self.settings.local_key().unwrap().unwrap();
            let envelope = seal_for_recipients(
                payload.to_json().unwrap().as_bytes(),
                &[local.public_key()],
                &self.peer_key,
            )
            .unwrap();
            let id = RemoteSyncClient::<MockTransport>::calculate_id(&self.peer, domain);
            self.transport.put_record(
                id.as_str(),
                StoredRecord {
                    data: envelope.to_json().unwrap(),
                    update: 0,
                },
            );
        }
    }
}
