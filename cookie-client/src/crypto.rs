//! Cryptographic primitives for Cookie Cloud.
//!
//! This module provides:
//! - secp256k1 key pairs ([`LocalKey`] for our side, [`PeerKey`] for others)
//! - ECDH shared secrets used directly as AES-256 key material
//! - ECDSA/SHA-256 signatures (DER, base64) over an envelope's signed fields
//! - Single-recipient and multi-recipient [`Envelope`]s
//!
//! # Wire compatibility
//!
//! The envelope format is shared with deployed stores and browser peers, so
//! it is reproduced exactly:
//!
//! - The AES key is the raw ECDH x-coordinate, and the IV is its first
//!   16 bytes. There is no KDF and no random IV.
//! - Multi-recipient envelopes encrypt once under a random 32-byte content
//!   key. The content key is wrapped per recipient with AES-256-CBC without
//!   padding, indexed by `md5hex(ephPubKey + recipientPubKey)`.
//! - The signature covers `{"ephPubKey":"…","data":"…"}` and is always
//!   verified before anything is decrypted.

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use cbc::cipher::{
    block_padding::{NoPadding, Pkcs7},
    BlockDecryptMut, BlockEncryptMut, KeyIvInit,
};
use cookie_types::Envelope;
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use md5::Md5;
use sha2::Digest;
use std::collections::BTreeMap;
use thiserror::Error;
use zeroize::Zeroizing;

/// AES-256 key size, and the size of an ECDH shared secret (32 bytes).
pub const KEY_SIZE: usize = 32;

/// CBC IV size (16 bytes), taken from the front of the key.
pub const IV_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Crypto errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// A key was not valid hex or not a valid secp256k1 key.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// The envelope signature did not verify against the sender's key.
    #[error("signature verification failed")]
    SignatureInvalid,

    /// The envelope holds no wrapped key for this recipient.
    #[error("recipient not authorized for this envelope")]
    RecipientNotAuthorized,

    /// Ciphertext or wrapped key was malformed, or padding was wrong.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// The OS random source failed.
    #[error("secure randomness unavailable")]
    RandomnessUnavailable,

    /// Envelope JSON could not be parsed.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

// ===========================================
// Keys
// ===========================================

/// Our own secp256k1 private key.
#[derive(Clone)]
pub struct LocalKey {
    secret: SecretKey,
}

impl LocalKey {
    /// Generate a fresh key from the OS random source.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
        loop {
            getrandom::getrandom(&mut bytes[..])
                .map_err(|_| CryptoError::RandomnessUnavailable)?;
            // Zero or >= curve order, astronomically rare
            if let Ok(secret) = SecretKey::from_slice(&bytes[..]) {
                return Ok(Self { secret });
            }
        }
    }

    /// Parse a hex private key.
    ///
    /// An optional `0x` prefix is stripped and short keys are left-padded
    /// with zeros to 32 bytes.
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let digits = strip_hex_prefix(hex_key.trim());
        if digits.is_empty() || digits.len() > KEY_SIZE * 2 {
            return Err(CryptoError::InvalidKeyFormat(format!(
                "private key must be 1-{} hex digits",
                KEY_SIZE * 2
            )));
        }

        let padded = Zeroizing::new(format!("{:0>width$}", digits, width = KEY_SIZE * 2));
        let bytes = Zeroizing::new(
            hex::decode(padded.as_str())
                .map_err(|e| CryptoError::InvalidKeyFormat(e.to_string()))?,
        );

        let secret = SecretKey::from_slice(&bytes)
            .map_err(|_| CryptoError::InvalidKeyFormat("private key out of range".into()))?;
        Ok(Self { secret })
    }

    /// The private key as 64 lowercase hex digits.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret.to_bytes()))
    }

    /// The matching public key.
    pub fn public_key(&self) -> PeerKey {
        PeerKey {
            public: self.secret.public_key(),
        }
    }

    /// The matching public key as compressed hex.
    pub fn public_key_hex(&self) -> String {
        self.public_key().to_hex()
    }
}

// Don't leak secret in debug output
impl std::fmt::Debug for LocalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalKey([REDACTED])")
    }
}

/// A secp256k1 public key: a peer, a recipient, or an ephemeral sender key.
#[derive(Clone, PartialEq, Eq)]
pub struct PeerKey {
    public: PublicKey,
}

impl PeerKey {
    /// Parse a hex SEC1 public key (33-byte compressed or 65-byte
    /// uncompressed), with an optional `0x` prefix.
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(strip_hex_prefix(hex_key.trim()))
            .map_err(|e| CryptoError::InvalidKeyFormat(e.to_string()))?;
        let public = PublicKey::from_sec1_bytes(&bytes)
            .map_err(|_| CryptoError::InvalidKeyFormat("not a secp256k1 point".into()))?;
        Ok(Self { public })
    }

    /// Compressed SEC1 encoding, 66 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        hex::encode(self.public.to_encoded_point(true).as_bytes())
    }
}

impl std::fmt::Debug for PeerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PeerKey({})", self.to_hex())
    }
}

/// A freshly generated key pair in hex form.
#[derive(Clone)]
pub struct KeyPair {
    /// 32-byte private scalar, 64 hex digits
    pub private_key: Zeroizing<String>,
    /// 33-byte compressed public point, 66 hex digits
    pub public_key: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Generate a new key pair.
pub fn generate_key_pair() -> Result<KeyPair, CryptoError> {
    let key = LocalKey::generate()?;
    Ok(KeyPair {
        private_key: key.to_hex(),
        public_key: key.public_key_hex(),
    })
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

// ===========================================
// ECDH and signatures
// ===========================================

/// The x-coordinate of `local · peer`, big-endian and zero-padded to 32 bytes.
///
/// `hex::encode` of the result is the 64-digit form stored by other peers.
pub fn derive_shared_secret(local: &LocalKey, peer: &PeerKey) -> Zeroizing<[u8; KEY_SIZE]> {
    let shared =
        k256::ecdh::diffie_hellman(local.secret.to_nonzero_scalar(), peer.public.as_affine());
    let mut out = Zeroizing::new([0u8; KEY_SIZE]);
    out.copy_from_slice(shared.raw_secret_bytes());
    out
}

/// Sign `data` with ECDSA over SHA-256. Returns the DER signature in base64.
pub fn sign(local: &LocalKey, data: &[u8]) -> String {
    let signing_key = SigningKey::from(local.secret.clone());
    let signature: Signature = signing_key.sign(data);
    BASE64.encode(signature.to_der().as_bytes())
}

/// Verify a base64 DER signature over `data`.
///
/// High-S signatures are normalized first.
pub fn verify(peer: &PeerKey, data: &[u8], signature_b64: &str) -> Result<(), CryptoError> {
    let der = BASE64
        .decode(signature_b64)
        .map_err(|_| CryptoError::SignatureInvalid)?;
    let signature = Signature::from_der(&der).map_err(|_| CryptoError::SignatureInvalid)?;
    let signature = signature.normalize_s().unwrap_or(signature);

    VerifyingKey::from(&peer.public)
        .verify(data, &signature)
        .map_err(|_| CryptoError::SignatureInvalid)
}

/// Index of a recipient's wrapped key: `md5hex(eph_pub_key + recipient_pub_key)`.
pub fn recipient_hash(eph_pub_key: &str, recipient_pub_key: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(eph_pub_key.as_bytes());
    hasher.update(recipient_pub_key.as_bytes());
    hex::encode(hasher.finalize())
}

// ===========================================
// Envelopes
// ===========================================

/// Encrypt `plaintext` for one recipient and sign it with `sender`.
pub fn seal(
    plaintext: &[u8],
    recipient: &PeerKey,
    sender: &LocalKey,
) -> Result<Envelope, CryptoError> {
    let ephemeral = LocalKey::generate()?;
    let shared = derive_shared_secret(&ephemeral, recipient);
    let ciphertext = cbc_encrypt(&shared, plaintext)?;

    signed_envelope(ephemeral.public_key_hex(), BASE64.encode(ciphertext), None, sender)
}

/// Verify and decrypt a single-recipient envelope.
pub fn open(
    envelope: &Envelope,
    recipient: &LocalKey,
    sender: &PeerKey,
) -> Result<Vec<u8>, CryptoError> {
    verify_envelope(envelope, sender)?;

    let ephemeral =
        PeerKey::from_hex(&envelope.eph_pub_key).map_err(|_| CryptoError::DecryptionFailed)?;
    let shared = derive_shared_secret(recipient, &ephemeral);
    cbc_decrypt(&shared[..], &envelope.data)
}

/// Encrypt `plaintext` once for every key in `recipients` and sign it with
/// `sender`.
pub fn seal_for_recipients(
    plaintext: &[u8],
    recipients: &[PeerKey],
    sender: &LocalKey,
) -> Result<Envelope, CryptoError> {
    if recipients.is_empty() {
        return Err(CryptoError::EncryptionFailed("no recipients".into()));
    }

    let ephemeral = LocalKey::generate()?;
    let eph_pub_key = ephemeral.public_key_hex();

    let mut content_key = Zeroizing::new([0u8; KEY_SIZE]);
    getrandom::getrandom(&mut content_key[..]).map_err(|_| CryptoError::RandomnessUnavailable)?;
    let ciphertext = cbc_encrypt(&content_key, plaintext)?;

    let mut share_keys = BTreeMap::new();
    for recipient in recipients {
        let shared = derive_shared_secret(&ephemeral, recipient);
        let wrapped = Aes256CbcEnc::new_from_slices(&shared[..], &shared[..IV_SIZE])
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .encrypt_padded_vec_mut::<NoPadding>(&content_key[..]);
        share_keys.insert(
            recipient_hash(&eph_pub_key, &recipient.to_hex()),
            BASE64.encode(wrapped),
        );
    }

    signed_envelope(eph_pub_key, BASE64.encode(ciphertext), Some(share_keys), sender)
}

/// Verify and decrypt a multi-recipient envelope.
///
/// Order: signature, recipient lookup, key unwrap, payload decrypt.
pub fn open_shared(
    envelope: &Envelope,
    recipient: &LocalKey,
    sender: &PeerKey,
) -> Result<Vec<u8>, CryptoError> {
    verify_envelope(envelope, sender)?;

    let index = recipient_hash(&envelope.eph_pub_key, &recipient.public_key_hex());
    let wrapped = envelope
        .share_keys
        .as_ref()
        .and_then(|keys| keys.get(&index))
        .ok_or(CryptoError::RecipientNotAuthorized)?;

    let ephemeral =
        PeerKey::from_hex(&envelope.eph_pub_key).map_err(|_| CryptoError::DecryptionFailed)?;
    let shared = derive_shared_secret(recipient, &ephemeral);

    let wrapped = BASE64.decode(wrapped).map_err(|_| CryptoError::DecryptionFailed)?;
    let content_key = Zeroizing::new(
        Aes256CbcDec::new_from_slices(&shared[..], &shared[..IV_SIZE])
            .map_err(|_| CryptoError::DecryptionFailed)?
            .decrypt_padded_vec_mut::<NoPadding>(&wrapped)
            .map_err(|_| CryptoError::DecryptionFailed)?,
    );
    if content_key.len() != KEY_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }

    cbc_decrypt(&content_key[..], &envelope.data)
}

/// Parse envelope JSON and open it as a multi-recipient envelope.
pub fn open_shared_json(
    json: &str,
    recipient: &LocalKey,
    sender: &PeerKey,
) -> Result<Vec<u8>, CryptoError> {
    let envelope =
        Envelope::from_json(json).map_err(|e| CryptoError::MalformedEnvelope(e.to_string()))?;
    open_shared(&envelope, recipient, sender)
}

fn signed_envelope(
    eph_pub_key: String,
    data: String,
    share_keys: Option<BTreeMap<String, String>>,
    sender: &LocalKey,
) -> Result<Envelope, CryptoError> {
    let mut envelope = Envelope {
        eph_pub_key,
        data,
        share_keys,
        signature: String::new(),
    };
    let signed = envelope
        .signed_fields()
        .to_canonical_json()
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    envelope.signature = sign(sender, signed.as_bytes());
    Ok(envelope)
}

fn verify_envelope(envelope: &Envelope, sender: &PeerKey) -> Result<(), CryptoError> {
    let signed = envelope
        .signed_fields()
        .to_canonical_json()
        .map_err(|e| CryptoError::MalformedEnvelope(e.to_string()))?;
    verify(sender, signed.as_bytes(), &envelope.signature)
}

/// AES-256-CBC/PKCS#7 with IV = key[..16].
fn cbc_encrypt(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256CbcEnc::new_from_slices(key, &key[..IV_SIZE])
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt(key: &[u8], data_b64: &str) -> Result<Vec<u8>, CryptoError> {
    let ciphertext = BASE64.decode(data_b64).map_err(|_| CryptoError::DecryptionFailed)?;
    Aes256CbcDec::new_from_slices(key, &key[..IV_SIZE])
        .map_err(|_| CryptoError::DecryptionFailed)?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
