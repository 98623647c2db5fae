//! Seal a payload for a set of recipients.

use anyhow::{Context, Result};
use cookie_client::{seal_for_recipients, PeerKey, Settings};
use cookie_types::{DecryptedPayload, Envelope};

/// Encrypt `payload_json` for `recipients`, signed with the local key.
///
/// The payload must parse as a cookie/header payload.
pub fn seal(settings: &Settings, recipients: &[String], payload_json: &str) -> Result<Envelope> {
    if recipients.is_empty() {
        anyhow::bail!("At least one --to recipient is required");
    }
    let sender = settings
        .local_key()
        .context("Configured local key is invalid")?
        .context("No local key configured. Run 'cookie-cloud keygen --save'.")?;

    DecryptedPayload::from_json_bytes(payload_json.as_bytes())
        .context("Payload is not a valid cookie/header payload")?;

    let recipients = recipients
        .iter()
        .map(|r| PeerKey::from_hex(r).with_context(|| format!("Invalid recipient key '{}'", r)))
        .collect::<Result<Vec<_>>>()?;

    Ok(seal_for_recipients(payload_json.as_bytes(), &recipients, &sender)?)
}

/// Run the seal command.
pub fn run(settings: &Settings, recipients: &[String], payload_json: &str) -> Result<()> {
    let envelope = seal(settings, recipients, payload_json)?;
    println!("{}", envelope.to_json()?);
    Ok(())
}
