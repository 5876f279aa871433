use std::io::Read;

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::domain::Incident;
use crate::error::AppError;

/// Mock explorer for simulated ledger transactions.
pub const EXPLORER_BASE_URL: &str = "https://polygonscan.com/tx/";

/// Hex sha256 over an in-memory byte buffer.
pub fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Streaming digest for evidence uploads. Returns the hex digest and the
/// number of bytes consumed, so large files never need to sit in memory.
pub fn hash_reader<R: Read>(reader: &mut R) -> Result<(String, u64), AppError> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut total: u64 = 0;
    loop {
        let n = reader.read(&mut buf).map_err(|e| {
            AppError::new(
                "EVIDENCE_HASH_READ_FAILED",
                "Failed to read evidence bytes for hashing",
            )
            .with_details(e.to_string())
        })?;
        if n == 0 {
            break;
        }
        total += n as u64;
        hasher.update(&buf[..n]);
    }
    Ok((hex::encode(hasher.finalize()), total))
}

/// Canonical digest over the incident's identity-relevant fields.
///
/// The payload is an explicitly ordered pipe-separated string: field order is
/// fixed here, never inherited from a map's iteration order. Anchoring stores
/// this value and verification recomputes it, so the serialization must stay
/// byte-stable for unchanged logical content.
pub fn evidence_bundle_hash(incident: &Incident) -> String {
    let files = incident
        .files
        .iter()
        .map(|f| format!("{}:{}", f.name, f.content_hash))
        .collect::<Vec<_>>()
        .join(",");
    let payload = format!(
        "id={}|type={}|severity={}|notes={}|lat={}|lng={}|addr={}|files=[{}]",
        incident.id,
        incident.incident_type.as_str(),
        incident.severity,
        incident.notes,
        incident.location.lat,
        incident.location.lng,
        incident.location.address.as_deref().unwrap_or(""),
        files
    );
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// Random 64-hex-character token with an 0x prefix. Simulates an external
/// ledger reference; carries no cryptographic meaning.
pub fn mock_transaction_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 32];
    rng.fill(bytes.as_mut_slice());
    format!("0x{}", hex::encode(bytes))
}

pub fn explorer_url(tx_id: &str) -> String {
    format!("{EXPLORER_BASE_URL}{tx_id}")
}
