//! Stripe-style webhook signatures: `t=<unix>,v1=<hex>[,v1=<hex>...]`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_header(header: &str) -> AppResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    AppError::bad_request("Invalid signature header: bad timestamp")
                })?);
            }
            Some(("v1", value)) => signatures.push(value.to_ascii_lowercase()),
            // Other schemes (v0, ...) are ignored
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| AppError::bad_request("Invalid signature header: missing timestamp"))?;
    if signatures.is_empty() {
        return Err(AppError::bad_request(
            "Invalid signature header: no v1 signature",
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Builds a header value for `payload`, as the provider would send it.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(secret, timestamp, payload)
    )
}

/// Verifies `header` against the raw `payload` at unix time `now`.
///
/// Fails with 400 when the header is malformed, the timestamp is outside
/// `tolerance` seconds, or no `v1` signature matches.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: u64,
    now: i64,
) -> AppResult<()> {
    let parsed = parse_header(header)?;

    if now.abs_diff(parsed.timestamp) > tolerance {
        return Err(AppError::bad_request(
            "Webhook timestamp outside the tolerance window",
        ));
    }

    let expected = compute_signature(secret, parsed.timestamp, payload);
    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())));

    if matched {
        Ok(())
    } else {
        Err(AppError::bad_request("Invalid webhook signature"))
    }
}
