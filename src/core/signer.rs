// bhesignature: HMAC(token key, method + uri) keys HMAC(_, date hour) keys HMAC(_, body).
// The base64 digest goes in `Signature`, the full date it used in `RequestDate`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of `YYYY-MM-DDTHH`, the part of the request date that feeds the digest.
const DATE_HOUR_LEN: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub request_date: String,
    pub signature: String,
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// ISO-8601 with second precision and an explicit offset, e.g. `2024-05-01T13:45:10+02:00`.
pub fn format_request_date(now: &DateTime<FixedOffset>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

pub fn operation_key(secret: &[u8], method: &str, uri: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(method.as_bytes());
    mac.update(uri.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Stage two of the chain. Identical for every request date within the same clock hour.
pub fn date_key(operation_key: &[u8], request_date: &str) -> Vec<u8> {
    let hour = request_date.get(..DATE_HOUR_LEN).unwrap_or(request_date);
    hmac_sha256(operation_key, hour.as_bytes())
}

/// `body` must be the exact bytes that go on the wire.
pub fn sign(
    secret: &[u8],
    method: &str,
    uri: &str,
    body: Option<&[u8]>,
    now: &DateTime<FixedOffset>,
) -> Signature {
    let request_date = format_request_date(now);
    let op_key = operation_key(secret, method, uri);
    let date_key = date_key(&op_key, &request_date);
    let digest = hmac_sha256(&date_key, body.unwrap_or_default());

    tracing::debug!("Signed {} {} for request date {}", method, uri, request_date);

    Signature {
        request_date,
        signature: BASE64.encode(digest),
    }
}
