//! Query-string signing (AWS Signature Version 4) for S3.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Credentials used to derive the signing key.
pub(super) struct Credentials<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: Option<&'a str>,
    pub region: &'a str,
}

/// A request to be authorised through its query string.
pub(super) struct QueryRequest<'a> {
    pub method: &'a str,
    pub host: &'a str,
    /// Already URI-encoded path, starting with `/`.
    pub canonical_path: &'a str,
    pub expires_in_secs: u64,
    pub signed_at: DateTime<Utc>,
}

/// Percent-encode per the SigV4 rules. Slashes survive only in paths.
pub(super) fn uri_encode(input: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            b'/' if keep_slash => out.push('/'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn hmac(key: &[u8], data: &str) -> Result<Vec<u8>, String> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|err| err.to_string())?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_key(secret: &str, date: &str, region: &str) -> Result<Vec<u8>, String> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date)?;
    let k_region = hmac(&k_date, region)?;
    let k_service = hmac(&k_region, SERVICE)?;
    hmac(&k_service, "aws4_request")
}

/// Build the signed query string (without a leading `?`).
pub(super) fn presign_query(
    credentials: &Credentials<'_>,
    request: &QueryRequest<'_>,
) -> Result<String, String> {
    let amz_date = request.signed_at.format("%Y%m%dT%H%M%SZ").to_string();
    let date = request.signed_at.format("%Y%m%d").to_string();
    let scope = format!("{date}/{}/{SERVICE}/aws4_request", credentials.region);

    let mut params = vec![
        ("X-Amz-Algorithm".to_owned(), ALGORITHM.to_owned()),
        (
            "X-Amz-Credential".to_owned(),
            format!("{}/{scope}", credentials.access_key_id),
        ),
        ("X-Amz-Date".to_owned(), amz_date.clone()),
        (
            "X-Amz-Expires".to_owned(),
            request.expires_in_secs.to_string(),
        ),
        ("X-Amz-SignedHeaders".to_owned(), "host".to_owned()),
    ];
    if let Some(token) = credentials.session_token {
        params.push(("X-Amz-Security-Token".to_owned(), token.to_owned()));
    }
    params.sort();

    let canonical_query = params
        .iter()
        .map(|(name, value)| format!("{}={}", uri_encode(name, false), uri_encode(value, false)))
        .collect::<Vec<_>>()
        .join("&");

    let canonical_request = format!(
        "{method}\n{path}\n{canonical_query}\nhost:{host}\n\nhost\n{UNSIGNED_PAYLOAD}",
        method = request.method,
        path = request.canonical_path,
        host = request.host,
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );
    let key = signing_key(credentials.secret_access_key, &date, credentials.region)?;
    let signature = hex::encode(hmac(&key, &string_to_sign)?);

    Ok(format!("{canonical_query}&X-Amz-Signature={signature}"))
}
