use chrono::{TimeZone, Utc};
use getrandom::fill;

pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

pub fn ts_to_rfc3339(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .unwrap_or_default()
        .to_rfc3339()
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    fill(&mut out).expect("Failed to generate random bytes");
    out
}

pub fn hex_encode(bytes: &[u8]) -> String {
    const LUT: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(LUT[(b >> 4) as usize] as char);
        out.push(LUT[(b & 0x0f) as usize] as char);
    }
    out
}

pub fn generate_session_token() -> String {
    // 256-bit token, hex-encoded.
    hex_encode(&random_bytes(32))
}

pub fn uuid_v4() -> String {
    // Format: 8-4-4-4-12 hex characters.
    let mut b = random_bytes(16);

    // Set version = 4.
    b[6] = (b[6] & 0x0f) | 0x40;
    // Set variant = RFC4122.
    b[8] = (b[8] & 0x3f) | 0x80;

    const LUT: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(36);

    for (i, byte) in b.iter().enumerate() {
        if i == 4 || i == 6 || i == 8 || i == 10 {
            out.push('-');
        }
        out.push(LUT[(byte >> 4) as usize] as char);
        out.push(LUT[(byte & 0x0f) as usize] as char);
    }

    out
}

/// Email check tokens are random UUIDs.
pub fn generate_email_check_token() -> String {
    uuid_v4()
}

/// Encode a study path for use inside a redirect URL.
pub fn encode_path(path: &str) -> String {
    url::form_urlencoded::byte_serialize(path.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_has_version_and_dashes() {
        let id = uuid_v4();
        assert_eq!(id.len(), 36);
        assert_eq!(&id[14..15], "4");
        assert_eq!(id.matches('-').count(), 4);
    }

    #[test]
    fn session_tokens_are_unique_hex() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn encodes_non_ascii_paths() {
        assert_eq!(encode_path("rust-study"), "rust-study");
        assert_eq!(encode_path("스터디"), "%EC%8A%A4%ED%84%B0%EB%94%94");
    }

    #[test]
    fn formats_timestamps() {
        assert_eq!(ts_to_rfc3339(0), "1970-01-01T00:00:00+00:00");
    }
}
