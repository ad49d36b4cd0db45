//! Magnet URI helpers.

use url::Url;

const BTIH_PREFIX: &str = "urn:btih:";

/// Whether `value` looks like a v1 info hash (40 hex or 32 base32 characters).
#[must_use]
pub fn is_info_hash(value: &str) -> bool {
    match value.len() {
        40 => value.chars().all(|ch| ch.is_ascii_hexdigit()),
        32 => value
            .chars()
            .all(|ch| ch.is_ascii_alphabetic() || ('2'..='7').contains(&ch)),
        _ => false,
    }
}

/// Bare magnet URI for `info_hash`.
#[must_use]
pub fn encode(info_hash: &str) -> String {
    format!("magnet:?xt={BTIH_PREFIX}{info_hash}")
}

/// Magnet URI for `info_hash` announcing to `trackers`.
#[must_use]
pub fn encode_with_trackers(info_hash: &str, trackers: &[String]) -> String {
    trackers
        .iter()
        .fold(encode(info_hash), |mut uri, tracker| {
            uri.push_str("&tr=");
            uri.push_str(&urlencoding::encode(tracker));
            uri
        })
}

/// Extract the lowercase info hash from a magnet URI.
#[must_use]
pub fn decode(uri: &str) -> Option<String> {
    let parsed = Url::parse(uri).ok()?;
    if parsed.scheme() != "magnet" {
        return None;
    }
    parsed
        .query_pairs()
        .filter(|(key, _)| key == "xt")
        .find_map(|(_, value)| {
            let hash = value.strip_prefix(BTIH_PREFIX)?;
            is_info_hash(hash).then(|| hash.to_ascii_lowercase())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789ABCDEF0123456789abcdef01234567";

    #[test]
    fn decode_recovers_encoded_hash() {
        let uri = encode_with_trackers(HASH, &["udp://open.tracker:1337/announce".into()]);
        assert_eq!(decode(&uri), Some(HASH.to_ascii_lowercase()));
    }

    #[test]
    fn decode_ignores_other_schemes_and_topics() {
        assert_eq!(decode("https://example.com/?xt=urn:btih:abc"), None);
        assert_eq!(decode("magnet:?xt=urn:sha1:abcdef"), None);
        assert_eq!(decode("not a uri"), None);
    }

    #[test]
    fn info_hash_shapes() {
        assert!(is_info_hash(HASH));
        assert!(is_info_hash("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567"));
        assert!(!is_info_hash("xyz"));
        assert!(!is_info_hash(&"g".repeat(40)));
    }
}
