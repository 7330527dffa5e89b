//! Referral detection in WHOIS responses.
//!
//! Registry responses frequently delegate to a registrar-level server, either
//! with an RIR-style `ReferralServer: whois://host` line or a
//! `Whois Server: host` field. The response is otherwise opaque text; this is
//! the only parsing done on it.

/// Keys scanned for, in priority order. `referralserver:` anywhere in the
/// text wins over `whois server:` (two sequential passes, never interleaved).
const REFERRAL_KEYS: &[&str] = &["referralserver:", "whois server:"];

/// Extract the next server to query from a WHOIS response, if any.
///
/// Within a pass the first line with a non-empty value wins; lines with an
/// empty value are treated as no match. The value is trimmed and a
/// `whois://` scheme prefix is dropped. Case of the returned target is
/// preserved (the self-referral check upstream is case-sensitive).
pub fn find_referral(response: &str) -> Option<String> {
    for key in REFERRAL_KEYS {
        if let Some(target) = scan_for_key(response, key) {
            return Some(target);
        }
    }
    None
}

fn scan_for_key(response: &str, key: &str) -> Option<String> {
    for line in response.lines() {
        let lower = line.to_ascii_lowercase();
        if let Some(pos) = lower.find(key) {
            let value = strip_scheme(line[pos + key.len()..].trim());
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

fn strip_scheme(value: &str) -> &str {
    match value.get(..8) {
        Some(prefix) if prefix.eq_ignore_ascii_case("whois://") => &value[8..],
        _ => value,
    }
}
