use rand::Rng;

pub fn random_id() -> String {
    hex::encode(rand::rng().random::<[u8; 8]>())
}

/// Prefixes a TURN URL with `turn:` unless it already names a scheme.
pub fn add_ice_url_scheme(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("turn:") || url.starts_with("turns:") || url.starts_with("stun:") {
        url.to_string()
    } else {
        format!("turn:{}", url)
    }
}

/// Session codes are typed by people; compare them case-insensitively.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
