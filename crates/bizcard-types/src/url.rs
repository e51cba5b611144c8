use uuid::Uuid;

/// Path segment under which public cards are served.
pub const CARD_PATH: &str = "card";

/// RFC 3986 scheme prefix: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`,
/// with the colon ahead of any `/`, `?` or `#`.
fn has_scheme(input: &str) -> bool {
    let Some(end) = input.find([':', '/', '?', '#']) else {
        return false;
    };
    let scheme = &input[..end];
    input[end..].starts_with(':')
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolve `input` against `origin`. Absolute URLs pass through unchanged;
/// anything else is treated as a path on `origin`.
pub fn normalize_url(origin: &str, input: &str) -> String {
    let input = input.trim();
    if has_scheme(input) {
        return input.to_string();
    }
    format!("{}/{}", origin.trim_end_matches('/'), input.trim_start_matches('/'))
}

/// Public share URL of a card: `<origin>/card/<id>`.
pub fn card_share_url(origin: &str, card_id: Uuid) -> String {
    normalize_url(origin, &format!("{}/{}", CARD_PATH, card_id))
}

/// Link target for a user-entered website such as `example.com`.
pub fn external_href(website: &str) -> String {
    let website = website.trim();
    if has_scheme(website) {
        website.to_string()
    } else {
        format!("https://{}", website.trim_start_matches('/'))
    }
}
