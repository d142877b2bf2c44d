//! Credential checks and input sanitizers.
//!
//! The checks guard every outbound call: a failure here short-circuits before
//! the relay is touched. The sanitizers normalize raw form input before it is
//! stored or used.

use email_address::EmailAddress;

use crate::address::Address;
use crate::settings::Settings;

/// Minimum length of anything that could be an address (`a@b.cd`).
const MIN_EMAIL_LEN: usize = 6;

/// Characters allowed in the local part, besides ASCII alphanumerics.
const LOCAL_PART_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~.-";

/// True iff `api_key`, `from_email` and `sender_name` are all non-empty.
pub fn is_complete(settings: &Settings) -> bool {
    !settings.api_key.is_empty()
        && !settings.from_email.is_empty()
        && !settings.sender_name.is_empty()
}

/// Syntactic address check.
///
/// Requires an RFC 5322 address with a non-empty local part and a domain made
/// of at least two dot-separated labels.
///
/// ```
/// use resend_relay::validate::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(!is_valid_email("user@localhost"));
/// assert!(!is_valid_email("user.example.com"));
/// ```
pub fn is_valid_email(address: &str) -> bool {
    // Bare addresses only, no display text.
    if address.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
        return false;
    }
    if !EmailAddress::is_valid(address) {
        return false;
    }
    match Address::split(address) {
        Some((local, domain)) => !local.is_empty() && has_domain_segments(domain),
        None => false,
    }
}

fn has_domain_segments(domain: &str) -> bool {
    let mut labels = 0;
    for label in domain.split('.') {
        if label.is_empty() {
            return false;
        }
        labels += 1;
    }
    labels >= 2
}

/// Normalize a plain-text form field.
///
/// Drops `<script>` and `<style>` elements with their contents, strips the
/// remaining markup tags and percent-encoded octets, collapses runs of spaces,
/// tabs and line breaks into one space, and trims. A `<` that does not open a
/// tag is kept as `&lt;`.
///
/// ```
/// use resend_relay::validate::sanitize_text;
///
/// assert_eq!(sanitize_text("  Acme\n\t<b>Support</b> "), "Acme Support");
/// ```
pub fn sanitize_text(input: &str) -> String {
    let stripped = strip_tags(&strip_script_and_style(input));
    let stripped = strip_percent_octets(&stripped);
    collapse_whitespace(&stripped)
}

/// Canonicalize an email address, returning an empty string when nothing
/// usable remains.
///
/// Disallowed local-part characters are removed, an internationalized domain
/// is converted to ASCII, runs of periods are dropped, and each domain label
/// loses invalid characters and surrounding hyphens. The result is not
/// guaranteed to pass [`is_valid_email`].
///
/// ```
/// use resend_relay::validate::sanitize_email;
///
/// assert_eq!(sanitize_email(" jo(h)n@exa_mple.com "), "john@example.com");
/// assert_eq!(sanitize_email("nope"), "");
/// ```
pub fn sanitize_email(input: &str) -> String {
    let email = input.trim();
    if email.len() < MIN_EMAIL_LEN {
        return String::new();
    }

    // The `@` must not be the first character.
    let at = match email.find('@') {
        Some(at) if at > 0 => at,
        _ => return String::new(),
    };
    let (local, domain) = (&email[..at], &email[at + 1..]);

    let local: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SPECIALS.contains(*c))
        .collect();
    if local.is_empty() {
        return String::new();
    }

    let domain = if domain.is_ascii() {
        domain.to_string()
    } else {
        idna::domain_to_ascii(domain).unwrap_or_else(|_| domain.to_string())
    };
    let domain = remove_period_runs(&domain);
    let domain = domain.trim_matches(|c: char| c.is_whitespace() || c == '\0' || c == '.');
    if domain.is_empty() {
        return String::new();
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return String::new();
    }

    let labels: Vec<String> = labels
        .into_iter()
        .map(|label| {
            label
                .trim_matches(|c: char| c.is_whitespace() || c == '\0' || c == '-')
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|label| !label.is_empty())
        .collect();
    if labels.len() < 2 {
        return String::new();
    }

    format!("{}@{}", local, labels.join("."))
}

/// Remove every run of two or more periods.
fn remove_period_runs(domain: &str) -> String {
    let mut out = String::with_capacity(domain.len());
    let mut chars = domain.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '.' && chars.peek() == Some(&'.') {
            while chars.peek() == Some(&'.') {
                chars.next();
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Remove `<script ...>...</script>` and `<style ...>...</style>` blocks,
/// matching tag names case-insensitively. An element without a closing tag is
/// left for [`strip_tags`].
fn strip_script_and_style(input: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `input`.
    let lower = input.to_ascii_lowercase();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some((start, name)) = next_raw_text_element(&lower, pos) {
        let Some(open_end) = lower[start..].find('>') else {
            break;
        };
        let close = format!("</{}>", name);
        let body_start = start + open_end + 1;
        let Some(close_at) = lower[body_start..].find(&close) else {
            break;
        };
        out.push_str(&input[pos..start]);
        pos = body_start + close_at + close.len();
    }

    out.push_str(&input[pos..]);
    out
}

fn next_raw_text_element(lower: &str, from: usize) -> Option<(usize, &'static str)> {
    ["script", "style"]
        .into_iter()
        .filter_map(|name| {
            lower[from..]
                .find(&format!("<{}", name))
                .map(|at| (from + at, name))
        })
        .min_by_key(|(at, _)| *at)
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let opens_tag = tail[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));

        if opens_tag {
            // An unterminated tag swallows the rest of the input.
            rest = match tail.find('>') {
                Some(end) => &tail[end + 1..],
                None => "",
            };
        } else {
            out.push_str("&lt;");
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

fn strip_percent_octets(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let bytes = current.as_bytes();
        let mut out = String::with_capacity(current.len());
        let mut last = 0;
        let mut i = 0;
        let mut removed = false;

        while i < bytes.len() {
            if bytes[i] == b'%'
                && i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit()
            {
                out.push_str(&current[last..i]);
                i += 3;
                last = i;
                removed = true;
            } else {
                i += 1;
            }
        }
        out.push_str(&current[last..]);

        // Removing one octet can splice together another.
        if !removed {
            return out;
        }
        current = out;
    }
}

fn collapse_whitespace(input: &str) -> String {
    input
        .split(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
