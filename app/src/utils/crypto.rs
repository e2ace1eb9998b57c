use nanoid::nanoid;
use rand::RngCore;

const SLUG_SUFFIX_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub fn generate_uuid() -> String {
    nanoid!()
}

/// Opaque invitation token: 32 random bytes, hex encoded (64 chars).
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// URL-safe slug derived from a display name, with a short random suffix
/// to keep the unique index happy across same-named organizations.
pub fn slugify(name: &str) -> String {
    let base: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let base = base.trim_matches('-');

    let mut slug = String::new();
    let mut prev_dash = false;
    for c in base.chars() {
        if c == '-' {
            if !prev_dash {
                slug.push('-');
            }
            prev_dash = true;
        } else {
            slug.push(c);
            prev_dash = false;
        }
    }

    let suffix = nanoid!(6, &SLUG_SUFFIX_ALPHABET);
    if slug.is_empty() {
        format!("org-{}", suffix)
    } else {
        format!("{}-{}", slug, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_token_is_64_hex_chars() {
        let token = generate_invite_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn invite_tokens_do_not_repeat() {
        assert_ne!(generate_invite_token(), generate_invite_token());
    }

    #[test]
    fn slugify_flattens_punctuation_and_case() {
        let slug = slugify("Acme, Inc.  (EU)");
        assert!(slug.starts_with("acme-inc-eu-"));
        assert!(!slug.contains("--"));
    }

    #[test]
    fn slugify_handles_fully_symbolic_names() {
        let slug = slugify("***");
        assert!(slug.starts_with("org-"));
    }
}
