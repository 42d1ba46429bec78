use sha2::{Digest, Sha256};

/// URL slug derived from a keyword: lower-cased, whitespace runs become `-`,
/// everything outside `[a-z0-9-]` is dropped.
///
/// Keywords with no ASCII alphanumerics (e.g. Thai) would produce an empty or
/// hyphen-only slug; those get `article-{short_hash(keyword)}` instead.
pub fn derive_slug(keyword: &str) -> String {
    let lowered = keyword.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    if slug.chars().any(|c| c.is_ascii_alphanumeric()) {
        slug
    } else {
        format!("article-{}", short_hash(keyword))
    }
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::derive_slug;

    #[test]
    fn spaces_become_hyphens_and_symbols_drop() {
        assert_eq!(derive_slug("Best SEO  Tips 2024!"), "best-seo-tips-2024");
    }

    #[test]
    fn plain_keyword_is_unchanged() {
        assert_eq!(derive_slug("widgets"), "widgets");
    }

    #[test]
    fn non_ascii_keyword_gets_stable_hash_slug() {
        let slug = derive_slug("การตลาด ออนไลน์");
        assert!(slug.starts_with("article-"));
        assert_eq!(slug.len(), "article-".len() + 8);
        assert_eq!(slug, derive_slug("การตลาด ออนไลน์"));
    }

    #[test]
    fn empty_keyword_still_yields_slug() {
        assert!(!derive_slug("").is_empty());
    }
}
