use tracing::info;

/// Characters the LANraragi search syntax reserves; they never survive into a tag.
const RESERVED: [char; 6] = ['"', '?', '*', '%', '$', ':'];

/// Rewrites `text` so it can be stored as a plain LANraragi tag.
///
/// Reserved characters are dropped, underscores become spaces and a hyphen
/// that directly follows a space (the exclusion operator) is removed. A
/// hyphen anywhere else is kept.
pub fn sanitize_tag(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !RESERVED.contains(c))
        .map(|c| if c == '_' { ' ' } else { c })
        .collect();

    // A whole run of hyphens after a space goes, so " --x" becomes " x".
    let mut sanitized = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        if c == '-' && sanitized.ends_with(' ') {
            continue;
        }
        sanitized.push(c);
    }

    if sanitized != text {
        info!("\"{}\" was sanitized.", text);
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reserved_characters_removed() {
        assert_eq!(sanitize_tag("a\"b?c*d%e$f:g"), "abcdefg");
        assert_eq!(sanitize_tag("\"?*%$:"), "");
    }

    #[test]
    fn test_underscore_and_hyphen_rules() {
        assert_eq!(sanitize_tag("foo_bar -baz"), "foo bar baz");
        assert_eq!(sanitize_tag("foo-bar"), "foo-bar");
        assert_eq!(sanitize_tag("-leading"), "-leading");
        assert_eq!(sanitize_tag("_-x"), " x");
    }

    #[test]
    fn test_empty_and_clean_input_unchanged() {
        assert_eq!(sanitize_tag(""), "");
        assert_eq!(sanitize_tag("scenery"), "scenery");
        assert_eq!(sanitize_tag("オリジナル"), "オリジナル");
    }

    #[test]
    fn test_idempotent_samples() {
        let samples = [
            "foo_bar -baz",
            "a - -b",
            "x --y",
            "_-_-z",
            "re:zero -starting_life-",
            "50% off?",
            " -",
            "plain",
        ];
        for sample in samples {
            let once = sanitize_tag(sample);
            assert_eq!(sanitize_tag(&once), once, "not idempotent for {sample:?}");
        }
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(text in "[ a-zA-Z0-9_\\-:\"?*%$]{0,32}") {
            let once = sanitize_tag(&text);
            prop_assert_eq!(sanitize_tag(&once), once.clone());
            prop_assert!(!once.contains(" -"), "negation left in {:?}", once);
            prop_assert!(!once.chars().any(|c| RESERVED.contains(&c) || c == '_'));
        }
    }
}
