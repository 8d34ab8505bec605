//! Code-fence normalization for generated documents
//!
//! Models return documents wrapped in markdown fences more often than not.
//! Every code-bearing response is normalized through [`strip_code_fences`]
//! before it is stored, so `Version.code` and `Project.current_code` never
//! carry fence markers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading fence with an optional language tag, e.g. ```` ```html ````.
static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("valid regex"));

/// Trailing fence, optionally preceded by a newline.
static CLOSING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?```[ \t]*$").expect("valid regex"));

/// Strip code-fence wrapping and surrounding whitespace from raw model
/// output.
///
/// Runs to a fixpoint so the operation is idempotent: stripping
/// already-stripped text returns it unchanged, and doubly-wrapped output
/// (which some models produce) is fully unwrapped.
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim().to_string();
    loop {
        let stripped = CLOSING_FENCE
            .replace(&OPENING_FENCE.replace(&text, ""), "")
            .trim()
            .to_string();
        if stripped == text {
            return text;
        }
        text = stripped;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_fence_with_language_tag() {
        assert_eq!(strip_code_fences("```html\n<p>hi</p>\n```"), "<p>hi</p>");
    }

    #[test]
    fn test_strips_fence_without_language_tag() {
        assert_eq!(strip_code_fences("```\n<p>hi</p>\n```"), "<p>hi</p>");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(strip_code_fences("<p>hi</p>"), "<p>hi</p>");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(strip_code_fences("  \n```html\n<p>hi</p>\n```\n  "), "<p>hi</p>");
    }

    #[test]
    fn test_unclosed_leading_fence_is_still_stripped() {
        assert_eq!(strip_code_fences("```html\n<p>hi</p>"), "<p>hi</p>");
    }

    #[test]
    fn test_doubly_wrapped_output_is_fully_unwrapped() {
        assert_eq!(
            strip_code_fences("```\n```html\n<p>hi</p>\n```\n```"),
            "<p>hi</p>"
        );
    }

    #[test]
    fn test_bare_fence_normalizes_to_empty() {
        assert_eq!(strip_code_fences("```"), "");
        assert_eq!(strip_code_fences("```html\n```"), "");
        assert_eq!(strip_code_fences("   "), "");
    }

    #[test]
    fn test_inner_fences_survive() {
        // A fence in the middle of a document is content, not wrapping.
        let doc = "<pre>```js\nlet x = 1;\n```</pre>";
        assert_eq!(strip_code_fences(doc), doc);
    }

    proptest! {
        #[test]
        fn prop_stripping_is_idempotent(raw in ".{0,200}") {
            let once = strip_code_fences(&raw);
            let twice = strip_code_fences(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_result_is_trimmed(raw in ".{0,200}") {
            let stripped = strip_code_fences(&raw);
            prop_assert_eq!(stripped.trim(), stripped.as_str());
        }
    }
}
