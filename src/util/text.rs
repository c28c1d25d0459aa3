//! Text normalization for feed-supplied HTML fragments.

/// Ellipsis marker used for truncation
const ELLIPSIS: &str = "...";
/// Characters consumed by the ellipsis marker
const ELLIPSIS_LEN: usize = 3;

/// The five named entities feeds use in practice, plus `&nbsp;`.
///
/// `&nbsp;` maps to a regular space so the whitespace-collapse pass
/// can fold it together with adjacent spacing.
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
];

/// Strips an HTML fragment down to plain text.
///
/// Removes all tags, decodes the common named entities, collapses every
/// run of whitespace (including newlines) to a single space, and trims.
/// Applied to titles and summary-like fields before storage.
///
/// Idempotent for fragments without nested entities: the output contains
/// no tags, and the only decodable sequences left are ones the input
/// itself smuggled in (e.g. `&amp;lt;` decodes to `&lt;`, which a second
/// pass would decode again).
///
/// # Examples
///
/// ```
/// use newswire::util::strip_html;
///
/// assert_eq!(strip_html("<p>Hello <strong>World</strong></p>"), "Hello World");
/// assert_eq!(strip_html("Tom &amp; Jerry"), "Tom & Jerry");
/// assert_eq!(strip_html("  spaced \n\n out  "), "spaced out");
/// ```
pub fn strip_html(input: &str) -> String {
    let without_tags = remove_tags(input);
    let decoded = decode_entities(&without_tags);
    collapse_whitespace(&decoded)
}

/// Drops everything between `<` and the next `>`, inclusive.
///
/// An unclosed `<` swallows the rest of the string, matching how a
/// fragment cut off mid-tag should render: as nothing.
fn remove_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(input: &str) -> String {
    // Fast path: no ampersand means no entities
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let mut matched = false;
        for (entity, replacement) in ENTITIES {
            if let Some(tail) = rest.strip_prefix(entity) {
                out.push_str(replacement);
                rest = tail;
                matched = true;
                break;
            }
        }
        if !matched {
            // Unrecognized entity or bare ampersand stays literal
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for word in input.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Truncates a string to at most `max` characters.
///
/// Returns the string unchanged when it already fits. Otherwise the
/// result is exactly `max` characters where the final three are the
/// ellipsis marker. Counts `char`s, not bytes, so multi-byte input
/// never splits a codepoint.
///
/// # Examples
///
/// ```
/// use newswire::util::truncate;
///
/// assert_eq!(truncate("short", 10), "short");
/// assert_eq!(truncate("Hello World", 8), "Hello...");
/// assert_eq!(truncate("Hello World", 8).chars().count(), 8);
/// ```
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    // Too narrow for a marker: return as many characters as fit
    if max <= ELLIPSIS_LEN {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - ELLIPSIS_LEN).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_removes_tags() {
        assert_eq!(strip_html("<p>Hello <strong>World</strong></p>"), "Hello World");
        assert_eq!(strip_html("<div><a href=\"x\">link</a></div>"), "link");
    }

    #[test]
    fn test_strip_decodes_entities() {
        assert_eq!(strip_html("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(strip_html("&lt;script&gt;"), "<script>");
        assert_eq!(strip_html("&quot;quoted&quot;"), "\"quoted\"");
        assert_eq!(strip_html("it&#39;s"), "it's");
        assert_eq!(strip_html("a&nbsp;b"), "a b");
    }

    #[test]
    fn test_strip_keeps_unknown_entities_literal() {
        assert_eq!(strip_html("caf&eacute;"), "caf&eacute;");
        assert_eq!(strip_html("AT&T"), "AT&T");
    }

    #[test]
    fn test_strip_collapses_whitespace() {
        assert_eq!(strip_html("  hello \n\n  world \t "), "hello world");
        assert_eq!(strip_html("<p>a</p>\n<p>b</p>"), "a b");
    }

    #[test]
    fn test_strip_empty_and_tag_only_input() {
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html("<br/><hr>"), "");
    }

    #[test]
    fn test_strip_unclosed_tag_swallows_rest() {
        assert_eq!(strip_html("before <a href=trunca"), "before");
    }

    #[test]
    fn test_strip_is_idempotent_on_typical_fragments() {
        let fragments = [
            "<p>Hello <strong>World</strong></p>",
            "Tom &amp; Jerry",
            "plain text",
            "  spaced \n out  ",
            "it&#39;s &quot;fine&quot;",
        ];
        for fragment in fragments {
            let once = strip_html(fragment);
            assert_eq!(strip_html(&once), once, "not idempotent on {fragment:?}");
        }
    }

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exact", 5), "exact");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn test_truncate_long_string_ends_with_marker() {
        let result = truncate("Hello World", 8);
        assert_eq!(result, "Hello...");
        assert_eq!(result.chars().count(), 8);
    }

    #[test]
    fn test_truncate_narrow_limits() {
        assert_eq!(truncate("Testing", 3), "Tes");
        assert_eq!(truncate("Testing", 0), "");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // Each CJK char is 3 bytes but 1 char
        let result = truncate("日本語のテキストです", 7);
        assert_eq!(result.chars().count(), 7);
        assert!(result.ends_with("..."));
    }

    proptest! {
        #[test]
        fn prop_truncate_never_exceeds_max(s in ".*", max in 0usize..300) {
            prop_assert!(truncate(&s, max).chars().count() <= max);
        }

        #[test]
        fn prop_truncate_identity_when_fits(s in ".{0,50}") {
            let len = s.chars().count();
            prop_assert_eq!(truncate(&s, len), s);
        }

        #[test]
        fn prop_strip_collapses_all_whitespace(s in ".*") {
            let stripped = strip_html(&s);
            prop_assert!(!stripped.contains("  "));
            prop_assert!(!stripped.contains('\n'));
            prop_assert_eq!(stripped.trim().to_string(), stripped.clone());
        }
    }
}
