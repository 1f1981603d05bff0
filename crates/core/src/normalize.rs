//! Markdown post-processing.
//!
//! The serializer emits generous blank-line padding around blocks; this
//! module collapses the redundancy and fixes over-escaped punctuation. The
//! passes run in a fixed order because later passes rely on earlier
//! collapsing. The whole transformation is idempotent:
//! `normalize_markdown(normalize_markdown(x)) == normalize_markdown(x)`.

use regex::Regex;

/// Normalizes serialized Markdown.
///
/// Passes, in order:
/// 1. Collapse 3 or more consecutive newlines to exactly 2.
/// 2. Remove blank-line padding before a fence marker.
/// 3. Remove blank-line padding after a fence-opening line.
/// 4. Remove blank-line padding before a list item marker.
/// 5. Remove blank-line padding between consecutive list items.
/// 6. Un-escape literal `\` + backtick, hash, and hyphen sequences.
pub fn normalize_markdown(markdown: &str) -> String {
    let mut result = collapse_blank_runs(markdown);
    result = tighten_before_fences(&result);
    result = tighten_after_fence_open(&result);
    result = tighten_before_list_items(&result);
    result = tighten_between_list_items(&result);
    unescape_literals(&result)
}

fn collapse_blank_runs(markdown: &str) -> String {
    let re = Regex::new(r"\n{3,}").unwrap();
    re.replace_all(markdown, "\n\n").to_string()
}

fn tighten_before_fences(markdown: &str) -> String {
    let re = Regex::new(r"\n{2,}```").unwrap();
    re.replace_all(markdown, "\n```").to_string()
}

fn tighten_after_fence_open(markdown: &str) -> String {
    let re = Regex::new(r"(?m)^(```[^\n]*)\n{2,}").unwrap();
    re.replace_all(markdown, "$1\n").to_string()
}

fn tighten_before_list_items(markdown: &str) -> String {
    let re = Regex::new(r"\n{2,}([-*] )").unwrap();
    re.replace_all(markdown, "\n$1").to_string()
}

/// Collapses blank runs separating consecutive list items.
///
/// Replacement can expose new adjacent pairs, so this runs to a fixpoint
/// with a bounded pass count.
fn tighten_between_list_items(markdown: &str) -> String {
    let re = Regex::new(r"([-*] [^\n]*)\n{2,}([-*] )").unwrap();

    let mut result = markdown.to_string();
    let mut passes = 0;
    loop {
        let next = re.replace_all(&result, "$1\n$2").to_string();
        if next == result || passes >= 10 {
            break;
        }
        result = next;
        passes += 1;
    }

    result
}

fn unescape_literals(markdown: &str) -> String {
    markdown.replace("\\`", "`").replace("\\#", "#").replace("\\-", "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_collapse_blank_runs() {
        let input = "para one\n\n\n\n\npara two";
        assert_eq!(normalize_markdown(input), "para one\n\npara two");
    }

    #[test]
    fn test_fence_padding_before_opening() {
        let input = "text\n\n\n```rust\ncode\n```";
        assert_eq!(normalize_markdown(input), "text\n```rust\ncode\n```");
    }

    #[test]
    fn test_fence_padding_after_opening() {
        let input = "```rust\n\n\nlet x = 1;\n```";
        assert_eq!(normalize_markdown(input), "```rust\nlet x = 1;\n```");
    }

    #[test]
    fn test_list_padding_before_first_item() {
        let input = "intro\n\n- first\n- second";
        assert_eq!(normalize_markdown(input), "intro\n- first\n- second");
    }

    #[test]
    fn test_list_padding_between_items() {
        let input = "- one\n\n- two\n\n- three";
        assert_eq!(normalize_markdown(input), "- one\n- two\n- three");
    }

    #[test]
    fn test_star_markers_also_tightened() {
        let input = "* one\n\n* two";
        assert_eq!(normalize_markdown(input), "* one\n* two");
    }

    #[test]
    fn test_unescape_literals() {
        let input = r"a \` b \# c \- d";
        assert_eq!(normalize_markdown(input), "a ` b # c - d");
    }

    #[test]
    fn test_paragraph_spacing_is_preserved() {
        let input = "para one\n\npara two";
        assert_eq!(normalize_markdown(input), "para one\n\npara two");
    }

    #[rstest]
    #[case("plain text")]
    #[case("a\n\n\n\nb\n\n\nc")]
    #[case("intro\n\n\n- x\n\n- y\n\nend")]
    #[case("before\n\n\n```py\n\n\nprint()\n```\n\nafter")]
    #[case(r"escaped \` \# \- mix")]
    #[case("# Title\n\nBody with *emphasis* and `code`.")]
    fn test_normalize_is_idempotent(#[case] input: &str) {
        let once = normalize_markdown(input);
        let twice = normalize_markdown(&once);
        assert_eq!(once, twice);
    }
}
