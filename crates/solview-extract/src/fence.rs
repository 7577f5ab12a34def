//! Fence detection shared by the extractors.
//!
//! A fence opens with three backticks, optionally followed immediately by a
//! language tag, and closes at the next three backticks. An opening fence
//! without a closing one runs to the end of the input.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Fence delimiter sequence.
pub const FENCE: &str = "```";

static CLOSED_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([\w+#.\-]+)?[ \t]*\r?\n?(.*?)```").expect("invalid fence regex")
});

static OPEN_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([\w+#.\-]+)?[ \t]*\r?\n?(.*)\z").expect("invalid open fence regex")
});

/// A fenced block found in free text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Fence<'a> {
    /// Language tag on the opening line, if any.
    pub(crate) tag: Option<&'a str>,
    /// Interior text, untrimmed.
    pub(crate) body: &'a str,
    /// Whether a closing delimiter was found.
    pub(crate) closed: bool,
}

/// Find the first fenced block in `input`.
pub(crate) fn find_first(input: &str) -> Option<Fence<'_>> {
    if let Some(caps) = CLOSED_FENCE.captures(input) {
        return Some(from_captures(&caps, true));
    }
    OPEN_FENCE
        .captures(input)
        .map(|caps| from_captures(&caps, false))
}

/// Build a [`Fence`] from a tag group (1) and body group (2).
pub(crate) fn from_captures<'a>(caps: &Captures<'a>, closed: bool) -> Fence<'a> {
    Fence {
        tag: caps.get(1).map(|m| m.as_str()),
        body: caps.get(2).map_or("", |m| m.as_str()),
        closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tagged_fence() {
        let fence = find_first("```rust\nfn main() {}\n```").unwrap();
        assert_eq!(fence.tag, Some("rust"));
        assert_eq!(fence.body, "fn main() {}\n");
        assert!(fence.closed);
    }

    #[test]
    fn test_untagged_fence() {
        let fence = find_first("```\nx = 1\n```").unwrap();
        assert_eq!(fence.tag, None);
        assert_eq!(fence.body, "x = 1\n");
    }

    #[test]
    fn test_tag_with_symbols() {
        assert_eq!(find_first("```c++\nint x;\n```").unwrap().tag, Some("c++"));
        assert_eq!(find_first("```c#\nvar x;\n```").unwrap().tag, Some("c#"));
        assert_eq!(
            find_first("```objective-c\n@end\n```").unwrap().tag,
            Some("objective-c")
        );
    }

    #[test]
    fn test_surrounding_prose_is_ignored() {
        let fence = find_first("Here is code:\n```go\nfmt.Println()\n```\nDone.").unwrap();
        assert_eq!(fence.tag, Some("go"));
        assert_eq!(fence.body, "fmt.Println()\n");
    }

    #[test]
    fn test_first_fence_wins() {
        let fence = find_first("```a\none\n```\n```b\ntwo\n```").unwrap();
        assert_eq!(fence.tag, Some("a"));
        assert_eq!(fence.body, "one\n");
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let fence = find_first("```python\nprint(1)\n").unwrap();
        assert_eq!(fence.tag, Some("python"));
        assert_eq!(fence.body, "print(1)\n");
        assert!(!fence.closed);
    }

    #[test]
    fn test_crlf_opening_line() {
        let fence = find_first("```js\r\nlet a;\r\n```").unwrap();
        assert_eq!(fence.tag, Some("js"));
        assert_eq!(fence.body, "let a;\r\n");
    }

    #[test]
    fn test_no_fence() {
        assert_eq!(find_first("plain text"), None);
        assert_eq!(find_first("``not a fence``"), None);
    }
}
