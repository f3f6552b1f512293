//! Remove the markdown fence some models wrap around generated code.

const FENCE: &str = "```";

/// Strip a single outer fenced block from `text`.
///
/// The trimmed text must start and end with a triple backtick. When the block
/// spans several lines the whole opening line goes with the fence; inner
/// fences are left alone. Text that is not fully bounded by a fence comes back
/// unchanged, so applying this twice to unfenced text is a no-op.
#[must_use]
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() < 2 * FENCE.len() || !trimmed.starts_with(FENCE) || !trimmed.ends_with(FENCE)
    {
        return text.to_string();
    }

    let inner = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
    // The opening line holds the language tag, if any.
    let body = inner.split_once('\n').map_or(inner, |(_tag, rest)| rest);
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("```js\ncode\n```", "code")]
    #[case("```\nprint('hi')\n```", "print('hi')")]
    #[case("  ```python\ndef f():\n    return 1\n```  \n", "def f():\n    return 1")]
    #[case("```x = 1```", "x = 1")]
    #[case("```rust\nlet a = 1;\n```\n", "let a = 1;")]
    fn strips_outer_fence(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fence(input), expected);
    }

    #[rstest]
    #[case("plain code")]
    #[case("const a = 1;\n```js\ninner\n```")]
    #[case("```js\nunterminated")]
    #[case("")]
    fn passes_unfenced_text_through(#[case] input: &str) {
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn strips_only_one_layer() {
        let nested = "```md\n```js\ncode\n```\n```";
        assert_eq!(strip_code_fence(nested), "```js\ncode\n```");
    }

    #[rstest]
    #[case("plain code")]
    #[case("a\n```\nb\n```\nc")]
    #[case("```js\ncode\n```")]
    fn idempotent_once_unfenced(#[case] input: &str) {
        let once = strip_code_fence(input);
        assert_eq!(strip_code_fence(&once), once);
    }
}
