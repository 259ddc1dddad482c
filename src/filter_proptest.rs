//! Property-based tests for the marker filter and manifest rewriter.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::config::RewriteRule;
    use crate::phases::filter::filter_text;
    use crate::phases::rewrite::apply_rules;
    use proptest::prelude::*;

    const MARKER: &str = "!publish: remove";

    /// Lines that never contain the marker (no '!' at all).
    fn plain_line() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ;:{}()\"'/._-]{0,40}"
    }

    fn join(lines: &[String]) -> String {
        lines.iter().map(|l| format!("{}\n", l)).collect()
    }

    proptest! {
        /// Property: text without the marker is reported as untouched
        #[test]
        fn filter_without_marker_is_identity(lines in prop::collection::vec(plain_line(), 0..30)) {
            let text = join(&lines);
            prop_assert!(filter_text(&text, MARKER).is_none());
        }

        /// Property: a single marker removes exactly its line and the next one
        #[test]
        fn filter_removes_marker_pair(
            lines in prop::collection::vec(plain_line(), 2..30),
            at in any::<prop::sample::Index>(),
        ) {
            let index = at.index(lines.len() - 1);
            let mut input = lines.clone();
            input[index] = format!("// {}", MARKER);

            let filtered = filter_text(&join(&input), MARKER).unwrap();

            let mut expected = input.clone();
            expected.drain(index..index + 2);
            prop_assert_eq!(filtered.text, join(&expected));
            prop_assert_eq!(filtered.lines_removed, 2);
            prop_assert!(!filtered.dangling);
        }

        /// Property: filtering marker-free output again changes nothing
        #[test]
        fn filter_is_idempotent(
            lines in prop::collection::vec(prop_oneof![
                3 => plain_line(),
                1 => Just(format!("// {}", MARKER)),
            ], 0..30),
        ) {
            let once = match filter_text(&join(&lines), MARKER) {
                Some(filtered) => filtered.text,
                None => join(&lines),
            };
            if !once.contains(MARKER) {
                prop_assert!(filter_text(&once, MARKER).is_none());
            }
        }

        /// Property: rules whose pattern is absent leave content unchanged
        #[test]
        fn rewrite_without_match_is_identity(content in "[a-z \n{}:\",]{0,200}") {
            let rules = [RewriteRule::new("file:..", "^1.0.0")];
            let (text, report) = apply_rules(&content, &rules);
            prop_assert_eq!(text, content);
            prop_assert_eq!(report.total_replacements(), 0);
        }

        /// Property: after a rule runs its pattern no longer occurs
        /// (when the replacement cannot reintroduce it)
        #[test]
        fn rewrite_replaces_every_occurrence(
            parts in prop::collection::vec("[a-z ]{0,10}", 1..10),
        ) {
            let content = parts.join("file:..");
            let rules = [RewriteRule::new("file:..", "^1.0.0")];
            let (text, report) = apply_rules(&content, &rules);
            prop_assert!(!text.contains("file:.."));
            prop_assert_eq!(report.total_replacements(), parts.len() - 1);
        }
    }
}
