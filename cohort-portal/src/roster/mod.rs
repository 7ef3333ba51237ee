//! Free-text roster parsing for bulk intern onboarding
//!
//! Admins paste ad-hoc lists of people in whatever format their
//! spreadsheet or mail client produced. The parser accepts, per
//! newline- or comma-separated segment:
//!
//! - `Jane Smith <jane@example.com>` (name, bracketed email)
//! - `Jane Smith jane@example.com` (whitespace-separated, email last)
//! - `jane@example.com` (bare email; name derived from the local part)
//!
//! Segments that match none of these are dropped silently. No email
//! validation beyond "contains `@`" happens here; format checks and
//! duplicate detection belong to the add-interns handler.

use std::sync::LazyLock;

use regex::Regex;

/// One parsed roster candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// Display name
    pub name: String,

    /// Email address, as written (not yet normalized)
    pub email: String,
}

static BRACKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)<(.+)>$").expect("bracket pattern is valid"));

/// Parse a free-text block into roster candidates
///
/// Segments are split on newlines and commas, trimmed, and matched
/// against the rules above in order. Duplicates are preserved; the
/// caller deduplicates against existing accounts.
///
/// # Examples
///
/// ```rust
/// use cohort_portal::roster::parse_roster;
///
/// let entries = parse_roster("Jane Smith <jane@x.com>\nbob@x.com");
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].name, "Jane Smith");
/// assert_eq!(entries[1].name, "bob");
/// ```
#[must_use]
pub fn parse_roster(input: &str) -> Vec<RosterEntry> {
    input
        .split(['\n', ','])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(parse_segment)
        .collect()
}

/// Parse a single trimmed, non-empty segment
///
/// The whitespace-split rule keeps the source quirk: with two or more
/// tokens, only the last token is considered as the email, so a line
/// like `jane@x.com Smith` is dropped rather than reinterpreted.
fn parse_segment(segment: &str) -> Option<RosterEntry> {
    if let Some(captures) = BRACKET_PATTERN.captures(segment) {
        return Some(RosterEntry {
            name: captures[1].trim().to_string(),
            email: captures[2].trim().to_string(),
        });
    }

    let tokens: Vec<&str> = segment.split_whitespace().collect();
    if tokens.len() >= 2 {
        let email = tokens[tokens.len() - 1];
        if email.contains('@') {
            return Some(RosterEntry {
                name: tokens[..tokens.len() - 1].join(" "),
                email: email.to_string(),
            });
        }
        return None;
    }

    if segment.contains('@') {
        let local = segment.split('@').next().unwrap_or_default();
        return Some(RosterEntry {
            name: local.to_string(),
            email: segment.to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(name: &str, email: &str) -> RosterEntry {
        RosterEntry {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn parses_bracketed_name_and_email() {
        assert_eq!(
            parse_roster("Jane Smith <jane@x.com>"),
            vec![entry("Jane Smith", "jane@x.com")]
        );
    }

    #[test]
    fn parses_comma_separated_name_and_email() {
        assert_eq!(
            parse_roster("John Doe, john@x.com"),
            vec![entry("John Doe", "john@x.com")]
        );
    }

    #[test]
    fn parses_bare_email_with_derived_name() {
        assert_eq!(
            parse_roster("user@domain.com"),
            vec![entry("user", "user@domain.com")]
        );
    }

    #[test]
    fn drops_segment_without_email() {
        assert!(parse_roster("not an email").is_empty());
    }

    #[test]
    fn parses_multiple_lines() {
        let entries = parse_roster("Jane Smith <jane@x.com>\nJohn Doe john@x.com\nbob@x.com");
        assert_eq!(
            entries,
            vec![
                entry("Jane Smith", "jane@x.com"),
                entry("John Doe", "john@x.com"),
                entry("bob", "bob@x.com"),
            ]
        );
    }

    #[test]
    fn skips_blank_segments() {
        let entries = parse_roster("\n , \njane@x.com,\n");
        assert_eq!(entries, vec![entry("jane", "jane@x.com")]);
    }

    #[test]
    fn malformed_brackets_fall_through_to_whitespace_rule() {
        // No closing bracket, so the bracket rule does not apply; the
        // last token still contains '@' and wins.
        assert_eq!(
            parse_roster("Jane Smith <jane@x.com"),
            vec![entry("Jane Smith", "<jane@x.com")]
        );
    }

    #[test]
    fn multi_word_name_without_separator_keeps_last_token_as_email() {
        assert_eq!(
            parse_roster("Doe John john@x.com"),
            vec![entry("Doe John", "john@x.com")]
        );
    }

    #[test]
    fn email_first_multi_token_line_is_dropped() {
        // Only the last token is considered as the email.
        assert!(parse_roster("john@x.com Doe").is_empty());
    }

    #[test]
    fn duplicates_are_preserved() {
        let entries = parse_roster("jane@x.com\njane@x.com");
        assert_eq!(entries.len(), 2);
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_input(input in ".{0,200}") {
            let _ = parse_roster(&input);
        }

        #[test]
        fn every_parsed_email_contains_at_or_came_from_brackets(
            input in "[ -~]{0,120}"
        ) {
            for parsed in parse_roster(&input) {
                // Bracketed segments are taken verbatim; every other
                // rule requires an '@' in the email token.
                prop_assert!(parsed.email.contains('@') || input.contains('<'));
            }
        }
    }
}
