//! Name-shaped substring extraction from recognized text.
//!
//! Recall-first design: every rule contributes its matches from a line, so a
//! titled or punctuated name never suppresses a plain two-token match found
//! elsewhere on the same line. Spans already claimed by an earlier rule are
//! skipped, so the inner words of `Dr. Jane Smith` are not re-reported as a
//! bare `Jane Smith`.
//!
//! Each line is evaluated independently; a name split across two lines by
//! word-wrap is never joined. That recall limitation is deliberate.

use std::collections::HashSet;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Shape rules in precedence order. All of them run on every line; the
/// order decides which rule claims a span when matches overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// `Title. First Last` for Title in {Mr, Ms, Mrs, Dr}.
    Titled,
    /// `First M. Last` with a single-letter middle initial.
    MiddleInitial,
    /// `Last, First`.
    CommaSeparated,
    /// `First Last`, two capitalized alphabetic tokens.
    PlainPair,
}

impl NameRule {
    pub const ORDERED: [NameRule; 4] = [
        NameRule::Titled,
        NameRule::MiddleInitial,
        NameRule::CommaSeparated,
        NameRule::PlainPair,
    ];

    fn regex(self) -> &'static Regex {
        static TITLED: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b(?:Mrs|Mr|Ms|Dr)\.\s+[A-Z][a-z]+\s+[A-Z][a-z]+\b").unwrap()
        });
        static MIDDLE_INITIAL: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z]\.\s+[A-Z][a-z]+\b").unwrap());
        static COMMA_SEPARATED: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+,\s*[A-Z][a-z]+\b").unwrap());
        static PLAIN_PAIR: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").unwrap());

        match self {
            NameRule::Titled => &TITLED,
            NameRule::MiddleInitial => &MIDDLE_INITIAL,
            NameRule::CommaSeparated => &COMMA_SEPARATED,
            NameRule::PlainPair => &PLAIN_PAIR,
        }
    }
}

static WHOLE_LINE_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+\s+[A-Z][a-z]+$").unwrap());

/// Extracts ordered, deduplicated name candidates from raw recognizer text.
///
/// Append order: rule order, then in-line appearance order, then document
/// line order. Deduplication keeps the first occurrence and compares by
/// exact string equality. The raw text itself is never modified; callers
/// keep it alongside the candidates for audit.
pub fn extract_names(raw_text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for line in raw_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut claimed: Vec<Range<usize>> = Vec::new();
        let mut rule_matched = false;
        for rule in NameRule::ORDERED {
            for m in rule.regex().find_iter(line) {
                if overlaps_any(&claimed, &m.range()) {
                    continue;
                }
                claimed.push(m.range());
                rule_matched = true;
                push_unique(&mut names, &mut seen, m.as_str());
            }
        }

        // Whole-line fallback: two capitalized tokens and nothing else.
        if !rule_matched && WHOLE_LINE_PAIR.is_match(line) {
            push_unique(&mut names, &mut seen, line);
        }
    }

    names
}

fn overlaps_any(claimed: &[Range<usize>], candidate: &Range<usize>) -> bool {
    claimed
        .iter()
        .any(|range| range.start < candidate.end && candidate.start < range.end)
}

fn push_unique(names: &mut Vec<String>, seen: &mut HashSet<String>, candidate: &str) {
    debug_assert!(!candidate.is_empty());
    if seen.insert(candidate.to_string()) {
        names.push(candidate.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titled_name_is_kept_whole() {
        assert_eq!(
            extract_names("Dr. Jane Smith\nJohn Doe\nJohn Doe"),
            vec!["Dr. Jane Smith", "John Doe"]
        );
    }

    #[test]
    fn all_four_titles_are_recognized() {
        let text = "Mr. Alan Turing\nMs. Grace Hopper\nMrs. Ada Lovelace\nDr. John Neumann";
        assert_eq!(
            extract_names(text),
            vec![
                "Mr. Alan Turing",
                "Ms. Grace Hopper",
                "Mrs. Ada Lovelace",
                "Dr. John Neumann",
            ]
        );
    }

    #[test]
    fn middle_initial_shape() {
        assert_eq!(extract_names("John Q. Public"), vec!["John Q. Public"]);
    }

    #[test]
    fn comma_separated_shape() {
        let names = extract_names("Smith, John");
        assert!(names.contains(&"Smith, John".to_string()));
    }

    #[test]
    fn noise_yields_nothing() {
        assert!(extract_names("random noise !!! 123").is_empty());
        assert!(extract_names("").is_empty());
        assert!(extract_names("   \n\t\n").is_empty());
    }

    #[test]
    fn no_duplicates_no_empties() {
        let text = "John Doe\nJohn Doe\nDr. Jane Smith\nJane Smith\nJohn Doe";
        let names = extract_names(text);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().all(|n| !n.is_empty()));
    }

    #[test]
    fn plain_pair_not_suppressed_by_titled_match_elsewhere() {
        // A titled name and a plain pair on the same line both survive.
        let names = extract_names("Dr. Jane Smith and John Doe");
        assert_eq!(names, vec!["Dr. Jane Smith", "John Doe"]);
    }

    #[test]
    fn inner_words_of_a_titled_name_are_not_reextracted() {
        let names = extract_names("Dr. Jane Smith");
        assert_eq!(names, vec!["Dr. Jane Smith"]);
    }

    #[test]
    fn order_follows_rules_then_appearance_then_lines() {
        // Line 1: the comma rule outranks the plain-pair rule even though
        // the plain pair appears first in the line.
        let names = extract_names("Alan Turing met Hopper, Grace\nAda Lovelace");
        assert_eq!(names, vec!["Hopper, Grace", "Alan Turing", "Ada Lovelace"]);
    }

    #[test]
    fn names_split_across_lines_are_not_joined() {
        assert!(extract_names("John\nDoe").is_empty());
    }

    #[test]
    fn lowercase_and_single_tokens_are_rejected() {
        assert!(extract_names("john doe").is_empty());
        assert!(extract_names("Madonna").is_empty());
        assert!(extract_names("JOHN DOE").is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "Dr. Jane Smith\nSmith, John\nAlan Turing";
        assert_eq!(extract_names(text), extract_names(text));
    }
}
