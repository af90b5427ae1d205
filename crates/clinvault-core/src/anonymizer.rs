//! Best-effort anonymization of clinical note text.
//!
//! Five regex substitutions run in a fixed order, each over the output of
//! the previous one: names, CPR numbers, phone numbers, email addresses and
//! postal code + city. Every match is replaced by a bracketed uppercase
//! token. Because the tokens contain no lowercase letters and no digits,
//! no rule can match a token inserted by an earlier rule.
//!
//! Names are recognised over ASCII and Latin-1 letters only.
//!
//! This is a heuristic filter. Unusual PII shapes slip through and ordinary
//! capitalized phrases get redacted.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Category of redacted content, in the order rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedactionKind {
    Name,
    Cpr,
    Phone,
    Email,
    Address,
}

impl RedactionKind {
    /// All kinds, in application order.
    pub const ORDER: [RedactionKind; 5] = [
        RedactionKind::Name,
        RedactionKind::Cpr,
        RedactionKind::Phone,
        RedactionKind::Email,
        RedactionKind::Address,
    ];

    /// Replacement token inserted for this kind.
    pub fn token(self) -> &'static str {
        match self {
            RedactionKind::Name => "[NAME]",
            RedactionKind::Cpr => "[CPR]",
            RedactionKind::Phone => "[PHONE]",
            RedactionKind::Email => "[EMAIL]",
            RedactionKind::Address => "[ADDRESS]",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RedactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RedactionKind::Name => "name",
            RedactionKind::Cpr => "cpr",
            RedactionKind::Phone => "phone",
            RedactionKind::Email => "email",
            RedactionKind::Address => "address",
        };
        f.write_str(label)
    }
}

/// Result of an anonymization pass with per-rule match counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anonymized {
    pub text: String,
    counts: [usize; 5],
}

impl Anonymized {
    /// Number of substitutions made by the rule for `kind`.
    pub fn count(&self, kind: RedactionKind) -> usize {
        self.counts[kind.index()]
    }

    /// Total substitutions across all rules.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

// =============================================================================
// Compiled rules (compiled once, reused across calls)
// =============================================================================

// Capitalized word over ASCII plus the Latin-1 letters (Nordic, German,
// French, Spanish diacritics). Other scripts are not covered.
macro_rules! capitalized_word {
    () => {
        "[A-ZÀ-ÖØ-Þ][a-zß-öø-ÿ]+"
    };
}

struct Rule {
    kind: RedactionKind,
    regex: Regex,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let patterns: [(RedactionKind, &str); 5] = [
        (
            RedactionKind::Name,
            concat!(
                r"\b",
                capitalized_word!(),
                r"(?:\s+",
                capitalized_word!(),
                r"){1,2}\b"
            ),
        ),
        (RedactionKind::Cpr, r"\b[0-9]{10,11}\b"),
        (RedactionKind::Phone, r"\b[0-9]{8}\b"),
        (RedactionKind::Email, r"\b[\w.-]+@[\w.-]+\.\w{2,}\b"),
        (
            RedactionKind::Address,
            concat!(r"\b[0-9]{4}\s*", capitalized_word!(), r"\b"),
        ),
    ];

    patterns
        .into_iter()
        .map(|(kind, pat)| Rule {
            kind,
            regex: Regex::new(pat).expect("Invalid anonymizer regex"),
        })
        .collect()
});

/// Replace likely personal information in `text` with redaction tokens.
///
/// Pure and deterministic; never fails. The empty string maps to itself.
pub fn anonymize(text: &str) -> String {
    anonymize_with_report(text).text
}

/// Like [`anonymize`], additionally reporting how many matches each rule
/// replaced.
pub fn anonymize_with_report(text: &str) -> Anonymized {
    let mut current = text.to_string();
    let mut counts = [0usize; 5];

    for rule in RULES.iter() {
        let mut hits = 0usize;
        let replaced = rule.regex.replace_all(&current, |_: &Captures<'_>| {
            hits += 1;
            rule.kind.token()
        });
        if hits > 0 {
            current = replaced.into_owned();
            counts[rule.kind.index()] = hits;
        }
    }

    Anonymized {
        text: current,
        counts,
    }
}
