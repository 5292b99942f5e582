use std::sync::LazyLock;

use regex::Regex;

/// Ordered matchers for one field kind. Literal "label:" forms come
/// before bare-value forms so loose value patterns only fire when no
/// labeled occurrence exists.
struct FieldPatterns {
    kind: &'static str,
    patterns: Vec<Regex>,
}

static PATTERNS: LazyLock<Vec<FieldPatterns>> = LazyLock::new(|| {
    let table: &[(&str, &[&str])] = &[
        (
            "email",
            &[r"([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})"],
        ),
        (
            "phone",
            &[r"(\+?1?\s*\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4})"],
        ),
        (
            "company",
            &[r"(?i)company[:\s]+([^,\n]+)", r"(?i)account[:\s]+([^,\n]+)"],
        ),
        (
            "status",
            &[
                r"(?i)status[:\s]+([^,\n]+)",
                r"(?i)\b(open|closed|converted|not started|in progress|completed|waiting|deferred)\b",
            ],
        ),
        (
            "stage",
            &[
                r"(?i)stage[:\s]+([^,\n]+)",
                r"(?i)\b(prospecting|qualification|proposal|negotiation|closed won|closed lost)\b",
            ],
        ),
        (
            "source",
            &[
                r"(?i)source[:\s]+([^,\n]+)",
                r"(?i)\b(web|phone|referral|campaign)\b",
            ],
        ),
        (
            "owner",
            &[r"(?i)owner[:\s]+([^,\n]+)", r"(?i)assigned[:\s]+([^,\n]+)"],
        ),
    ];
    table
        .iter()
        .map(|&(kind, patterns)| FieldPatterns {
            kind,
            patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
        })
        .collect()
});

/// Best-effort field value from a block of free text near a located
/// element. First capture group of the first matching pattern, full
/// match when the pattern has no group, empty string when the kind is
/// unrecognized or nothing matches.
pub fn extract_field(text: &str, kind: &str) -> String {
    let Some(entry) = PATTERNS.iter().find(|p| p.kind == kind) else {
        return String::new();
    };
    for pattern in &entry.patterns {
        if let Some(caps) = pattern.captures(text) {
            let m = caps.get(1).or_else(|| caps.get(0)).unwrap();
            return m.as_str().trim().to_string();
        }
    }
    String::new()
}

// ── Tests ──
