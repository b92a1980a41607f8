//! Trust-level inference for sources the engine cited without a level.

use super::types::SourceType;

const TIERS: &[(u8, &[&str])] = &[
    (
        7,
        &[
            "government",
            "municipal",
            "ministry",
            "department",
            "census",
            "registry",
            "official",
            "gazette",
            "city hall",
            "city council",
            "statistics office",
        ],
    ),
    (
        6,
        &[
            "ombudsman",
            "auditor",
            "audit office",
            "inspector general",
            "anti-corruption",
            "watchdog",
            "regulator",
            "regulatory",
        ],
    ),
    (
        5,
        &[
            "united nations",
            "un-habitat",
            "undp",
            "unep",
            "unesco",
            "unicef",
            "world bank",
            "oecd",
            " who ",
            "world health",
            "international labour",
            "international monetary",
        ],
    ),
    (
        4,
        &[
            "university",
            "journal",
            "academic",
            "institute of",
            "peer-reviewed",
            "research centre",
            "research center",
        ],
    ),
    (
        3,
        &[
            " ngo ",
            "non-governmental",
            "transparency international",
            "brookings",
            "chatham house",
            "think tank",
            "foundation",
            "civil society",
        ],
    ),
    (
        2,
        &[
            "company",
            "telecom",
            "satellite",
            "utility",
            "utilities",
            "transport operator",
            "private",
            "corporation",
        ],
    ),
];

/// Infers a 1..=7 trust level from a source's name, falling back to its declared type.
///
/// Name keywords are matched strongest tier first. Unmatched names take the
/// default level of their type; news, social media and unknown sources are level 1.
pub fn classify_source(source_type: SourceType, source_name: &str) -> u8 {
    let haystack = format!(" {} ", source_name.to_ascii_lowercase());

    TIERS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(level, _)| *level)
        .unwrap_or_else(|| default_level(source_type))
}

fn default_level(source_type: SourceType) -> u8 {
    match source_type {
        SourceType::Government => 7,
        SourceType::International => 5,
        SourceType::Academic => 4,
        SourceType::Ngo => 3,
        SourceType::Private => 2,
        SourceType::Media | SourceType::Unknown => 1,
    }
}
