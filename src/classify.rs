use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{AggregatedRow, SchoolBucket};

/// One named school bucket with its case-sensitive course-title prefixes.
/// Prefix lists across buckets are intentionally not disjoint: cross-listed
/// codes (e.g. ELCT) belong to more than one school.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketRule {
    pub name: String,
    pub prefixes: Vec<String>,
}

const DEFAULT_RULES: &[(&str, &[&str])] = &[
    (
        "SMS",
        &[
            "ACCT", "BSAD", "BSTA", "BMTH", "FNCE", "IRMA", "MLIS", "MIHM", "BSAD/MKTG", "MBIM",
            "ECONS", "MKTG", "AMS", "'BU-ACC", "BUA", "BU-BSD", "MCON", "MHIM", "BU-IRM",
            "BU-IRMA", "BU-MKT", "MKT", "IRM", "ENT", "BU-BUA", "BSD", "BU-FIN", "FIN", "IIRM",
        ],
    ),
    (
        "VASSS",
        &[
            "ECON", "MCOM", "MCBC", "MCJP", "MCPR", "PBAD", "PBMG", "PLSC", "IILDP", "ILDP",
            "PMBG", "SOWK", "CMS", "MCM", "BU-ILD", "BU-POL", "POL", "BU-ECO", "BU-SWK",
            "BU-PAD", "BU-CMS", "BU-MCM", "ILD-POL", "BU-ILDP", "SWK", "SOC", "SWMP", "SWFC",
            "SWSA", "PBMR", "PAD", "BU-SOWK",
        ],
    ),
    (
        "CFFS",
        &[
            "MAT", "LIT", "PHY", "CHE", "ECO", "BIO", "PPAD", "PILW", "CRS", "GOV", "ECN",
            "ACC", "BUS", "HIS", "AGR",
        ],
    ),
    (
        "EAH",
        &[
            "BEDU", "CRLS", "CRSL", "CHMN", "CHIS", "EDPA", "EDUC", "ENGL", "FRCH", "GCPY",
            "GEDS", "HIST", "MUSC", "RELS", "RELG", "EGLT", "BIBL", "NTST", "OTST", "THST",
            "FREN", "BU/GST", "BU-GST", "BU-CRS", "BU-GEDS", "PRDE", "GES", "GST", "GET",
            "BU-HIS", "MUS", "PSY", "BU-LIT", "BU-MUS", "FAC", "CGPY",
        ],
    ),
    (
        "PAH",
        &[
            "MLSC", "PHSC", "MLSB", "MLSH", "MLSM", "MLSP", "PHFC", "PHMP", "PHEP", "PHNT",
            "PHPR", "PHEH", "ENGL/EGLT", "PHHP", "MLS", "BU-MLS",
        ],
    ),
    ("NURSING", &["NRSG", "COS", "NSC", "BU-NSC", "RSG"]),
    (
        "CES",
        &[
            "COSC", "INSY", "ITGY", "ELCT", "SENG", "IFT", "SEN", "BU-CSC", "BU-SEN", "INS",
            "BU-IFT", "CYB", "BU-ENG",
        ],
    ),
    (
        "SAT",
        &[
            "AGRE", "AGEM", "AGRY", "AGRI", "ANSC", "CRPT", "BIOL", "BOTA", "CHEM", "ICHEM",
            "ELCT", "MATH", "STAT", "MBIO", "NUDT", "ZOOL", "ZOO", "PHYS", "BU-CHM", "BU-BIO",
            "EVMT", "BU-AGG", "STA/STAT", "BU-AGR", "BOT", "BU-BTG", "CSC", "STA", "BU-MCB",
            "MCB", "AGG",
        ],
    ),
    (
        "BCSM",
        &[
            "ANAT", "BCHM", "MBBT", "PATH", "EPDM", "PHGY", "Internal", "Surgery", "Level",
            "OBGYN", "400", "Batch", "SURG", "PAED", "Junior",
        ],
    ),
    (
        "SBMS",
        &[
            "COMH", "MBBS", "CHM", "NUT", "BU-NUT", "ANA", "BCH", "PHS", "BU-PIO", "PIO",
            "BU-ANA", "BU-BCH",
        ],
    ),
    (
        "LAW",
        &["LAWS", "DCSS", "LAW", "BU-PUL", "CIL", "PHL", "PUL", "BU-CIL"],
    ),
    (
        "SCES",
        &["Elct", "MTH", "BU/CPE", "MEE", "CEE", "BU-CPE", "INGY"],
    ),
];

pub fn default_rules() -> Vec<BucketRule> {
    DEFAULT_RULES
        .iter()
        .map(|(name, prefixes)| BucketRule {
            name: (*name).to_string(),
            prefixes: prefixes.iter().map(|prefix| (*prefix).to_string()).collect(),
        })
        .collect()
}

/// Loads an override rule set from a JSON file:
/// `[{"name": "SMS", "prefixes": ["ACCT", ...]}, ...]`.
pub fn load_rules(path: &Path) -> Result<Vec<BucketRule>> {
    let file = std::fs::File::open(path).map_err(|err| {
        Error::Configuration(format!(
            "bucket rules {} could not be opened: {err}",
            path.display()
        ))
    })?;
    let rules: Vec<BucketRule> = serde_json::from_reader(file).map_err(|err| {
        Error::Configuration(format!(
            "bucket rules {} are malformed: {err}",
            path.display()
        ))
    })?;
    if rules.is_empty() {
        return Err(Error::Configuration(
            "bucket rules file defines no buckets".to_string(),
        ));
    }
    Ok(rules)
}

/// Partitions rows into school buckets, in rule order. A row lands in every
/// bucket whose prefix list matches its course title; buckets with no
/// matching rows are omitted. Rows matching no bucket are left out here and
/// surfaced by [`unclassified`].
pub fn classify(rows: &[AggregatedRow], rules: &[BucketRule]) -> Vec<SchoolBucket> {
    let mut buckets = Vec::new();

    for rule in rules {
        let matching: Vec<AggregatedRow> = rows
            .iter()
            .filter(|row| matches_rule(&row.course_title, rule))
            .cloned()
            .collect();
        if !matching.is_empty() {
            buckets.push(SchoolBucket {
                name: rule.name.clone(),
                rows: matching,
            });
        }
    }

    buckets
}

pub fn unclassified<'a>(rows: &'a [AggregatedRow], rules: &[BucketRule]) -> Vec<&'a AggregatedRow> {
    rows.iter()
        .filter(|row| !rules.iter().any(|rule| matches_rule(&row.course_title, rule)))
        .collect()
}

fn matches_rule(course_title: &str, rule: &BucketRule) -> bool {
    rule.prefixes
        .iter()
        .any(|prefix| course_title.starts_with(prefix.as_str()))
}

/// Isolates the leading alphabetic course code: first whitespace token of the
/// title, truncated at the first digit. Blank titles yield `None`; a token
/// that starts with a digit yields an empty code.
pub fn course_prefix(title: &str) -> Option<String> {
    let token = title.trim().split_whitespace().next()?;
    Some(token.chars().take_while(|c| !c.is_ascii_digit()).collect())
}

pub fn known_prefixes(rules: &[BucketRule]) -> BTreeSet<String> {
    rules
        .iter()
        .flat_map(|rule| rule.prefixes.iter().cloned())
        .collect()
}

/// The "check new course codes" diagnostic: course-code prefixes present in
/// the data but absent from the known set, deduplicated and sorted.
pub fn find_unknown_prefixes<'a, I>(titles: I, known: &BTreeSet<String>) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut unknown = BTreeSet::new();
    for title in titles {
        if let Some(prefix) = course_prefix(title) {
            if !prefix.is_empty() && !known.contains(&prefix) {
                unknown.insert(prefix);
            }
        }
    }
    unknown.into_iter().collect()
}
