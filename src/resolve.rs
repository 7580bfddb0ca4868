use std::collections::BTreeSet;

use crate::directory::LecturerDirectory;
use crate::models::{RawRecord, StandardizedRecord, SummaryRow};

/// Maps one raw submission onto a canonical lecturer identity. The raw name
/// is trimmed and looked up case-insensitively; a match takes the directory's
/// spelling, department, and school. A miss keeps the trimmed raw name with
/// empty affiliation. No fuzzy matching.
pub fn resolve(record: RawRecord, directory: &LecturerDirectory) -> (StandardizedRecord, bool) {
    let trimmed = record.lecturer_name.trim().to_string();

    match directory.official_for(&trimmed) {
        Some(official) => {
            let official = official.to_string();
            let (department, school) = match directory.info(&official) {
                Some(info) => (info.department.clone(), info.school.clone()),
                None => (String::new(), String::new()),
            };
            (
                StandardizedRecord {
                    course_title: record.course_title,
                    lecturer_name: official,
                    department,
                    school,
                    items: record.items,
                },
                true,
            )
        }
        None => (
            StandardizedRecord {
                course_title: record.course_title,
                lecturer_name: trimmed,
                department: String::new(),
                school: String::new(),
                items: record.items,
            },
            false,
        ),
    }
}

/// Resolves every record independently and collects the unmatched raw names,
/// deduplicated and sorted.
pub fn resolve_all(
    records: Vec<RawRecord>,
    directory: &LecturerDirectory,
) -> (Vec<StandardizedRecord>, Vec<String>) {
    let mut standardized = Vec::with_capacity(records.len());
    let mut unmatched = BTreeSet::new();

    for record in records {
        let (resolved, matched) = resolve(record, directory);
        if !matched {
            unmatched.insert(resolved.lecturer_name.clone());
        }
        standardized.push(resolved);
    }

    (standardized, unmatched.into_iter().collect())
}

/// Standardizes lecturer identity on already-aggregated summary rows. Rows
/// whose name misses the directory keep the values from the file.
pub fn standardize_summary(
    rows: &mut [SummaryRow],
    directory: &LecturerDirectory,
) -> Vec<String> {
    let mut unmatched = BTreeSet::new();

    for row in rows.iter_mut() {
        let trimmed = row.lecturer_name.trim().to_string();
        match directory.official_for(&trimmed) {
            Some(official) => {
                let official = official.to_string();
                if let Some(info) = directory.info(&official) {
                    row.department = info.department.clone();
                    row.school = info.school.clone();
                }
                row.lecturer_name = official;
            }
            None => {
                unmatched.insert(trimmed.clone());
                row.lecturer_name = trimmed;
            }
        }
    }

    unmatched.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DimensionScore, ITEM_COUNT};

    fn sample_directory() -> LecturerDirectory {
        let mut directory = LecturerDirectory::empty();
        directory.add_entry("John Doe", "Computer Science", "Sciences", "J. Doe");
        directory
    }

    fn sample_record(lecturer: &str) -> RawRecord {
        RawRecord {
            course_title: "CSC101 Intro".to_string(),
            lecturer_name: lecturer.to_string(),
            items: vec![Some(4.0); ITEM_COUNT],
        }
    }

    #[test]
    fn alias_resolves_to_official_identity() {
        let directory = sample_directory();
        let (resolved, matched) = resolve(sample_record("  j. DOE "), &directory);

        assert!(matched);
        assert_eq!(resolved.lecturer_name, "John Doe");
        assert_eq!(resolved.department, "Computer Science");
        assert_eq!(resolved.school, "Sciences");
    }

    #[test]
    fn miss_keeps_trimmed_name_with_empty_affiliation() {
        let directory = sample_directory();
        let (resolved, matched) = resolve(sample_record("  A. Stranger "), &directory);

        assert!(!matched);
        assert_eq!(resolved.lecturer_name, "A. Stranger");
        assert_eq!(resolved.department, "");
        assert_eq!(resolved.school, "");
    }

    #[test]
    fn unmatched_names_are_deduplicated_and_sorted() {
        let directory = sample_directory();
        let records = vec![
            sample_record("Zed Unknown"),
            sample_record("A. Stranger"),
            sample_record("zed unknown "),
            sample_record("Zed Unknown"),
            sample_record("J. Doe"),
        ];

        let (standardized, unmatched) = resolve_all(records, &directory);
        assert_eq!(standardized.len(), 5);
        // Case variants differ after trimming, so both spellings survive.
        assert_eq!(unmatched, vec!["A. Stranger", "Zed Unknown", "zed unknown"]);
    }

    #[test]
    fn empty_directory_leaves_every_record_unresolved() {
        let directory = LecturerDirectory::empty();
        let (standardized, unmatched) = resolve_all(vec![sample_record("J. Doe")], &directory);

        assert_eq!(standardized[0].lecturer_name, "J. Doe");
        assert_eq!(unmatched, vec!["J. Doe"]);
    }

    #[test]
    fn summary_rows_are_standardized_in_place() {
        let directory = sample_directory();
        let score = DimensionScore {
            raw: 4.0,
            percent: 80.0,
        };
        let mut rows = vec![SummaryRow {
            school: "".to_string(),
            department: "".to_string(),
            course_title: "CSC101 Intro".to_string(),
            lecturer_name: "j. doe".to_string(),
            dimensions: [score; 5],
            evaluation: score,
            respondents: 10,
            class_population: 20,
            response_rate: 50.0,
        }];

        let unmatched = standardize_summary(&mut rows, &directory);
        assert!(unmatched.is_empty());
        assert_eq!(rows[0].lecturer_name, "John Doe");
        assert_eq!(rows[0].school, "Sciences");
        assert_eq!(rows[0].department, "Computer Science");
    }
}
