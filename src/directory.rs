use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

const REQUIRED_COLUMNS: [&str; 3] = ["Official Name", "Department", "School"];

#[derive(Debug, Clone)]
pub struct LecturerInfo {
    pub department: String,
    pub school: String,
}

/// Reference roster of lecturers. Loaded once per run and read-only after
/// that: official names keyed by lowercased form, and every alias (including
/// the official name itself) mapping back to the official spelling.
#[derive(Debug, Default)]
pub struct LecturerDirectory {
    name_info: HashMap<String, LecturerInfo>,
    alias_to_official: HashMap<String, String>,
    conflicts: Vec<String>,
}

impl LecturerDirectory {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        #[derive(Deserialize)]
        struct DirectoryRow {
            #[serde(rename = "Official Name")]
            official_name: String,
            #[serde(rename = "Department")]
            department: String,
            #[serde(rename = "School")]
            school: String,
            #[serde(rename = "Aliases")]
            aliases: Option<String>,
        }

        let mut reader = csv::Reader::from_path(path).map_err(|err| {
            Error::Configuration(format!(
                "lecturer directory {} could not be opened: {err}",
                path.display()
            ))
        })?;

        let headers = reader.headers().map_err(|err| {
            Error::Configuration(format!("lecturer directory has no header row: {err}"))
        })?;
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|h| h.trim() == **required))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "lecturer directory is missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut directory = Self::empty();
        for result in reader.deserialize::<DirectoryRow>() {
            let row = result.map_err(|err| {
                Error::Configuration(format!("lecturer directory row is malformed: {err}"))
            })?;
            directory.add_entry(
                &row.official_name,
                &row.department,
                &row.school,
                row.aliases.as_deref().unwrap_or(""),
            );
        }

        Ok(directory)
    }

    /// Registers one roster entry. `aliases` is a comma-separated list and
    /// may be empty. Rows with a blank official name are skipped.
    pub fn add_entry(&mut self, official_name: &str, department: &str, school: &str, aliases: &str) {
        let official = official_name.trim();
        if official.is_empty() {
            return;
        }

        self.name_info.insert(
            official.to_lowercase(),
            LecturerInfo {
                department: department.trim().to_string(),
                school: school.trim().to_string(),
            },
        );

        self.add_alias(official, official);
        for alias in aliases.split(',') {
            let alias = alias.trim();
            if !alias.is_empty() {
                self.add_alias(alias, official);
            }
        }
    }

    // An alias already claimed by a different official name keeps its first
    // owner; the collision is recorded instead of silently overwritten.
    fn add_alias(&mut self, alias: &str, official: &str) {
        match self.alias_to_official.entry(alias.to_lowercase()) {
            std::collections::hash_map::Entry::Occupied(existing) => {
                if existing.get() != official {
                    self.conflicts.push(format!(
                        "alias '{alias}' already maps to '{}', ignored for '{official}'",
                        existing.get()
                    ));
                }
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(official.to_string());
            }
        }
    }

    /// Case-insensitive alias lookup; returns the official spelling.
    pub fn official_for(&self, name: &str) -> Option<&str> {
        self.alias_to_official
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn info(&self, official_name: &str) -> Option<&LecturerInfo> {
        self.name_info.get(&official_name.trim().to_lowercase())
    }

    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.name_info.is_empty()
    }

    pub fn len(&self) -> usize {
        self.name_info.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_directory() -> LecturerDirectory {
        let mut directory = LecturerDirectory::empty();
        directory.add_entry(
            "John Doe",
            "Computer Science",
            "Sciences",
            "J. Doe, Dr. J Doe",
        );
        directory.add_entry("Jane Smith", "Physics", "Sciences", "");
        directory
    }

    #[test]
    fn official_names_resolve_to_themselves() {
        let directory = sample_directory();
        assert_eq!(directory.official_for("john doe"), Some("John Doe"));
        assert_eq!(directory.official_for("  JANE SMITH "), Some("Jane Smith"));
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        let directory = sample_directory();
        assert_eq!(directory.official_for("j. doe"), Some("John Doe"));
        assert_eq!(directory.official_for("DR. J DOE"), Some("John Doe"));
        assert_eq!(directory.official_for("Unknown Person"), None);
    }

    #[test]
    fn info_is_keyed_by_official_name() {
        let directory = sample_directory();
        let info = directory.info("John Doe").unwrap();
        assert_eq!(info.department, "Computer Science");
        assert_eq!(info.school, "Sciences");
        assert!(directory.info("J. Doe").is_none());
    }

    #[test]
    fn conflicting_alias_keeps_first_owner() {
        let mut directory = LecturerDirectory::empty();
        directory.add_entry("John Doe", "Computer Science", "Sciences", "J. Doe");
        directory.add_entry("Jane Doe", "Physics", "Sciences", "J. Doe");

        assert_eq!(directory.official_for("j. doe"), Some("John Doe"));
        assert_eq!(directory.conflicts().len(), 1);
        assert!(directory.conflicts()[0].contains("J. Doe"));
    }

    #[test]
    fn blank_official_names_are_skipped() {
        let mut directory = LecturerDirectory::empty();
        directory.add_entry("  ", "Nowhere", "Nowhere", "ghost");
        assert!(directory.is_empty());
        assert_eq!(directory.official_for("ghost"), None);
    }

    #[test]
    fn load_rejects_missing_columns() {
        let path = std::env::temp_dir().join(format!(
            "srte-directory-missing-cols-{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, "Official Name,Department\nJohn Doe,CS\n").unwrap();

        let err = LecturerDirectory::load(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("School"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_reads_roster_with_optional_aliases() {
        let path = std::env::temp_dir().join(format!(
            "srte-directory-roster-{}.csv",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "Official Name,Department,School,Aliases\n\
             John Doe,Computer Science,Sciences,\"J. Doe, Doe J\"\n\
             Jane Smith,Physics,Sciences,\n",
        )
        .unwrap();

        let directory = LecturerDirectory::load(&path).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.official_for("doe j"), Some("John Doe"));
        assert!(directory.conflicts().is_empty());

        std::fs::remove_file(&path).ok();
    }
}
