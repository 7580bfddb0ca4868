use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{
    CommentRecord, DimensionScore, RawRecord, SummaryRow, DIMENSIONS, ITEM_COUNT,
};

/// Positional schema of the raw evaluation sheet once the two trailing
/// bookkeeping columns are discarded. The file's own header row is ignored.
pub const RAW_COLUMNS: [&str; 25] = [
    "Course Title",
    "Lecturer Name",
    "TM1",
    "TM2",
    "TM3",
    "TM4",
    "TM5",
    "TM6",
    "TM7",
    "TA8",
    "TA9",
    "TA10",
    "TA11",
    "TA12",
    "CM13",
    "CM14",
    "CM15",
    "CM16",
    "IF17",
    "IF18",
    "IF19",
    "IF20",
    "IF21",
    "PTA22",
    "PTA23",
];

const RAW_TRAILING: usize = 2;

// The comment export repeats the 23 item columns between the identity pair
// and the two free-text columns; they are dropped wholesale.
const COMMENT_WIDTH: usize = 27;
const LIKES_COLUMN: usize = 25;
const DISLIKES_COLUMN: usize = 26;

pub const SUMMARY_COLUMNS: [&str; 19] = [
    "School",
    "Dept",
    "Course Title",
    "Lecturer Name",
    "TM Overall",
    "TM %",
    "TA Overall",
    "TA %",
    "CM Overall",
    "CM %",
    "IF Overall",
    "IF %",
    "PTA Overall",
    "PTA %",
    "ES Overall",
    "ES %",
    "No",
    "Class Pop",
    "Resp Rate",
];

fn open(path: &Path, what: &str) -> Result<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path).map_err(|err| {
        Error::Configuration(format!(
            "{what} {} could not be opened: {err}",
            path.display()
        ))
    })
}

/// Loads the raw evaluation sheet. Item cells that fail numeric parsing load
/// as missing values; the aggregator decides whether a group is salvageable.
pub fn load_raw_data(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = open(path, "raw data sheet")?;

    let width = reader.headers()?.len();
    let expected = RAW_COLUMNS.len() + RAW_TRAILING;
    if width != expected {
        return Err(Error::Configuration(format!(
            "raw data sheet has {width} columns, expected {expected} \
             ({} data columns plus {RAW_TRAILING} discarded trailing columns)",
            RAW_COLUMNS.len()
        )));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let items: Vec<Option<f64>> = record
            .iter()
            .skip(2)
            .take(ITEM_COUNT)
            .map(|field| field.trim().parse::<f64>().ok())
            .collect();
        records.push(RawRecord {
            course_title: record.get(0).unwrap_or("").trim().to_string(),
            lecturer_name: record.get(1).unwrap_or("").to_string(),
            items,
        });
    }

    Ok(records)
}

/// Loads the comment sheet, keeping course title, lecturer name, and the two
/// free-text columns.
pub fn load_comment_data(path: &Path) -> Result<Vec<CommentRecord>> {
    let mut reader = open(path, "comment sheet")?;

    let width = reader.headers()?.len();
    if width != COMMENT_WIDTH {
        return Err(Error::Configuration(format!(
            "comment sheet has {width} columns, expected {COMMENT_WIDTH}"
        )));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(CommentRecord {
            course_title: record.get(0).unwrap_or("").trim().to_string(),
            lecturer_name: record.get(1).unwrap_or("").to_string(),
            likes: record.get(LIKES_COLUMN).unwrap_or("").to_string(),
            dislikes: record.get(DISLIKES_COLUMN).unwrap_or("").to_string(),
        });
    }

    Ok(records)
}

/// Loads the summary sheet by header name. Rows with any empty required cell
/// are dropped wholesale; rows with unparseable numerics are dropped with a
/// note so the caller can report them.
pub fn load_summary_data(path: &Path) -> Result<(Vec<SummaryRow>, Vec<String>)> {
    let mut reader = open(path, "summary sheet")?;

    let headers = reader.headers()?.clone();
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| (header.trim().to_string(), index))
        .collect();

    let missing: Vec<&str> = SUMMARY_COLUMNS
        .iter()
        .filter(|column| !columns.contains_key(**column))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(Error::Configuration(format!(
            "summary sheet is missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;

        let incomplete = SUMMARY_COLUMNS.iter().any(|column| {
            record
                .get(columns[*column])
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
        });
        if incomplete {
            continue;
        }

        match parse_summary_row(&record, &columns) {
            Ok(row) => rows.push(row),
            // Line numbering: header row is line 1.
            Err(err) => skipped.push(format!("summary row {} skipped: {err}", line + 2)),
        }
    }

    Ok((rows, skipped))
}

fn parse_summary_row(
    record: &csv::StringRecord,
    columns: &HashMap<String, usize>,
) -> Result<SummaryRow> {
    let text = |name: &str| -> String {
        record
            .get(columns[name])
            .unwrap_or("")
            .trim()
            .to_string()
    };
    let number = |name: &str| -> Result<f64> {
        let field = record.get(columns[name]).unwrap_or("").trim();
        field.parse::<f64>().map_err(|_| {
            Error::DataQuality(format!("column '{name}' has non-numeric value '{field}'"))
        })
    };

    let mut dimensions = [DimensionScore {
        raw: 0.0,
        percent: 0.0,
    }; 5];
    for (slot, dimension) in dimensions.iter_mut().zip(DIMENSIONS.iter()) {
        *slot = DimensionScore {
            raw: number(&format!("{} Overall", dimension.key))?,
            percent: number(&format!("{} %", dimension.key))?,
        };
    }

    Ok(SummaryRow {
        school: text("School"),
        department: text("Dept"),
        course_title: text("Course Title"),
        lecturer_name: text("Lecturer Name"),
        dimensions,
        evaluation: DimensionScore {
            raw: number("ES Overall")?,
            percent: number("ES %")?,
        },
        respondents: number("No")? as u32,
        class_population: number("Class Pop")? as u32,
        response_rate: number("Resp Rate")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("srte-{name}-{}.csv", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn raw_row(course: &str, lecturer: &str, item: &str) -> String {
        let mut fields = vec![course.to_string(), lecturer.to_string()];
        fields.extend(std::iter::repeat(item.to_string()).take(ITEM_COUNT));
        fields.push("extra1".to_string());
        fields.push("extra2".to_string());
        fields.join(",")
    }

    #[test]
    fn raw_sheet_discards_trailing_columns() {
        let header: Vec<String> = (0..27).map(|i| format!("col{i}")).collect();
        let contents = format!(
            "{}\n{}\n",
            header.join(","),
            raw_row("CSC101 Intro", "J. Doe", "4")
        );
        let path = temp_file("raw-ok", &contents);

        let records = load_raw_data(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course_title, "CSC101 Intro");
        assert_eq!(records[0].lecturer_name, "J. Doe");
        assert_eq!(records[0].items.len(), ITEM_COUNT);
        assert!(records[0].items.iter().all(|item| *item == Some(4.0)));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn raw_sheet_parses_bad_cells_as_missing() {
        let header: Vec<String> = (0..27).map(|i| format!("col{i}")).collect();
        let contents = format!(
            "{}\n{}\n",
            header.join(","),
            raw_row("CSC101 Intro", "J. Doe", "x")
        );
        let path = temp_file("raw-missing", &contents);

        let records = load_raw_data(&path).unwrap();
        assert!(records[0].items.iter().all(|item| item.is_none()));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn raw_sheet_rejects_wrong_width() {
        let path = temp_file("raw-narrow", "a,b,c\n1,2,3\n");
        let err = load_raw_data(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn comment_sheet_keeps_identity_and_free_text() {
        let header: Vec<String> = (0..COMMENT_WIDTH).map(|i| format!("col{i}")).collect();
        let mut fields = vec!["CSC101 Intro".to_string(), "J. Doe".to_string()];
        fields.extend(std::iter::repeat("3".to_string()).take(23));
        fields.push("Great class".to_string());
        fields.push("Too fast".to_string());
        let contents = format!("{}\n{}\n", header.join(","), fields.join(","));
        let path = temp_file("comments-ok", &contents);

        let records = load_comment_data(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].likes, "Great class");
        assert_eq!(records[0].dislikes, "Too fast");

        std::fs::remove_file(&path).ok();
    }

    fn summary_contents(rows: &[&str]) -> String {
        let mut contents = SUMMARY_COLUMNS.join(",");
        contents.push('\n');
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        contents
    }

    const GOOD_ROW: &str = "Sciences,Computer Science,CSC101 Intro,John Doe,\
                            4.0,80.0,4.0,80.0,4.0,80.0,4.0,80.0,4.0,80.0,4.0,80.0,25,40,62.5";

    #[test]
    fn summary_sheet_parses_complete_rows() {
        let path = temp_file("summary-ok", &summary_contents(&[GOOD_ROW]));

        let (rows, skipped) = load_summary_data(&path).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.lecturer_name, "John Doe");
        assert_eq!(row.respondents, 25);
        assert_eq!(row.class_population, 40);
        assert!((row.response_rate - 62.5).abs() < 1e-9);
        assert!(!row.is_invalid());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn summary_sheet_drops_incomplete_rows_wholesale() {
        let incomplete = "Sciences,,CSC101 Intro,John Doe,\
                          4.0,80.0,4.0,80.0,4.0,80.0,4.0,80.0,4.0,80.0,4.0,80.0,25,40,62.5";
        let path = temp_file("summary-dropna", &summary_contents(&[GOOD_ROW, incomplete]));

        let (rows, skipped) = load_summary_data(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(skipped.is_empty());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn summary_sheet_notes_unparseable_rows() {
        let garbled = "Sciences,Computer Science,CSC101 Intro,John Doe,\
                       abc,80.0,4.0,80.0,4.0,80.0,4.0,80.0,4.0,80.0,4.0,80.0,25,40,62.5";
        let path = temp_file("summary-garbled", &summary_contents(&[garbled]));

        let (rows, skipped) = load_summary_data(&path).unwrap();
        assert!(rows.is_empty());
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].contains("TM Overall"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn summary_sheet_requires_named_columns() {
        let path = temp_file("summary-missing", "School,Dept\nSciences,CS\n");
        let err = load_summary_data(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("Course Title"));
        std::fs::remove_file(&path).ok();
    }
}
