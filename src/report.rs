use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::comments::{categorize, overall_polarity};
use crate::error::{Error, Result};
use crate::models::{CommentGroup, SchoolBucket, SummaryRow, DIMENSIONS};

const INSTITUTION: &str = "BABCOCK UNIVERSITY";
const OFFICE: &str = "OFFICE OF INSTITUTIONAL EFFECTIVENESS";
const INSTRUMENT: &str = "STUDENT RATING OF TEACHING EFFECTIVENESS (SRTE)";
const RATING_SCALE: &str =
    "1.00 - 1.99=Poor, 2.00 - 2.49=Fair, 2.50 - 3.49=Good, 3.50 - 4.49=Very Good, \
     4.50 - 5.00=Excellent";
const INVALID_NOTE: &str =
    "Note: This evaluation is invalid, as the number of students that rated this course \
     is more than the number of registered students for this course.";

/// Renders the fixed report layout for one (lecturer, course) row.
pub fn build_document(
    row: &SummaryRow,
    likes: &[CommentGroup],
    dislikes: &[CommentGroup],
    semester: &str,
    session: &str,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{INSTITUTION}");
    let _ = writeln!(output, "{OFFICE}");
    let _ = writeln!(output, "{INSTRUMENT}");
    let _ = writeln!(output, "{semester} SEMESTER OF {session} ACADEMIC SESSION");
    let _ = writeln!(output);

    let _ = writeln!(output, "SCHOOL: {}", row.school);
    let _ = writeln!(output, "DEPARTMENT: {}", row.department);
    let _ = writeln!(output, "COURSE CODE/TITLE: {}", row.course_title);
    let _ = writeln!(output, "NAME OF LECTURER: {}", row.lecturer_name);
    let _ = writeln!(output);

    let _ = writeln!(
        output,
        "{:<40}{:<16}{}",
        "SUMMARY OF SCORES:", "OVERALL MEAN", "OVERALL RATING"
    );
    for (dimension, score) in DIMENSIONS.iter().zip(row.dimensions.iter()) {
        let _ = writeln!(
            output,
            "* {:<38}{:<16.2}{:.1}%",
            dimension.label, score.raw, score.percent
        );
    }
    let _ = writeln!(
        output,
        "* {:<38}{:<16.2}{:.1}%",
        "Evaluation Score", row.evaluation.raw, row.evaluation.percent
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "OPEN ENDED ASSESSMENT");
    write_comment_section(
        &mut output,
        "1. Indicate three things you experienced in this course that you liked",
        likes,
        "No specific likes mentioned.",
        "Likes",
    );
    write_comment_section(
        &mut output,
        "2. List three things you experienced that you did not like",
        dislikes,
        "No specific dislikes mentioned.",
        "Dislikes",
    );

    let _ = writeln!(output, "Footnote:");
    let _ = writeln!(output, "{RATING_SCALE}");
    let _ = writeln!(output);

    let _ = writeln!(output, "FOR OFFICIAL USE ONLY:");
    let _ = writeln!(
        output,
        "No. of students who took this course: {}",
        row.class_population
    );
    let _ = writeln!(
        output,
        "No. of students who evaluated this course: {}",
        row.respondents
    );
    let _ = writeln!(
        output,
        "Percent of students who evaluated this course: {:.1}%",
        row.response_rate
    );
    let _ = writeln!(output);

    if row.is_invalid() {
        let _ = writeln!(output, "{INVALID_NOTE}");
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "Page 1");

    output
}

fn write_comment_section(
    output: &mut String,
    heading: &str,
    groups: &[CommentGroup],
    fallback: &str,
    section_label: &str,
) {
    let _ = writeln!(output, "{heading}");

    if groups.is_empty() {
        let _ = writeln!(output, "* {fallback}");
        let _ = writeln!(output);
        return;
    }

    for group in groups {
        let _ = writeln!(output, "* {}", comment_line(group));
    }
    if let Some(polarity) = overall_polarity(groups) {
        let _ = writeln!(
            output,
            "Overall Sentiment for {section_label}: {} (Avg. Polarity: {:.2})",
            categorize(polarity),
            polarity
        );
    }
    let _ = writeln!(output);
}

/// `"{text} (x{count}) - {category}"`, with count and category present only
/// when they apply.
pub fn comment_line(group: &CommentGroup) -> String {
    let mut line = group.text.clone();
    if group.count > 1 {
        let _ = write!(line, " (x{})", group.count);
    }
    if let Some(sentiment) = group.sentiment {
        let _ = write!(line, " - {sentiment}");
    }
    line
}

/// Report artifact name: `<lecturer>_<course>.md` with filesystem-hostile
/// characters replaced and the lecturer's commas and periods removed.
pub fn report_filename(lecturer_name: &str, course_title: &str) -> String {
    let lecturer = sanitize(&lecturer_name.replace(&[',', '.'][..], ""));
    let course = sanitize(course_title);
    format!("{lecturer}_{course}.md")
}

fn sanitize(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .map_err(|err| Error::Render(format!("could not write {}: {err}", path.display())))
}

/// Writes one CSV per school bucket and returns the paths written.
pub fn write_bucket_summaries(out_dir: &Path, buckets: &[SchoolBucket]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let path = out_dir.join(format!("{}.csv", sanitize(&bucket.name)));
        let mut writer = csv::Writer::from_path(&path)?;

        writer.write_record(&crate::ingest::SUMMARY_COLUMNS[..17])?;
        for row in &bucket.rows {
            let mut fields = vec![
                row.school.clone(),
                row.department.clone(),
                row.course_title.clone(),
                row.lecturer_name.clone(),
            ];
            for score in &row.dimensions {
                fields.push(format!("{:.2}", score.raw));
                fields.push(format!("{:.1}", score.percent));
            }
            fields.push(format!("{:.2}", row.evaluation.raw));
            fields.push(format!("{:.1}", row.evaluation.percent));
            fields.push(row.respondents.to_string());
            writer.write_record(&fields)?;
        }
        writer.flush()?;
        written.push(path);
    }

    Ok(written)
}

pub struct RunDiagnostics<'a> {
    pub unmatched_lecturers: &'a [String],
    pub alias_conflicts: &'a [String],
    pub data_quality: &'a [String],
    pub unknown_prefixes: &'a [String],
    pub unclassified_courses: &'a [String],
}

/// Builds the markdown run summary handed back to the operator after an
/// analysis run: bucket sizes plus every collected warning list.
pub fn build_run_summary(
    generated_on: NaiveDate,
    submissions: usize,
    aggregated_rows: usize,
    buckets: &[SchoolBucket],
    diagnostics: &RunDiagnostics,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# SRTE Analysis Run");
    let _ = writeln!(
        output,
        "Generated on {generated_on}: {submissions} submissions aggregated into \
         {aggregated_rows} course/lecturer rows."
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## School Summaries");
    if buckets.is_empty() {
        let _ = writeln!(output, "No rows matched any school bucket.");
    } else {
        for bucket in buckets {
            let _ = writeln!(output, "- {}: {} rows", bucket.name, bucket.rows.len());
        }
    }

    write_list_section(
        &mut output,
        "Unmatched Lecturers",
        diagnostics.unmatched_lecturers,
        "All lecturer names resolved against the directory.",
    );
    write_list_section(
        &mut output,
        "Directory Alias Conflicts",
        diagnostics.alias_conflicts,
        "No alias conflicts in the directory.",
    );
    write_list_section(
        &mut output,
        "Data Quality",
        diagnostics.data_quality,
        "All groups aggregated cleanly.",
    );
    write_list_section(
        &mut output,
        "Unknown Course Codes",
        diagnostics.unknown_prefixes,
        "No unknown course codes found.",
    );
    write_list_section(
        &mut output,
        "Unclassified Courses",
        diagnostics.unclassified_courses,
        "Every aggregated course matched a school bucket.",
    );

    output
}

fn write_list_section(output: &mut String, heading: &str, items: &[String], fallback: &str) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {heading}");
    if items.is_empty() {
        let _ = writeln!(output, "{fallback}");
    } else {
        for item in items {
            let _ = writeln!(output, "- {item}");
        }
    }
}
