use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

mod aggregate;
mod classify;
mod comments;
mod directory;
mod error;
mod ingest;
mod models;
mod report;
mod resolve;

use directory::LecturerDirectory;
use models::{CommentRecord, SummaryRow};

#[derive(Parser)]
#[command(name = "srte-reporter")]
#[command(
    about = "SRTE evaluation analysis and report generator for the Office of Institutional Effectiveness",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Standardize, aggregate, and classify a raw evaluation sheet
    Analyze {
        /// Raw evaluation sheet (CSV)
        #[arg(long)]
        data: PathBuf,
        /// Lecturer directory (CSV)
        #[arg(long)]
        directory: PathBuf,
        /// Bucket rules override (JSON); built-in school rules when omitted
        #[arg(long)]
        rules: Option<PathBuf>,
        #[arg(long, default_value = "summaries")]
        out_dir: PathBuf,
    },
    /// Render one report document per lecturer/course summary row
    Report {
        /// Summary sheet with registration data joined in (CSV)
        #[arg(long)]
        summary: PathBuf,
        /// Comment sheet (CSV)
        #[arg(long)]
        comments: PathBuf,
        /// Lecturer directory (CSV)
        #[arg(long)]
        directory: PathBuf,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        session: String,
        /// Render only this lecturer's reports
        #[arg(long)]
        lecturer: Option<String>,
        #[arg(long, default_value = "reports")]
        out_dir: PathBuf,
    },
    /// List course-code prefixes absent from the classification rules
    CheckCodes {
        /// Raw evaluation sheet (CSV)
        #[arg(long)]
        data: PathBuf,
        /// Bucket rules override (JSON); built-in school rules when omitted
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            data,
            directory,
            rules,
            out_dir,
        } => run_analyze(&data, &directory, rules.as_deref(), &out_dir),
        Commands::Report {
            summary,
            comments,
            directory,
            semester,
            session,
            lecturer,
            out_dir,
        } => run_report(
            &summary,
            &comments,
            &directory,
            &semester,
            &session,
            lecturer.as_deref(),
            &out_dir,
        ),
        Commands::CheckCodes { data, rules } => run_check_codes(&data, rules.as_deref()),
    }
}

// A broken or missing directory degrades to an empty roster instead of
// aborting: downstream stages then flag every lecturer as unresolved.
fn load_directory_or_warn(path: &Path) -> LecturerDirectory {
    match LecturerDirectory::load(path) {
        Ok(directory) => {
            println!(
                "Loaded {} lecturers from {}.",
                directory.len(),
                path.display()
            );
            for conflict in directory.conflicts() {
                eprintln!("Warning: {conflict}");
            }
            directory
        }
        Err(err) => {
            eprintln!("Warning: {err}");
            eprintln!("Continuing without a lecturer directory; every name will be unresolved.");
            LecturerDirectory::empty()
        }
    }
}

fn resolve_rules(rules: Option<&Path>) -> anyhow::Result<Vec<classify::BucketRule>> {
    match rules {
        Some(path) => classify::load_rules(path)
            .with_context(|| format!("failed to load bucket rules from {}", path.display())),
        None => Ok(classify::default_rules()),
    }
}

fn run_analyze(
    data: &Path,
    directory_path: &Path,
    rules: Option<&Path>,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let rules = resolve_rules(rules)?;
    let directory = load_directory_or_warn(directory_path);

    let raw = ingest::load_raw_data(data)
        .with_context(|| format!("failed to read raw data from {}", data.display()))?;
    let submissions = raw.len();
    println!("Loaded {submissions} submissions from {}.", data.display());

    let (standardized, unmatched) = resolve::resolve_all(raw, &directory);
    if !unmatched.is_empty() {
        println!("Unmatched lecturer names ({}):", unmatched.len());
        for name in &unmatched {
            println!("- {name}");
        }
    }

    let (rows, failures) = aggregate::aggregate(&standardized);
    let data_quality: Vec<String> = failures.iter().map(|failure| failure.to_string()).collect();
    for message in &data_quality {
        eprintln!("Warning: {message}");
    }

    let buckets = classify::classify(&rows, &rules);
    let dropped: Vec<String> = classify::unclassified(&rows, &rules)
        .iter()
        .map(|row| format!("{} ({})", row.course_title, row.lecturer_name))
        .collect();
    for course in &dropped {
        println!("Unclassified: {course}");
    }

    let known = classify::known_prefixes(&rules);
    let titles: Vec<&str> = standardized
        .iter()
        .map(|record| record.course_title.as_str())
        .collect();
    let unknown = classify::find_unknown_prefixes(titles, &known);

    let written = report::write_bucket_summaries(out_dir, &buckets)?;
    for path in &written {
        println!("Summary written to {}.", path.display());
    }

    let diagnostics = report::RunDiagnostics {
        unmatched_lecturers: &unmatched,
        alias_conflicts: directory.conflicts(),
        data_quality: &data_quality,
        unknown_prefixes: &unknown,
        unclassified_courses: &dropped,
    };
    let run_summary = report::build_run_summary(
        Utc::now().date_naive(),
        submissions,
        rows.len(),
        &buckets,
        &diagnostics,
    );
    let summary_path = out_dir.join("analysis_run.md");
    std::fs::write(&summary_path, run_summary)?;
    println!("Run summary written to {}.", summary_path.display());

    Ok(())
}

fn run_report(
    summary: &Path,
    comments_path: &Path,
    directory_path: &Path,
    semester: &str,
    session: &str,
    lecturer: Option<&str>,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let directory = load_directory_or_warn(directory_path);

    let (mut rows, skipped) = ingest::load_summary_data(summary)
        .with_context(|| format!("failed to read summary data from {}", summary.display()))?;
    for note in &skipped {
        eprintln!("Warning: {note}");
    }

    let unmatched = resolve::standardize_summary(&mut rows, &directory);
    if !unmatched.is_empty() {
        println!("Unmatched lecturer names in summary ({}):", unmatched.len());
        for name in &unmatched {
            println!("- {name}");
        }
    }

    let comment_records = ingest::load_comment_data(comments_path)
        .with_context(|| format!("failed to read comments from {}", comments_path.display()))?;
    // Standardize comment identities too, so they join on the same key as
    // the summary rows.
    let comment_records: Vec<CommentRecord> = comment_records
        .into_iter()
        .map(|mut record| {
            let trimmed = record.lecturer_name.trim().to_string();
            record.lecturer_name = match directory.official_for(&trimmed) {
                Some(official) => official.to_string(),
                None => trimmed,
            };
            record
        })
        .collect();

    let rows: Vec<SummaryRow> = match lecturer {
        Some(name) => {
            let filtered: Vec<SummaryRow> = rows
                .into_iter()
                .filter(|row| row.lecturer_name.eq_ignore_ascii_case(name.trim()))
                .collect();
            if filtered.is_empty() {
                anyhow::bail!("no summary rows for lecturer '{name}'");
            }
            filtered
        }
        None => rows,
    };

    std::fs::create_dir_all(out_dir)?;
    let mut rendered = 0usize;
    let mut failures: Vec<String> = Vec::new();

    for row in &rows {
        let matching: Vec<&CommentRecord> = comment_records
            .iter()
            .filter(|record| {
                record.course_title == row.course_title
                    && record.lecturer_name == row.lecturer_name
            })
            .collect();
        let likes_raw: Vec<String> = matching.iter().map(|record| record.likes.clone()).collect();
        let dislikes_raw: Vec<String> = matching
            .iter()
            .map(|record| record.dislikes.clone())
            .collect();

        let likes = comments::aggregate_comments(&likes_raw, None);
        let dislikes = comments::aggregate_comments(&dislikes_raw, None);

        let document = report::build_document(row, &likes, &dislikes, semester, session);
        let path = out_dir.join(report::report_filename(&row.lecturer_name, &row.course_title));
        match report::write_document(&path, &document) {
            Ok(()) => {
                rendered += 1;
                println!("Report written to {}.", path.display());
            }
            Err(err) => failures.push(err.to_string()),
        }
    }

    for failure in &failures {
        eprintln!("Warning: {failure}");
    }
    println!("Rendered {rendered} of {} reports.", rows.len());

    Ok(())
}

fn run_check_codes(data: &Path, rules: Option<&Path>) -> anyhow::Result<()> {
    let rules = resolve_rules(rules)?;
    let raw = ingest::load_raw_data(data)
        .with_context(|| format!("failed to read raw data from {}", data.display()))?;

    let known = classify::known_prefixes(&rules);
    let titles: Vec<&str> = raw
        .iter()
        .map(|record| record.course_title.as_str())
        .collect();
    let unknown = classify::find_unknown_prefixes(titles, &known);

    if unknown.is_empty() {
        println!("No new course codes found.");
    } else {
        println!("New course codes found ({}):", unknown.len());
        for code in &unknown {
            println!("- {code}");
        }
    }

    Ok(())
}
