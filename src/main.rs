mod cache;
mod coordinator;
mod error;
mod fetch;
mod parser;
mod quality;
mod records;
mod registry;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use coordinator::ExtractionCoordinator;
use fetch::{FilePageFetcher, HttpPageFetcher, PageFetcher};
use parser::{StrategyKind, DEFAULT_LOOK_AHEAD};
use quality::ScoreConfig;
use records::{ExtractionRequest, ExtractionResult};

#[derive(Parser)]
#[command(name = "course_scraper", about = "Course catalog extraction engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract course sections for one term/subject
    Search {
        /// Academic term, e.g. "Fall 2025"
        #[arg(short, long)]
        term: String,
        /// Subject code, e.g. COMM
        #[arg(short, long)]
        subject: String,
        /// Filter by course number, e.g. 108
        #[arg(short, long)]
        course: Option<String>,
        /// Filter by campus name
        #[arg(long)]
        campus: Option<String>,
        /// Read a saved results-page dump instead of fetching
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Schedule search URL to fetch from
        #[arg(short, long)]
        url: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay saved catalog dumps through every strategy and score them
    Validate {
        /// Directory of .txt page dumps
        dir: PathBuf,
        /// Subject code; inferred from each dump when omitted
        #[arg(short, long)]
        subject: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search { term, subject, course, campus, file, url, json } => {
            run_search(term, subject, course, campus, file, url, json).await
        }
        Commands::Validate { dir, subject } => run_validate(&dir, subject.as_deref()),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

#[allow(clippy::too_many_arguments)]
async fn run_search(
    term: String,
    subject: String,
    course: Option<String>,
    campus: Option<String>,
    file: Option<PathBuf>,
    url: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let fetcher: Arc<dyn PageFetcher> = match (file, url) {
        (Some(path), _) => Arc::new(FilePageFetcher::new(path)),
        (None, Some(url)) => Arc::new(HttpPageFetcher::new(url)?),
        (None, None) => anyhow::bail!("pass --file or --url to supply the results page"),
    };

    let coordinator = ExtractionCoordinator::with_defaults(fetcher);
    let request = ExtractionRequest { term, subject, course_number: course, campus };
    let result = coordinator.extract(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result(&result);
    Ok(())
}

fn print_result(result: &ExtractionResult) {
    if result.courses.is_empty() {
        println!("No sections found.");
    } else {
        println!(
            "{:<9} | {:<5} | {:<4} | {:<19} | {:<12} | {:<8} | {:<20} | {:>5} | {:>4} | {}",
            "Course", "CRN", "Days", "Time", "Campus", "Room", "Instructor", "Seats", "Wait", "Status"
        );
        println!("{}", "-".repeat(118));
        for c in &result.courses {
            println!(
                "{:<9} | {:<5} | {:<4} | {:<19} | {:<12} | {:<8} | {:<20} | {:>5} | {:>4} | {}",
                truncate(&c.course_code, 9),
                c.crn,
                c.days,
                truncate(&c.time_range, 19),
                truncate(&c.campus, 12),
                truncate(&c.location, 8),
                truncate(&c.instructor, 20),
                c.seats_available,
                c.waitlist_count,
                c.status_label,
            );
        }
    }

    let m = &result.metadata;
    println!(
        "\n{} sections ({} before filters) | parser: {} | score: {}{} | cached: {}",
        result.courses.len(),
        m.total_courses,
        m.parser_used,
        m.quality_score,
        if m.needs_improvement { " (needs improvement)" } else { "" },
        m.from_cache,
    );
}

struct DumpReport {
    name: String,
    subject: String,
    rows: Vec<(&'static str, u8, usize)>,
}

impl DumpReport {
    fn print(&self, config: &ScoreConfig) {
        println!("\n{} ({})", self.name, self.subject);
        for (strategy, score, count) in &self.rows {
            let marker = if *score >= config.pass_threshold { "ok " } else { "LOW" };
            println!("  {} {:<26} score {:>3}  {} sections", marker, strategy, score, count);
        }
        if let Some((best, score, _)) = self.rows.iter().max_by_key(|(_, score, _)| *score) {
            println!("  best: {} ({})", best, score);
        }
    }
}

fn run_validate(dir: &Path, subject: Option<&str>) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    if files.is_empty() {
        println!("No .txt dumps in {}", dir.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len}")?
            .progress_chars("=> "),
    );

    let config = ScoreConfig::default();
    let reports: Vec<anyhow::Result<DumpReport>> = files
        .par_iter()
        .map(|path| {
            let report = validate_dump(path, subject, &config);
            pb.inc(1);
            report
        })
        .collect();
    pb.finish_and_clear();

    for report in reports {
        match report {
            Ok(report) => report.print(&config),
            Err(e) => eprintln!("error: {:#}", e),
        }
    }
    Ok(())
}

fn validate_dump(
    path: &Path,
    subject: Option<&str>,
    config: &ScoreConfig,
) -> anyhow::Result<DumpReport> {
    let raw = std::fs::read_to_string(path)?;
    let lines = parser::tokenize(&raw);
    let subject = subject
        .map(str::to_string)
        .or_else(|| parser::lines::dominant_subject(&lines))
        .ok_or_else(|| anyhow::anyhow!("no course anchors in {}", path.display()))?;

    let rows = StrategyKind::ALL
        .iter()
        .map(|kind| {
            let records = parser::run_strategy(*kind, &lines, &subject, DEFAULT_LOOK_AHEAD);
            (kind.name(), quality::score(&records, config), records.len())
        })
        .collect();

    Ok(DumpReport {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        subject,
        rows,
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
