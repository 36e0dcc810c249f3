use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use termexam::api::{AssessmentApi, HttpAssessmentApi};
use termexam::cli::Cli;
use termexam::clock::Clock;
use termexam::config::{default_log_path, load_config_from, Config};
use termexam::model::{AssessmentAssignment, ListingStats};
use termexam::state::AppState;
use termexam::timer::format_clock;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config_from(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    init_tracing(&config, cli.is_interactive())?;
    tracing::debug!(?config, "configuration loaded");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;

    let api: Arc<dyn AssessmentApi> = Arc::new(HttpAssessmentApi::new(
        &config.base_url,
        config.token.clone(),
        config.request_timeout_secs,
    )?);

    if let Some(id) = cli.result {
        let result = rt
            .block_on(api.fetch_result(id))
            .with_context(|| format!("cannot load result of assessment {id}"))?;
        println!("Score:     {:.1}%", result.score_percentage);
        println!("Questions: {}", result.total_questions);
        println!("Correct:   {}", result.correct_answers);
        println!("Incorrect: {}", result.incorrect_answers);
        println!("Time:      {}", format_clock(result.time_spent_seconds));
        return Ok(());
    }

    let assignments = rt
        .block_on(api.list_available())
        .context("cannot load assigned assessments")?;

    if cli.list {
        print_listing(&assignments);
        return Ok(());
    }

    let state = AppState::new(assignments, Clock::System);
    termexam::tui::run_tui(state, api, &rt)
}

/// The TUI owns the terminal, so interactive runs log to a file.
fn init_tracing(config: &Config, interactive: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("termexam=info".parse()?);

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let Some(path) = config.log_file.clone().or_else(default_log_path) else {
        // No usable data dir: run without a log
        return Ok(());
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    let file = open_log(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn open_log(path: &Path) -> Result<fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

fn print_listing(assignments: &[AssessmentAssignment]) {
    let now = chrono::Utc::now();
    for a in assignments {
        let display = a.display_state(now);
        println!(
            "{:>5}  {} {:<12} {:<30} {:>8}  {} questions",
            a.id,
            display.icon(),
            display.label(),
            a.name,
            format_clock(a.duration),
            a.question_count
        );
    }
    let stats = ListingStats::from_assignments(assignments, now);
    println!(
        "{} assigned, {} available, {} in progress, {} completed",
        stats.total, stats.available, stats.in_progress, stats.completed
    );
}
