//! CLI smoke entry point.
//!
//! # Responsibility
//! - Bootstrap `tasklist_core` from environment configuration.
//! - Print every list grouped by urgency section for quick local checks.

use chrono::Utc;
use std::process::ExitCode;
use tasklist_core::{bootstrap, init_logging, AppConfig, DefaultSorting, SortingStrategy};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Logging is best-effort for the probe; the snapshot still prints.
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("logging disabled: {err}");
    }

    let app = match bootstrap(&config).await {
        Ok(app) => app,
        Err(err) => {
            eprintln!("bootstrap failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("tasklist_core version={}", tasklist_core::core_version());
    if let Some(store) = app.repo.store() {
        println!("store={}", store.path().display());
    }

    let sorting = DefaultSorting::new();
    let now = Utc::now();
    for list in app.lists.lists() {
        println!("\n{} ({})", list.name, list.len());
        let projection = sorting.build_sections(&list.tasks, now);
        for group in &projection.sections {
            println!("  {}", group.section);
            for task in &group.tasks {
                println!("    [{}] {}", task.priority().as_str(), task.title());
            }
        }
        if !projection.completed.is_empty() {
            println!("  Completed");
            for task in &projection.completed {
                println!("    [x] {}", task.title());
            }
        }
    }

    ExitCode::SUCCESS
}
