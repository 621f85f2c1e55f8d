use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info, warn};

use winsync_core::Arrangement;
use winsync_core::sync::{SyncOutcome, SyncReport};

use super::helpers::{self, AppContext};
use crate::color;

/// JSON output for one sync session.
#[derive(Serialize)]
struct SyncOutput<'a> {
    outcome: &'static str,
    adopted: &'a [Arrangement],
    kept_local: usize,
    skipped_records: usize,
}

pub(crate) fn handle_sync_command(
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.sync_started", json_output = json_output);

    let Some(engine) = ctx.sync_engine() else {
        eprintln!("{}", color::error("Sync is not configured."));
        eprintln!(
            "{}",
            color::hint("Set [sync] remote_dir in config.toml to a shared folder.")
        );
        error!(event = "cli.sync_failed", reason = "not_configured");
        return Err("Sync is not configured".into());
    };

    let report = helpers::block_on(engine.synchronize())?;

    if let SyncOutcome::Failed(e) = &report.outcome {
        error!(event = "cli.sync_failed", error = %e);
        return Err(helpers::fail("Sync failed", e, json_output));
    }

    if json_output {
        let output = SyncOutput {
            outcome: outcome_label(&report.outcome),
            adopted: &report.adopted,
            kept_local: report.kept_local,
            skipped_records: report.skipped_records,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report);
    }

    if matches!(report.outcome, SyncOutcome::Dropped) {
        warn!(event = "cli.sync_dropped");
    } else {
        info!(
            event = "cli.sync_completed",
            adopted = report.adopted.len(),
            kept_local = report.kept_local,
            skipped = report.skipped_records
        );
    }
    Ok(())
}

fn outcome_label(outcome: &SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Completed => "completed",
        SyncOutcome::Dropped => "dropped",
        SyncOutcome::Failed(_) => "failed",
    }
}

fn print_report(report: &SyncReport) {
    if matches!(report.outcome, SyncOutcome::Dropped) {
        println!("{}", color::warning("A sync is already running; nothing to do."));
        return;
    }

    if report.adopted.is_empty() {
        println!("Sync complete. No new arrangements.");
    } else {
        println!(
            "Sync complete. Added {}:",
            helpers::plural(report.adopted.len(), "arrangement", "arrangements")
        );
        for arrangement in &report.adopted {
            println!(
                "  + {} {}",
                color::success(arrangement.name()),
                color::muted(&format!("from {}", arrangement.origin_device()))
            );
        }
    }
    if report.kept_local > 0 {
        println!(
            "  {} already present locally",
            helpers::plural(report.kept_local, "arrangement", "arrangements")
        );
    }
    if report.skipped_records > 0 {
        println!(
            "  {}",
            color::warning(&format!(
                "{} could not be read and were skipped",
                helpers::plural(report.skipped_records, "record", "records")
            ))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::helpers::block_on;
    use super::super::helpers::test_support::*;
    use super::*;
    use crate::app::build_cli;
    use winsync_core::Frame;
    use winsync_core::testing::{arrangement, window_record};

    fn sync_matches() -> ArgMatches {
        let matches = build_cli()
            .try_get_matches_from(vec!["winsync", "sync"])
            .unwrap();
        matches.subcommand_matches("sync").unwrap().clone()
    }

    #[test]
    fn test_sync_adopts_remote_arrangements() {
        let t = context_with(desktop(), true);
        let remote = arrangement(
            "Laptop",
            "device-b",
            vec![window_record(
                "com.apple.Safari",
                "Docs",
                Frame::new(0.0, 0.0, 800.0, 600.0),
            )],
        );
        let engine = t.ctx.sync_engine().unwrap();
        block_on(engine.upload(&remote)).unwrap().unwrap();

        handle_sync_command(&t.ctx, &sync_matches()).unwrap();

        assert_eq!(t.ctx.repository.list(), vec![remote]);
        assert!(t.ctx.settings.last_sync_date().is_some());
    }

    #[test]
    fn test_sync_unconfigured_fails() {
        let t = context();
        assert!(handle_sync_command(&t.ctx, &sync_matches()).is_err());
    }

    #[test]
    fn test_sync_disabled_fails() {
        let t = context_with(desktop(), true);
        t.ctx.settings.set_sync_enabled(false).unwrap();

        let err = handle_sync_command(&t.ctx, &sync_matches()).unwrap_err();
        assert!(err.to_string().contains("Sync is turned off"));
    }

    #[test]
    fn test_sync_with_missing_remote_folder_fails() {
        let t = context_with(desktop(), true);
        std::fs::remove_dir_all(t.dir.path().join("remote")).unwrap();

        assert!(handle_sync_command(&t.ctx, &sync_matches()).is_err());
        assert!(t.ctx.repository.is_empty());
    }
}
