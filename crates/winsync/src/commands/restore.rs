use clap::ArgMatches;
use tracing::{error, info, warn};

use winsync_core::RestoreReport;

use super::helpers::{self, AppContext};
use crate::color;

pub(crate) fn handle_restore_command(
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let query = match matches.get_one::<String>("arrangement") {
        Some(query) => query.clone(),
        None => match ctx.settings.default_arrangement() {
            Some(default) => default,
            None => {
                eprintln!(
                    "{}",
                    color::error("No arrangement given and no default arrangement is set.")
                );
                eprintln!(
                    "{}",
                    color::hint("Set one with 'winsync settings default <arrangement>'.")
                );
                error!(event = "cli.restore_failed", reason = "no_default");
                return Err("No arrangement to restore".into());
            }
        },
    };

    info!(
        event = "cli.restore_started",
        query = query.as_str(),
        json_output = json_output
    );

    let arrangement = ctx.require_arrangement(&query, "cli.restore_failed")?;
    let manager = ctx.manager().map_err(|e| {
        error!(event = "cli.restore_failed", error = %e);
        helpers::fail("Cannot restore windows", &e, json_output)
    })?;

    let report = helpers::block_on(manager.restore_arrangement(&arrangement.id()))?.map_err(|e| {
        error!(event = "cli.restore_failed", error = %e);
        helpers::fail("Failed to restore arrangement", &e, json_output)
    })?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.is_complete() {
        info!(
            event = "cli.restore_completed",
            id = %report.arrangement_id,
            restored = report.restored_count()
        );
        Ok(())
    } else {
        let failed = report.total() - report.restored_count();
        warn!(
            event = "cli.restore_partial",
            id = %report.arrangement_id,
            restored = report.restored_count(),
            failed = failed
        );
        Err(format!(
            "{} of {} could not be restored",
            helpers::plural(failed, "window", "windows"),
            report.total()
        )
        .into())
    }
}

fn print_report(report: &RestoreReport) {
    println!(
        "Restoring {} ({}):",
        color::accent(&report.arrangement_name),
        helpers::plural(report.total(), "window", "windows")
    );
    for outcome in &report.outcomes {
        let marker = if outcome.status.is_restored() { "✓" } else { "✗" };
        println!(
            "  {} {}",
            color::restore_status(outcome.status.is_restored(), marker),
            outcome.summary()
        );
    }
    println!(
        "\n{} of {} restored",
        report.restored_count(),
        report.total()
    );
}
