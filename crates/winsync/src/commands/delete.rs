use clap::ArgMatches;
use tracing::{error, info, warn};

use winsync_core::Arrangement;

use super::helpers::{self, AppContext};
use crate::color;

pub(crate) fn handle_delete_command(
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = matches
        .get_one::<String>("arrangement")
        .ok_or("Arrangement argument is required")?;
    let remote = matches.get_flag("remote");

    info!(
        event = "cli.delete_started",
        query = query.as_str(),
        remote = remote
    );

    let arrangement = ctx.require_arrangement(query, "cli.delete_failed")?;

    // Remote first, so a failed remote delete leaves the local copy to retry from.
    if remote {
        delete_remote(ctx, &arrangement)?;
    }

    if let Err(e) = ctx.repository.delete(&arrangement.id()) {
        error!(event = "cli.delete_failed", id = %arrangement.id(), error = %e);
        return Err(helpers::fail("Failed to delete arrangement", &e, false));
    }
    println!("Deleted arrangement {}", color::accent(arrangement.name()));

    clear_default_if_matches(ctx, &arrangement);

    info!(event = "cli.delete_completed", id = %arrangement.id());
    Ok(())
}

fn delete_remote(
    ctx: &AppContext,
    arrangement: &Arrangement,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(engine) = ctx.sync_engine() else {
        println!(
            "{}",
            color::warning("Sync is not configured; only the local copy will be deleted.")
        );
        warn!(event = "cli.delete_remote_skipped", reason = "not_configured");
        return Ok(());
    };

    match helpers::block_on(engine.delete(arrangement))? {
        Ok(()) => {
            println!("Removed {} from the remote store", color::accent(arrangement.name()));
            Ok(())
        }
        Err(e) => {
            error!(event = "cli.delete_remote_failed", id = %arrangement.id(), error = %e);
            Err(helpers::fail("Failed to delete remote copy", &e, false))
        }
    }
}

fn clear_default_if_matches(ctx: &AppContext, arrangement: &Arrangement) {
    let Some(default) = ctx.settings.default_arrangement() else {
        return;
    };
    if default != arrangement.name() && default != arrangement.id().to_string() {
        return;
    }
    // Another arrangement may still answer to the same name.
    if ctx.repository.lookup(&default).is_some() {
        return;
    }
    match ctx.settings.set_default_arrangement(None) {
        Ok(()) => println!("{}", color::muted("Cleared the default arrangement.")),
        Err(e) => warn!(event = "cli.delete_default_clear_failed", error = %e),
    }
}
