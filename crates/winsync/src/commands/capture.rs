use clap::ArgMatches;
use tracing::{error, info, warn};

use winsync_core::Arrangement;

use super::helpers::{self, AppContext};
use crate::color;

pub(crate) fn handle_capture_command(
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("Arrangement name is required")?;
    let tags: Vec<String> = matches
        .get_many::<String>("tag")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let upload = matches.get_flag("upload");

    info!(
        event = "cli.capture_started",
        name = name.as_str(),
        tag_count = tags.len(),
        upload = upload
    );

    let arrangement = capture(ctx, name, &tags)?;

    println!(
        "Saved arrangement {} ({})",
        color::accent(arrangement.name()),
        helpers::plural(arrangement.window_count(), "window", "windows")
    );
    println!("  ID: {}", color::muted(&arrangement.id().to_string()));
    if !arrangement.tags().is_empty() {
        println!("  Tags: {}", arrangement.tags().join(", "));
    }

    if upload {
        upload_arrangement(ctx, &arrangement)?;
    }

    info!(
        event = "cli.capture_completed",
        id = %arrangement.id(),
        window_count = arrangement.window_count()
    );
    Ok(())
}

fn capture(
    ctx: &AppContext,
    name: &str,
    tags: &[String],
) -> Result<Arrangement, Box<dyn std::error::Error>> {
    let manager = ctx.manager().map_err(|e| {
        error!(event = "cli.capture_failed", error = %e);
        helpers::fail("Cannot capture windows", &e, false)
    })?;

    helpers::block_on(manager.save_current_arrangement(name, tags))?.map_err(|e| {
        error!(event = "cli.capture_failed", error = %e);
        helpers::fail("Failed to capture arrangement", &e, false)
    })
}

fn upload_arrangement(
    ctx: &AppContext,
    arrangement: &Arrangement,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(engine) = ctx.sync_engine() else {
        println!(
            "{}",
            color::warning("Not uploaded: set [sync] remote_dir in config.toml to enable sync.")
        );
        warn!(event = "cli.capture_upload_skipped", reason = "not_configured");
        return Ok(());
    };

    match helpers::block_on(engine.upload(arrangement))? {
        Ok(record_id) => {
            println!("  Uploaded as {}", color::muted(record_id.as_str()));
            Ok(())
        }
        Err(e) => {
            // The local save already happened; only the upload is reported.
            error!(event = "cli.capture_upload_failed", error = %e);
            Err(helpers::fail("Saved locally but upload failed", &e, false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::helpers::test_support::*;
    use super::*;
    use crate::app::build_cli;

    fn capture_matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["winsync", "capture"];
        argv.extend_from_slice(args);
        let matches = build_cli().try_get_matches_from(argv).unwrap();
        matches.subcommand_matches("capture").unwrap().clone()
    }

    #[test]
    fn test_capture_saves_arrangement() {
        let t = context();
        handle_capture_command(&t.ctx, &capture_matches(&["Work", "--tag", "desk"])).unwrap();

        let saved = t.ctx.repository.list();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name(), "Work");
        assert!(saved[0].has_tag("desk"));
        assert_eq!(saved[0].origin_device(), "device-a");
    }

    #[test]
    fn test_capture_with_upload_writes_remote_record() {
        let t = context_with(desktop(), true);
        handle_capture_command(&t.ctx, &capture_matches(&["Work", "--upload"])).unwrap();

        let saved = &t.ctx.repository.list()[0];
        let record = t
            .dir
            .path()
            .join("remote")
            .join("WindowArrangement")
            .join(format!("{}.json", saved.id()));
        assert!(record.exists());
    }

    #[test]
    fn test_capture_upload_without_remote_still_saves() {
        let t = context();
        handle_capture_command(&t.ctx, &capture_matches(&["Work", "--upload"])).unwrap();
        assert_eq!(t.ctx.repository.len(), 1);
    }

    #[test]
    fn test_capture_denied_saves_nothing() {
        let t = context_with(desktop().deny_inspection(), false);
        assert!(handle_capture_command(&t.ctx, &capture_matches(&["Work"])).is_err());
        assert!(t.ctx.repository.is_empty());
    }
}
