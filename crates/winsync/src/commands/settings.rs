use std::path::PathBuf;

use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info};

use winsync_core::settings::SettingsSnapshot;
use winsync_core::{SettingsError, WinSyncError};

use super::helpers::{self, AppContext};
use crate::color;

/// JSON output for `settings show`.
#[derive(Serialize)]
struct SettingsOutput {
    #[serde(flatten)]
    settings: SettingsSnapshot,
    device_id: String,
    remote_dir: Option<PathBuf>,
}

pub(crate) fn handle_settings_command(
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => handle_show(ctx, sub_matches.get_flag("json")),
        Some(("exclude", sub_matches)) => handle_exclude(ctx, bundle_id(sub_matches)?, true),
        Some(("include", sub_matches)) => handle_exclude(ctx, bundle_id(sub_matches)?, false),
        Some(("default", sub_matches)) => {
            handle_default(ctx, sub_matches.get_one::<String>("arrangement"))
        }
        Some(("sync", sub_matches)) => {
            let enabled = sub_matches
                .get_one::<String>("state")
                .is_some_and(|s| s == "on");
            handle_sync_toggle(ctx, enabled)
        }
        Some(("reset", _)) => handle_reset(ctx),
        _ => {
            error!(event = "cli.settings_subcommand_unknown");
            Err("Unknown settings subcommand".into())
        }
    }
}

fn bundle_id(matches: &ArgMatches) -> Result<&str, Box<dyn std::error::Error>> {
    let id = matches
        .get_one::<String>("bundle-id")
        .map(|s| s.trim())
        .ok_or("Bundle id is required")?;
    if id.is_empty() {
        return Err("Bundle id cannot be empty".into());
    }
    Ok(id)
}

fn handle_show(ctx: &AppContext, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.settings_show_started", json_output = json_output);

    let snapshot = ctx.settings.snapshot();
    let remote_dir = ctx.config.remote_dir();

    if json_output {
        let output = SettingsOutput {
            settings: snapshot,
            device_id: ctx.device_id.clone(),
            remote_dir,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let sync_state = if snapshot.sync_enabled {
        color::success("on")
    } else {
        color::muted("off")
    };
    println!("Sync:                {}", sync_state);
    match &remote_dir {
        Some(dir) => println!("Remote folder:       {}", dir.display()),
        None => println!("Remote folder:       {}", color::muted("(not configured)")),
    }
    match snapshot.last_sync_date {
        Some(date) => println!(
            "Last sync:           {}",
            date.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("Last sync:           {}", color::muted("never")),
    }
    println!("Device:              {}", ctx.device_id);
    match &snapshot.default_arrangement {
        Some(default) => {
            let label = match ctx.repository.lookup(default) {
                Some(arrangement) => color::accent(arrangement.name()),
                None => color::warning(&format!("{} (missing)", default)),
            };
            println!("Default arrangement: {}", label);
        }
        None => println!("Default arrangement: {}", color::muted("(none)")),
    }
    println!("Excluded apps:");
    for app in &snapshot.excluded_apps {
        println!("  - {}", app);
    }

    info!(event = "cli.settings_show_completed");
    Ok(())
}

fn handle_exclude(
    ctx: &AppContext,
    bundle_id: &str,
    exclude: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        event = "cli.settings_exclude_started",
        bundle_id = bundle_id,
        exclude = exclude
    );

    let changed = if exclude {
        ctx.settings.add_excluded_app(bundle_id)
    } else {
        ctx.settings.remove_excluded_app(bundle_id)
    }
    .map_err(|e| settings_failed(&e))?;

    match (exclude, changed) {
        (true, true) => println!("Excluded {} from capture", color::accent(bundle_id)),
        (true, false) => println!("{} is already excluded", color::accent(bundle_id)),
        (false, true) => println!("{} will be captured again", color::accent(bundle_id)),
        (false, false) => println!("{} was not excluded", color::accent(bundle_id)),
    }

    info!(event = "cli.settings_exclude_completed", changed = changed);
    Ok(())
}

fn handle_default(
    ctx: &AppContext,
    query: Option<&String>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.settings_default_started", query = ?query);

    let Some(query) = query else {
        ctx.settings
            .set_default_arrangement(None)
            .map_err(|e| settings_failed(&e))?;
        println!("Cleared the default arrangement.");
        info!(event = "cli.settings_default_completed", cleared = true);
        return Ok(());
    };

    let arrangement = ctx.require_arrangement(query, "cli.settings_default_failed")?;
    // Stored by id so a later arrangement with the same name does not take over.
    ctx.settings
        .set_default_arrangement(Some(&arrangement.id().to_string()))
        .map_err(|e| settings_failed(&e))?;
    println!(
        "Default arrangement set to {}",
        color::accent(arrangement.name())
    );

    info!(
        event = "cli.settings_default_completed",
        id = %arrangement.id()
    );
    Ok(())
}

fn handle_sync_toggle(ctx: &AppContext, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.settings_sync_started", enabled = enabled);

    ctx.settings
        .set_sync_enabled(enabled)
        .map_err(|e| settings_failed(&e))?;

    if enabled {
        println!("Sync turned {}", color::success("on"));
        if !ctx.config.is_sync_configured() {
            println!(
                "{}",
                color::warning("Set [sync] remote_dir in config.toml before running 'winsync sync'.")
            );
        }
    } else {
        println!("Sync turned {}", color::muted("off"));
    }

    info!(event = "cli.settings_sync_completed", enabled = enabled);
    Ok(())
}

fn handle_reset(ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.settings_reset_started");
    ctx.settings.reset_all().map_err(|e| settings_failed(&e))?;
    println!("Settings restored to defaults.");
    info!(event = "cli.settings_reset_completed");
    Ok(())
}

fn settings_failed(e: &SettingsError) -> Box<dyn std::error::Error> {
    error!(
        event = "cli.settings_failed",
        error_code = e.error_code(),
        error = %e
    );
    helpers::fail("Failed to update settings", e, false)
}

#[cfg(test)]
mod tests {
    use super::super::helpers::block_on;
    use super::super::helpers::test_support::*;
    use super::*;
    use crate::app::build_cli;

    fn settings_matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["winsync", "settings"];
        argv.extend_from_slice(args);
        let matches = build_cli().try_get_matches_from(argv).unwrap();
        matches.subcommand_matches("settings").unwrap().clone()
    }

    #[test]
    fn test_exclude_and_include() {
        let t = context();
        handle_settings_command(&t.ctx, &settings_matches(&["exclude", "com.example.chat"]))
            .unwrap();
        assert!(t.ctx.settings.is_app_excluded("com.example.chat"));

        handle_settings_command(&t.ctx, &settings_matches(&["include", "com.example.chat"]))
            .unwrap();
        assert!(!t.ctx.settings.is_app_excluded("com.example.chat"));
    }

    #[test]
    fn test_default_stores_id_and_clears() {
        let t = context();
        let saved = block_on(t.ctx.manager().unwrap().save_current_arrangement("Work", &[]))
            .unwrap()
            .unwrap();

        handle_settings_command(&t.ctx, &settings_matches(&["default", "Work"])).unwrap();
        assert_eq!(
            t.ctx.settings.default_arrangement(),
            Some(saved.id().to_string())
        );

        handle_settings_command(&t.ctx, &settings_matches(&["default"])).unwrap();
        assert_eq!(t.ctx.settings.default_arrangement(), None);
    }

    #[test]
    fn test_default_unknown_arrangement_fails() {
        let t = context();
        assert!(handle_settings_command(&t.ctx, &settings_matches(&["default", "Nope"])).is_err());
        assert_eq!(t.ctx.settings.default_arrangement(), None);
    }

    #[test]
    fn test_sync_toggle_and_reset() {
        let t = context();
        handle_settings_command(&t.ctx, &settings_matches(&["sync", "off"])).unwrap();
        assert!(!t.ctx.settings.sync_enabled());

        handle_settings_command(&t.ctx, &settings_matches(&["reset"])).unwrap();
        assert!(t.ctx.settings.sync_enabled());
    }

    #[test]
    fn test_show_text_and_json() {
        let t = context();
        handle_settings_command(&t.ctx, &settings_matches(&["show"])).unwrap();
        handle_settings_command(&t.ctx, &settings_matches(&["show", "--json"])).unwrap();
    }
}
