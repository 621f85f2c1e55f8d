use clap::ArgMatches;
use tracing::error;

use winsync_core::events;

mod capture;
mod delete;
mod helpers;
mod list;
mod restore;
mod settings;
mod show;
mod sync;
mod tag;

use helpers::AppContext;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let ctx = AppContext::load()?;

    match matches.subcommand() {
        Some(("capture", sub_matches)) => capture::handle_capture_command(&ctx, sub_matches),
        Some(("list", sub_matches)) => list::handle_list_command(&ctx, sub_matches),
        Some(("show", sub_matches)) => show::handle_show_command(&ctx, sub_matches),
        Some(("restore", sub_matches)) => restore::handle_restore_command(&ctx, sub_matches),
        Some(("delete", sub_matches)) => delete::handle_delete_command(&ctx, sub_matches),
        Some(("tag", sub_matches)) => tag::handle_tag_command(&ctx, sub_matches),
        Some(("sync", sub_matches)) => sync::handle_sync_command(&ctx, sub_matches),
        Some(("settings", sub_matches)) => settings::handle_settings_command(&ctx, sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
