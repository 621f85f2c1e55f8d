use clap::ArgMatches;
use tracing::info;

use super::helpers::AppContext;
use crate::table;

pub(crate) fn handle_list_command(
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.list_started", json_output = json_output);

    let arrangements = ctx.repository.list();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&arrangements)?);
    } else if arrangements.is_empty() {
        println!("No saved arrangements. Save one with 'winsync capture <name>'.");
    } else {
        println!("Saved arrangements:");
        table::print_arrangements_table(&arrangements, &ctx.device_id);
    }

    info!(event = "cli.list_completed", count = arrangements.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::helpers::test_support::*;
    use super::*;
    use crate::app::build_cli;

    fn list_matches(json: bool) -> ArgMatches {
        let argv = if json {
            vec!["winsync", "list", "--json"]
        } else {
            vec!["winsync", "list"]
        };
        let matches = build_cli().try_get_matches_from(argv).unwrap();
        matches.subcommand_matches("list").unwrap().clone()
    }

    #[test]
    fn test_list_empty_and_populated() {
        let t = context();
        handle_list_command(&t.ctx, &list_matches(false)).unwrap();

        let manager = t.ctx.manager().unwrap();
        super::super::helpers::block_on(manager.save_current_arrangement("Work", &[]))
            .unwrap()
            .unwrap();

        handle_list_command(&t.ctx, &list_matches(false)).unwrap();
        handle_list_command(&t.ctx, &list_matches(true)).unwrap();
    }

    #[test]
    fn test_list_needs_no_window_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = winsync_core::WinSyncPaths::from_dir(dir.path());
        let ctx = AppContext::open(&paths, winsync_core::WinSyncConfig::default(), None);
        handle_list_command(&ctx, &list_matches(true)).unwrap();
    }
}
