use clap::ArgMatches;
use tracing::info;

use super::helpers::AppContext;
use crate::color;
use crate::table;

pub(crate) fn handle_show_command(
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = matches
        .get_one::<String>("arrangement")
        .ok_or("Arrangement argument is required")?;
    let json_output = matches.get_flag("json");

    info!(
        event = "cli.show_started",
        query = query.as_str(),
        json_output = json_output
    );

    let arrangement = ctx.require_arrangement(query, "cli.show_failed")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&arrangement)?);
    } else {
        println!("{}", color::bold(arrangement.name()));
        println!("  ID:       {}", arrangement.id());
        println!(
            "  Created:  {}",
            arrangement.created_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!(
            "  Updated:  {}",
            arrangement.updated_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
        let origin = if arrangement.is_from_device(&ctx.device_id) {
            format!("{} (this device)", arrangement.origin_device())
        } else {
            arrangement.origin_device().to_string()
        };
        println!("  Origin:   {}", origin);
        if !arrangement.tags().is_empty() {
            println!("  Tags:     {}", arrangement.tags().join(", "));
        }
        println!();
        if arrangement.windows().is_empty() {
            println!("{}", color::muted("No windows recorded."));
        } else {
            table::print_windows_table(arrangement.windows());
        }
    }

    info!(
        event = "cli.show_completed",
        id = %arrangement.id(),
        window_count = arrangement.window_count()
    );
    Ok(())
}
