use clap::ArgMatches;
use tracing::{error, info};

use super::helpers::{self, AppContext};
use crate::color;

pub(crate) fn handle_tag_command(
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let (action, sub_matches) = match matches.subcommand() {
        Some(("add", sub)) => ("add", sub),
        Some(("remove", sub)) => ("remove", sub),
        _ => {
            error!(event = "cli.tag_subcommand_unknown");
            return Err("Unknown tag subcommand".into());
        }
    };
    let query = sub_matches
        .get_one::<String>("arrangement")
        .ok_or("Arrangement argument is required")?;
    let tag = sub_matches
        .get_one::<String>("tag")
        .ok_or("Tag argument is required")?;

    info!(
        event = "cli.tag_started",
        action = action,
        query = query.as_str(),
        tag = tag.as_str()
    );

    let arrangement = ctx.require_arrangement(query, "cli.tag_failed")?;
    let manager = ctx.manager().map_err(|e| {
        error!(event = "cli.tag_failed", error = %e);
        helpers::fail("Cannot update tags", &e, false)
    })?;

    let result = if action == "add" {
        manager.add_tag(&arrangement.id(), tag)
    } else {
        manager.remove_tag(&arrangement.id(), tag)
    };

    let updated = result.map_err(|e| {
        error!(event = "cli.tag_failed", id = %arrangement.id(), error = %e);
        helpers::fail("Failed to update tags", &e, false)
    })?;

    let tags = if updated.tags().is_empty() {
        color::muted("(none)")
    } else {
        updated.tags().join(", ")
    };
    println!("{}: {}", color::accent(updated.name()), tags);

    info!(
        event = "cli.tag_completed",
        id = %updated.id(),
        tag_count = updated.tags().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::helpers::block_on;
    use super::super::helpers::test_support::*;
    use super::*;
    use crate::app::build_cli;

    fn tag_matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["winsync", "tag"];
        argv.extend_from_slice(args);
        let matches = build_cli().try_get_matches_from(argv).unwrap();
        matches.subcommand_matches("tag").unwrap().clone()
    }

    #[test]
    fn test_tag_add_then_remove() {
        let t = context();
        block_on(t.ctx.manager().unwrap().save_current_arrangement("Work", &[]))
            .unwrap()
            .unwrap();

        handle_tag_command(&t.ctx, &tag_matches(&["add", "Work", "focus"])).unwrap();
        assert!(t.ctx.repository.lookup("Work").unwrap().has_tag("focus"));

        handle_tag_command(&t.ctx, &tag_matches(&["remove", "Work", "focus"])).unwrap();
        assert!(!t.ctx.repository.lookup("Work").unwrap().has_tag("focus"));
    }

    #[test]
    fn test_tag_add_rejects_blank_tag() {
        let t = context();
        block_on(t.ctx.manager().unwrap().save_current_arrangement("Work", &[]))
            .unwrap()
            .unwrap();

        assert!(handle_tag_command(&t.ctx, &tag_matches(&["add", "Work", "  "])).is_err());
    }
}
