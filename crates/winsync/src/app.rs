use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("winsync")
        .about("Save, restore and sync window arrangements")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("capture")
                .about("Capture the current windows and save them as an arrangement")
                .arg(
                    Arg::new("name")
                        .help("Name of the arrangement")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .short('t')
                        .help("Tag to attach (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("upload")
                        .long("upload")
                        .help("Upload to the shared remote store after saving")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List saved arrangements")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("show")
                .about("Show the windows of one arrangement")
                .arg(arrangement_arg(true))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("restore")
                .about("Move windows back to where an arrangement recorded them")
                .arg(arrangement_arg(false).help(
                    "Arrangement name or id (defaults to the configured default arrangement)",
                ))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a saved arrangement")
                .arg(arrangement_arg(true))
                .arg(
                    Arg::new("remote")
                        .long("remote")
                        .help("Also delete the copy in the shared remote store")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("tag")
                .about("Manage arrangement tags")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Add a tag to an arrangement")
                        .arg(arrangement_arg(true))
                        .arg(tag_arg()),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove a tag from an arrangement")
                        .arg(arrangement_arg(true))
                        .arg(tag_arg()),
                ),
        )
        .subcommand(
            Command::new("sync")
                .about("Merge arrangements from the shared remote store")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("settings")
                .about("View and change settings")
                .subcommand_required(true)
                .subcommand(
                    Command::new("show")
                        .about("Show current settings")
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("exclude")
                        .about("Exclude an application from capture")
                        .arg(bundle_id_arg()),
                )
                .subcommand(
                    Command::new("include")
                        .about("Stop excluding an application from capture")
                        .arg(bundle_id_arg()),
                )
                .subcommand(
                    Command::new("default")
                        .about("Set the arrangement restored when none is named (omit to clear)")
                        .arg(arrangement_arg(false)),
                )
                .subcommand(
                    Command::new("sync")
                        .about("Turn sync on or off")
                        .arg(
                            Arg::new("state")
                                .help("on or off")
                                .required(true)
                                .value_parser(["on", "off"])
                                .index(1),
                        ),
                )
                .subcommand(Command::new("reset").about("Restore every setting to its default")),
        )
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

fn arrangement_arg(required: bool) -> Arg {
    Arg::new("arrangement")
        .help("Arrangement name or id")
        .required(required)
        .index(1)
}

fn tag_arg() -> Arg {
    Arg::new("tag").help("Tag text").required(true).index(2)
}

fn bundle_id_arg() -> Arg {
    Arg::new("bundle-id")
        .help("Application bundle identifier (e.g. com.apple.Safari)")
        .required(true)
        .index(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_capture_collects_repeated_tags() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "winsync", "capture", "Work", "--tag", "desk", "-t", "focus", "--upload",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("capture").unwrap();

        assert_eq!(sub.get_one::<String>("name").unwrap(), "Work");
        let tags: Vec<&String> = sub.get_many::<String>("tag").unwrap().collect();
        assert_eq!(tags, ["desk", "focus"]);
        assert!(sub.get_flag("upload"));
    }

    #[test]
    fn test_capture_requires_name() {
        assert!(
            build_cli()
                .try_get_matches_from(vec!["winsync", "capture"])
                .is_err()
        );
    }

    #[test]
    fn test_restore_arrangement_is_optional() {
        let matches = build_cli()
            .try_get_matches_from(vec!["winsync", "restore", "--json"])
            .unwrap();
        let sub = matches.subcommand_matches("restore").unwrap();
        assert!(sub.get_one::<String>("arrangement").is_none());
        assert!(sub.get_flag("json"));
    }

    #[test]
    fn test_verbose_is_global() {
        let matches = build_cli()
            .try_get_matches_from(vec!["winsync", "list", "-v"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }

    #[test]
    fn test_tag_add_takes_arrangement_and_tag() {
        let matches = build_cli()
            .try_get_matches_from(vec!["winsync", "tag", "add", "Work", "focus"])
            .unwrap();
        let (_, tag) = matches.subcommand().unwrap();
        let add = tag.subcommand_matches("add").unwrap();
        assert_eq!(add.get_one::<String>("arrangement").unwrap(), "Work");
        assert_eq!(add.get_one::<String>("tag").unwrap(), "focus");
    }

    #[test]
    fn test_settings_sync_rejects_unknown_state() {
        assert!(
            build_cli()
                .try_get_matches_from(vec!["winsync", "settings", "sync", "maybe"])
                .is_err()
        );
        assert!(
            build_cli()
                .try_get_matches_from(vec!["winsync", "settings", "sync", "off"])
                .is_ok()
        );
    }

    #[test]
    fn test_delete_remote_flag() {
        let matches = build_cli()
            .try_get_matches_from(vec!["winsync", "delete", "Work", "--remote"])
            .unwrap();
        assert!(
            matches
                .subcommand_matches("delete")
                .unwrap()
                .get_flag("remote")
        );
    }
}
