use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};

use hwscope::commands;

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .help("Read settings from this file instead of the default location")
}

fn main() -> Result<()> {
    let matches = Command::new("hwscope")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live hardware performance monitor")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("sources")
                .about("Discover metric sources and list them")
                .arg(config_arg())
                .arg(
                    Arg::new("no-gpu")
                        .long("no-gpu")
                        .help("Skip GPU discovery")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("monitor")
                .about("Sample hardware continuously and print each snapshot")
                .arg(config_arg())
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Tick interval in milliseconds")
                        .value_parser(value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("ticks")
                        .short('n')
                        .long("ticks")
                        .value_name("N")
                        .help("Stop after N snapshots")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("interface")
                        .long("interface")
                        .value_name("NAME")
                        .help("Network interface to chart instead of the automatic choice"),
                )
                .arg(
                    Arg::new("no-gpu")
                        .long("no-gpu")
                        .help("Skip GPU discovery")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print one JSON line per snapshot")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Take a single warmed-up sample of every source")
                .arg(config_arg())
                .arg(
                    Arg::new("no-gpu")
                        .long("no-gpu")
                        .help("Skip GPU discovery")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the snapshot as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage monitor settings (use 'hwscope config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the effective settings"))
                .subcommand(Command::new("path").about("Print the settings file location"))
                .subcommand(
                    Command::new("init")
                        .about("Write default settings")
                        .arg(
                            Arg::new("force")
                                .long("force")
                                .help("Overwrite an existing file")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .get_matches();

    hwscope::init_logging(matches.get_flag("verbose"));

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("sources", sub_matches)) => commands::sources(sub_matches),
        Some(("monitor", sub_matches)) => commands::monitor(sub_matches),
        Some(("snapshot", sub_matches)) => commands::snapshot(sub_matches),
        Some(("config", sub_matches)) => commands::config::execute(sub_matches),
        _ => {
            println!("Welcome to hwscope!");
            println!("Use 'hwscope --help' for more information.");
            Ok(())
        }
    }
}
