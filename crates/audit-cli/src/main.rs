//! `audit-diff` binary

use audit_cli::{render_config, run_diff, DiffOptions};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Engine configuration (TOML)");

    Command::new("audit-diff")
        .version(audit_engine::VERSION)
        .about("Render the change history of a governed object")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("diff")
                .about("Diff a revision history and print the rows as JSON")
                .arg(
                    Arg::new("history")
                        .long("history")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Revision history (JSON)"),
                )
                .arg(
                    Arg::new("context")
                        .long("context")
                        .value_parser(value_parser!(PathBuf))
                        .help("People, roles, field aliases and objects (JSON)"),
                )
                .arg(config_arg.clone())
                .arg(
                    Arg::new("wait-acl")
                        .long("wait-acl")
                        .action(ArgAction::SetTrue)
                        .help("Wait for role diffs to load before printing"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration as TOML")
                .arg(config_arg),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn diff_options(args: &ArgMatches) -> DiffOptions {
    DiffOptions {
        history: args.get_one::<PathBuf>("history").cloned().unwrap_or_default(),
        context: args.get_one::<PathBuf>("context").cloned(),
        config: args.get_one::<PathBuf>("config").cloned(),
        wait_acl: args.get_flag("wait-acl"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("diff", args)) => println!("{}", run_diff(&diff_options(args)).await?),
        Some(("config", args)) => {
            let path = args.get_one::<PathBuf>("config");
            print!("{}", render_config(path.map(PathBuf::as_path)).await?);
        }
        _ => {}
    }
    Ok(())
}
