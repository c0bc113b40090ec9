// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use bodystream_config::ConfigManager;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

mod commands;

fn build_cli() -> Command {
    Command::new("bodystream")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stream HTTP request and response bodies with progress and rate limiting")
        .arg(
            Arg::new("limit")
                .short('l')
                .long("limit")
                .value_name("RATE")
                .help("Bandwidth limit in bytes per second, K/M/G suffixes allowed (0 = unlimited)")
                .value_parser(commands::parse_bandwidth)
                .global(true),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .value_name("BYTES")
                .help("Expected body size, enables the progress percentage")
                .value_parser(value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Do not render a progress line")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Log streaming decisions and other debug output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Read configuration from DIR instead of the platform default")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("get")
                .about("Download a URL, streaming the body to a file or stdout")
                .arg(Arg::new("url").required(true).value_name("URL").help("URL to fetch"))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write the body to FILE instead of stdout")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("put")
                .about("Upload a file, streaming it as the request body")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_name("FILE")
                        .help("File to send")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(Arg::new("url").required(true).value_name("URL").help("Destination URL"))
                .arg(
                    Arg::new("method")
                        .short('X')
                        .long("method")
                        .value_name("METHOD")
                        .help("HTTP method")
                        .value_parser(["PUT", "POST"])
                        .default_value("PUT"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("init").about("Write a default configuration file"))
                .subcommand(Command::new("path").about("Print the configuration file path")),
        )
}

/// Global arguments are propagated down, so the innermost matches see them all
fn innermost(matches: &ArgMatches) -> &ArgMatches {
    match matches.subcommand() {
        Some((_, sub)) => innermost(sub),
        None => matches,
    }
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    match matches.get_one::<PathBuf>("config-dir") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new(),
    }
    .context("Failed to locate configuration directory")
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let globals = innermost(&matches);

    let default_level = if globals.get_flag("debug") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let manager = config_manager(globals)?;
    let config = manager.load_with_env_overrides().unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}, using defaults", e);
        bodystream_config::Config::default()
    });

    match matches.subcommand() {
        Some(("get", sub_matches)) => {
            let options = commands::Options::resolve(&config, sub_matches);
            commands::get(&config, &options, sub_matches)
        }
        Some(("put", sub_matches)) => {
            let options = commands::Options::resolve(&config, sub_matches);
            commands::put(&config, &options, sub_matches)
        }
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("show", _)) => commands::show_config(&config),
            Some(("init", _)) => commands::init_config(&manager),
            Some(("path", _)) => {
                println!("{}", manager.config_path().display());
                Ok(())
            }
            _ => Ok(()),
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
