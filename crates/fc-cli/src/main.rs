use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use fc_cli::{replay, Script};
use fc_coordinator::{create_client, ClientConfig, PaginationConfig, RenderContext};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn script_arg() -> Arg {
    Arg::new("script")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON array of recorded steps")
}

fn client_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("GraphQL endpoint (defaults to $FORUM_API_URL)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("Client configuration file (JSON)"),
        )
        .arg(
            Arg::new("paginate-replies")
                .long("paginate-replies")
                .action(ArgAction::SetTrue)
                .help("Merge cached reply pages like post pages"),
        )
}

fn client_config(args: &ArgMatches) -> anyhow::Result<ClientConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid client configuration in {}", path.display()))?
        }
        None => ClientConfig::from_env().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "using default api url");
            ClientConfig::default()
        }),
    };

    if let Some(url) = args.get_one::<String>("api-url") {
        config = config.with_api_url(url.clone());
    }
    if args.get_flag("paginate-replies") {
        config = config.with_paginated_field(PaginationConfig::replies());
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("fc")
        .version(fc_cli::VERSION)
        .about("Forum client cache replay tool")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(client_args(
            Command::new("replay")
                .about("Replay a script and print every cache read")
                .arg(script_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print one JSON object per step"),
                ),
        ))
        .subcommand(client_args(
            Command::new("stats")
                .about("Replay a script and print cache statistics")
                .arg(script_arg()),
        ));

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("replay", args)) => {
            let (script, mut client) = prepare(args)?;
            let reports = replay(&mut client, &script)?;

            let json = args.get_flag("json");
            for (step, report) in reports.iter().enumerate() {
                if json {
                    println!("{}", report.to_json(step));
                } else {
                    println!("{report}");
                }
            }
        }
        Some(("stats", args)) => {
            let (script, mut client) = prepare(args)?;
            replay(&mut client, &script)?;

            let stats = client.cache().stats();
            println!("Cache Statistics:");
            println!("  Steps: {}", script.steps().len());
            println!("  Records: {}", stats.record_count);
            println!("  Fields: {}", stats.field_count);
        }
        _ => {}
    }

    Ok(())
}

fn prepare(args: &ArgMatches) -> anyhow::Result<(Script, fc_coordinator::Client)> {
    let path = args
        .get_one::<PathBuf>("script")
        .context("script path is required")?;
    let script = Script::load(path)?;
    let config = client_config(args)?;
    let client = create_client(&config, &RenderContext::Browser)?;
    Ok((script, client))
}
