mod app;
mod logging;

use app::{AppError, HostRecord, Paths};
use clap::{Parser, Subcommand, ValueEnum};
use hosts::Query;
use std::path::Path;
use std::process::ExitCode;

const VERSION: &str = concat!(env!("HOSTDIR_VERSION"), " ", env!("HOSTDIR_BUILD_HASH"));

#[derive(Parser)]
#[command(name = "hostdir", version = VERSION, about = "Directory of known SSH hosts")]
struct Arguments {
    /// Log debugging information to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all hosts; a `[user@]host[:port]` query forces user and port
    Search {
        /// Use fictional demo hosts
        #[arg(short, long)]
        demo: bool,

        /// Print hosts as a JSON array
        #[arg(long)]
        json: bool,

        query: Option<String>,
    },
    /// Add an ssh:// URL to the history
    Remember { url: String },
    /// Remove an ssh:// URL from the history
    Forget { url: String },
    /// Open an ssh:// or sftp:// URL with the system handler
    Open { url: String },
    /// Print a file or directory location
    Print { what: PrintTarget },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PrintTarget {
    Datadir,
    History,
    Config,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config file if none exists
    Init,
    /// Check the config file against the schema
    Validate,
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    logging::init(args.verbose);

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hostdir: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Search { demo, json, query } => {
            let config = app::load_config(demo);
            let paths = Paths::detect(&config);
            let mut sources = app::build_sources(&config, &paths);
            let query = Query::parse(query.as_deref().unwrap_or_default());

            let hosts = app::search(&mut sources, &query);

            if json {
                let records: Vec<_> = hosts.iter().map(|h| HostRecord::new(h, &config)).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for host in &hosts {
                    println!("{}\t{}\t{}", host.name(), host.ssh_url(), host.source());
                }
            }
        }
        Command::Remember { url } => {
            let config = app::load_config(false);
            app::remember(&config, &Paths::detect(&config), &url)?;
        }
        Command::Forget { url } => {
            let config = app::load_config(false);
            app::forget(&config, &Paths::detect(&config), &url)?;
        }
        Command::Open { url } => app::open_url(&url)?,
        Command::Print { what } => {
            let path = match what {
                PrintTarget::Datadir => config::data_dir(),
                PrintTarget::History => config::history_path(&app::load_config(false)),
                PrintTarget::Config => config::config_path(),
            };
            print_path(path.as_deref())?;
        }
        Command::Config { action } => match action {
            ConfigAction::Init => {
                let path = config::ensure_config_exists()?;
                println!("{}", path.display());
            }
            ConfigAction::Validate => {
                let path = config::config_path().ok_or(config::LoadError::NoHomeDir)?;
                config::load_from_path(&path)?;
                println!("{}: ok", path.display());
            }
        },
    }
    Ok(())
}

fn print_path(path: Option<&Path>) -> Result<(), AppError> {
    let path = path.ok_or(AppError::NoDataDir)?;
    println!("{}", path.display());
    Ok(())
}
