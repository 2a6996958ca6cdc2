use crate::infra::open_store;
use crate::server;
use clap::{Args, Parser, Subcommand};
use sponsor_tracker::auth::TokenKeys;
use sponsor_tracker::config::AppConfig;
use sponsor_tracker::error::AppError;
use sponsor_tracker::telemetry;
use sponsor_tracker::workflows::sponsors::{ImportReport, SponsorImporter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Sponsor Tracker",
    about = "Track job applications against the UK visa sponsor register",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed the company directory from a sponsor register CSV export
    Import(ImportArgs),
    /// Provision a user (if needed) and print a signed bearer token
    Token(TokenArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Path to the register CSV (Organisation Name, Town/City, Type & Rating, Route)
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct TokenArgs {
    /// Email address identifying the user
    #[arg(long)]
    pub(crate) email: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import(args) => run_import(args),
        Command::Token(args) => run_token(args),
    }
}

fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let store = open_store(&config)?;

    match SponsorImporter::new(store).import_path(&args.csv)? {
        ImportReport::AlreadySeeded { existing } => {
            println!("Sponsor register already holds {existing} companies; import skipped.");
        }
        ImportReport::Imported {
            inserted,
            skipped_rows,
        } => {
            println!(
                "Imported {inserted} companies from {} ({skipped_rows} rows without a name skipped).",
                args.csv.display()
            );
        }
    }
    Ok(())
}

fn run_token(args: TokenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = open_store(&config)?;
    let user = store.upsert_user(&args.email)?;
    let token = TokenKeys::from_config(&config.auth).issue(&user)?;

    eprintln!(
        "Token for {} (user {}) valid for {} hours:",
        user.email,
        user.id.0,
        config.auth.token_ttl.num_hours()
    );
    println!("{token}");
    Ok(())
}
