//! Binary entrypoint for the Deckhand CLI.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use deckhand_cli::{commands, init_tracing};
use deckhand_core::{ActingUser, DeckhandError, RequestContext, SessionSigner, View};
use deckhand_in::{AnthropicBackend, Translator};
use std::io::Read;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "deckhand",
    version,
    about = "Translate card requests and canonicalize card filters"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a request into a filter context and commands
    Translate {
        /// Acting user id
        #[arg(short, long, env = "DECKHAND_USER", default_value = "cli")]
        user: String,

        /// What the user is looking at
        #[arg(long, value_enum, default_value_t = ViewArg::None)]
        view: ViewArg,

        /// The request text
        query: Vec<String>,
    },

    /// Read filter fields as JSON on stdin and print their canonical form
    Canonicalize {
        /// Id of the persisted filter, if any
        #[arg(long)]
        filter_id: Option<u64>,
    },

    /// Sign or verify launchpad session signatures
    #[command(subcommand)]
    Session(SessionCommands),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Translate { .. } => "translate",
            Commands::Canonicalize { .. } => "canonicalize",
            Commands::Session(SessionCommands::Sign { .. }) => "session sign",
            Commands::Session(SessionCommands::Verify { .. }) => "session verify",
        }
    }
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Issue a signature for a user
    Sign {
        #[arg(short, long)]
        user: String,

        /// Seconds until the signature expires
        #[arg(long, default_value_t = 300)]
        ttl: u32,

        #[arg(long, env = "DECKHAND_SESSION_SECRET", hide_env_values = true)]
        secret: String,
    },

    /// Check a signature and print the user it was issued for
    Verify {
        sig: String,

        #[arg(long, env = "DECKHAND_SESSION_SECRET", hide_env_values = true)]
        secret: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Card,
    List,
    None,
}

impl From<ViewArg> for View {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Card => View::CardContents,
            ViewArg::List => View::CardList,
            ViewArg::None => View::Elsewhere,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<String> {
    debug!(command = command.name(), "dispatching");

    let output = match command {
        Commands::Translate { user, view, query } => {
            let backend = AnthropicBackend::from_env().map_err(DeckhandError::from)?;
            let translator = Translator::new(backend);
            let context = RequestContext::new(ActingUser::new(user), view.into());
            debug!(user = %context.user().id, view = context.view_description(), "translating");

            commands::translate(&translator, &query.join(" "), &context).await?
        }
        Commands::Canonicalize { filter_id } => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("reading filter fields from stdin")?;
            let input = serde_json::from_str(&input)
                .map_err(|e| DeckhandError::contract(format!("stdin is not JSON: {}", e)))?;

            commands::canonicalize(input, filter_id)?
        }
        Commands::Session(SessionCommands::Sign { user, ttl, secret }) => {
            let signer = SessionSigner::new(&secret);
            commands::sign_session(&signer, &user, Duration::seconds(i64::from(ttl)), Utc::now())
        }
        Commands::Session(SessionCommands::Verify { sig, secret }) => {
            let signer = SessionSigner::new(&secret);
            commands::verify_session(&signer, &sig, Utc::now())?
        }
    };

    Ok(serde_json::to_string_pretty(&output)?)
}
