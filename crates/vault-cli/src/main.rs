mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    command::CommandSubcommand, note::NoteSubcommand, placeholder::PlaceholderSubcommand,
    set::SetSubcommand, tag::TagSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cmdvault",
    about = "Pentest command vault: templated commands, value sets, tags, and notes",
    version,
    propagate_version = true
)]
struct Cli {
    /// Vault root (default: nearest .cmdvault/ upward, then the home directory)
    #[arg(long, global = true, env = "CMDVAULT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the vault directory, config, and database
    Init {
        /// Skip the starter tags, placeholders, and commands
        #[arg(long)]
        no_seed: bool,
    },

    /// Run the web API
    Serve {
        /// Interface to bind (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (0 = OS-assigned; default from config)
        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        no_open: bool,
    },

    /// Manage commands and their steps
    Command {
        #[command(subcommand)]
        subcommand: CommandSubcommand,
    },

    /// Manage the placeholder registry
    Placeholder {
        #[command(subcommand)]
        subcommand: PlaceholderSubcommand,
    },

    /// Manage placeholder sets and their values
    Set {
        #[command(subcommand)]
        subcommand: SetSubcommand,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        subcommand: TagSubcommand,
    },

    /// Manage notes
    Note {
        #[command(subcommand)]
        subcommand: NoteSubcommand,
    },

    /// Search commands and notes
    Search {
        /// Case-insensitive substring; empty matches everything
        #[arg(default_value = "")]
        query: String,

        /// Tag name (repeatable; all must match)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Change the login username and/or password
    Passwd {
        #[arg(long, default_value = "admin")]
        username: String,

        #[arg(long)]
        current: String,

        #[arg(long)]
        new_username: Option<String>,

        #[arg(long)]
        new_password: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { no_seed } => cmd::init::run(&root, no_seed, cli.json),
        Commands::Serve {
            host,
            port,
            no_open,
        } => cmd::serve::run(&root, host.as_deref(), port, no_open),
        Commands::Command { subcommand } => cmd::command::run(&root, subcommand, cli.json),
        Commands::Placeholder { subcommand } => cmd::placeholder::run(&root, subcommand, cli.json),
        Commands::Set { subcommand } => cmd::set::run(&root, subcommand, cli.json),
        Commands::Tag { subcommand } => cmd::tag::run(&root, subcommand, cli.json),
        Commands::Note { subcommand } => cmd::note::run(&root, subcommand, cli.json),
        Commands::Search { query, tags } => cmd::search::run(&root, &query, &tags, cli.json),
        Commands::Passwd {
            username,
            current,
            new_username,
            new_password,
        } => cmd::passwd::run(
            &root,
            &username,
            &current,
            new_username.as_deref(),
            new_password.as_deref(),
            cli.json,
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
