//! `blogdesk` admin console
//!
//! Every dashboard screen is a subcommand. Each one passes through the access gate before it
//! runs: private screens need a stored credential, the login screen needs its absence.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

mod output;
mod prompt;
mod views;

use blogdesk_core::{Config, Error, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

/// Command line interface for the blogdesk admin console
#[derive(Debug, Parser)]
#[command(
    name = "blogdesk",
    version = env!("CARGO_PKG_VERSION"),
    about = "Admin console for blog posts, contact leads and scheduled calls"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the configuration
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long, global = true)]
    json: bool,

    /// Show only the active sidebar entry
    #[arg(long, global = true)]
    collapsed: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the credential
    Login {
        /// Account email
        #[arg(short, long)]
        email: Option<String>,

        /// Account password; prompted for when omitted
        #[arg(short, long, env = "BLOGDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored credential
    Logout,

    /// Show whether a credential is stored
    Status,

    /// Manage blog posts
    Blog {
        /// Blog subcommand
        #[command(subcommand)]
        action: BlogCommands,
    },

    /// Contact leads
    Contacts {
        /// Contacts subcommand
        #[command(subcommand)]
        action: ContactCommands,
    },

    /// Scheduled calls
    Calls {
        /// Calls subcommand
        #[command(subcommand)]
        action: CallCommands,
    },

    /// Admin accounts
    Admin {
        /// Admin subcommand
        #[command(subcommand)]
        action: AdminCommands,
    },

    /// Inspect configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration file
        #[arg(short, long)]
        validate: bool,
    },
}

/// Output format of list views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON array
    Json,
}

/// Blog commands
#[derive(Debug, Subcommand)]
enum BlogCommands {
    /// List blog posts
    List {
        /// Output format (table, json)
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List the predefined categories
    Categories,

    /// Show one blog post
    Show {
        /// Blog id
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Create a blog post
    Create(BlogEdits),

    /// Edit a blog post; only changed fields are sent
    Edit {
        /// Blog id
        #[arg(value_name = "ID")]
        id: String,

        /// Field changes
        #[command(flatten)]
        edits: BlogEdits,
    },

    /// Delete a blog post
    Delete {
        /// Blog id
        #[arg(value_name = "ID")]
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Field values applied to a blog form
#[derive(Debug, Default, Args)]
struct BlogEdits {
    /// Title
    #[arg(long)]
    title: Option<String>,

    /// Short description shown in listings
    #[arg(long)]
    short_description: Option<String>,

    /// Predefined category slug (see `blogdesk blog categories`)
    #[arg(long, conflicts_with = "custom_category")]
    category: Option<String>,

    /// Free-form category
    #[arg(long)]
    custom_category: Option<String>,

    /// Author name
    #[arg(long)]
    author: Option<String>,

    /// Tag to add; repeatable
    #[arg(long = "tag", value_name = "TAG")]
    add_tags: Vec<String>,

    /// Tag to remove; repeatable
    #[arg(long = "remove-tag", value_name = "TAG")]
    remove_tags: Vec<String>,

    /// Cover image to upload
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,

    /// Body text (HTML)
    #[arg(long, conflicts_with = "description_file")]
    description: Option<String>,

    /// Read the body from a file
    #[arg(long, value_name = "FILE")]
    description_file: Option<PathBuf>,
}

/// Contact commands
#[derive(Debug, Subcommand)]
enum ContactCommands {
    /// List contact leads
    List {
        /// Filter and search
        #[command(flatten)]
        filter: ContactFilter,

        /// Output format (table, json)
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Export contact leads as CSV
    Export {
        /// Filter and search
        #[command(flatten)]
        filter: ContactFilter,

        /// Output file; `-` for stdout
        #[arg(short, long, value_name = "FILE", default_value = blogdesk_core::export::CONTACTS_FILE)]
        output: PathBuf,
    },
}

/// Contact list filter
#[derive(Debug, Default, Args)]
struct ContactFilter {
    /// Status filter (all, Pending, Responded)
    #[arg(long, default_value = "all")]
    status: String,

    /// Case-insensitive name search
    #[arg(short, long, default_value = "")]
    search: String,
}

/// Scheduled call commands
#[derive(Debug, Subcommand)]
enum CallCommands {
    /// List scheduled calls
    List {
        /// Case-insensitive name or email search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Output format (table, json)
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Export scheduled calls as CSV
    Export {
        /// Case-insensitive name or email search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Output file; `-` for stdout
        #[arg(short, long, value_name = "FILE", default_value = blogdesk_core::export::CALLS_FILE)]
        output: PathBuf,
    },
}

/// Admin commands
#[derive(Debug, Subcommand)]
enum AdminCommands {
    /// Create an admin account
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email
        #[arg(short, long)]
        email: String,

        /// Initial password; prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Main entry point for the admin console
#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists (for development convenience)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = blogdesk_core::init_logging(&config.logging) {
        eprintln!("{err}");
    }
    debug!(version = env!("CARGO_PKG_VERSION"), "blogdesk starting");

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("{}", err.user_message());
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Authentication failures exit with 2 so scripts can tell "log in first" apart
const fn exit_code(err: &Error) -> u8 {
    if err.requires_login() { 2 } else { 1 }
}

/// Load configuration and apply command line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    Ok(config)
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    if let Commands::Config { show, validate } = cli.command {
        return handle_config_command(&config, show, validate);
    }

    let console = views::Console::open(config, cli.collapsed)?;

    match cli.command {
        Commands::Login { email, password } => console.login(email, password).await,
        Commands::Logout => console.logout(),
        Commands::Status => console.status(),
        Commands::Blog { action } => match action {
            BlogCommands::List { format } => console.list_blogs(format).await,
            BlogCommands::Categories => {
                views::print_categories();
                Ok(())
            }
            BlogCommands::Show { id } => console.show_blog(&id).await,
            BlogCommands::Create(edits) => console.save_blog(None, &edits).await,
            BlogCommands::Edit { id, edits } => console.save_blog(Some(&id), &edits).await,
            BlogCommands::Delete { id, yes } => console.delete_blog(&id, yes).await,
        },
        Commands::Contacts { action } => match action {
            ContactCommands::List { filter, format } => console.list_contacts(&filter, format).await,
            ContactCommands::Export { filter, output } => {
                console.export_contacts(&filter, &output).await
            }
        },
        Commands::Calls { action } => match action {
            CallCommands::List { search, format } => console.list_calls(&search, format).await,
            CallCommands::Export { search, output } => console.export_calls(&search, &output).await,
        },
        Commands::Admin {
            action: AdminCommands::Create {
                name,
                email,
                password,
            },
        } => console.create_admin(name, email, password).await,
        Commands::Config { .. } => Ok(()),
    }
}

/// Handle configuration commands
fn handle_config_command(config: &Config, show: bool, validate: bool) -> Result<()> {
    if validate {
        config.validate()?;
        println!("Configuration is valid");
    }

    if show {
        let config_toml = toml::to_string_pretty(config).map_err(|e| Error::Configuration {
            message: format!("Failed to serialize configuration: {e}"),
        })?;
        println!("{config_toml}");
    }

    Ok(())
}
