//! Command-line configuration.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};
use rust_decimal::Decimal;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// MediTrack pharmacy inventory CLI
#[derive(Debug, Parser)]
#[command(name = "meditrack", about = "MediTrack pharmacy inventory", long_about = None)]
pub struct Config {
    /// SQLite database file
    #[arg(long, env = "MEDITRACK_DATABASE", default_value = "meditrack.db", global = true)]
    pub database: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(flatten)]
    pub identity: IdentityConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Acting identity. A username and password take precedence over the
/// explicit id/name/role triple.
#[derive(Debug, Args)]
pub struct IdentityConfig {
    /// Actor ID recorded on changes
    #[arg(long, env = "MEDITRACK_ACTOR_ID", default_value = "cli", global = true)]
    pub actor_id: String,

    /// Actor display name recorded on changes
    #[arg(long, env = "MEDITRACK_ACTOR_NAME", default_value = "Pharmacist", global = true)]
    pub actor_name: String,

    /// Actor role (admin, pharmacist). Admin requires `--username`
    #[arg(long, env = "MEDITRACK_ACTOR_ROLE", default_value = "pharmacist", global = true)]
    pub role: String,

    /// Log in as a stored user instead
    #[arg(long, env = "MEDITRACK_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for `--username`
    #[arg(long, env = "MEDITRACK_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the drug catalog
    #[command(subcommand)]
    Drugs(DrugCommand),

    /// Record and list sales
    #[command(subcommand)]
    Sales(SaleCommand),

    /// Import drugs from a comma-separated file
    Import(ImportArgs),

    /// Export drugs as CSV
    Export(ExportArgs),

    /// Manage staff accounts
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Debug, Subcommand)]
pub enum DrugCommand {
    /// List drugs, newest first
    List {
        /// List the deleted partition instead
        #[arg(long, conflicts_with = "low_stock")]
        deleted: bool,

        /// Only drugs below their reorder threshold
        #[arg(long)]
        low_stock: bool,
    },

    /// Show one drug with its history
    Show {
        id: String,

        /// Look in the deleted partition
        #[arg(long)]
        deleted: bool,
    },

    /// Add a drug
    Add(AddDrugArgs),

    /// Edit tracked fields of a drug
    Update(UpdateDrugArgs),

    /// Toggle the lock flag (admin)
    Lock { id: String },

    /// Move a drug to the deleted partition
    Delete { id: String },

    /// Restore a deleted drug
    Restore { id: String },

    /// Permanently remove a deleted drug (admin)
    Purge {
        id: String,

        /// Confirm the irreversible purge
        #[arg(long)]
        yes: bool,
    },

    /// Soft-delete several drugs at once
    BatchDelete(BatchDeleteArgs),
}

#[derive(Debug, Args)]
pub struct AddDrugArgs {
    #[arg(long)]
    pub code: String,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub category: String,

    #[arg(long, default_value = "")]
    pub manufacturer: String,

    /// Unit price
    #[arg(long)]
    pub price: Decimal,

    #[arg(long)]
    pub stock: u32,

    #[arg(long)]
    pub min_stock_threshold: Option<u32>,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expiry_date: NaiveDate,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub side_effects: Option<String>,

    /// Create the drug already locked
    #[arg(long)]
    pub locked: bool,
}

#[derive(Debug, Args)]
pub struct UpdateDrugArgs {
    pub id: String,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,

    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long)]
    pub stock: Option<u32>,

    #[arg(long)]
    pub min_stock_threshold: Option<u32>,

    #[arg(long)]
    pub expiry_date: Option<NaiveDate>,

    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,

    #[arg(long, conflicts_with = "clear_side_effects")]
    pub side_effects: Option<String>,

    /// Remove the side effects
    #[arg(long)]
    pub clear_side_effects: bool,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["ids", "category", "manufacturer", "created_before", "created_after"])
))]
pub struct BatchDeleteArgs {
    /// Explicit drug IDs
    #[arg(long = "id", num_args = 1..)]
    pub ids: Vec<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Created before midnight UTC of this date
    #[arg(long)]
    pub created_before: Option<NaiveDate>,

    /// Created after midnight UTC of this date
    #[arg(long)]
    pub created_after: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// List sales, newest first
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Record a sale
    Record {
        /// Cart line as <drug-id>:<quantity>, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,

        /// Customer name (walk-in when omitted)
        #[arg(long)]
        customer: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// File with one drug per line
    pub file: PathBuf,

    /// Only report per-line verdicts
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Export the deleted partition
    #[arg(long)]
    pub deleted: bool,

    /// Write to this file, or a dated file inside this directory, instead of
    /// embedding the CSV in the response
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a staff account
    Add {
        /// Login name
        login: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// admin or pharmacist
        #[arg(long, default_value = "pharmacist")]
        user_role: String,

        #[arg(long, env = "MEDITRACK_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },

    /// List staff accounts
    List,

    /// Show the logged-in account
    Me,

    /// Change the logged-in account's display name and/or password
    Update {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        new_password: Option<String>,
    },
}
