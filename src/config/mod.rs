pub mod cli;
pub mod provider;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sequence-dispatch")]
#[command(about = "Generate, review and send eight-email outreach sequences")]
pub struct CliConfig {
    /// Path to a TOML configuration file; environment variables are used when absent
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory drafts and reports are read from and written to
    #[arg(long, default_value = ".", global = true)]
    pub workspace: String,

    /// Draft file, relative to the workspace
    #[arg(long, global = true)]
    pub draft: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate sequences for one address or a CSV of recipients
    Generate {
        #[arg(long, conflicts_with = "csv")]
        email: Option<String>,

        #[arg(long)]
        csv: Option<String>,

        #[arg(long)]
        product_id: Option<String>,

        #[arg(long)]
        product_description: Option<String>,
    },

    /// Edit one email of one recipient in the draft
    Edit {
        #[arg(long)]
        email: String,

        #[arg(long)]
        slot: u8,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        body: Option<String>,
    },

    /// List the emails that will be sent for each recipient
    Show {
        #[arg(long)]
        email: Option<String>,
    },

    /// Register contacts and send every populated email in the draft
    Dispatch {
        #[arg(long)]
        sender_name: String,

        #[arg(long)]
        sender_email: String,

        #[arg(long)]
        campaign: String,

        /// Directory, relative to the workspace, for the dispatch report
        #[arg(long)]
        report_dir: Option<String>,
    },

    /// Browse or maintain the product catalog used for generation
    Products {
        #[command(subcommand)]
        action: ProductCommand,
    },

    /// Print a sample recipients CSV
    SampleCsv,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum ProductCommand {
    /// List a user's products
    List {
        /// Falls back to the configured generator user id
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Show one product with its description
    Show {
        #[arg(long)]
        id: String,
    },

    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,
    },

    /// Replace a product's name and description
    Update {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub const DEFAULT_DRAFT: &'static str = "campaign_draft.json";
}
