// formsync - formulation database to board-platform sync

mod board_admin;
mod common;
mod coverage;
mod exit_codes;
mod inspect;
mod link;
mod push;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "formsync")]
#[command(about = "Sync formulas, ingredients, and INCI names to shared boards")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command that talks to the remote API.
#[derive(Args)]
struct ApiArgs {
    /// API token (falls back to FORMSYNC_API_TOKEN)
    #[arg(long, env = "FORMSYNC_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Override the API endpoint (testing only)
    #[arg(long, hide = true)]
    api_base: Option<String>,
}

/// Flags shared by every command that reads the profile or database.
#[derive(Args)]
struct ProfileArgs {
    /// Sync profile (TOML)
    #[arg(long, default_value = "formsync.toml")]
    config: PathBuf,

    /// Formulation database
    #[arg(long, default_value = "formulations.db")]
    db: PathBuf,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror local records as board items (idempotent, never deletes)
    #[command(after_help = "\
Examples:
  formsync push formulas --dry-run
  formsync push formulas --filter status=approved
  formsync push inci --batch-size 20
  formsync push ingredients --start-from 200 --max-items 100")]
    Push {
        /// What to mirror
        #[arg(value_enum)]
        target: push::PushTarget,

        /// Report what would be created without writing
        #[arg(long)]
        dry_run: bool,

        /// Skip the first N records (resume support)
        #[arg(long, default_value_t = 0)]
        start_from: usize,

        /// Process at most N records
        #[arg(long)]
        max_items: Option<usize>,

        /// Pause between batches of this many creates
        #[arg(long, default_value_t = 10)]
        batch_size: usize,

        /// Narrow formulas by status, e.g. status=approved
        #[arg(long, value_name = "KEY=VALUE")]
        filter: Option<String>,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Run one reconciliation pass for a configured link
    #[command(after_help = "\
Examples:
  formsync link formula_ingredients --dry-run
  formsync link formula_ingredients --report run.json
  formsync link ingredient_inci --start-from 50 --max-items 25
  formsync link ingredient_inci --report audit.csv --quiet")]
    Link {
        /// Link name from the profile's [links] table
        link_name: String,

        /// Match and report, but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Skip the first N entities (resume support)
        #[arg(long, default_value_t = 0)]
        start_from: usize,

        /// Process at most N entities
        #[arg(long)]
        max_items: Option<usize>,

        /// Write a per-entity report (.csv for CSV, anything else JSON)
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Print how much of a link is currently connected
    Coverage {
        /// Link name from the profile's [links] table
        link_name: String,

        #[command(flatten)]
        profile: ProfileArgs,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Create boards and columns
    #[command(subcommand)]
    Board(BoardCommands),

    /// Dump board structure (columns, item count); omit the board to
    /// list everything the token can see
    Inspect {
        /// Profile board key or raw board id
        board: Option<String>,

        /// Emit JSON instead of the tab-separated listing
        #[arg(long)]
        json: bool,

        /// Sync profile (TOML)
        #[arg(long, default_value = "formsync.toml")]
        config: PathBuf,

        #[command(flatten)]
        api: ApiArgs,
    },
}

#[derive(Subcommand)]
enum BoardCommands {
    /// Create a board
    #[command(after_help = "\
Examples:
  formsync board create --name 'INCI Names' --kind public
  formsync board create --name Staging --kind private --description 'scratch'")]
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, value_enum, default_value = "public")]
        kind: board_admin::KindArg,

        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Add a column to a board
    #[command(name = "add-column", after_help = "\
Examples:
  formsync board add-column formulas --title Status --type status
  formsync board add-column formulas --title Ingredients --type board_relation --target-board ingredients
  formsync board add-column ingredients --title INCI --type mirror --relation-column board_relation_inci1 --mirror-column name")]
    AddColumn {
        /// Profile board key or raw board id
        board: String,

        #[arg(long)]
        title: String,

        /// Column type (text, status, board_relation, mirror, ...)
        #[arg(long = "type")]
        column_type: String,

        /// Target board for board_relation columns
        #[arg(long)]
        target_board: Option<String>,

        /// Existing relation column a mirror reads through
        #[arg(long)]
        relation_column: Option<String>,

        /// Column id on the target board a mirror displays
        #[arg(long)]
        mirror_column: Option<String>,

        /// Sync profile (TOML), used to resolve board keys
        #[arg(long, default_value = "formsync.toml")]
        config: PathBuf,

        #[command(flatten)]
        api: ApiArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Push {
            target,
            dry_run,
            start_from,
            max_items,
            batch_size,
            filter,
            profile,
            api,
        } => push::cmd_push(
            target,
            &profile.config,
            &profile.db,
            api.api_token,
            api.api_base,
            dry_run,
            start_from,
            max_items,
            batch_size,
            filter,
            profile.quiet,
        ),
        Commands::Link {
            link_name,
            dry_run,
            start_from,
            max_items,
            report,
            profile,
            api,
        } => link::cmd_link(
            &link_name,
            &profile.config,
            &profile.db,
            api.api_token,
            api.api_base,
            dry_run,
            start_from,
            max_items,
            report,
            profile.quiet,
        ),
        Commands::Coverage { link_name, profile, api } => coverage::cmd_coverage(
            &link_name,
            &profile.config,
            &profile.db,
            api.api_token,
            api.api_base,
            profile.quiet,
        ),
        Commands::Board(BoardCommands::Create { name, kind, description, api }) => {
            board_admin::cmd_board_create(&name, kind, description, api.api_token, api.api_base)
        }
        Commands::Board(BoardCommands::AddColumn {
            board,
            title,
            column_type,
            target_board,
            relation_column,
            mirror_column,
            config,
            api,
        }) => board_admin::cmd_board_add_column(
            &board,
            &title,
            &column_type,
            target_board,
            relation_column,
            mirror_column,
            &config,
            api.api_token,
            api.api_base,
        ),
        Commands::Inspect { board, json, config, api } => {
            inspect::cmd_inspect(board, &config, api.api_token, api.api_base, json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
