use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for fieldlogger
/// Timesheet web service for field auditors, backed by SQLite
#[derive(Parser)]
#[command(
    name = "fieldlogger",
    version = env!("CARGO_PKG_VERSION"),
    about = "Internal timesheet service: auditors log work entries and store routes, admins view statistics",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Run the HTTP server
    Serve {
        #[arg(long, help = "Bind host (overrides config)")]
        host: Option<String>,

        #[arg(long, help = "Bind port (overrides config and $PORT)")]
        port: Option<u16>,
    },

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing configuration fields with defaults")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/vim/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,

        #[arg(
            long = "backup",
            value_name = "FILE",
            help = "Snapshot the database to FILE (.zip, .tar.gz or plain copy)"
        )]
        backup: Option<String>,
    },

    /// Print the internal audit log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Import the store catalog from a spreadsheet (.xlsx or .csv)
    ImportStores {
        #[arg(long, value_name = "FILE")]
        file: String,
    },

    /// Export timesheet records
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, value_name = "YYYY-MM", help = "Restrict the export to one month")]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}
