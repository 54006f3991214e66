use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::rules::{IgnoreReason, IgnoreScope};

#[derive(Parser, Debug)]
#[command(
    name = "scanledger",
    version,
    about = "Track static-analysis scan results over time: identity, diffs, suppressions, drift"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML). Default: config/scanledger.toml
    #[arg(long)]
    pub config: Option<String>,

    /// Override the state directory from the config
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (info, debug, trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log file path
    #[arg(long, default_value = "data/scanledger.log")]
    pub log_file: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process a raw engine report: suppress, diff, persist, score, snapshot
    Scan {
        /// Package slug the report belongs to
        #[arg(long)]
        package: String,
        /// Raw report JSON from the analysis engine
        #[arg(long)]
        input: PathBuf,
    },
    /// Compute the readiness score for explicit counts
    Score {
        #[arg(long)]
        errors: usize,
        #[arg(long)]
        warnings: usize,
    },
    /// Show scan statistics for a package
    History {
        #[arg(long)]
        package: String,
    },
    /// Manage suppression rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Manage issues marked resolved
    Complete {
        #[command(subcommand)]
        action: CompleteAction,
    },
    /// List regressions in the latest stored scan
    Rediscovered {
        #[arg(long)]
        package: String,
    },
    /// Checksum-based source drift monitoring
    Monitor {
        #[command(subcommand)]
        action: MonitorAction,
    },
    /// Check expected package artifacts (readme, license, translations)
    Validate {
        #[arg(long)]
        root: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// Add a rule; re-adding an identical rule overwrites it
    Add {
        #[arg(long, value_enum)]
        scope: ScopeArg,
        #[arg(long)]
        path: String,
        /// Required when scope is code
        #[arg(long)]
        code: Option<String>,
        #[arg(long, value_enum, default_value = "other")]
        reason: ReasonArg,
        #[arg(long, default_value = "")]
        note: String,
        /// Attribution recorded on the rule
        #[arg(long)]
        by: Option<String>,
    },
    /// Remove a rule by id
    Remove {
        #[arg(long)]
        id: String,
    },
    /// List stored rules
    List,
    /// Merge rules from a JSON export onto the stored set
    Import {
        #[arg(long)]
        input: PathBuf,
    },
    /// Serialize stored rules as JSON
    Export,
    /// Probe a package root for bundled third-party directories
    DetectVendor {
        #[arg(long)]
        root: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum CompleteAction {
    /// Mark a (file, line, code) triple resolved
    Mark {
        #[arg(long)]
        package: String,
        #[arg(long)]
        file: String,
        #[arg(long)]
        line: u32,
        #[arg(long)]
        code: String,
        /// Attribution recorded on the mark
        #[arg(long)]
        by: Option<String>,
    },
    /// List resolved issues for a package
    List {
        #[arg(long)]
        package: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MonitorAction {
    /// Snapshot checksums for a package; replaces any active session
    Start {
        #[arg(long)]
        package: String,
        #[arg(long)]
        root: PathBuf,
    },
    /// Diff current checksums against the baseline and consume the delta
    Check,
    /// Clear the active session
    Stop,
    /// Show the active session, if any
    Status,
    /// Show the capped activity log
    Log,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum ScopeArg {
    Directory,
    File,
    Code,
}

impl From<ScopeArg> for IgnoreScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Directory => IgnoreScope::Directory,
            ScopeArg::File => IgnoreScope::File,
            ScopeArg::Code => IgnoreScope::Code,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
pub enum ReasonArg {
    Vendor,
    Other,
}

impl From<ReasonArg> for IgnoreReason {
    fn from(value: ReasonArg) -> Self {
        match value {
            ReasonArg::Vendor => IgnoreReason::Vendor,
            ReasonArg::Other => IgnoreReason::Other,
        }
    }
}
