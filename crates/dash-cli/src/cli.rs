//! CLI argument definitions for the dashboard engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use dash_engine::DEFAULT_TOP_N;
use dash_model::MeasureOp;

#[derive(Parser)]
#[command(
    name = "dash",
    version,
    about = "Associative selection engine for dashboards",
    long_about = "Explore a dataset the associative way.\n\n\
                  Select values in any field and see which values of every other field\n\
                  remain possible, aggregate measures over the compatible rows, and keep\n\
                  selections and dashboard sheets in a session store."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub data: DataArgs,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Where the dataset and the session state come from.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Dataset JSON file (default: the built-in Region/Product/Sales demo).
    #[arg(long = "dataset", value_name = "PATH", global = true)]
    pub dataset: Option<PathBuf>,

    /// Session store holding the selection and dashboard sheets.
    #[arg(long = "store", value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List dataset fields with their type and number of distinct values.
    Fields,

    /// Classify field values as selected, possible or excluded.
    Classify(ClassifyArgs),

    /// Aggregate a measure by a dimension over the rows compatible with the selection.
    Aggregate(AggregateArgs),

    /// Show or change the selection kept in the session store.
    #[command(subcommand)]
    Select(SelectCommand),

    /// Manage dashboard sheets kept in the session store.
    #[command(subcommand)]
    Sheet(SheetCommand),

    /// Compute the data behind every widget of a sheet.
    Render(RenderArgs),
}

/// Extra selections applied on top of the stored one for a single command.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Toggle a value before evaluating (repeatable).
    #[arg(long = "select", short = 's', value_name = "FIELD=VALUE")]
    pub select: Vec<String>,
}

#[derive(Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Fields to classify (default: every field).
    #[arg(long = "field", short = 'f', value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Report values superseded by a selection in their own field as alternative.
    #[arg(long = "alternatives")]
    pub alternatives: bool,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Field to group by.
    #[arg(long = "dimension", short = 'd', value_name = "FIELD")]
    pub dimension: String,

    /// Field to aggregate; without it the distinct dimension values are listed.
    #[arg(long = "measure", short = 'm', value_name = "FIELD")]
    pub measure: Option<String>,

    /// Aggregation operation.
    #[arg(long = "op", value_enum, default_value = "sum")]
    pub op: MeasureOpArg,

    /// Number of groups to keep.
    #[arg(long = "top", value_name = "N", default_value_t = DEFAULT_TOP_N, conflicts_with = "all")]
    pub top: usize,

    /// Keep every group.
    #[arg(long = "all")]
    pub all: bool,

    /// Order groups by key instead of by value (as line charts do).
    #[arg(long = "by-key")]
    pub by_key: bool,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum SelectCommand {
    /// Select a value, or deselect it if already selected.
    Toggle {
        #[arg(value_name = "FIELD=VALUE")]
        selection: String,
    },

    /// Replace a field's selection with exactly the given values.
    Only {
        #[arg(value_name = "FIELD")]
        field: String,
        #[arg(value_name = "VALUE", required = true)]
        values: Vec<String>,
    },

    /// Clear the selection of one field.
    Clear {
        #[arg(value_name = "FIELD")]
        field: String,
    },

    /// Clear every selection.
    ClearAll,

    /// Show the current selection.
    Show,
}

#[derive(Subcommand)]
pub enum SheetCommand {
    /// List sheets, marking the active one.
    List,

    /// Append a new empty sheet and make it active.
    Add,

    /// Remove a sheet (the last sheet cannot be removed).
    Remove {
        #[arg(value_name = "SHEET_ID")]
        id: String,
    },

    /// Rename a sheet.
    Rename {
        #[arg(value_name = "SHEET_ID")]
        id: String,
        name: String,
    },

    /// Set the title shown on a sheet.
    Title {
        #[arg(value_name = "SHEET_ID")]
        id: String,
        title: String,
    },

    /// Make a sheet the active one.
    Activate {
        #[arg(value_name = "SHEET_ID")]
        id: String,
    },

    /// Set the dashboard title.
    Retitle { title: String },
}

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Sheet to render (default: the active sheet).
    #[arg(long = "sheet", value_name = "SHEET_ID")]
    pub sheet: Option<String>,

    /// Number of groups kept by charts.
    #[arg(long = "top", value_name = "N", default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI aggregation choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MeasureOpArg {
    Sum,
    Avg,
    Count,
}

impl From<MeasureOpArg> for MeasureOp {
    fn from(value: MeasureOpArg) -> Self {
        match value {
            MeasureOpArg::Sum => MeasureOp::Sum,
            MeasureOpArg::Avg => MeasureOp::Avg,
            MeasureOpArg::Count => MeasureOp::Count,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
