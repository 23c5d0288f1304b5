//! Shared clap helper types for CLI commands.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use qrdeck::ErrorTolerance;

/// Error-correction levels accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ErrorToleranceArg {
    Low,
    Medium,
    Quartile,
    High,
}

impl From<ErrorToleranceArg> for ErrorTolerance {
    fn from(value: ErrorToleranceArg) -> ErrorTolerance {
        match value {
            ErrorToleranceArg::Low => ErrorTolerance::Low,
            ErrorToleranceArg::Medium => ErrorTolerance::Medium,
            ErrorToleranceArg::Quartile => ErrorTolerance::Quartile,
            ErrorToleranceArg::High => ErrorTolerance::High,
        }
    }
}

/// Layout options shared by every render command.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Sheet configuration file (TOML).
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// Override the distance from the page edge to the grid.
    #[arg(long = "padding")]
    pub padding_mm: Option<f32>,
    /// Override the code error-correction level.
    #[arg(long, value_enum)]
    pub tolerance: Option<ErrorToleranceArg>,
}
