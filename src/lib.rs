#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
use std::path::PathBuf;
use thiserror::Error;

pub mod action;
pub mod config;
pub mod eval;
pub mod evidence;
pub mod ids;
pub mod index;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod ranking;
mod group;

pub use action::{ActionPolicy, ActionRule, ActionWeighting};
pub use config::{Coefficients, RankConfig, StructuralScaling};
pub use group::IdGroup;
pub use ids::{DrugId, GeneSymbol, PhenotypeId, ProteinId, StandardTerm};
pub use index::{IndexBuilder, RelationIndex};
pub use parser::{LoadWarning, RelationTables};
pub use ranking::{DrugRanking, RankedPhenotype, Ranker, ScoreBreakdown};

const DEFAULT_GROUP_SIZE: usize = 4;
const DEFAULT_TOP_K: usize = 10;

/// Number of decimal places used when rendering scores
pub const SCORE_PRECISION: usize = 6;

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RankError {
    /// A required relation table does not exist
    #[error("unable to load required table `{table}` from {}", path.display())]
    Load {
        /// Name of the relation table
        table: &'static str,
        /// The expected location of the table
        path: PathBuf,
    },
    /// Failed to open a file
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// The header of a table does not contain a required column
    #[error("table `{table}` is missing column `{column}`")]
    MissingColumn {
        /// Name of the relation table
        table: &'static str,
        /// Name of the missing column
        column: &'static str,
    },
    /// Input data is invalid
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    /// A weighting coefficient is negative or not finite
    #[error("coefficient `{name}` must be a finite, non-negative number, got {value}")]
    InvalidCoefficient {
        /// Name of the coefficient
        name: &'static str,
        /// The rejected value
        value: f64,
    },
    /// Failed to read or write delimited data
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// Generic IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The configuration file cannot be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Shortcut for `Result<T, RankError>`
pub type RankResult<T> = Result<T, RankError>;
