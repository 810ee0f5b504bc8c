//! The three evidence sources that contribute to a phenotype's score
//!
//! Each aggregator is a pure function of the immutable [`RelationIndex`],
//! a single drug and its coefficient. None of them modifies shared state,
//! so different drugs can be aggregated concurrently.
//!
//! - [`structural`]: action-weighted drug → protein → gene → phenotype paths
//! - [`genetic`]: pharmacogenomic weights of drug → gene pairs
//! - [`population`]: frequency priors of the phenotype's standardized term
//!
//! [`RelationIndex`]: crate::RelationIndex
use std::collections::BTreeMap;

use crate::PhenotypeId;

pub mod genetic;
pub mod population;
pub mod structural;

pub use genetic::genetic_evidence;
pub use population::population_evidence;
pub use structural::{structural_evidence, PathSupport, StructuralEvidence};

/// Partial scores of one evidence source, keyed by phenotype
///
/// The map is ordered by phenotype, so that iterating it is deterministic.
pub type PhenotypeScores<'a> = BTreeMap<&'a PhenotypeId, f64>;
