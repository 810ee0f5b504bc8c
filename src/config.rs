//! Run configuration
//!
//! A [`RankConfig`] bundles the weighting [`Coefficients`], the file names
//! of the relation tables and output options. All sections are optional
//! and fall back to their defaults, so an empty TOML document is a valid
//! configuration.
//!
//! ```toml
//! [coefficients]
//! beta = 0.6
//! lambda = 0.3
//! structural_scaling = "raw"   # or "max_normalized"
//!
//! [tables]
//! drug_targets = "drug_targets.csv"
//! pgx_weights = "drug_gene_pgx.csv"
//!
//! [output]
//! top_k = 10
//! write_summaries = true
//! ```
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::{RankError, RankResult, DEFAULT_TOP_K};

/// Default weight of the pharmacogenomic prior (β)
pub const DEFAULT_BETA: f64 = 0.6;
/// Default weight of the population frequency prior (λ)
pub const DEFAULT_LAMBDA: f64 = 0.3;

/// How structural evidence enters the final score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralScaling {
    /// Raw additive accumulation of action weights over all evidence paths
    #[default]
    Raw,
    /// Structural scores of a drug are divided by their maximum,
    /// bounding them to `[0, 1]` before they are combined with the priors
    MaxNormalized,
}

/// Weighting coefficients of the evidence sources
///
/// # Examples
///
/// ```
/// use phenorank::{Coefficients, StructuralScaling};
///
/// let coef = Coefficients::default();
/// assert_eq!(coef.beta(), 0.6);
/// assert_eq!(coef.lambda(), 0.3);
/// assert_eq!(coef.structural_scaling(), StructuralScaling::Raw);
///
/// assert!(Coefficients::new(-0.1, 0.3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Coefficients {
    beta: f64,
    lambda: f64,
    structural_scaling: StructuralScaling,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            beta: DEFAULT_BETA,
            lambda: DEFAULT_LAMBDA,
            structural_scaling: StructuralScaling::Raw,
        }
    }
}

impl Coefficients {
    /// Constructs new `Coefficients` with raw structural scaling
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidCoefficient`] if `beta` or `lambda`
    /// is negative or not finite
    pub fn new(beta: f64, lambda: f64) -> RankResult<Self> {
        let coef = Self {
            beta,
            lambda,
            structural_scaling: StructuralScaling::Raw,
        };
        coef.validate()?;
        Ok(coef)
    }

    /// Sets the [`StructuralScaling`]
    #[must_use]
    pub fn with_structural_scaling(mut self, scaling: StructuralScaling) -> Self {
        self.structural_scaling = scaling;
        self
    }

    /// Weight of the pharmacogenomic prior
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Weight of the population frequency prior
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// How structural evidence is scaled before combination
    pub fn structural_scaling(&self) -> StructuralScaling {
        self.structural_scaling
    }

    /// Checks that all coefficients are finite and non-negative
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidCoefficient`] for the first invalid value
    pub fn validate(&self) -> RankResult<()> {
        for (name, value) in [("beta", self.beta), ("lambda", self.lambda)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RankError::InvalidCoefficient { name, value });
            }
        }
        Ok(())
    }
}

/// File names of the relation tables, relative to the input directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableFiles {
    /// Drug → Protein edges (required)
    pub drug_targets: String,
    /// Protein → Gene edges (required)
    pub protein_genes: String,
    /// Gene → Phenotype edges (required)
    pub gene_phenotypes: String,
    /// Drug → Gene pharmacogenomic weights
    pub pgx_weights: String,
    /// Phenotype → standardized term mapping
    pub term_map: String,
    /// Standardized term → population prior
    pub term_priors: String,
    /// Action labels of Drug → Protein edges
    pub target_actions: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            drug_targets: "drug_targets.csv".to_string(),
            protein_genes: "protein_gene.csv".to_string(),
            gene_phenotypes: "gene_hpo.csv".to_string(),
            pgx_weights: "drug_gene_pgx.csv".to_string(),
            term_map: "hpo_meddra_map.tsv".to_string(),
            term_priors: "pt_prior.csv".to_string(),
            target_actions: "drug_target_actions.tsv".to_string(),
        }
    }
}

/// Options for writing ranked output
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputOptions {
    /// Number of entries per drug in the top-k preview table
    pub top_k: usize,
    /// Write a short `debug_<drug>.txt` summary next to each ranked table
    pub write_summaries: bool,
    /// Write the cross-drug `topk_preview.csv` table
    pub write_preview: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            write_summaries: true,
            write_preview: true,
        }
    }
}

/// Complete configuration of a ranking run
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    /// Weighting coefficients
    pub coefficients: Coefficients,
    /// File names of the input tables
    pub tables: TableFiles,
    /// Output options
    pub output: OutputOptions,
}

impl RankConfig {
    /// Parses a configuration from a TOML string
    ///
    /// # Errors
    ///
    /// - [`RankError::Config`] if the document is not valid
    /// - [`RankError::InvalidCoefficient`] if a coefficient is out of range
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::{RankConfig, StructuralScaling};
    ///
    /// let config = RankConfig::from_toml_str(r#"
    ///     [coefficients]
    ///     beta = 0.0
    ///     structural_scaling = "max_normalized"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.coefficients.beta(), 0.0);
    /// assert_eq!(config.coefficients.lambda(), 0.3);
    /// assert_eq!(config.coefficients.structural_scaling(), StructuralScaling::MaxNormalized);
    /// assert_eq!(config.tables.drug_targets, "drug_targets.csv");
    /// ```
    pub fn from_toml_str(s: &str) -> RankResult<Self> {
        let config: RankConfig = toml::from_str(s)?;
        config.coefficients.validate()?;
        Ok(config)
    }

    /// Reads the configuration from a TOML file
    ///
    /// # Errors
    ///
    /// - [`RankError::CannotOpenFile`] if the file cannot be read
    /// - all errors of [`RankConfig::from_toml_str`]
    pub fn from_file<P: AsRef<Path>>(path: P) -> RankResult<Self> {
        let path = path.as_ref();
        debug!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|_| RankError::CannotOpenFile(path.display().to_string()))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = RankConfig::from_toml_str("").unwrap();
        assert_eq!(config, RankConfig::default());
        assert_eq!(config.output.top_k, 10);
    }

    #[test]
    fn negative_coefficient_is_rejected() {
        let err = RankConfig::from_toml_str("[coefficients]\nlambda = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            RankError::InvalidCoefficient { name: "lambda", .. }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = RankConfig::from_toml_str("[coefficients]\ngamma = 1.0\n").unwrap_err();
        assert!(matches!(err, RankError::Config(_)));
    }

    #[test]
    fn nan_is_rejected() {
        assert!(Coefficients::new(f64::NAN, 0.3).is_err());
        assert!(Coefficients::new(0.6, f64::INFINITY).is_err());
        assert!(Coefficients::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn table_names_can_be_overridden() {
        let config = RankConfig::from_toml_str(
            "[tables]\nterm_map = \"map.csv\"\n[output]\nwrite_preview = false\n",
        )
        .unwrap();
        assert_eq!(config.tables.term_map, "map.csv");
        assert_eq!(config.tables.term_priors, "pt_prior.csv");
        assert!(!config.output.write_preview);
        assert!(config.output.write_summaries);
    }
}
