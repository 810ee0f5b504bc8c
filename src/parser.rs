//! Loading the relation tables from delimited text files
//!
//! Every table is a delimited text file with a header row. Tab is used as
//! delimiter for `.tsv` and `.txt` files, comma for all others. Columns are
//! identified by their header name and some tables accept alternative names,
//! e.g. the phenotype column can be named `phenotype_id` or `hpo_id`.
//!
//! Rows with missing fields or malformed numbers are skipped. Each skipped
//! row is logged and recorded as a [`LoadWarning`], the run continues.
//!
//! ```text
//! drug_id,protein_id,action_type
//! CHEMBL1064,P04035,INHIBITOR
//! CHEMBL108,P35498,
//! ```
use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::config::TableFiles;
use crate::ids::{DrugId, GeneSymbol, PhenotypeId, ProteinId, StandardTerm};
use crate::{RankError, RankResult};

/// Table name of the Drug → Protein relation
pub const DRUG_TARGETS: &str = "drug_targets";
/// Table name of the Protein → Gene relation
pub const PROTEIN_GENES: &str = "protein_genes";
/// Table name of the Gene → Phenotype relation
pub const GENE_PHENOTYPES: &str = "gene_phenotypes";
/// Table name of the Drug → Gene pharmacogenomic weights
pub const PGX_WEIGHTS: &str = "pgx_weights";
/// Table name of the Phenotype → standardized term mapping
pub const TERM_MAP: &str = "term_map";
/// Table name of the standardized term priors
pub const TERM_PRIORS: &str = "term_priors";
/// Table name of the Drug → Protein action labels
pub const TARGET_ACTIONS: &str = "target_actions";

const DRUG_COLUMN: &[&str] = &["drug_id", "drug"];
const PROTEIN_COLUMN: &[&str] = &["protein_id", "protein"];
const GENE_COLUMN: &[&str] = &["gene_id", "gene", "gene_symbol"];
const PHENOTYPE_COLUMN: &[&str] = &["phenotype_id", "hpo_id"];
const ACTION_COLUMN: &[&str] = &["action_type", "action"];
const WEIGHT_COLUMN: &[&str] = &["weight", "cpic_weight"];
const TERM_COLUMN: &[&str] = &["standardized_term", "meddra_pt", "pt_name", "pt"];
const PRIOR_COLUMN: &[&str] = &["prior"];

/// Reason why a row was skipped
#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    /// A required field is missing or empty
    MissingField(&'static str),
    /// A numeric field cannot be parsed
    InvalidNumber {
        /// Column of the field
        column: &'static str,
        /// Raw field value
        value: String,
    },
    /// A numeric field is outside of the allowed range
    OutOfRange {
        /// Column of the field
        column: &'static str,
        /// Parsed value
        value: f64,
    },
}

/// A row that was skipped while loading a table
#[derive(Debug, Clone, PartialEq)]
pub struct LoadWarning {
    table: &'static str,
    line: u64,
    kind: WarningKind,
}

impl LoadWarning {
    /// The table that contains the row
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// The line number of the row (the header is line 1)
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Why the row was skipped
    pub fn kind(&self) -> &WarningKind {
        &self.kind
    }
}

impl Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} line {}: ", self.table, self.line)?;
        match &self.kind {
            WarningKind::MissingField(column) => write!(f, "missing value for `{column}`"),
            WarningKind::InvalidNumber { column, value } => {
                write!(f, "`{value}` is not a valid number for `{column}`")
            }
            WarningKind::OutOfRange { column, value } => {
                write!(f, "{value} is out of range for `{column}`")
            }
        }
    }
}

/// A Drug → Protein edge with an optional action label
#[derive(Debug, Clone, PartialEq)]
pub struct DrugTargetRow {
    /// The drug
    pub drug: DrugId,
    /// The target protein
    pub protein: ProteinId,
    /// Free text action label, if present and non-empty
    pub action: Option<String>,
}

/// A Protein → Gene edge
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinGeneRow {
    /// The protein
    pub protein: ProteinId,
    /// The gene encoding the protein
    pub gene: GeneSymbol,
}

/// A Gene → Phenotype edge
#[derive(Debug, Clone, PartialEq)]
pub struct GenePhenotypeRow {
    /// The gene
    pub gene: GeneSymbol,
    /// The associated phenotype
    pub phenotype: PhenotypeId,
}

/// A pharmacogenomic weight of a gene for a drug
#[derive(Debug, Clone, PartialEq)]
pub struct PgxWeightRow {
    /// The drug
    pub drug: DrugId,
    /// The gene
    pub gene: GeneSymbol,
    /// Non-negative prior weight
    pub weight: f64,
}

/// Mapping of a phenotype to a standardized term
#[derive(Debug, Clone, PartialEq)]
pub struct TermMapRow {
    /// The phenotype
    pub phenotype: PhenotypeId,
    /// The standardized term
    pub term: StandardTerm,
}

/// Population frequency prior of a standardized term
#[derive(Debug, Clone, PartialEq)]
pub struct TermPriorRow {
    /// The standardized term
    pub term: StandardTerm,
    /// Prior in `[0, 1]`
    pub prior: f64,
}

/// All relation tables of a run, as parsed rows
///
/// Optional tables that do not exist are represented as empty tables.
#[derive(Debug, Clone, Default)]
pub struct RelationTables {
    /// Drug → Protein edges
    pub drug_targets: Vec<DrugTargetRow>,
    /// Protein → Gene edges
    pub protein_genes: Vec<ProteinGeneRow>,
    /// Gene → Phenotype edges
    pub gene_phenotypes: Vec<GenePhenotypeRow>,
    /// Drug → Gene pharmacogenomic weights
    pub pgx_weights: Vec<PgxWeightRow>,
    /// Phenotype → standardized term mapping
    pub term_map: Vec<TermMapRow>,
    /// Standardized term priors
    pub term_priors: Vec<TermPriorRow>,
    /// Additional action labels of Drug → Protein edges
    pub target_actions: Vec<DrugTargetRow>,
    warnings: Vec<LoadWarning>,
}

impl RelationTables {
    /// Loads all tables from `dir`, using the file names from `files`
    ///
    /// # Errors
    ///
    /// - [`RankError::Load`] if one of the required tables (drug targets,
    ///   protein genes, gene phenotypes) does not exist
    /// - [`RankError::MissingColumn`] if a table header lacks a required column
    /// - [`RankError::CannotOpenFile`] or [`RankError::Csv`] if a file cannot be read
    pub fn load<P: AsRef<Path>>(dir: P, files: &TableFiles) -> RankResult<Self> {
        let dir = dir.as_ref();
        let mut tables = RelationTables::default();
        let mut warnings = Vec::new();

        // required tables are checked first, so that a missing table
        // fails the run before any other file is parsed
        let targets_path = required(DRUG_TARGETS, dir.join(&files.drug_targets))?;
        let proteins_path = required(PROTEIN_GENES, dir.join(&files.protein_genes))?;
        let phenotypes_path = required(GENE_PHENOTYPES, dir.join(&files.gene_phenotypes))?;

        tables.drug_targets =
            parse_drug_targets(DRUG_TARGETS, open(&targets_path)?, &mut warnings)?;
        tables.protein_genes = parse_protein_genes(open(&proteins_path)?, &mut warnings)?;
        tables.gene_phenotypes = parse_gene_phenotypes(open(&phenotypes_path)?, &mut warnings)?;

        if let Some(path) = optional(PGX_WEIGHTS, dir.join(&files.pgx_weights)) {
            tables.pgx_weights = parse_pgx_weights(open(&path)?, &mut warnings)?;
        }
        if let Some(path) = optional(TERM_MAP, dir.join(&files.term_map)) {
            tables.term_map = parse_term_map(open(&path)?, &mut warnings)?;
        }
        if let Some(path) = optional(TERM_PRIORS, dir.join(&files.term_priors)) {
            tables.term_priors = parse_term_priors(open(&path)?, &mut warnings)?;
        }
        if let Some(path) = optional(TARGET_ACTIONS, dir.join(&files.target_actions)) {
            tables.target_actions =
                parse_drug_targets(TARGET_ACTIONS, open(&path)?, &mut warnings)?;
        }

        info!(
            "Loaded {} drug targets, {} protein genes, {} gene phenotypes, {} pgx weights, {} term mappings, {} term priors ({} rows skipped)",
            tables.drug_targets.len(),
            tables.protein_genes.len(),
            tables.gene_phenotypes.len(),
            tables.pgx_weights.len(),
            tables.term_map.len(),
            tables.term_priors.len(),
            warnings.len()
        );
        tables.warnings = warnings;
        Ok(tables)
    }

    /// All rows that were skipped during loading
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}

fn required(table: &'static str, path: PathBuf) -> RankResult<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(RankError::Load { table, path })
    }
}

fn optional(table: &'static str, path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        Some(path)
    } else {
        info!(
            "Optional table {} not found at {}, its contribution will be zero",
            table,
            path.display()
        );
        None
    }
}

/// Returns the field delimiter for the given file, based on its extension
fn delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => b'\t',
        _ => b',',
    }
}

fn reader_builder(delimiter: u8) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All);
    builder
}

fn open(path: &Path) -> RankResult<csv::Reader<File>> {
    debug!("Reading {}", path.display());
    let file = File::open(path).map_err(|_| RankError::CannotOpenFile(path.display().to_string()))?;
    Ok(reader_builder(delimiter(path)).from_reader(file))
}

/// Column indices of a table, resolved from its header
struct Header {
    table: &'static str,
    names: Vec<String>,
}

impl Header {
    fn read<R: Read>(table: &'static str, reader: &mut csv::Reader<R>) -> RankResult<Self> {
        let names = reader
            .headers()?
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        Ok(Self { table, names })
    }

    /// A table without any header is treated as a table without rows
    fn is_blank(&self) -> bool {
        let blank = self.names.iter().all(String::is_empty);
        if blank {
            info!("Table {} is empty", self.table);
        }
        blank
    }

    fn optional(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.names.iter().position(|name| name == alias))
    }

    fn required(&self, aliases: &'static [&'static str]) -> RankResult<usize> {
        self.optional(aliases).ok_or(RankError::MissingColumn {
            table: self.table,
            column: aliases[0],
        })
    }
}

/// A single row of a table with access to its fields
struct Row<'a> {
    table: &'static str,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    fn line(&self) -> u64 {
        self.record.position().map_or(0, |pos| pos.line())
    }

    fn warning(&self, kind: WarningKind) -> LoadWarning {
        let warning = LoadWarning {
            table: self.table,
            line: self.line(),
            kind,
        };
        warn!("Skipping row: {}", warning);
        warning
    }

    /// Returns the non-empty field at `idx`
    fn get(&self, idx: usize) -> Option<&'a str> {
        self.record.get(idx).filter(|value| !value.is_empty())
    }

    fn required(&self, idx: usize, column: &'static str) -> Result<&'a str, LoadWarning> {
        self.get(idx)
            .ok_or_else(|| self.warning(WarningKind::MissingField(column)))
    }

    /// Parses a number and checks that it lies within `min..=max`
    fn number(
        &self,
        idx: usize,
        column: &'static str,
        min: f64,
        max: f64,
    ) -> Result<f64, LoadWarning> {
        let raw = self.required(idx, column)?;
        let value = raw.parse::<f64>().map_err(|_| {
            self.warning(WarningKind::InvalidNumber {
                column,
                value: raw.to_string(),
            })
        })?;
        if value.is_nan() || value < min || value > max {
            return Err(self.warning(WarningKind::OutOfRange { column, value }));
        }
        Ok(value)
    }
}

/// Iterates all records of a table and collects the successfully parsed rows
fn parse_rows<R, T, F>(
    table: &'static str,
    reader: &mut csv::Reader<R>,
    warnings: &mut Vec<LoadWarning>,
    parse_row: F,
) -> RankResult<Vec<T>>
where
    R: Read,
    F: Fn(&Row) -> Result<T, LoadWarning>,
{
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = Row {
            table,
            record: &record,
        };
        match parse_row(&row) {
            Ok(parsed) => rows.push(parsed),
            Err(warning) => warnings.push(warning),
        }
    }
    debug!("Parsed {} rows of {}", rows.len(), table);
    Ok(rows)
}

/// Parses Drug → Protein rows, `drug_id, protein_id[, action_type]`
///
/// The same layout is used for the separate action table.
pub(crate) fn parse_drug_targets<R: Read>(
    table: &'static str,
    mut reader: csv::Reader<R>,
    warnings: &mut Vec<LoadWarning>,
) -> RankResult<Vec<DrugTargetRow>> {
    let header = Header::read(table, &mut reader)?;
    if header.is_blank() {
        return Ok(Vec::new());
    }
    let drug = header.required(DRUG_COLUMN)?;
    let protein = header.required(PROTEIN_COLUMN)?;
    let action = header.optional(ACTION_COLUMN);

    parse_rows(table, &mut reader, warnings, |row| {
        Ok(DrugTargetRow {
            drug: DrugId::new(row.required(drug, DRUG_COLUMN[0])?),
            protein: ProteinId::new(row.required(protein, PROTEIN_COLUMN[0])?),
            action: action.and_then(|idx| row.get(idx)).map(str::to_string),
        })
    })
}

/// Parses Protein → Gene rows, `protein_id, gene_id`
pub(crate) fn parse_protein_genes<R: Read>(
    mut reader: csv::Reader<R>,
    warnings: &mut Vec<LoadWarning>,
) -> RankResult<Vec<ProteinGeneRow>> {
    let header = Header::read(PROTEIN_GENES, &mut reader)?;
    if header.is_blank() {
        return Ok(Vec::new());
    }
    let protein = header.required(PROTEIN_COLUMN)?;
    let gene = header.required(GENE_COLUMN)?;

    parse_rows(PROTEIN_GENES, &mut reader, warnings, |row| {
        Ok(ProteinGeneRow {
            protein: ProteinId::new(row.required(protein, PROTEIN_COLUMN[0])?),
            gene: GeneSymbol::new(row.required(gene, GENE_COLUMN[0])?),
        })
    })
}

/// Parses Gene → Phenotype rows, `gene_id, phenotype_id`
pub(crate) fn parse_gene_phenotypes<R: Read>(
    mut reader: csv::Reader<R>,
    warnings: &mut Vec<LoadWarning>,
) -> RankResult<Vec<GenePhenotypeRow>> {
    let header = Header::read(GENE_PHENOTYPES, &mut reader)?;
    if header.is_blank() {
        return Ok(Vec::new());
    }
    let gene = header.required(GENE_COLUMN)?;
    let phenotype = header.required(PHENOTYPE_COLUMN)?;

    parse_rows(GENE_PHENOTYPES, &mut reader, warnings, |row| {
        Ok(GenePhenotypeRow {
            gene: GeneSymbol::new(row.required(gene, GENE_COLUMN[0])?),
            phenotype: PhenotypeId::new(row.required(phenotype, PHENOTYPE_COLUMN[0])?),
        })
    })
}

/// Parses pharmacogenomic weights, `drug_id, gene_id, weight`
pub(crate) fn parse_pgx_weights<R: Read>(
    mut reader: csv::Reader<R>,
    warnings: &mut Vec<LoadWarning>,
) -> RankResult<Vec<PgxWeightRow>> {
    let header = Header::read(PGX_WEIGHTS, &mut reader)?;
    if header.is_blank() {
        return Ok(Vec::new());
    }
    let drug = header.required(DRUG_COLUMN)?;
    let gene = header.required(GENE_COLUMN)?;
    let weight = header.required(WEIGHT_COLUMN)?;

    parse_rows(PGX_WEIGHTS, &mut reader, warnings, |row| {
        Ok(PgxWeightRow {
            drug: DrugId::new(row.required(drug, DRUG_COLUMN[0])?),
            gene: GeneSymbol::new(row.required(gene, GENE_COLUMN[0])?),
            weight: row.number(weight, WEIGHT_COLUMN[0], 0.0, f64::MAX)?,
        })
    })
}

/// Parses the phenotype → standardized term mapping, `phenotype_id, standardized_term`
pub(crate) fn parse_term_map<R: Read>(
    mut reader: csv::Reader<R>,
    warnings: &mut Vec<LoadWarning>,
) -> RankResult<Vec<TermMapRow>> {
    let header = Header::read(TERM_MAP, &mut reader)?;
    if header.is_blank() {
        return Ok(Vec::new());
    }
    let phenotype = header.required(PHENOTYPE_COLUMN)?;
    let term = header.required(TERM_COLUMN)?;

    parse_rows(TERM_MAP, &mut reader, warnings, |row| {
        Ok(TermMapRow {
            phenotype: PhenotypeId::new(row.required(phenotype, PHENOTYPE_COLUMN[0])?),
            term: StandardTerm::new(row.required(term, TERM_COLUMN[0])?),
        })
    })
}

/// Parses standardized term priors, `standardized_term, prior`
pub(crate) fn parse_term_priors<R: Read>(
    mut reader: csv::Reader<R>,
    warnings: &mut Vec<LoadWarning>,
) -> RankResult<Vec<TermPriorRow>> {
    let header = Header::read(TERM_PRIORS, &mut reader)?;
    if header.is_blank() {
        return Ok(Vec::new());
    }
    let term = header.required(TERM_COLUMN)?;
    let prior = header.required(PRIOR_COLUMN)?;

    parse_rows(TERM_PRIORS, &mut reader, warnings, |row| {
        Ok(TermPriorRow {
            term: StandardTerm::new(row.required(term, TERM_COLUMN[0])?),
            prior: row.number(prior, PRIOR_COLUMN[0], 0.0, 1.0)?,
        })
    })
}
