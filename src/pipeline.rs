//! End-to-end ranking runs
//!
//! A run loads the relation tables from an input directory, builds the
//! [`RelationIndex`], ranks every drug and writes the ranked tables into
//! an output directory.
//!
//! All rankings are computed before the first file is written. If loading
//! fails, the output directory is left untouched.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::output::{write_preview_file, write_ranking_file, write_summary_file};
use crate::{DrugRanking, LoadWarning, RankConfig, RankResult, Ranker, RelationIndex, RelationTables};

/// The outcome of a successful run
#[derive(Debug, Default)]
pub struct RunSummary {
    drugs: usize,
    files: Vec<PathBuf>,
    warnings: Vec<LoadWarning>,
}

impl RunSummary {
    /// The number of ranked drugs
    pub fn drugs(&self) -> usize {
        self.drugs
    }

    /// All files that were written, in the order they were written
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// The rows that were skipped while loading the tables
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}

/// Loads the relation tables from `input_dir` and builds the index
///
/// # Errors
///
/// All errors of [`RelationTables::load`]
pub fn load_index<P: AsRef<Path>>(
    input_dir: P,
    config: &RankConfig,
) -> RankResult<(RelationIndex, Vec<LoadWarning>)> {
    let tables = RelationTables::load(input_dir, &config.tables)?;
    let index = RelationIndex::from_tables(&tables);
    Ok((index, tables.warnings().to_vec()))
}

/// Ranks all drugs of an index, using all available threads
pub fn rank(index: &RelationIndex, config: &RankConfig) -> Vec<DrugRanking> {
    Ranker::new(index, config.coefficients).par_rank_all()
}

/// Writes the rankings and, depending on the output options, the summaries
/// and the preview table into `output_dir`
///
/// The directory is created if it does not exist.
///
/// # Errors
///
/// - [`crate::RankError::Io`] if the directory cannot be created
/// - all errors of the [`crate::output`] writers
pub fn write<P: AsRef<Path>>(
    output_dir: P,
    rankings: &[DrugRanking],
    index: &RelationIndex,
    config: &RankConfig,
) -> RankResult<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut files = Vec::with_capacity(rankings.len() * 2 + 1);
    for ranking in rankings {
        files.push(write_ranking_file(output_dir, ranking)?);
        if config.output.write_summaries {
            files.push(write_summary_file(output_dir, ranking)?);
        }
    }
    if config.output.write_preview {
        files.push(write_preview_file(
            output_dir,
            rankings,
            index,
            config.output.top_k,
        )?);
    }
    Ok(files)
}

/// Runs the complete pipeline from `input_dir` to `output_dir`
///
/// # Errors
///
/// - [`crate::RankError::Load`] if a required table is missing, nothing
///   is written in this case
/// - all errors of [`load_index`] and [`write`]
///
/// # Examples
///
/// ```no_run
/// use phenorank::RankConfig;
/// use phenorank::pipeline::run;
///
/// let summary = run("data/", "results/", &RankConfig::default()).unwrap();
/// println!("Ranked {} drugs", summary.drugs());
/// ```
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    config: &RankConfig,
) -> RankResult<RunSummary> {
    let (index, warnings) = load_index(input_dir, config)?;
    if !warnings.is_empty() {
        warn!("{} rows were skipped while loading", warnings.len());
    }
    if index.drugs().is_empty() {
        warn!("No drugs found in the input tables");
    }

    let rankings = rank(&index, config);
    let files = write(output_dir.as_ref(), &rankings, &index, config)?;
    info!(
        "Wrote {} files for {} drugs to {}",
        files.len(),
        rankings.len(),
        output_dir.as_ref().display()
    );

    Ok(RunSummary {
        drugs: rankings.len(),
        files,
        warnings,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::IndexBuilder;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("phenorank-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn write_respects_output_options() {
        let mut builder = IndexBuilder::new();
        builder.add_drug_target("D1", "P1", None);
        builder.add_drug_target("D2", "P1", None);
        builder.add_protein_gene("P1", "G1");
        builder.add_gene_phenotype("G1", "HP:0000001");
        let index = builder.build();

        let mut config = RankConfig::default();
        config.output.write_summaries = false;
        config.output.write_preview = false;
        let rankings = rank(&index, &config);

        let dir = scratch_dir("options");
        let files = write(&dir, &rankings, &index, &config).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["D1_ranked_hpo.csv", "D2_ranked_hpo.csv"]);

        config.output.write_summaries = true;
        config.output.write_preview = true;
        let files = write(&dir, &rankings, &index, &config).unwrap();
        assert_eq!(files.len(), 5);
        assert!(dir.join("topk_preview.csv").is_file());
        assert!(dir.join("debug_D2.txt").is_file());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn similar_drug_names_get_separate_files() {
        let mut builder = IndexBuilder::new();
        builder.add_drug_target("a/b", "P1", Some("inhibitor"));
        builder.add_drug_target("a_b", "P1", None);
        builder.add_protein_gene("P1", "G1");
        builder.add_gene_phenotype("G1", "HP:0000001");
        let index = builder.build();

        let mut config = RankConfig::default();
        config.output.write_summaries = false;
        config.output.write_preview = false;
        let rankings = rank(&index, &config);

        let dir = scratch_dir("similar-names");
        let files = write(&dir, &rankings, &index, &config).unwrap();
        assert_eq!(files.len(), 2);
        assert_ne!(files[0], files[1]);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);
        assert_eq!(
            fs::read_to_string(&files[0]).unwrap(),
            "phenotype_id,score\nHP:0000001,1.200000\n"
        );
        assert_eq!(
            fs::read_to_string(&files[1]).unwrap(),
            "phenotype_id,score\nHP:0000001,1.000000\n"
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_writes_nothing() {
        let input = scratch_dir("missing-input");
        let output = scratch_dir("missing-output");
        assert!(run(&input, &output, &RankConfig::default()).is_err());
        assert!(!output.exists());
    }
}
