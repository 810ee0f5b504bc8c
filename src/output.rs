//! Writing rankings to delimited text files
//!
//! Each drug gets its own table `<drug>_ranked_hpo.csv`:
//!
//! ```text
//! phenotype_id,score
//! HP:0003198,2.840000
//! HP:0001250,1.200000
//! ```
//!
//! Scores are rendered with a fixed precision of [`SCORE_PRECISION`]
//! decimal places, so identical rankings result in byte-identical files.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{DrugId, DrugRanking, RankError, RankResult, RelationIndex, SCORE_PRECISION};

/// Name of the cross-drug preview table
pub const PREVIEW_FILE: &str = "topk_preview.csv";

/// Formats a score with [`SCORE_PRECISION`] decimal places
///
/// # Examples
///
/// ```
/// use phenorank::output::format_score;
///
/// assert_eq!(format_score(2.84), "2.840000");
/// assert_eq!(format_score(1.0 / 3.0), "0.333333");
/// ```
pub fn format_score(score: f64) -> String {
    format!("{:.*}", SCORE_PRECISION, score)
}

/// Percent-encodes characters that are not allowed in file names
///
/// `%` itself is encoded as well, so different drugs never share a file name.
fn file_stem(drug: &DrugId) -> String {
    let mut stem = String::with_capacity(drug.as_str().len());
    for c in drug.as_str().chars() {
        let reserved = matches!(c, '%' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|');
        if reserved || c.is_ascii_whitespace() || c.is_ascii_control() {
            stem.push_str(&format!("%{:02X}", u32::from(c)));
        } else {
            stem.push(c);
        }
    }
    stem
}

/// The file name of a drug's ranked table
pub fn ranking_file_name(drug: &DrugId) -> String {
    format!("{}_ranked_hpo.csv", file_stem(drug))
}

/// The file name of a drug's summary
pub fn summary_file_name(drug: &DrugId) -> String {
    format!("debug_{}.txt", file_stem(drug))
}

/// Writes the ranked table of a drug to `writer`
///
/// # Errors
///
/// Returns [`RankError::Csv`] if writing fails
pub fn write_ranking<W: Write>(writer: W, ranking: &DrugRanking) -> RankResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["phenotype_id", "score"])?;
    for entry in ranking {
        let score = format_score(entry.score());
        wtr.write_record([entry.phenotype().as_str(), score.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a one line summary with the best three phenotypes of a drug
///
/// # Errors
///
/// Returns [`RankError::Io`] if writing fails
pub fn write_summary<W: Write>(mut writer: W, ranking: &DrugRanking) -> RankResult<()> {
    let top: Vec<&str> = ranking
        .top(3)
        .iter()
        .map(|entry| entry.phenotype().as_str())
        .collect();
    writeln!(writer, "top3 HPO: {}", top.join(", "))?;
    Ok(())
}

/// Writes the best `k` phenotypes of every drug into a single table
///
/// The table contains the standardized term of each phenotype, if
/// the phenotype is mapped to one.
///
/// ```text
/// drug,rank,phenotype_id,standardized_term,score
/// CHEMBL1064,1,HP:0003198,Myopathy,2.840000
/// ```
///
/// # Errors
///
/// Returns [`RankError::Csv`] if writing fails
pub fn write_preview<W: Write>(
    writer: W,
    rankings: &[DrugRanking],
    index: &RelationIndex,
    k: usize,
) -> RankResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["drug", "rank", "phenotype_id", "standardized_term", "score"])?;
    for ranking in rankings {
        for (idx, entry) in ranking.top(k).iter().enumerate() {
            let rank = (idx + 1).to_string();
            let term = index.term(entry.phenotype()).map_or("", |term| term.name());
            let score = format_score(entry.score());
            wtr.write_record([
                ranking.drug().as_str(),
                rank.as_str(),
                entry.phenotype().as_str(),
                term,
                score.as_str(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn create(path: &Path) -> RankResult<File> {
    File::create(path).map_err(|_| RankError::CannotOpenFile(path.display().to_string()))
}

/// Writes the ranked table of a drug into `dir`
///
/// Returns the path of the created file
///
/// # Errors
///
/// - [`RankError::CannotOpenFile`] if the file cannot be created
/// - [`RankError::Csv`] if writing fails
pub fn write_ranking_file<P: AsRef<Path>>(dir: P, ranking: &DrugRanking) -> RankResult<PathBuf> {
    let path = dir.as_ref().join(ranking_file_name(ranking.drug()));
    debug!("Writing {}", path.display());
    write_ranking(create(&path)?, ranking)?;
    Ok(path)
}

/// Writes the summary of a drug into `dir`
///
/// Returns the path of the created file
///
/// # Errors
///
/// - [`RankError::CannotOpenFile`] if the file cannot be created
/// - [`RankError::Io`] if writing fails
pub fn write_summary_file<P: AsRef<Path>>(dir: P, ranking: &DrugRanking) -> RankResult<PathBuf> {
    let path = dir.as_ref().join(summary_file_name(ranking.drug()));
    write_summary(create(&path)?, ranking)?;
    Ok(path)
}

/// Writes the cross-drug preview table into `dir`
///
/// Returns the path of the created file
///
/// # Errors
///
/// - [`RankError::CannotOpenFile`] if the file cannot be created
/// - [`RankError::Csv`] if writing fails
pub fn write_preview_file<P: AsRef<Path>>(
    dir: P,
    rankings: &[DrugRanking],
    index: &RelationIndex,
    k: usize,
) -> RankResult<PathBuf> {
    let path = dir.as_ref().join(PREVIEW_FILE);
    debug!("Writing {}", path.display());
    write_preview(create(&path)?, rankings, index, k)?;
    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Coefficients, IndexBuilder, Ranker};

    fn index() -> RelationIndex {
        let mut builder = IndexBuilder::new();
        builder.add_drug_target("D1", "P1", Some("inhibitor"));
        builder.add_protein_gene("P1", "G1");
        builder.add_gene_phenotype("G1", "HP:0000002");
        builder.add_gene_phenotype("G1", "HP:0000001");
        builder.add_protein_gene("P1", "G2");
        builder.add_gene_phenotype("G2", "HP:0000002");
        builder.add_term_mapping("HP:0000002", "Rash");
        builder.build()
    }

    fn rankings(index: &RelationIndex) -> Vec<DrugRanking> {
        Ranker::new(index, Coefficients::new(0.0, 0.0).unwrap()).rank_all()
    }

    #[test]
    fn ranking_table() {
        let index = index();
        let rankings = rankings(&index);
        let mut buf = Vec::new();
        write_ranking(&mut buf, &rankings[0]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "phenotype_id,score\nHP:0000002,2.400000\nHP:0000001,1.200000\n"
        );
    }

    #[test]
    fn summary_line() {
        let index = index();
        let rankings = rankings(&index);
        let mut buf = Vec::new();
        write_summary(&mut buf, &rankings[0]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "top3 HPO: HP:0000002, HP:0000001\n"
        );
    }

    #[test]
    fn preview_table() {
        let index = index();
        let rankings = rankings(&index);
        let mut buf = Vec::new();
        write_preview(&mut buf, &rankings, &index, 1).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "drug,rank,phenotype_id,standardized_term,score\nD1,1,HP:0000002,Rash,2.400000\n"
        );
    }

    #[test]
    fn file_names_are_escaped() {
        assert_eq!(ranking_file_name(&DrugId::new("CHEMBL108")), "CHEMBL108_ranked_hpo.csv");
        assert_eq!(ranking_file_name(&DrugId::new("a/b c")), "a%2Fb%20c_ranked_hpo.csv");
        assert_eq!(summary_file_name(&DrugId::new("DB:001")), "debug_DB%3A001.txt");
        assert_eq!(ranking_file_name(&DrugId::new("5%")), "5%25_ranked_hpo.csv");
    }

    #[test]
    fn escaped_file_names_do_not_collide() {
        let drugs = ["a/b", "a_b", "a%2Fb", "a b", "a:b"];
        let names: std::collections::HashSet<String> = drugs
            .iter()
            .map(|drug| ranking_file_name(&DrugId::new(drug)))
            .collect();
        assert_eq!(names.len(), drugs.len());
    }
}
