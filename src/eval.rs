//! Evaluation of rankings against known adverse events
//!
//! A gold list contains the known adverse events of a drug, either as
//! phenotype identifiers (`HP:0003198`) or as standardized terms
//! (`Myopathy`). Rankings are compared to the gold list in a shared space:
//!
//! 1. If all gold items are phenotype identifiers, both the gold items and
//!    the ranking are projected to standardized terms. This is used if
//!    both projections are non-empty.
//! 2. Otherwise, if all gold items are phenotype identifiers, the comparison
//!    happens on the phenotype identifiers themselves.
//! 3. Otherwise the gold items are treated as standardized terms and the
//!    ranking is projected to standardized terms.
//!
//! Phenotype identifiers are compared uppercased, terms case-folded.
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::ids::is_hpo_id;
use crate::{DrugRanking, PhenotypeId, RankError, RankResult, RelationIndex, StandardTerm};

/// The space in which a ranking was compared to the gold list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalSpace {
    /// Phenotype identifiers
    Phenotype,
    /// Standardized terms
    Term,
}

impl std::fmt::Display for EvalSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalSpace::Phenotype => f.write_str("HPO"),
            EvalSpace::Term => f.write_str("PT"),
        }
    }
}

/// A ranking and a gold list, projected into the same space
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    ranked: Vec<String>,
    gold: HashSet<String>,
    space: EvalSpace,
}

impl Projection {
    /// The projected ranking, best first
    ///
    /// When projecting to terms, a term can occur multiple times, once for
    /// every ranked phenotype that maps to it.
    pub fn ranked(&self) -> &[String] {
        &self.ranked
    }

    /// The projected gold items
    pub fn gold(&self) -> &HashSet<String> {
        &self.gold
    }

    /// The evaluation space
    pub fn space(&self) -> EvalSpace {
        self.space
    }

    /// Projects a ranking and its gold items into a shared space
    pub fn new<S: AsRef<str>>(ranking: &DrugRanking, gold_items: &[S], index: &RelationIndex) -> Self {
        let gold_items: Vec<&str> = gold_items
            .iter()
            .map(|item| item.as_ref().trim_start_matches('\u{feff}').trim())
            .filter(|item| !item.is_empty())
            .collect();
        let all_phenotypes = gold_items.iter().all(|item| is_hpo_id(item));

        let terms = uppercase_term_map(index);
        let term_key = |id: &str| terms.get(&id.to_uppercase()).map(|key| key.to_string());
        let ranked_terms: Vec<String> = ranking
            .iter()
            .filter_map(|entry| term_key(entry.phenotype().as_str()))
            .collect();

        if all_phenotypes {
            let gold_terms: HashSet<String> =
                gold_items.iter().filter_map(|item| term_key(*item)).collect();
            if !gold_terms.is_empty() && !ranked_terms.is_empty() {
                return Self {
                    ranked: ranked_terms,
                    gold: gold_terms,
                    space: EvalSpace::Term,
                };
            }
            return Self {
                ranked: ranking
                    .iter()
                    .map(|entry| entry.phenotype().as_str().to_uppercase())
                    .collect(),
                gold: gold_items.iter().map(|item| item.to_uppercase()).collect(),
                space: EvalSpace::Phenotype,
            };
        }

        Self {
            ranked: ranked_terms,
            gold: gold_items.iter().map(|item| item.to_lowercase()).collect(),
            space: EvalSpace::Term,
        }
    }

    /// Fraction of the top `k` items that are in the gold list
    ///
    /// The denominator is `k`, or the length of the ranking if it is
    /// shorter, but at least 1.
    pub fn precision_at(&self, k: usize) -> f64 {
        precision_at_k(&self.ranked, &self.gold, k)
    }

    /// Normalized discounted cumulative gain of the top `k` items
    pub fn ndcg_at(&self, k: usize) -> f64 {
        ndcg_at_k(&self.ranked, &self.gold, k)
    }

    /// The 1-based position of the first occurrence of `item`
    ///
    /// `item` is normalized the same way as the gold items of the
    /// projection's space.
    pub fn rank_of(&self, item: &str) -> Option<usize> {
        let item = match self.space {
            EvalSpace::Phenotype => item.trim().to_uppercase(),
            EvalSpace::Term => item.trim().to_lowercase(),
        };
        self.ranked
            .iter()
            .position(|ranked| ranked == &item)
            .map(|idx| idx + 1)
    }
}

/// Phenotype → case-folded term, keyed by the uppercased phenotype id
///
/// Ids that only differ in case keep the mapping of the smallest id.
fn uppercase_term_map(index: &RelationIndex) -> HashMap<String, &str> {
    let mut mappings: Vec<(&PhenotypeId, &StandardTerm)> = index.term_mappings().collect();
    mappings.sort_by(|a, b| a.0.cmp(b.0));
    let mut terms = HashMap::with_capacity(mappings.len());
    for (phenotype, term) in mappings {
        terms
            .entry(phenotype.as_str().to_uppercase())
            .or_insert(term.key());
    }
    terms
}

/// Fraction of the top `k` items of `ranked` that are in `gold`
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use phenorank::eval::precision_at_k;
///
/// let ranked = vec!["a", "b", "c"];
/// let gold: HashSet<&str> = ["a", "c", "x"].into_iter().collect();
///
/// assert!((precision_at_k(&ranked, &gold, 2) - 0.5).abs() < 1e-12);
/// // only 3 items are ranked, so the denominator is 3, not 10
/// assert!((precision_at_k(&ranked, &gold, 10) - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn precision_at_k<T>(ranked: &[T], gold: &HashSet<T>, k: usize) -> f64
where
    T: Eq + std::hash::Hash,
{
    let hits = ranked.iter().take(k).filter(|item| gold.contains(*item)).count();
    let denominator = k.min(ranked.len()).max(1);
    usize_to_f64(hits) / usize_to_f64(denominator)
}

/// Normalized discounted cumulative gain with binary relevance
///
/// The ideal DCG assumes `min(k, |gold|, max(1, |ranked|))` hits at the
/// top positions. Returns `0.0` if the ideal DCG is `0.0`.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use phenorank::eval::ndcg_at_k;
///
/// let gold: HashSet<&str> = ["a"].into_iter().collect();
///
/// assert_eq!(ndcg_at_k(&["a", "b"], &gold, 10), 1.0);
/// assert!((ndcg_at_k(&["b", "a"], &gold, 10) - 1.0 / 3f64.log2()).abs() < 1e-12);
/// ```
pub fn ndcg_at_k<T>(ranked: &[T], gold: &HashSet<T>, k: usize) -> f64
where
    T: Eq + std::hash::Hash,
{
    let dcg: f64 = ranked
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, item)| gold.contains(*item))
        .map(|(idx, _)| discount(idx))
        .sum();
    let ideal_hits = k.min(gold.len()).min(ranked.len().max(1));
    let ideal: f64 = (0..ideal_hits).map(discount).sum();
    if ideal > 0.0 {
        dcg / ideal
    } else {
        0.0
    }
}

/// Gain of a relevant item at the 0-based position `idx`
fn discount(idx: usize) -> f64 {
    1.0 / usize_to_f64(idx + 2).log2()
}

// rankings are far smaller than 2^52 entries
#[allow(clippy::cast_precision_loss)]
fn usize_to_f64(n: usize) -> f64 {
    n as f64
}

/// Reads a gold list, one item per line
///
/// Empty lines and a leading UTF-8 BOM are ignored.
///
/// # Errors
///
/// Returns [`RankError::CannotOpenFile`] if the file cannot be read
pub fn read_gold_list<P: AsRef<Path>>(path: P) -> RankResult<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|_| RankError::CannotOpenFile(path.display().to_string()))?;
    let items: Vec<String> = content
        .lines()
        .map(|line| line.trim_start_matches('\u{feff}').trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    debug!("Read {} gold items from {}", items.len(), path.display());
    Ok(items)
}

/// Evaluation metrics of a single drug
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    k: usize,
    precision: f64,
    ndcg: f64,
    space: EvalSpace,
}

impl EvalReport {
    /// Evaluates the top `k` items of a ranking against its gold items
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::{Coefficients, DrugId, IndexBuilder, Ranker};
    /// use phenorank::eval::{EvalReport, EvalSpace};
    ///
    /// let mut builder = IndexBuilder::new();
    /// builder.add_drug_target("D1", "P1", Some("inhibitor"));
    /// builder.add_protein_gene("P1", "G1");
    /// builder.add_gene_phenotype("G1", "HP:0003198");
    /// builder.add_gene_phenotype("G1", "HP:0000988");
    /// builder.add_term_mapping("HP:0003198", "Myopathy");
    /// let index = builder.build();
    ///
    /// let ranking = Ranker::new(&index, Coefficients::default()).rank_drug(&DrugId::new("D1"));
    /// let report = EvalReport::new(&ranking, &["myopathy"], &index, 10);
    ///
    /// assert_eq!(report.space(), EvalSpace::Term);
    /// assert_eq!(report.precision(), 1.0);
    /// assert_eq!(report.ndcg(), 1.0);
    /// ```
    pub fn new<S: AsRef<str>>(
        ranking: &DrugRanking,
        gold_items: &[S],
        index: &RelationIndex,
        k: usize,
    ) -> Self {
        let projection = Projection::new(ranking, gold_items, index);
        Self {
            k,
            precision: projection.precision_at(k),
            ndcg: projection.ndcg_at(k),
            space: projection.space(),
        }
    }

    /// The cutoff
    pub fn k(&self) -> usize {
        self.k
    }

    /// Precision at `k`
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// nDCG at `k`
    pub fn ndcg(&self) -> f64 {
        self.ndcg
    }

    /// The space in which the evaluation happened
    pub fn space(&self) -> EvalSpace {
        self.space
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Coefficients, DrugId, IndexBuilder, Ranker};

    fn setup() -> (RelationIndex, DrugRanking) {
        let mut builder = IndexBuilder::new();
        builder.add_drug_target("D1", "P1", Some("inhibitor"));
        builder.add_drug_target("D1", "P2", None);
        builder.add_protein_gene("P1", "G1");
        builder.add_protein_gene("P2", "G2");
        builder.add_gene_phenotype("G1", "HP:0000001");
        builder.add_gene_phenotype("G2", "HP:0000001");
        builder.add_gene_phenotype("G2", "HP:0000002");
        builder.add_gene_phenotype("G1", "HP:0000003");
        builder.add_term_mapping("HP:0000001", "Myalgia");
        builder.add_term_mapping("HP:0000002", "Myalgia");
        builder.add_term_mapping("HP:0000003", "Rash");
        let index = builder.build();
        let ranking = Ranker::new(&index, Coefficients::new(0.0, 0.0).unwrap())
            .rank_drug(&DrugId::new("D1"));
        (index, ranking)
    }

    #[test]
    fn ranking_order() {
        let (_, ranking) = setup();
        let order: Vec<&str> = ranking.iter().map(|e| e.phenotype().as_str()).collect();
        // HP:1 = 2.2, HP:3 = 1.2, HP:2 = 1.0
        assert_eq!(order, vec!["HP:0000001", "HP:0000003", "HP:0000002"]);
    }

    #[test]
    fn hpo_gold_is_projected_to_terms() {
        let (index, ranking) = setup();
        let projection = Projection::new(&ranking, &["hp:0000002"], &index);
        assert_eq!(projection.space(), EvalSpace::Term);
        assert_eq!(projection.ranked(), &["myalgia", "rash", "myalgia"]);
        assert!(projection.gold().contains("myalgia"));
        assert_eq!(projection.rank_of("MYALGIA"), Some(1));
        assert_eq!(projection.rank_of("Rash"), Some(2));
    }

    #[test]
    fn partially_mapped_hpo_gold_is_projected_to_terms() {
        let (index, ranking) = setup();
        let projection = Projection::new(&ranking, &["\u{feff}HP:0000003", "", "HP:0009999"], &index);
        assert_eq!(projection.space(), EvalSpace::Term);
        assert_eq!(projection.gold().len(), 1);
        assert!(projection.gold().contains("rash"));
    }

    #[test]
    fn unmapped_hpo_gold_stays_in_phenotype_space() {
        let (index, ranking) = setup();
        let projection = Projection::new(&ranking, &["HP:0009999"], &index);
        assert_eq!(projection.space(), EvalSpace::Phenotype);
        assert_eq!(projection.precision_at(10), 0.0);
        assert_eq!(projection.rank_of("hp:0000002"), Some(3));
    }

    #[test]
    fn term_lookup_ignores_id_case() {
        let mut builder = IndexBuilder::new();
        builder.add_drug_target("D1", "P1", None);
        builder.add_protein_gene("P1", "G1");
        builder.add_gene_phenotype("G1", "hp:0000001");
        builder.add_term_mapping("hp:0000001", "Rash");
        let index = builder.build();
        let ranking = Ranker::new(&index, Coefficients::default()).rank_drug(&DrugId::new("D1"));

        let projection = Projection::new(&ranking, &["HP:0000001"], &index);
        assert_eq!(projection.space(), EvalSpace::Term);
        assert_eq!(projection.ranked(), &["rash"]);
        assert_eq!(projection.precision_at(10), 1.0);
    }

    #[test]
    fn term_gold() {
        let (index, ranking) = setup();
        let report = EvalReport::new(&ranking, &["Rash", "Nausea"], &index, 2);
        assert_eq!(report.space(), EvalSpace::Term);
        assert_eq!(report.k(), 2);
        assert_eq!(report.precision(), 0.5);
        // the hit is at position 2, two gold items allow an ideal of two hits
        let expected = (1.0 / 3f64.log2()) / (1.0 + 1.0 / 3f64.log2());
        assert!((report.ndcg() - expected).abs() < 1e-12);
    }

    #[test]
    fn empty_ranking() {
        let gold: HashSet<String> = ["a".to_string()].into_iter().collect();
        let ranked: Vec<String> = Vec::new();
        assert_eq!(precision_at_k(&ranked, &gold, 10), 0.0);
        assert_eq!(ndcg_at_k(&ranked, &gold, 10), 0.0);
        assert_eq!(ndcg_at_k(&ranked, &HashSet::new(), 10), 0.0);
    }

    #[test]
    fn display_space() {
        assert_eq!(EvalSpace::Term.to_string(), "PT");
        assert_eq!(EvalSpace::Phenotype.to_string(), "HPO");
    }
}
