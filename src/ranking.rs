//! Combining the evidence sources into a ranked list of phenotypes per drug
use std::cmp::Ordering;
use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::action::{ActionPolicy, ActionWeighting};
use crate::config::{Coefficients, StructuralScaling};
use crate::evidence::{genetic_evidence, population_evidence, structural_evidence};
use crate::{DrugId, PhenotypeId, RelationIndex};

/// The contribution of each evidence source to a phenotype's score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    structural: f64,
    genetic: f64,
    population: f64,
    paths: usize,
}

impl ScoreBreakdown {
    /// Score from drug → protein → gene → phenotype paths
    pub fn structural(&self) -> f64 {
        self.structural
    }

    /// Score from pharmacogenomic weights, already multiplied by β
    pub fn genetic(&self) -> f64 {
        self.genetic
    }

    /// Score from the population prior, already multiplied by λ
    pub fn population(&self) -> f64 {
        self.population
    }

    /// Number of distinct evidence paths from the drug to the phenotype
    pub fn paths(&self) -> usize {
        self.paths
    }

    /// The final score, the sum of all three sources
    pub fn total(&self) -> f64 {
        self.structural + self.genetic + self.population
    }
}

/// A single phenotype with its score
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPhenotype {
    phenotype: PhenotypeId,
    score: f64,
    breakdown: ScoreBreakdown,
}

impl RankedPhenotype {
    /// The phenotype
    pub fn phenotype(&self) -> &PhenotypeId {
        &self.phenotype
    }

    /// The final score
    pub fn score(&self) -> f64 {
        self.score
    }

    /// The contribution of the individual evidence sources
    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    /// Orders by score descending, then by phenotype ascending
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.phenotype.cmp(&other.phenotype))
    }
}

/// The ranked phenotypes of a single drug
///
/// Entries are sorted by score in descending order. Phenotypes with
/// identical scores are sorted by their identifier in ascending order,
/// so the ranking is a total order and identical inputs always produce
/// identical rankings.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugRanking {
    drug: DrugId,
    entries: Vec<RankedPhenotype>,
}

impl DrugRanking {
    /// Constructs a ranking from unordered entries
    fn new(drug: DrugId, mut entries: Vec<RankedPhenotype>) -> Self {
        entries.sort_by(RankedPhenotype::rank_cmp);
        Self { drug, entries }
    }

    /// The drug
    pub fn drug(&self) -> &DrugId {
        &self.drug
    }

    /// All ranked phenotypes, best first
    pub fn entries(&self) -> &[RankedPhenotype] {
        &self.entries
    }

    /// Iterates the ranked phenotypes, best first
    pub fn iter(&self) -> std::slice::Iter<'_, RankedPhenotype> {
        self.entries.iter()
    }

    /// The best `k` phenotypes
    pub fn top(&self, k: usize) -> &[RankedPhenotype] {
        &self.entries[..k.min(self.entries.len())]
    }

    /// The number of ranked phenotypes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no phenotype is reachable from the drug
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry of a phenotype, `None` if the phenotype is not ranked
    pub fn get(&self, phenotype: &PhenotypeId) -> Option<&RankedPhenotype> {
        self.entries.iter().find(|entry| &entry.phenotype == phenotype)
    }

    /// The 1-based rank of a phenotype, `None` if the phenotype is not ranked
    pub fn rank_of(&self, phenotype: &PhenotypeId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| &entry.phenotype == phenotype)
            .map(|idx| idx + 1)
    }
}

impl<'a> IntoIterator for &'a DrugRanking {
    type Item = &'a RankedPhenotype;
    type IntoIter = std::slice::Iter<'a, RankedPhenotype>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Scores and ranks the phenotypes of drugs
///
/// The `Ranker` only reads from the [`RelationIndex`]. Each drug is scored
/// independently, [`Ranker::par_rank_all`] scores all drugs in parallel
/// and returns the same result as [`Ranker::rank_all`].
///
/// # Examples
///
/// ```
/// use phenorank::{Coefficients, DrugId, IndexBuilder, PhenotypeId, Ranker};
///
/// let mut builder = IndexBuilder::new();
/// builder.add_drug_target("D1", "P1", Some("inhibitor"));
/// builder.add_drug_target("D1", "P2", Some("agonist"));
/// builder.add_protein_gene("P1", "G1");
/// builder.add_protein_gene("P2", "G1");
/// builder.add_gene_phenotype("G1", "HP:0000001");
/// builder.add_pgx_weight("D1", "G1", 0.5);
/// builder.add_term_mapping("HP:0000001", "Myopathy");
/// builder.add_term_prior("Myopathy", 0.8);
/// let index = builder.build();
///
/// let ranker = Ranker::new(&index, Coefficients::default());
/// let ranking = ranker.rank_drug(&DrugId::new("D1"));
///
/// let best = &ranking.entries()[0];
/// assert_eq!(best.phenotype(), &PhenotypeId::new("HP:0000001"));
/// assert_eq!(format!("{:.6}", best.score()), "2.840000");
/// ```
#[derive(Debug, Clone)]
pub struct Ranker<'a, W = ActionPolicy> {
    index: &'a RelationIndex,
    coefficients: Coefficients,
    policy: W,
}

impl<'a> Ranker<'a, ActionPolicy> {
    /// Constructs a new `Ranker` with the default [`ActionPolicy`]
    pub fn new(index: &'a RelationIndex, coefficients: Coefficients) -> Self {
        Self {
            index,
            coefficients,
            policy: ActionPolicy::default(),
        }
    }
}

impl<'a, W: ActionWeighting> Ranker<'a, W> {
    /// Replaces the weighting of drug → protein edges
    pub fn with_policy<V: ActionWeighting>(self, policy: V) -> Ranker<'a, V> {
        Ranker {
            index: self.index,
            coefficients: self.coefficients,
            policy,
        }
    }

    /// The coefficients used for scoring
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Scores and ranks all phenotypes with evidence for `drug`
    ///
    /// The result contains every phenotype that is reachable through a
    /// drug → protein → gene → phenotype path or through a gene with a
    /// pharmacogenomic weight for the drug. Unreachable phenotypes are not
    /// part of the ranking. An unknown drug results in an empty ranking.
    pub fn rank_drug(&self, drug: &DrugId) -> DrugRanking {
        let mut structural = structural_evidence(self.index, drug, &self.policy);
        if self.coefficients.structural_scaling() == StructuralScaling::MaxNormalized {
            structural = structural.max_normalized();
        }
        let genetic = genetic_evidence(self.index, drug, self.coefficients.beta());

        let touched: BTreeSet<&PhenotypeId> = structural
            .phenotypes()
            .chain(genetic.keys().copied())
            .collect();

        let population =
            population_evidence(self.index, touched.iter().copied(), self.coefficients.lambda());

        let entries: Vec<RankedPhenotype> = touched
            .into_iter()
            .map(|phenotype| {
                let path_support = structural.get(phenotype).copied().unwrap_or_default();
                let breakdown = ScoreBreakdown {
                    structural: path_support.score(),
                    genetic: genetic.get(phenotype).copied().unwrap_or(0.0),
                    population: population.get(phenotype).copied().unwrap_or(0.0),
                    paths: path_support.paths(),
                };
                RankedPhenotype {
                    phenotype: phenotype.clone(),
                    score: breakdown.total(),
                    breakdown,
                }
            })
            .collect();

        debug!("Ranked {} phenotypes for {}", entries.len(), drug);
        DrugRanking::new(drug.clone(), entries)
    }

    /// Ranks all drugs of the index, in ascending order of the drug
    pub fn rank_all(&self) -> Vec<DrugRanking> {
        info!("Ranking {} drugs", self.index.drugs().len());
        self.index
            .drugs()
            .iter()
            .map(|drug| self.rank_drug(drug))
            .collect()
    }
}

impl<'a, W: ActionWeighting + Sync> Ranker<'a, W> {
    /// Ranks all drugs of the index in parallel
    ///
    /// The result is identical to [`Ranker::rank_all`], including its order.
    pub fn par_rank_all(&self) -> Vec<DrugRanking> {
        info!("Ranking {} drugs in parallel", self.index.drugs().len());
        self.index
            .drugs()
            .par_iter()
            .map(|drug| self.rank_drug(drug))
            .collect()
    }
}
