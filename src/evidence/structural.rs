//! Mechanistic evidence from drug → protein → gene → phenotype paths
use std::collections::BTreeMap;

use tracing::trace;

use crate::action::ActionWeighting;
use crate::{DrugId, PhenotypeId, RelationIndex};

/// Accumulated path evidence of a single phenotype
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PathSupport {
    score: f64,
    paths: usize,
}

impl PathSupport {
    /// Sum of the action weights of all paths
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Number of distinct evidence paths
    pub fn paths(&self) -> usize {
        self.paths
    }

    fn add_path(&mut self, weight: f64) {
        self.score += weight;
        self.paths += 1;
    }
}

/// Structural evidence of all phenotypes reachable from a drug
///
/// Every (protein, gene) route that reaches a phenotype is a separate
/// evidence path and adds the action weight of its drug → protein edge
/// to the phenotype's score. Phenotypes supported by several independent
/// routes therefore score higher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralEvidence<'a> {
    support: BTreeMap<&'a PhenotypeId, PathSupport>,
}

impl<'a> StructuralEvidence<'a> {
    /// The path support of a phenotype
    ///
    /// Returns `None` if the phenotype is not reachable
    pub fn get(&self, phenotype: &PhenotypeId) -> Option<&PathSupport> {
        self.support.get(phenotype)
    }

    /// The structural score of a phenotype, `0.0` if it is not reachable
    pub fn score(&self, phenotype: &PhenotypeId) -> f64 {
        self.get(phenotype).map_or(0.0, PathSupport::score)
    }

    /// Iterates all reachable phenotypes in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (&'a PhenotypeId, &PathSupport)> {
        self.support.iter().map(|(id, support)| (*id, support))
    }

    /// Iterates all reachable phenotypes in ascending order
    pub fn phenotypes(&self) -> impl Iterator<Item = &'a PhenotypeId> + '_ {
        self.support.keys().copied()
    }

    /// The number of reachable phenotypes
    pub fn len(&self) -> usize {
        self.support.len()
    }

    /// Returns `true` if no phenotype is reachable
    pub fn is_empty(&self) -> bool {
        self.support.is_empty()
    }

    /// The highest structural score, `0.0` if no phenotype is reachable
    pub fn max_score(&self) -> f64 {
        self.support
            .values()
            .map(PathSupport::score)
            .fold(0.0, f64::max)
    }

    /// Rescales all scores by the highest score, bounding them to `[0, 1]`
    ///
    /// Path counts are not changed.
    #[must_use]
    pub fn max_normalized(mut self) -> Self {
        let max = self.max_score();
        if max > 0.0 {
            for support in self.support.values_mut() {
                support.score /= max;
            }
        }
        self
    }
}

/// Collects the structural evidence of all phenotypes reachable from `drug`
///
/// # Examples
///
/// ```
/// use phenorank::{ActionPolicy, DrugId, IndexBuilder, PhenotypeId};
/// use phenorank::evidence::structural_evidence;
///
/// let mut builder = IndexBuilder::new();
/// builder.add_drug_target("D1", "P1", Some("inhibitor"));
/// builder.add_drug_target("D1", "P2", Some("agonist"));
/// builder.add_protein_gene("P1", "G1");
/// builder.add_protein_gene("P2", "G1");
/// builder.add_gene_phenotype("G1", "HP:0000001");
/// let index = builder.build();
///
/// let evidence = structural_evidence(&index, &DrugId::new("D1"), &ActionPolicy::default());
/// let support = evidence.get(&PhenotypeId::new("HP:0000001")).unwrap();
///
/// assert_eq!(support.paths(), 2);
/// assert!((support.score() - 2.3).abs() < 1e-12);
/// ```
pub fn structural_evidence<'a, W: ActionWeighting + ?Sized>(
    index: &'a RelationIndex,
    drug: &DrugId,
    policy: &W,
) -> StructuralEvidence<'a> {
    let mut support: BTreeMap<&'a PhenotypeId, PathSupport> = BTreeMap::new();
    for target in index.targets(drug) {
        let weight = policy.edge_weight(target.actions());
        trace!("{} -> {} has weight {}", drug, target.protein(), weight);
        for gene in index.genes(target.protein()) {
            for phenotype in index.phenotypes(gene) {
                support.entry(phenotype).or_default().add_path(weight);
            }
        }
    }
    StructuralEvidence { support }
}
