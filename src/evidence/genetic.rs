//! Pharmacogenomic prior evidence
use tracing::trace;

use crate::evidence::PhenotypeScores;
use crate::{DrugId, RelationIndex};

/// Collects the pharmacogenomic contribution of all phenotypes of `drug`
///
/// Every gene with a pharmacogenomic weight `w` for the drug adds
/// `beta * w` to each phenotype associated with that gene. Genes without a
/// weight contribute nothing. This evidence does not depend on any
/// drug → protein path.
///
/// When several weights were provided for the same drug - gene pair,
/// only the largest one is used (see [`crate::IndexBuilder::add_pgx_weight`]).
///
/// # Examples
///
/// ```
/// use phenorank::{DrugId, IndexBuilder, PhenotypeId};
/// use phenorank::evidence::genetic_evidence;
///
/// let mut builder = IndexBuilder::new();
/// builder.add_gene_phenotype("G1", "HP:0000001");
/// builder.add_pgx_weight("D1", "g1", 0.5);
/// let index = builder.build();
///
/// let scores = genetic_evidence(&index, &DrugId::new("D1"), 0.6);
/// let phenotype = PhenotypeId::new("HP:0000001");
/// assert!((scores[&phenotype] - 0.3).abs() < 1e-12);
/// ```
pub fn genetic_evidence<'a>(
    index: &'a RelationIndex,
    drug: &DrugId,
    beta: f64,
) -> PhenotypeScores<'a> {
    let mut scores = PhenotypeScores::new();
    for (gene, weight) in index.pgx_weights(drug) {
        let contribution = beta * weight;
        trace!("{} -> {} contributes {}", drug, gene, contribution);
        for phenotype in index.phenotypes(gene) {
            *scores.entry(phenotype).or_insert(0.0) += contribution;
        }
    }
    scores
}
