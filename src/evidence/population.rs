//! Population frequency prior evidence
use crate::evidence::PhenotypeScores;
use crate::{PhenotypeId, RelationIndex};

/// Collects the population prior contribution of the given phenotypes
///
/// Only phenotypes that already received evidence from another source
/// should be passed in, the population prior never makes a phenotype
/// reachable on its own.
///
/// A phenotype mapped to a standardized term with prior `p` receives
/// `lambda * p`. Phenotypes without a mapping, or mapped to a term without
/// a prior, are not part of the result. This is expected and not an error.
///
/// # Examples
///
/// ```
/// use phenorank::{IndexBuilder, PhenotypeId};
/// use phenorank::evidence::population_evidence;
///
/// let mut builder = IndexBuilder::new();
/// builder.add_term_mapping("HP:0003198", "Myopathy");
/// builder.add_term_prior("myopathy", 0.8);
/// let index = builder.build();
///
/// let mapped = PhenotypeId::new("HP:0003198");
/// let unmapped = PhenotypeId::new("HP:0000001");
/// let scores = population_evidence(&index, [&mapped, &unmapped], 0.3);
///
/// assert!((scores[&mapped] - 0.24).abs() < 1e-12);
/// assert!(!scores.contains_key(&unmapped));
/// ```
pub fn population_evidence<'a, I>(
    index: &RelationIndex,
    phenotypes: I,
    lambda: f64,
) -> PhenotypeScores<'a>
where
    I: IntoIterator<Item = &'a PhenotypeId>,
{
    phenotypes
        .into_iter()
        .filter_map(|phenotype| {
            index
                .population_prior(phenotype)
                .map(|prior| (phenotype, lambda * prior))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::IndexBuilder;

    #[test]
    fn mapping_without_prior_contributes_nothing() {
        let mut builder = IndexBuilder::new();
        builder.add_term_mapping("H1", "Rash");
        builder.add_term_mapping("H2", "Nausea");
        builder.add_term_prior("Nausea", 0.5);
        let index = builder.build();

        let h1 = PhenotypeId::new("H1");
        let h2 = PhenotypeId::new("H2");
        let scores = population_evidence(&index, [&h1, &h2], 1.0);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&h2], 0.5);
    }

    #[test]
    fn zero_lambda_keeps_entries() {
        let mut builder = IndexBuilder::new();
        builder.add_term_mapping("H1", "Rash");
        builder.add_term_prior("Rash", 0.5);
        let index = builder.build();

        let h1 = PhenotypeId::new("H1");
        let scores = population_evidence(&index, [&h1], 0.0);
        assert_eq!(scores[&h1], 0.0);
    }

    #[test]
    fn empty_tables() {
        let index = IndexBuilder::new().build();
        let h1 = PhenotypeId::new("H1");
        assert!(population_evidence(&index, [&h1], 0.3).is_empty());
    }
}
