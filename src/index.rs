//! Immutable adjacency indices over the relation tables
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::ids::{DrugId, GeneSymbol, PhenotypeId, ProteinId, StandardTerm};
use crate::parser::RelationTables;
use crate::IdGroup;

/// A drug → protein edge
///
/// The edge holds all distinct action labels that were provided for
/// the drug - protein pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    protein: ProteinId,
    actions: IdGroup<String>,
}

impl Target {
    /// The target protein
    pub fn protein(&self) -> &ProteinId {
        &self.protein
    }

    /// All distinct action labels of the edge
    pub fn actions(&self) -> &IdGroup<String> {
        &self.actions
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// All relations of a run, indexed for traversal
///
/// The index is created once per run through [`IndexBuilder`] (or
/// [`RelationIndex::from_tables`]) and cannot be modified afterwards.
/// It is `Send + Sync` and can be shared between threads that score
/// different drugs.
///
/// ```mermaid
/// flowchart LR
///     DRUG -->|"target (action)"| PROTEIN
///     PROTEIN -->|encoded by| GENE
///     GENE -->|associated with| PHENOTYPE
///     DRUG -.->|pgx weight| GENE
///     PHENOTYPE -.->|maps to| TERM
///     TERM -.->|prior| TERM
/// ```
///
/// All adjacency sets are sorted and free of duplicates.
///
/// # Examples
///
/// ```
/// use phenorank::{IndexBuilder, DrugId, GeneSymbol, ProteinId};
///
/// let mut builder = IndexBuilder::new();
/// builder.add_drug_target("D1", "P1", Some("inhibitor"));
/// builder.add_drug_target("D1", "P1", Some("inhibitor"));
/// builder.add_protein_gene("P1", "g1");
/// builder.add_gene_phenotype("G1", "HP:0000001");
/// builder.add_pgx_weight("D1", "g1", 0.3);
/// builder.add_pgx_weight("D1", "G1", 0.5);
///
/// let index = builder.build();
///
/// let drug = DrugId::new("D1");
/// assert_eq!(index.targets(&drug).len(), 1);
/// assert_eq!(index.genes(&ProteinId::new("P1")).len(), 1);
/// assert_eq!(index.pgx_weight(&drug, &GeneSymbol::new("G1")), Some(0.5));
/// ```
#[derive(Debug, Default, Clone)]
pub struct RelationIndex {
    drugs: Vec<DrugId>,
    drug_targets: HashMap<DrugId, Vec<Target>>,
    protein_genes: HashMap<ProteinId, IdGroup<GeneSymbol>>,
    gene_phenotypes: HashMap<GeneSymbol, IdGroup<PhenotypeId>>,
    pgx_weights: HashMap<DrugId, Vec<(GeneSymbol, f64)>>,
    term_map: HashMap<PhenotypeId, StandardTerm>,
    term_priors: HashMap<StandardTerm, f64>,
}

impl RelationIndex {
    /// Builds the index from loaded [`RelationTables`]
    pub fn from_tables(tables: &RelationTables) -> Self {
        let mut builder = IndexBuilder::new();
        for row in &tables.drug_targets {
            builder.insert_drug_target(row.drug.clone(), row.protein.clone(), row.action.as_deref());
        }
        for row in &tables.target_actions {
            if let Some(action) = &row.action {
                builder.add_target_action(row.drug.as_str(), row.protein.as_str(), action);
            }
        }
        for row in &tables.protein_genes {
            builder.insert_protein_gene(row.protein.clone(), row.gene.clone());
        }
        for row in &tables.gene_phenotypes {
            builder.insert_gene_phenotype(row.gene.clone(), row.phenotype.clone());
        }
        for row in &tables.pgx_weights {
            builder.insert_pgx_weight(row.drug.clone(), row.gene.clone(), row.weight);
        }
        for row in &tables.term_map {
            builder.insert_term_mapping(row.phenotype.clone(), row.term.clone());
        }
        for row in &tables.term_priors {
            builder.insert_term_prior(row.term.clone(), row.prior);
        }
        builder.build()
    }

    /// All drugs of the index in ascending order
    ///
    /// These are all drugs with at least one target protein or
    /// at least one pharmacogenomic weight.
    pub fn drugs(&self) -> &[DrugId] {
        &self.drugs
    }

    /// The target edges of a drug, sorted by protein
    pub fn targets(&self, drug: &DrugId) -> &[Target] {
        self.drug_targets.get(drug).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The genes encoding a protein
    pub fn genes(&self, protein: &ProteinId) -> &[GeneSymbol] {
        self.protein_genes
            .get(protein)
            .map(IdGroup::as_slice)
            .unwrap_or(&[])
    }

    /// The phenotypes associated with a gene
    pub fn phenotypes(&self, gene: &GeneSymbol) -> &[PhenotypeId] {
        self.gene_phenotypes
            .get(gene)
            .map(IdGroup::as_slice)
            .unwrap_or(&[])
    }

    /// The effective pharmacogenomic weights of a drug, sorted by gene
    ///
    /// Each gene appears only once, with the maximum of all its weights.
    pub fn pgx_weights(&self, drug: &DrugId) -> &[(GeneSymbol, f64)] {
        self.pgx_weights.get(drug).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The effective pharmacogenomic weight of a gene for a drug
    pub fn pgx_weight(&self, drug: &DrugId, gene: &GeneSymbol) -> Option<f64> {
        let weights = self.pgx_weights(drug);
        weights
            .binary_search_by(|(g, _)| g.cmp(gene))
            .ok()
            .map(|idx| weights[idx].1)
    }

    /// The standardized term a phenotype is mapped to
    pub fn term(&self, phenotype: &PhenotypeId) -> Option<&StandardTerm> {
        self.term_map.get(phenotype)
    }

    /// The population prior of a standardized term
    pub fn prior(&self, term: &StandardTerm) -> Option<f64> {
        self.term_priors.get(term).copied()
    }

    /// The population prior of the term that the phenotype is mapped to
    pub fn population_prior(&self, phenotype: &PhenotypeId) -> Option<f64> {
        self.term(phenotype).and_then(|term| self.prior(term))
    }

    /// Iterates all phenotype → standardized term mappings
    pub fn term_mappings(&self) -> impl Iterator<Item = (&PhenotypeId, &StandardTerm)> {
        self.term_map.iter()
    }

    /// Returns `true` if the index contains no drugs
    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }
}

/// Builder for [`RelationIndex`]
///
/// All `add_*` methods apply set semantics: adding the same edge multiple
/// times results in a single edge. Empty identifiers are ignored.
///
/// - Drug → Protein: one edge per (drug, protein) pair, collecting all distinct
///   non-empty action labels.
/// - Drug → Gene weights: the maximum weight per (drug, gene) pair is kept.
/// - Phenotype → Term: the first mapping of a phenotype is kept.
/// - Term → Prior: the maximum prior per term is kept.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    drug_targets: BTreeMap<DrugId, BTreeMap<ProteinId, IdGroup<String>>>,
    pending_actions: Vec<(DrugId, ProteinId, String)>,
    protein_genes: HashMap<ProteinId, IdGroup<GeneSymbol>>,
    gene_phenotypes: HashMap<GeneSymbol, IdGroup<PhenotypeId>>,
    pgx_weights: BTreeMap<DrugId, BTreeMap<GeneSymbol, f64>>,
    term_map: HashMap<PhenotypeId, StandardTerm>,
    term_priors: HashMap<StandardTerm, f64>,
}

impl IndexBuilder {
    /// Constructs a new, empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a drug → protein edge, optionally with an action label
    ///
    /// Returns `true` if the edge did not exist before.
    pub fn add_drug_target(&mut self, drug: &str, protein: &str, action: Option<&str>) -> bool {
        self.insert_drug_target(DrugId::new(drug), ProteinId::new(protein), action)
    }

    fn insert_drug_target(&mut self, drug: DrugId, protein: ProteinId, action: Option<&str>) -> bool {
        if drug.is_empty() || protein.is_empty() {
            return false;
        }
        let proteins = self.drug_targets.entry(drug).or_default();
        let is_new = !proteins.contains_key(&protein);
        let actions = proteins.entry(protein).or_default();
        if let Some(action) = action.map(str::trim).filter(|a| !a.is_empty()) {
            actions.insert(action.to_string());
        }
        is_new
    }

    /// Adds an action label to a drug → protein edge
    ///
    /// The label is only applied if the edge itself is added through
    /// [`IndexBuilder::add_drug_target`], before or after this call.
    /// Labels never create new edges.
    pub fn add_target_action(&mut self, drug: &str, protein: &str, action: &str) {
        let action = action.trim();
        if action.is_empty() {
            return;
        }
        self.pending_actions.push((
            DrugId::new(drug),
            ProteinId::new(protein),
            action.to_string(),
        ));
    }

    /// Adds a protein → gene edge
    ///
    /// Returns `true` if the edge did not exist before.
    pub fn add_protein_gene(&mut self, protein: &str, gene: &str) -> bool {
        self.insert_protein_gene(ProteinId::new(protein), GeneSymbol::new(gene))
    }

    fn insert_protein_gene(&mut self, protein: ProteinId, gene: GeneSymbol) -> bool {
        if protein.is_empty() || gene.is_empty() {
            return false;
        }
        self.protein_genes.entry(protein).or_default().insert(gene)
    }

    /// Adds a gene → phenotype edge
    ///
    /// Returns `true` if the edge did not exist before.
    pub fn add_gene_phenotype(&mut self, gene: &str, phenotype: &str) -> bool {
        self.insert_gene_phenotype(GeneSymbol::new(gene), PhenotypeId::new(phenotype))
    }

    fn insert_gene_phenotype(&mut self, gene: GeneSymbol, phenotype: PhenotypeId) -> bool {
        if gene.is_empty() || phenotype.is_empty() {
            return false;
        }
        self.gene_phenotypes.entry(gene).or_default().insert(phenotype)
    }

    /// Adds a pharmacogenomic weight of a gene for a drug
    ///
    /// If the pair already has a weight, the larger one is kept. Weights
    /// that are negative or not finite are ignored.
    pub fn add_pgx_weight(&mut self, drug: &str, gene: &str, weight: f64) {
        self.insert_pgx_weight(DrugId::new(drug), GeneSymbol::new(gene), weight);
    }

    fn insert_pgx_weight(&mut self, drug: DrugId, gene: GeneSymbol, weight: f64) {
        if drug.is_empty() || gene.is_empty() || !weight.is_finite() || weight < 0.0 {
            return;
        }
        match self.pgx_weights.entry(drug).or_default().entry(gene) {
            Entry::Vacant(entry) => {
                entry.insert(weight);
            }
            Entry::Occupied(mut entry) => {
                if weight > *entry.get() {
                    entry.insert(weight);
                }
            }
        }
    }

    /// Maps a phenotype to a standardized term
    ///
    /// A phenotype maps to at most one term, the first mapping is kept.
    pub fn add_term_mapping(&mut self, phenotype: &str, term: &str) {
        self.insert_term_mapping(PhenotypeId::new(phenotype), StandardTerm::new(term));
    }

    fn insert_term_mapping(&mut self, phenotype: PhenotypeId, term: StandardTerm) {
        if phenotype.is_empty() || term.is_empty() {
            return;
        }
        self.term_map.entry(phenotype).or_insert(term);
    }

    /// Adds the population prior of a standardized term
    ///
    /// If the term already has a prior, the larger one is kept. Priors
    /// outside of `[0, 1]` are ignored.
    pub fn add_term_prior(&mut self, term: &str, prior: f64) {
        self.insert_term_prior(StandardTerm::new(term), prior);
    }

    fn insert_term_prior(&mut self, term: StandardTerm, prior: f64) {
        if term.is_empty() || !(0.0..=1.0).contains(&prior) {
            return;
        }
        let current = self.term_priors.entry(term).or_insert(prior);
        if prior > *current {
            *current = prior;
        }
    }

    /// Finalizes the [`RelationIndex`]
    pub fn build(mut self) -> RelationIndex {
        for (drug, protein, action) in std::mem::take(&mut self.pending_actions) {
            if let Some(actions) = self
                .drug_targets
                .get_mut(&drug)
                .and_then(|proteins| proteins.get_mut(&protein))
            {
                actions.insert(action);
            } else {
                debug!("Ignoring action of unknown target {} -> {}", drug, protein);
            }
        }

        let drugs: BTreeSet<DrugId> = self
            .drug_targets
            .keys()
            .chain(self.pgx_weights.keys())
            .cloned()
            .collect();

        let drug_targets = self
            .drug_targets
            .into_iter()
            .map(|(drug, proteins)| {
                let targets = proteins
                    .into_iter()
                    .map(|(protein, actions)| Target { protein, actions })
                    .collect();
                (drug, targets)
            })
            .collect();

        let pgx_weights = self
            .pgx_weights
            .into_iter()
            .map(|(drug, genes)| (drug, genes.into_iter().collect()))
            .collect();

        let index = RelationIndex {
            drugs: drugs.into_iter().collect(),
            drug_targets,
            protein_genes: self.protein_genes,
            gene_phenotypes: self.gene_phenotypes,
            pgx_weights,
            term_map: self.term_map,
            term_priors: self.term_priors,
        };
        debug!(
            "Built relation index with {} drugs, {} proteins, {} genes",
            index.drugs.len(),
            index.protein_genes.len(),
            index.gene_phenotypes.len()
        );
        index
    }
}
