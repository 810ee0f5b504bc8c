//! Identifiers of the entities that make up the relation graph
//!
//! All identifiers are opaque strings. The only normalization applied
//! is trimming of surrounding whitespace, except for
//!
//! - [`GeneSymbol`], which is canonicalized to uppercase, and
//! - [`StandardTerm`], which keeps its display text but compares case-insensitively.
use std::borrow::Borrow;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name {
            inner: String,
        }

        impl $name {
            /// Constructs a new identifier, trimming surrounding whitespace
            pub fn new(id: &str) -> Self {
                Self {
                    inner: id.trim().to_string(),
                }
            }

            /// Returns the identifier as `&str`
            pub fn as_str(&self) -> &str {
                &self.inner
            }

            /// Returns `true` if the identifier is the empty string
            pub fn is_empty(&self) -> bool {
                self.inner.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(&id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.inner
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.inner
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.inner)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.inner == other.trim()
            }
        }
    };
}

opaque_id!(
    /// Identifier of a drug, e.g. a ChEMBL ID like `CHEMBL108`
    DrugId
);

opaque_id!(
    /// Identifier of a target protein, e.g. a UniProt accession
    ProteinId
);

opaque_id!(
    /// Identifier of a phenotype in ontology-term form, e.g. `HP:0001250`
    PhenotypeId
);

impl PhenotypeId {
    /// Returns `true` if the identifier has the shape of an HPO term ID
    ///
    /// HPO term IDs consist of the prefix `HP:` followed by exactly 7 digits.
    /// The prefix is compared case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::PhenotypeId;
    ///
    /// assert!(PhenotypeId::new("HP:0001250").is_hpo());
    /// assert!(PhenotypeId::new("hp:0001250").is_hpo());
    /// assert!(!PhenotypeId::new("HP:12").is_hpo());
    /// assert!(!PhenotypeId::new("Seizure").is_hpo());
    /// ```
    pub fn is_hpo(&self) -> bool {
        is_hpo_id(&self.inner)
    }
}

pub(crate) fn is_hpo_id(s: &str) -> bool {
    let s = s.trim();
    match s.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("HP:") => {
            let digits = &s[3..];
            digits.len() == 7 && digits.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

/// Gene symbol, canonicalized to uppercase
///
/// Gene identifiers are compared case-insensitively everywhere, so the
/// canonical form is created once, during construction.
///
/// # Examples
///
/// ```
/// use phenorank::GeneSymbol;
///
/// let gene = GeneSymbol::new(" hmgcr ");
/// assert_eq!(gene.as_str(), "HMGCR");
/// assert_eq!(gene, GeneSymbol::new("HMGCR"));
/// ```
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeneSymbol {
    inner: String,
}

impl GeneSymbol {
    /// Constructs a new `GeneSymbol` in its uppercase canonical form
    pub fn new(symbol: &str) -> Self {
        Self {
            inner: symbol.trim().to_uppercase(),
        }
    }

    /// Returns the canonical (uppercase) symbol
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns `true` if the symbol is the empty string
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<&str> for GeneSymbol {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl Borrow<str> for GeneSymbol {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl Display for GeneSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}

/// A standardized adverse-event term, e.g. a MedDRA preferred term
///
/// The term keeps the text it was created with for display purposes,
/// but equality, hashing and ordering use the case-folded form.
///
/// # Examples
///
/// ```
/// use phenorank::StandardTerm;
///
/// let a = StandardTerm::new("Stevens-Johnson syndrome");
/// let b = StandardTerm::new("stevens-johnson SYNDROME");
/// assert_eq!(a, b);
/// assert_eq!(a.name(), "Stevens-Johnson syndrome");
/// assert_eq!(a.key(), "stevens-johnson syndrome");
/// ```
#[derive(Clone, Debug, Default)]
pub struct StandardTerm {
    name: String,
    key: String,
}

impl StandardTerm {
    /// Constructs a new `StandardTerm`
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        Self {
            name: name.to_string(),
            key: name.to_lowercase(),
        }
    }

    /// The term as it was provided
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The case-folded term, used for comparisons
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns `true` if the term is the empty string
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl From<&str> for StandardTerm {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq for StandardTerm {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for StandardTerm {}

impl Hash for StandardTerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for StandardTerm {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StandardTerm {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl Display for StandardTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn opaque_ids_are_trimmed_not_case_folded() {
        let drug = DrugId::new("  CHEMBL108\t");
        assert_eq!(drug.as_str(), "CHEMBL108");
        assert_ne!(drug, DrugId::new("chembl108"));
        assert!(drug == *"CHEMBL108");
    }

    #[test]
    fn gene_symbols_are_uppercased() {
        assert_eq!(GeneSymbol::new("Hla-b"), GeneSymbol::new("HLA-B"));
        assert_eq!(GeneSymbol::new("cyp2c9").to_string(), "CYP2C9");
        assert!(GeneSymbol::new("   ").is_empty());
    }

    #[test]
    fn gene_symbol_lookup_by_str() {
        let mut map: HashMap<GeneSymbol, u8> = HashMap::new();
        map.insert(GeneSymbol::new("slco1b1"), 1);
        assert_eq!(map.get("SLCO1B1"), Some(&1));
    }

    #[test]
    fn standard_terms_compare_case_insensitive() {
        let mut map = HashMap::new();
        map.insert(StandardTerm::new("Myopathy"), 0.5);
        assert_eq!(map.get(&StandardTerm::new("MYOPATHY")), Some(&0.5));
    }

    #[test]
    fn hpo_shape() {
        assert!(is_hpo_id("HP:0000001"));
        assert!(is_hpo_id(" HP:0000001 "));
        assert!(!is_hpo_id("HP:000000A"));
        assert!(!is_hpo_id("HP:00000001"));
        assert!(!is_hpo_id("H"));
        assert!(!is_hpo_id(""));
    }
}
