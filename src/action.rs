//! Weighting of drug → protein edges by their action label
//!
//! Action labels are free text, such as `"INHIBITOR"`, `"positive allosteric
//! modulator"` or `"antagonist"`. They are classified by an ordered list of
//! [`ActionRule`]s. The first rule with a pattern that is contained in the
//! (lowercased) label determines the weight. Labels that are empty or do not
//! match any rule receive the neutral weight `1.0`.

use crate::IdGroup;

/// The weight of an edge without (or with an unknown) action label
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// Trait to calculate the weight of a drug → protein edge
///
/// `phenorank` ships with [`ActionPolicy`], an ordered keyword rule list.
/// Custom implementations can be used with [`crate::Ranker::with_policy`].
pub trait ActionWeighting {
    /// Returns the weight of a single action label
    fn weight(&self, action: &str) -> f64;

    /// Returns the weight of an edge with the given labels
    ///
    /// An edge can be annotated with more than one label, e.g. if several
    /// rows of the input tables describe the same drug → protein edge. The
    /// strongest label determines the weight. An edge without any label
    /// receives the [`NEUTRAL_WEIGHT`].
    fn edge_weight(&self, labels: &IdGroup<String>) -> f64 {
        labels
            .iter()
            .map(|label| self.weight(label))
            .reduce(f64::max)
            .unwrap_or(NEUTRAL_WEIGHT)
    }
}

/// A single classification rule
///
/// The rule matches if any of its patterns is a substring of the lowercased
/// action label.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRule {
    patterns: Vec<String>,
    weight: f64,
}

impl ActionRule {
    /// Constructs a new rule that assigns `weight` to all labels containing one of `patterns`
    ///
    /// Patterns are lowercased, matching is case-insensitive. Scores must stay
    /// non-negative, so negative weights are raised to `0.0` and non-finite
    /// weights are replaced by the [`NEUTRAL_WEIGHT`].
    pub fn new<I, S>(patterns: I, weight: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            weight: if weight.is_finite() {
                weight.max(0.0)
            } else {
                NEUTRAL_WEIGHT
            },
        }
    }

    /// Returns `true` if the rule applies to the (already lowercased) label
    fn matches(&self, label: &str) -> bool {
        self.patterns.iter().any(|p| label.contains(p.as_str()))
    }

    /// The weight assigned by this rule
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The patterns of this rule
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Ordered, first-match-wins list of [`ActionRule`]s
///
/// The default policy is:
///
/// | order | label contains | weight |
/// | --- | --- | --- |
/// | 1 | `inhib`, `block` or `antagon` | 1.20 |
/// | 2 | `agon` | 1.10 |
/// | 3 | `modulat` | 1.05 |
/// | - | anything else | 1.00 |
///
/// # Examples
///
/// ```
/// use phenorank::{ActionPolicy, ActionWeighting};
///
/// let policy = ActionPolicy::default();
/// assert_eq!(policy.weight("Inhibitor"), 1.2);
/// // `antagonist` contains `agon`, but the first rule wins
/// assert_eq!(policy.weight("ANTAGONIST"), 1.2);
/// assert_eq!(policy.weight("partial agonist"), 1.1);
/// assert_eq!(policy.weight("allosteric modulator"), 1.05);
/// assert_eq!(policy.weight("opener"), 1.0);
/// assert_eq!(policy.weight(""), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPolicy {
    rules: Vec<ActionRule>,
    default_weight: f64,
}

impl Default for ActionPolicy {
    fn default() -> Self {
        Self {
            rules: vec![
                ActionRule::new(["inhib", "block", "antagon"], 1.20),
                ActionRule::new(["agon"], 1.10),
                ActionRule::new(["modulat"], 1.05),
            ],
            default_weight: NEUTRAL_WEIGHT,
        }
    }
}

impl ActionPolicy {
    /// Constructs a policy from the given rules
    ///
    /// Rules are evaluated in the given order.
    pub fn new(rules: Vec<ActionRule>) -> Self {
        Self {
            rules,
            default_weight: NEUTRAL_WEIGHT,
        }
    }

    /// Appends a rule with the lowest priority
    #[must_use]
    pub fn with_rule(mut self, rule: ActionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rules of the policy, in evaluation order
    pub fn rules(&self) -> &[ActionRule] {
        &self.rules
    }
}

impl ActionWeighting for ActionPolicy {
    fn weight(&self, action: &str) -> f64 {
        let label = action.trim().to_lowercase();
        if label.is_empty() {
            return self.default_weight;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(&label))
            .map_or(self.default_weight, ActionRule::weight)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_match_wins() {
        let policy = ActionPolicy::default();
        assert_eq!(policy.weight("channel blocker"), 1.2);
        assert_eq!(policy.weight("inverse agonist"), 1.1);
        // contains `modulat` and `agon`, but `agon` is evaluated first
        assert_eq!(policy.weight("agonist modulator"), 1.1);
        assert_eq!(policy.weight("negative allosteric MODULATOR"), 1.05);
    }

    #[test]
    fn unmatched_is_neutral() {
        let policy = ActionPolicy::default();
        assert_eq!(policy.weight("substrate"), NEUTRAL_WEIGHT);
        assert_eq!(policy.weight("   "), NEUTRAL_WEIGHT);
    }

    #[test]
    fn edge_weight_uses_strongest_label() {
        let policy = ActionPolicy::default();
        let labels: IdGroup<String> = ["modulator".to_string(), "inhibitor".to_string()]
            .into_iter()
            .collect();
        assert_eq!(policy.edge_weight(&labels), 1.2);
        assert_eq!(policy.edge_weight(&IdGroup::new()), NEUTRAL_WEIGHT);
    }

    #[test]
    fn custom_rules() {
        let policy = ActionPolicy::new(vec![ActionRule::new(["Opener"], 1.5)])
            .with_rule(ActionRule::new(["binder"], 0.9));
        assert_eq!(policy.weight("channel opener"), 1.5);
        assert_eq!(policy.weight("BINDER"), 0.9);
        assert_eq!(policy.weight("inhibitor"), NEUTRAL_WEIGHT);
        assert_eq!(policy.rules().len(), 2);
        assert_eq!(policy.rules()[0].patterns(), &["opener".to_string()]);
    }
}
