//! Generator nodes — the sampling half of the template engine.
//!
//! A parsed field statement becomes a tree of [`GeneratorNode`]s with a
//! single operation, [`GeneratorNode::produce`]. The evaluation context (the
//! shared [`ContentMap`] plus [`EvalOptions`]) is threaded through `produce`
//! as explicit arguments rather than stored in the nodes, so a built tree
//! can be reused across independent evaluations.

use std::collections::HashMap;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::error::{TemplateError, TemplateResult};
use crate::eval::EvalOptions;

/// One sampled value: a single string or the ordered output of a repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// A single text value.
    Text(String),
    /// The pairwise-distinct values collected by a `Repeat` node.
    Many(Vec<String>),
}

impl SampleValue {
    /// The inner string for single-valued samples, `None` for tuples.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Many(_) => None,
        }
    }
}

/// Per-evaluation mapping from field name to its currently sampled value.
///
/// `None` is the explicit "unresolved" marker: the field was sampled but its
/// dependent generator could not resolve yet (or never will). The aggregate
/// evaluator is the only writer; `Dependent` nodes read it during `produce`.
pub type ContentMap = HashMap<String, Option<SampleValue>>;

/// Match label on one arm of a `Dependent` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchLabel {
    /// The `ANY` wildcard — matches every resolved dependency value.
    Any,
    /// Matches only when the dependency's value equals this text exactly.
    Exact(String),
}

/// The literal wildcard label recognized in dependency conditions.
pub const ANY_LABEL: &str = "ANY";

/// A node in a field's generator tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorNode {
    /// A fixed literal value, returned verbatim on every sample.
    Value(String),
    /// A uniform pick from the usable lines of an external list file,
    /// re-read fresh on every sample.
    FileChoice(String),
    /// Weighted selection among child nodes; weights are relative,
    /// unnormalized proportions, all positive.
    Weighted(Vec<(GeneratorNode, f64)>),
    /// Equal-probability selection among child nodes.
    Uniform(Vec<GeneratorNode>),
    /// Selection keyed on another field's already-sampled value.
    Dependent {
        /// Name of the field this node's choice depends on.
        field: String,
        /// Arms scanned in order; `Any` arms always sit at the end.
        arms: Vec<(GeneratorNode, MatchLabel)>,
    },
    /// A fixed count of pairwise-distinct samples drawn from the inner node.
    Repeat {
        /// How many distinct values to collect.
        count: usize,
        /// The generator the values are drawn from.
        inner: Box<GeneratorNode>,
    },
    /// A statement that reduced to a single unconditioned choice.
    Single(Box<GeneratorNode>),
}

impl GeneratorNode {
    /// Build a `Dependent` node, relocating wildcard arms to the end so
    /// specific labels are always tried first.
    pub fn dependent(field: impl Into<String>, arms: Vec<(GeneratorNode, MatchLabel)>) -> Self {
        let (specific, any): (Vec<_>, Vec<_>) = arms
            .into_iter()
            .partition(|(_, label)| *label != MatchLabel::Any);
        let mut arms = specific;
        arms.extend(any);
        Self::Dependent {
            field: field.into(),
            arms,
        }
    }

    /// Produce one sample from this node.
    ///
    /// Returns `Ok(None)` only for a `Dependent` whose dependency is still
    /// unresolved or whose arms all fail to match — the caller (normally the
    /// aggregate evaluator) records that as the unresolved marker.
    pub fn produce(
        &self,
        rng: &mut StdRng,
        content: &ContentMap,
        opts: &EvalOptions,
    ) -> TemplateResult<Option<SampleValue>> {
        match self {
            Self::Value(text) => Ok(Some(SampleValue::Text(text.clone()))),

            Self::FileChoice(path) => {
                let lines = read_list(path)?;
                let line = lines[rng.random_range(0..lines.len())].clone();
                Ok(Some(SampleValue::Text(line)))
            }

            Self::Weighted(choices) => {
                if choices.is_empty() {
                    return Ok(None);
                }
                let total: f64 = choices.iter().map(|(_, weight)| weight).sum();
                let draw = rng.random_range(0.0..total);
                let mut upto = 0.0;
                for (child, weight) in choices {
                    // First match wins at interval boundaries.
                    if upto + weight > draw {
                        return child.produce(rng, content, opts);
                    }
                    upto += weight;
                }
                // Float rounding can leave the draw at the very top edge;
                // it belongs to the last interval.
                match choices.last() {
                    Some((child, _)) => child.produce(rng, content, opts),
                    None => Ok(None),
                }
            }

            Self::Uniform(children) => {
                if children.is_empty() {
                    return Ok(None);
                }
                children[rng.random_range(0..children.len())].produce(rng, content, opts)
            }

            Self::Dependent { field, arms } => {
                let Some(Some(value)) = content.get(field) else {
                    return Ok(None);
                };
                for (child, label) in arms {
                    let matched = match label {
                        MatchLabel::Any => true,
                        MatchLabel::Exact(text) => value.as_text() == Some(text),
                    };
                    if matched {
                        return child.produce(rng, content, opts);
                    }
                }
                Ok(None)
            }

            Self::Repeat { count, inner } => {
                let mut values: Vec<String> = Vec::with_capacity(*count);
                let mut attempts = 0;
                while values.len() < *count {
                    if attempts >= opts.max_repeat_attempts {
                        return Err(TemplateError::RepeatExhausted {
                            wanted: *count,
                            found: values.len(),
                            attempts,
                        });
                    }
                    attempts += 1;
                    // Only plain text samples can be deduplicated; null and
                    // tuple samples from the inner node count as misses.
                    if let Some(SampleValue::Text(text)) = inner.produce(rng, content, opts)?
                        && !values.contains(&text)
                    {
                        values.push(text);
                    }
                }
                Ok(Some(SampleValue::Many(values)))
            }

            Self::Single(inner) => inner.produce(rng, content, opts),
        }
    }
}

/// Read the usable lines of a list file: trimmed, length >= 2.
fn read_list(path: &str) -> TemplateResult<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_string(),
        source,
    })?;
    let lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| line.len() >= 2)
        .map(str::to_string)
        .collect();
    if lines.is_empty() {
        return Err(TemplateError::EmptySource(path.to_string()));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::io::Write;

    fn produce(node: &GeneratorNode, rng: &mut StdRng) -> Option<SampleValue> {
        node.produce(rng, &ContentMap::new(), &EvalOptions::default())
            .unwrap()
    }

    fn text(s: &str) -> Option<SampleValue> {
        Some(SampleValue::Text(s.to_string()))
    }

    #[test]
    fn value_returns_literal_every_time() {
        let node = GeneratorNode::Value("Goblin".to_string());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(produce(&node, &mut rng), text("Goblin"));
        }
    }

    #[test]
    fn uniform_only_returns_members() {
        let node = GeneratorNode::Uniform(vec![
            GeneratorNode::Value("a".to_string()),
            GeneratorNode::Value("b".to_string()),
            GeneratorNode::Value("c".to_string()),
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let got = produce(&node, &mut rng).unwrap();
            assert!(matches!(got.as_text(), Some("a" | "b" | "c")));
        }
    }

    #[test]
    fn weighted_frequencies_follow_weights() {
        let node = GeneratorNode::Weighted(vec![
            (GeneratorNode::Value("red".to_string()), 0.5),
            (GeneratorNode::Value("blue".to_string()), 0.5),
        ]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut reds = 0;
        for _ in 0..10_000 {
            if produce(&node, &mut rng) == text("red") {
                reds += 1;
            }
        }
        // ~50/50 within statistical tolerance
        assert!((4_600..=5_400).contains(&reds), "reds = {reds}");
    }

    #[test]
    fn weighted_respects_unnormalized_proportions() {
        let node = GeneratorNode::Weighted(vec![
            (GeneratorNode::Value("common".to_string()), 9.0),
            (GeneratorNode::Value("rare".to_string()), 1.0),
        ]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut rares = 0;
        for _ in 0..10_000 {
            if produce(&node, &mut rng) == text("rare") {
                rares += 1;
            }
        }
        assert!((700..=1_300).contains(&rares), "rares = {rares}");
    }

    #[test]
    fn dependent_matches_specific_label() {
        let node = GeneratorNode::dependent(
            "height",
            vec![
                (GeneratorNode::Value("A".to_string()), MatchLabel::Exact("tall".to_string())),
                (GeneratorNode::Value("B".to_string()), MatchLabel::Any),
            ],
        );
        let mut content = ContentMap::new();
        content.insert("height".to_string(), Some(SampleValue::Text("tall".to_string())));
        let mut rng = StdRng::seed_from_u64(1);
        let got = node
            .produce(&mut rng, &content, &EvalOptions::default())
            .unwrap();
        assert_eq!(got, text("A"));
    }

    #[test]
    fn dependent_falls_through_to_wildcard() {
        let node = GeneratorNode::dependent(
            "height",
            vec![
                (GeneratorNode::Value("A".to_string()), MatchLabel::Exact("tall".to_string())),
                (GeneratorNode::Value("B".to_string()), MatchLabel::Any),
            ],
        );
        let mut content = ContentMap::new();
        content.insert("height".to_string(), Some(SampleValue::Text("short".to_string())));
        let mut rng = StdRng::seed_from_u64(1);
        let got = node
            .produce(&mut rng, &content, &EvalOptions::default())
            .unwrap();
        assert_eq!(got, text("B"));
    }

    #[test]
    fn dependent_unresolved_dependency_is_null() {
        let node = GeneratorNode::dependent(
            "height",
            vec![(GeneratorNode::Value("B".to_string()), MatchLabel::Any)],
        );
        let mut rng = StdRng::seed_from_u64(1);

        // Dependency absent entirely
        let got = node
            .produce(&mut rng, &ContentMap::new(), &EvalOptions::default())
            .unwrap();
        assert_eq!(got, None);

        // Dependency present but itself unresolved
        let mut content = ContentMap::new();
        content.insert("height".to_string(), None);
        let got = node
            .produce(&mut rng, &content, &EvalOptions::default())
            .unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn dependent_no_matching_arm_is_null() {
        let node = GeneratorNode::dependent(
            "height",
            vec![(
                GeneratorNode::Value("A".to_string()),
                MatchLabel::Exact("tall".to_string()),
            )],
        );
        let mut content = ContentMap::new();
        content.insert("height".to_string(), Some(SampleValue::Text("short".to_string())));
        let mut rng = StdRng::seed_from_u64(1);
        let got = node
            .produce(&mut rng, &content, &EvalOptions::default())
            .unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn dependent_constructor_moves_any_last() {
        let node = GeneratorNode::dependent(
            "f",
            vec![
                (GeneratorNode::Value("wild".to_string()), MatchLabel::Any),
                (GeneratorNode::Value("A".to_string()), MatchLabel::Exact("x".to_string())),
            ],
        );
        let GeneratorNode::Dependent { arms, .. } = &node else {
            panic!("expected dependent node");
        };
        assert_eq!(arms[0].1, MatchLabel::Exact("x".to_string()));
        assert_eq!(arms[1].1, MatchLabel::Any);

        // And the specific label still wins even though ANY was listed first.
        let mut content = ContentMap::new();
        content.insert("f".to_string(), Some(SampleValue::Text("x".to_string())));
        let mut rng = StdRng::seed_from_u64(1);
        let got = node
            .produce(&mut rng, &content, &EvalOptions::default())
            .unwrap();
        assert_eq!(got, text("A"));
    }

    #[test]
    fn repeat_collects_distinct_values() {
        let node = GeneratorNode::Repeat {
            count: 3,
            inner: Box::new(GeneratorNode::Uniform(
                ["a", "b", "c", "d", "e"]
                    .iter()
                    .map(|s| GeneratorNode::Value((*s).to_string()))
                    .collect(),
            )),
        };
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let Some(SampleValue::Many(values)) = produce(&node, &mut rng) else {
                panic!("expected tuple sample");
            };
            assert_eq!(values.len(), 3);
            let mut unique = values.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), 3, "duplicates in {values:?}");
        }
    }

    #[test]
    fn repeat_exhausts_small_domain() {
        let node = GeneratorNode::Repeat {
            count: 3,
            inner: Box::new(GeneratorNode::Value("only".to_string())),
        };
        let mut rng = StdRng::seed_from_u64(5);
        let err = node
            .produce(&mut rng, &ContentMap::new(), &EvalOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::RepeatExhausted {
                wanted: 3,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn repeat_zero_count_is_empty_tuple() {
        let node = GeneratorNode::Repeat {
            count: 0,
            inner: Box::new(GeneratorNode::Value("x".to_string())),
        };
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(produce(&node, &mut rng), Some(SampleValue::Many(Vec::new())));
    }

    #[test]
    fn single_delegates() {
        let node = GeneratorNode::Single(Box::new(GeneratorNode::Value("inner".to_string())));
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(produce(&node, &mut rng), text("inner"));
    }

    #[test]
    fn file_choice_picks_usable_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Ruby").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "x").unwrap(); // too short, skipped
        writeln!(file, "Sapphire").unwrap();
        let node = GeneratorNode::FileChoice(file.path().to_string_lossy().into_owned());
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let got = produce(&node, &mut rng).unwrap();
            assert!(matches!(got.as_text(), Some("Ruby" | "Sapphire")));
        }
    }

    #[test]
    fn file_choice_missing_file_is_fatal() {
        let node = GeneratorNode::FileChoice("does/not/exist.txt".to_string());
        let mut rng = StdRng::seed_from_u64(9);
        let err = node
            .produce(&mut rng, &ContentMap::new(), &EvalOptions::default())
            .unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }));
    }

    #[test]
    fn file_choice_empty_list_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "x").unwrap();
        let node = GeneratorNode::FileChoice(file.path().to_string_lossy().into_owned());
        let mut rng = StdRng::seed_from_u64(9);
        let err = node
            .produce(&mut rng, &ContentMap::new(), &EvalOptions::default())
            .unwrap_err();
        assert!(matches!(err, TemplateError::EmptySource(_)));
    }
}
