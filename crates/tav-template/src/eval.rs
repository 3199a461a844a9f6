//! Aggregate evaluation — two-pass sampling of a whole template.

use rand::rngs::StdRng;
use serde::Serialize;

use crate::error::TemplateResult;
use crate::generator::{ContentMap, SampleValue};
use crate::template::Template;

/// Default bound on without-replacement repeat attempts.
pub const DEFAULT_MAX_REPEAT_ATTEMPTS: usize = 10_000;

/// Knobs for one evaluation.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Attempt bound for `Repeat` nodes. The original tool looped forever
    /// when a repeat's inner domain was smaller than its target count; here
    /// that surfaces as `TemplateError::RepeatExhausted` instead.
    pub max_repeat_attempts: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_repeat_attempts: DEFAULT_MAX_REPEAT_ATTEMPTS,
        }
    }
}

/// The full output of one aggregate evaluation: field names in declaration
/// order plus the final content map.
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    /// Field names in template declaration order.
    pub names: Vec<String>,
    /// Final value (or unresolved marker) for every field.
    pub content: ContentMap,
}

impl Sample {
    /// The resolved value of a field, if the field exists and resolved.
    pub fn value(&self, name: &str) -> Option<&SampleValue> {
        self.content.get(name).and_then(|v| v.as_ref())
    }

    /// Iterate fields in declaration order as `(name, value)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&SampleValue>)> {
        self.names
            .iter()
            .map(|name| (name.as_str(), self.content.get(name).and_then(|v| v.as_ref())))
    }
}

impl Template {
    /// Evaluate every field of this template into one [`Sample`].
    ///
    /// Pass 1 samples each field in declaration order, storing the result
    /// (unresolved included) in the shared content map. Pass 2 re-samples
    /// only the fields that are still unresolved; by then every independent
    /// field has its final value, so a dependent field declared *before*
    /// the field it depends on resolves here. That is exactly one hop of
    /// forward dependency — deeper chains relative to declaration order
    /// stay unresolved, deliberately, for template compatibility.
    pub fn evaluate(&self, rng: &mut StdRng, opts: &EvalOptions) -> TemplateResult<Sample> {
        let mut content = ContentMap::new();

        for field in &self.fields {
            let value = field.node.produce(rng, &content, opts)?;
            content.insert(field.name.clone(), value);
        }

        for field in &self.fields {
            if content.get(&field.name).is_some_and(|v| v.is_none()) {
                let value = field.node.produce(rng, &content, opts)?;
                content.insert(field.name.clone(), value);
            }
        }

        Ok(Sample {
            names: self.fields.iter().map(|f| f.name.clone()).collect(),
            content,
        })
    }
}
