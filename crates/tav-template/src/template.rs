//! Template files: the `TEMPLATE` marker, field lines, and the flat-list
//! fallback.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{TemplateError, TemplateResult};
use crate::generator::GeneratorNode;
use crate::parser;

/// First-line marker that switches a `.txt` file into template mode.
pub const TEMPLATE_MARKER: &str = "TEMPLATE";

/// One named slot of a template, resolved by its generator tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name, unique within its template.
    pub name: String,
    /// Root of the field's generator tree.
    pub node: GeneratorNode,
}

/// An ordered set of fields parsed from a template file.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl Template {
    /// Parse field definitions, one per non-blank line.
    ///
    /// `base_offset` is the byte position of `source` within the enclosing
    /// file, so error spans point into the file rather than the fragment.
    pub fn parse(source: &str, base_offset: usize) -> TemplateResult<Self> {
        let mut fields: Vec<Field> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut offset = base_offset;

        for line in source.split('\n') {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let field = parser::parse_line(line.trim_end_matches('\r'), offset)?;
                if !seen.insert(field.name.clone()) {
                    return Err(TemplateError::parse(
                        offset..offset + line.len(),
                        format!("duplicate field name: {}", field.name),
                    ));
                }
                fields.push(field);
            }
            offset += line.len() + 1;
        }

        Ok(Self { fields })
    }
}

/// A loaded `.txt` file: either a parsed template or a flat candidate list.
///
/// If the file's first line is exactly [`TEMPLATE_MARKER`], the remaining
/// lines are field definitions. Anything else makes the whole file (first
/// line included) a flat list sampled as a single uniform file choice.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateFile {
    /// Template mode: named fields with generator trees.
    Template(Template),
    /// Flat-list mode: one uniform pick over the file's lines.
    List(GeneratorNode),
}

impl TemplateFile {
    /// Read and parse a template file from disk.
    pub fn load(path: &Path) -> TemplateResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let first_line = source.lines().next().unwrap_or("");
        if first_line.trim() != TEMPLATE_MARKER {
            return Ok(Self::List(GeneratorNode::FileChoice(
                path.display().to_string(),
            )));
        }

        // Field lines start after the marker line.
        let body_offset = source.find('\n').map_or(source.len(), |i| i + 1);
        let template = Template::parse(&source[body_offset..], body_offset)?;
        Ok(Self::Template(template))
    }
}
