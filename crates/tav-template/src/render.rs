//! Sample rendering for the console stream and the per-template append log.
//!
//! Both sinks use the same layout: one line per field, the name (plus a
//! colon) padded to a fixed column, then the value. Unresolved fields render
//! as `NOT DEFINED`; repeat tuples join their elements with `", "`. A blank
//! line separates consecutive samples.

use std::io::Write;
use std::path::Path;

use crate::error::{TemplateError, TemplateResult};
use crate::eval::Sample;
use crate::generator::SampleValue;

/// Column the values start at; names longer than this just push past it.
pub const NAME_COLUMN: usize = 20;

/// Marker text rendered for a field that stayed unresolved.
pub const NOT_DEFINED: &str = "NOT DEFINED";

/// Render one field value.
pub fn render_value(value: Option<&SampleValue>) -> String {
    match value {
        None => NOT_DEFINED.to_string(),
        Some(SampleValue::Text(text)) => text.clone(),
        Some(SampleValue::Many(items)) => items.join(", "),
    }
}

/// Render a whole sample, one line per field in declaration order, with a
/// trailing newline.
pub fn render_sample(sample: &Sample) -> String {
    let mut out = String::new();
    for (name, value) in sample.fields() {
        let mut line = format!("{name}:");
        // Pad by character count, not bytes; names may be non-ASCII.
        let width = line.chars().count();
        for _ in width..NAME_COLUMN {
            line.push(' ');
        }
        line.push_str(&render_value(value));
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Append a rendered sample plus a blank separator line to the template's
/// log file, creating the file if needed.
pub fn append_to_log(path: &Path, sample: &Sample) -> TemplateResult<()> {
    let map_err = |source| TemplateError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(map_err)?;
    file.write_all(render_sample(sample).as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ContentMap;

    fn sample() -> Sample {
        let mut content = ContentMap::new();
        content.insert(
            "race".to_string(),
            Some(SampleValue::Text("Dwarf".to_string())),
        );
        content.insert(
            "traits".to_string(),
            Some(SampleValue::Many(vec![
                "gruff".to_string(),
                "loyal".to_string(),
            ])),
        );
        content.insert("mount".to_string(), None);
        Sample {
            names: vec!["race".to_string(), "traits".to_string(), "mount".to_string()],
            content,
        }
    }

    #[test]
    fn values_render_by_kind() {
        let s = sample();
        assert_eq!(render_value(s.value("race")), "Dwarf");
        assert_eq!(render_value(s.value("traits")), "gruff, loyal");
        assert_eq!(render_value(s.value("mount")), "NOT DEFINED");
    }

    #[test]
    fn sample_renders_padded_lines_in_order() {
        let rendered = render_sample(&sample());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "race:               Dwarf");
        assert_eq!(lines[1], "traits:             gruff, loyal");
        assert_eq!(lines[2], "mount:              NOT DEFINED");
    }

    #[test]
    fn long_names_push_past_the_column() {
        let mut content = ContentMap::new();
        content.insert(
            "a_rather_long_field_name".to_string(),
            Some(SampleValue::Text("x".to_string())),
        );
        let s = Sample {
            names: vec!["a_rather_long_field_name".to_string()],
            content,
        };
        assert_eq!(render_sample(&s), "a_rather_long_field_name:x\n");
    }

    #[test]
    fn log_appends_with_blank_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adventurer.txt.log");
        append_to_log(&path, &sample()).unwrap();
        append_to_log(&path, &sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let blanks = content.lines().filter(|l| l.is_empty()).count();
        assert_eq!(blanks, 2);
        assert_eq!(content.matches("race:").count(), 2);
    }
}
