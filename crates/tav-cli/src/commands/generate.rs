//! `tav generate` — sample a template file and log the results.

use std::path::PathBuf;

use tav_template::eval::EvalOptions;
use tav_template::generator::ContentMap;
use tav_template::{Sample, TemplateFile, render};

use super::{make_rng, report_template_error};

/// Generate `count` samples from `<template>.txt`.
///
/// Template-mode files print the padded field layout (or JSON lines with
/// `json`) and append every sample to `<template>.txt.log`; flat-list files
/// print one picked line per repetition and are never logged. The file is
/// re-read before each sample so edits between repetitions take effect.
pub fn run(
    template: &str,
    count: u32,
    seed: Option<u64>,
    max_attempts: usize,
    json: bool,
) -> Result<(), String> {
    let path = PathBuf::from(format!("{template}.txt"));
    let log_path = PathBuf::from(format!("{template}.txt.log"));
    let opts = EvalOptions {
        max_repeat_attempts: max_attempts,
    };
    let mut rng = make_rng(seed);
    let count = count.max(1);

    for repetition in 0..count {
        let loaded = TemplateFile::load(&path).map_err(|e| report_template_error(&path, &e))?;
        match loaded {
            TemplateFile::Template(template) => {
                let sample = template
                    .evaluate(&mut rng, &opts)
                    .map_err(|e| report_template_error(&path, &e))?;
                if json {
                    println!("{}", sample_json(&sample));
                } else {
                    print!("{}", render::render_sample(&sample));
                    if repetition + 1 < count {
                        println!();
                    }
                }
                render::append_to_log(&log_path, &sample).map_err(|e| e.to_string())?;
            }
            TemplateFile::List(node) => {
                let value = node
                    .produce(&mut rng, &ContentMap::new(), &opts)
                    .map_err(|e| report_template_error(&path, &e))?;
                println!("{}", render::render_value(value.as_ref()));
            }
        }
    }
    Ok(())
}

/// One sample as a JSON array of `{name, value}` objects, in field order.
///
/// Unresolved fields serialize as `null`; repeat tuples as string arrays.
fn sample_json(sample: &Sample) -> String {
    let fields: Vec<serde_json::Value> = sample
        .fields()
        .map(|(name, value)| serde_json::json!({ "name": name, "value": value }))
        .collect();
    serde_json::Value::Array(fields).to_string()
}
