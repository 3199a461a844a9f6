pub mod attack;
pub mod generate;
pub mod roll;

use std::path::Path;

use ariadne::{Color, Label, Report, ReportKind, Source};
use rand::SeedableRng;
use rand::rngs::StdRng;

use tav_template::TemplateError;

/// Seeded RNG when a seed is given, OS-seeded otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Render a template error for the terminal.
///
/// Spanned parse errors get an ariadne report pointing into the template
/// source; everything else falls back to the error's display form.
pub fn report_template_error(path: &Path, err: &TemplateError) -> String {
    let Some(span) = err.span() else {
        return err.to_string();
    };
    let Ok(source) = std::fs::read_to_string(path) else {
        return err.to_string();
    };

    let filename = path.display().to_string();
    let mut output = Vec::new();
    let write_result = Report::build(ReportKind::Error, (filename.as_str(), span.clone()))
        .with_message(err.to_string())
        .with_label(
            Label::new((filename.as_str(), span))
                .with_message("here")
                .with_color(Color::Red),
        )
        .finish()
        .write((filename.as_str(), Source::from(source)), &mut output);

    match write_result {
        Ok(()) => String::from_utf8(output).unwrap_or_else(|_| err.to_string()),
        Err(_) => err.to_string(),
    }
}
