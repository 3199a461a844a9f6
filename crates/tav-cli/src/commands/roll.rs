//! `tav roll` — roll dice expressions, optionally repeated and tabulated.

use comfy_table::{ContentArrangement, Table};

use tav_dice::{RollExpr, RollMode, RollResult, roll};

use super::make_rng;

/// Output shape flags for the roll command.
pub struct Layout {
    /// Print all totals on a single line instead of one row per repetition.
    pub line_print: bool,
    /// Render a table with per-die detail instead of bare totals.
    pub verbose: bool,
    /// Swap the matrix: one row per expression instead of per repetition.
    pub transpose: bool,
}

/// Fold the mutually exclusive mode flags into a [`RollMode`].
///
/// clap enforces the exclusivity, so the first set flag wins here.
pub fn mode(
    advantage: bool,
    disadvantage: bool,
    critical: bool,
    best: Option<u32>,
    worst: Option<u32>,
) -> RollMode {
    if advantage {
        RollMode::Advantage
    } else if disadvantage {
        RollMode::Disadvantage
    } else if critical {
        RollMode::Critical
    } else if let Some(n) = best {
        RollMode::Best(n)
    } else if let Some(n) = worst {
        RollMode::Worst(n)
    } else {
        RollMode::Normal
    }
}

/// Roll every expression `count` times and print per the layout flags.
pub fn run(
    exprs: &[String],
    count: u32,
    mode: RollMode,
    layout: Layout,
    seed: Option<u64>,
) -> Result<(), String> {
    let parsed: Vec<RollExpr> = exprs
        .iter()
        .map(|e| RollExpr::parse(e))
        .collect::<Result<_, _>>()
        .map_err(|e| e.to_string())?;

    let mut rng = make_rng(seed);
    let count = count.max(1);

    // Rows are repetitions, columns follow the expression order.
    let mut rows: Vec<Vec<RollResult>> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let row = parsed
            .iter()
            .map(|e| roll(e, mode, &mut rng))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        rows.push(row);
    }
    if layout.transpose {
        rows = transpose(rows);
    }

    if layout.verbose {
        let header: Vec<String> = if layout.transpose {
            (1..=count).map(|i| format!("roll {i}")).collect()
        } else {
            exprs.to_vec()
        };
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(header);
        for row in &rows {
            table.add_row(row.iter().map(ToString::to_string));
        }
        println!("{table}");
    } else if layout.line_print {
        let totals: Vec<String> = rows
            .iter()
            .flatten()
            .map(|r| r.total().to_string())
            .collect();
        println!("{}", totals.join(" "));
    } else {
        for row in &rows {
            let totals: Vec<String> = row.iter().map(|r| r.total().to_string()).collect();
            println!("{}", totals.join(" "));
        }
    }
    Ok(())
}

/// Swap rows and columns of a rectangular result matrix.
fn transpose(rows: Vec<Vec<RollResult>>) -> Vec<Vec<RollResult>> {
    let cols = rows.first().map_or(0, Vec::len);
    let mut out: Vec<Vec<RollResult>> = vec![Vec::with_capacity(rows.len()); cols];
    for row in rows {
        for (i, cell) in row.into_iter().enumerate() {
            out[i].push(cell);
        }
    }
    out
}
