//! CLI frontend for the Tavern tabletop utilities.

mod commands;

use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tav",
    about = "Tavern — template-driven content generation and dice tools",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random content from a template file
    Generate {
        /// Template base name; ".txt" is appended automatically
        template: String,

        /// Number of samples to generate
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// RNG seed for deterministic output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Attempt bound for without-replacement repeats
        #[arg(long, default_value = "10000")]
        max_attempts: usize,

        /// Emit samples as JSON instead of the padded text layout
        #[arg(long)]
        json: bool,
    },

    /// Roll dice expressions like 3d6+4-1d4-1
    Roll {
        /// One or more roll expressions
        #[arg(required = true)]
        exprs: Vec<String>,

        /// Number of times to repeat the roll
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// Roll with advantage (1d20+x rolls only)
        #[arg(short = 'a', long, conflicts_with_all = ["disadvantage", "critical", "best", "worst"])]
        advantage: bool,

        /// Roll with disadvantage (1d20+x rolls only)
        #[arg(short = 'd', long, conflicts_with_all = ["critical", "best", "worst"])]
        disadvantage: bool,

        /// Roll critical hit damage (all dice doubled)
        #[arg(long = "crit", conflicts_with_all = ["best", "worst"])]
        critical: bool,

        /// Sum only the given number of best dice (single die type)
        #[arg(short = 'b', long, conflicts_with = "worst")]
        best: Option<u32>,

        /// Sum only the given number of worst dice (single die type)
        #[arg(short = 'w', long)]
        worst: Option<u32>,

        /// Print repeated rolls on one line instead of a column
        #[arg(short = 'l', long, conflicts_with = "verbose")]
        line_print: bool,

        /// Render a table with per-die detail
        #[arg(short = 'v', long)]
        verbose: bool,

        /// One row per expression instead of per repetition
        #[arg(short = 't', long)]
        transpose: bool,

        /// RNG seed for deterministic output
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Resolve an attack roll against a target armor class
    Attack {
        /// Attack roll expression, e.g. 1d20+5
        attack: String,

        /// Damage roll expression, e.g. 3d6+2
        damage: String,

        /// Target armor class to hit
        ac: i64,

        /// Number of times to repeat the attack
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// Roll the attack with advantage
        #[arg(short = 'a', long, conflicts_with = "disadvantage")]
        advantage: bool,

        /// Roll the attack with disadvantage
        #[arg(short = 'd', long)]
        disadvantage: bool,

        /// RNG seed for deterministic output
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            template,
            count,
            seed,
            max_attempts,
            json,
        } => commands::generate::run(&template, count, seed, max_attempts, json),
        Commands::Roll {
            exprs,
            count,
            advantage,
            disadvantage,
            critical,
            best,
            worst,
            line_print,
            verbose,
            transpose,
            seed,
        } => {
            let mode = commands::roll::mode(advantage, disadvantage, critical, best, worst);
            commands::roll::run(
                &exprs,
                count,
                mode,
                commands::roll::Layout {
                    line_print,
                    verbose,
                    transpose,
                },
                seed,
            )
        }
        Commands::Attack {
            attack,
            damage,
            ac,
            count,
            advantage,
            disadvantage,
            seed,
        } => commands::attack::run(&attack, &damage, ac, count, advantage, disadvantage, seed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
