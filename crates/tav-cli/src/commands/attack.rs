//! `tav attack` — resolve attack rolls against an armor class.

use colored::Colorize;

use tav_dice::{RollExpr, RollMode, roll};

use super::make_rng;

/// Roll `count` attacks, resolving hit, miss, and critical damage.
///
/// A natural 20 is a critical hit regardless of the target armor class and
/// rolls the damage expression with every die doubled.
pub fn run(
    attack: &str,
    damage: &str,
    ac: i64,
    count: u32,
    advantage: bool,
    disadvantage: bool,
    seed: Option<u64>,
) -> Result<(), String> {
    let attack_expr = RollExpr::parse(attack).map_err(|e| e.to_string())?;
    let damage_expr = RollExpr::parse(damage).map_err(|e| e.to_string())?;
    let attack_mode = if advantage {
        RollMode::Advantage
    } else if disadvantage {
        RollMode::Disadvantage
    } else {
        RollMode::Normal
    };

    let mut rng = make_rng(seed);
    let count = count.max(1);

    for repetition in 0..count {
        if repetition > 0 {
            println!("----------------------------");
        }
        let attack_roll = roll(&attack_expr, attack_mode, &mut rng).map_err(|e| e.to_string())?;
        println!("Attack roll:     {attack_roll} vs AC {ac}");

        if attack_roll.natural() == 20 {
            println!("{}", "CRITICAL HIT!".red().bold());
            let dmg = roll(&damage_expr, RollMode::Critical, &mut rng).map_err(|e| e.to_string())?;
            println!("Damage:          {dmg}");
        } else if attack_roll.total() >= ac {
            println!("{}", "HIT!".green());
            let dmg = roll(&damage_expr, RollMode::Normal, &mut rng).map_err(|e| e.to_string())?;
            println!("Damage:          {dmg}");
        } else {
            println!("{}", "MISS!".red());
        }
    }
    Ok(())
}
