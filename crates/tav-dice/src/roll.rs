//! Rolling expressions under the different selection modes.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::error::{DiceError, DiceResult};
use crate::expr::{RollExpr, Sign};

/// How the dice of an expression are selected and summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollMode {
    /// Sum every die plus the bonus.
    Normal,
    /// Roll a single `1d20` term twice and keep the higher roll.
    Advantage,
    /// Roll a single `1d20` term twice and keep the lower roll.
    Disadvantage,
    /// Critical hit damage: every dice term is rolled twice.
    Critical,
    /// Keep only the `n` highest dice of a single term.
    Best(u32),
    /// Keep only the `n` lowest dice of a single term.
    Worst(u32),
}

/// The dice kept for one roll, plus the expression's flat bonus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RollResult {
    /// Signed values of the kept dice.
    pub dice: Vec<i64>,
    /// Flat bonus added to the total.
    pub bonus: i64,
}

impl RollResult {
    /// Sum of the kept dice plus the bonus.
    pub fn total(&self) -> i64 {
        self.dice.iter().sum::<i64>() + self.bonus
    }

    /// Sum of the kept dice alone — the "natural" roll before bonuses.
    pub fn natural(&self) -> i64 {
        self.dice.iter().sum()
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.dice.iter().map(i64::to_string).collect();
        write!(f, "[{}]", values.join(", "))?;
        match self.bonus.cmp(&0) {
            std::cmp::Ordering::Greater => write!(f, " + {}", self.bonus)?,
            std::cmp::Ordering::Less => write!(f, " - {}", -self.bonus)?,
            std::cmp::Ordering::Equal => {}
        }
        write!(f, " = {}", self.total())
    }
}

/// Roll one die, 1..=sides.
fn die(sides: u32, rng: &mut StdRng) -> i64 {
    i64::from(rng.random_range(1..=sides))
}

/// Roll an expression under the given mode.
pub fn roll(expr: &RollExpr, mode: RollMode, rng: &mut StdRng) -> DiceResult<RollResult> {
    match mode {
        RollMode::Normal => Ok(roll_normal(expr, false, rng)),
        RollMode::Critical => Ok(roll_normal(expr, true, rng)),

        RollMode::Advantage | RollMode::Disadvantage => {
            let &[term] = expr.terms.as_slice() else {
                return Err(DiceError::InvalidMode(
                    "advantage and disadvantage need a 1d20+x style roll".to_string(),
                ));
            };
            if term.count != 1 || term.sides != 20 || term.sign == Sign::Minus {
                return Err(DiceError::InvalidMode(
                    "advantage and disadvantage need a 1d20+x style roll".to_string(),
                ));
            }
            let first = die(20, rng);
            let second = die(20, rng);
            let kept = if mode == RollMode::Advantage {
                first.max(second)
            } else {
                first.min(second)
            };
            Ok(RollResult {
                dice: vec![kept],
                bonus: expr.bonus,
            })
        }

        RollMode::Best(n) | RollMode::Worst(n) => {
            let &[term] = expr.terms.as_slice() else {
                return Err(DiceError::InvalidMode(
                    "best/worst selection works on a single die type".to_string(),
                ));
            };
            if term.count < n {
                return Err(DiceError::InvalidMode(format!(
                    "cannot pick {n} dice out of {} rolled",
                    term.count
                )));
            }
            let mut values: Vec<i64> = (0..term.count).map(|_| die(term.sides, rng)).collect();
            values.sort_unstable();
            if matches!(mode, RollMode::Best(_)) {
                values.reverse();
            }
            values.truncate(n as usize);
            if term.sign == Sign::Minus {
                for v in &mut values {
                    *v = -*v;
                }
            }
            Ok(RollResult {
                dice: values,
                bonus: expr.bonus,
            })
        }
    }
}

/// Roll every term once (twice when `critical`), keeping all dice.
fn roll_normal(expr: &RollExpr, critical: bool, rng: &mut StdRng) -> RollResult {
    let rounds = if critical { 2 } else { 1 };
    let mut dice = Vec::new();
    for _ in 0..rounds {
        for term in &expr.terms {
            for _ in 0..term.count {
                dice.push(term.sign.factor() * die(term.sides, rng));
            }
        }
    }
    RollResult {
        dice,
        bonus: expr.bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn normal_roll_stays_in_range() {
        let expr = RollExpr::parse("3d6+2").unwrap();
        let mut rng = rng();
        for _ in 0..200 {
            let result = roll(&expr, RollMode::Normal, &mut rng).unwrap();
            assert_eq!(result.dice.len(), 3);
            assert!((5..=20).contains(&result.total()), "total {}", result.total());
        }
    }

    #[test]
    fn negative_terms_subtract() {
        let expr = RollExpr::parse("3d6-1d4").unwrap();
        let mut rng = rng();
        for _ in 0..200 {
            let result = roll(&expr, RollMode::Normal, &mut rng).unwrap();
            assert_eq!(result.dice.len(), 4);
            assert!(result.dice[3] < 0);
            assert!((-1..=17).contains(&result.total()));
        }
    }

    #[test]
    fn bare_bonus_rolls_nothing() {
        let expr = RollExpr::parse("5").unwrap();
        let result = roll(&expr, RollMode::Normal, &mut rng()).unwrap();
        assert!(result.dice.is_empty());
        assert_eq!(result.total(), 5);
    }

    #[test]
    fn advantage_beats_or_ties_disadvantage_on_shared_seed() {
        let expr = RollExpr::parse("1d20+5").unwrap();
        for seed in 0..50 {
            let mut a = StdRng::seed_from_u64(seed);
            let mut d = StdRng::seed_from_u64(seed);
            let adv = roll(&expr, RollMode::Advantage, &mut a).unwrap();
            let dis = roll(&expr, RollMode::Disadvantage, &mut d).unwrap();
            assert!(adv.total() >= dis.total());
            assert!((1..=20).contains(&adv.natural()));
        }
    }

    #[test]
    fn advantage_requires_single_d20() {
        let mut rng = rng();
        let err = roll(
            &RollExpr::parse("2d20").unwrap(),
            RollMode::Advantage,
            &mut rng,
        )
        .unwrap_err();
        assert!(err.to_string().contains("1d20"));
        assert!(
            roll(&RollExpr::parse("1d6").unwrap(), RollMode::Advantage, &mut rng).is_err()
        );
    }

    #[test]
    fn critical_doubles_the_dice() {
        let expr = RollExpr::parse("2d6+3").unwrap();
        let result = roll(&expr, RollMode::Critical, &mut rng()).unwrap();
        assert_eq!(result.dice.len(), 4);
        assert_eq!(result.bonus, 3);
    }

    #[test]
    fn best_keeps_the_highest() {
        let expr = RollExpr::parse("4d6").unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            let mut check = rng.clone();
            let all: Vec<i64> = (0..4)
                .map(|_| i64::from(check.random_range(1..=6u32)))
                .collect();
            let result = roll(&expr, RollMode::Best(3), &mut rng).unwrap();
            let mut sorted = all.clone();
            sorted.sort_unstable();
            let expected: i64 = sorted[1..].iter().sum();
            assert_eq!(result.total(), expected);
        }
    }

    #[test]
    fn worst_keeps_the_lowest() {
        let expr = RollExpr::parse("2d20").unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            let result = roll(&expr, RollMode::Worst(1), &mut rng).unwrap();
            assert_eq!(result.dice.len(), 1);
            assert!((1..=20).contains(&result.total()));
        }
    }

    #[test]
    fn best_rejects_overdraw_and_multiple_terms() {
        let mut rng = rng();
        assert!(
            roll(&RollExpr::parse("2d6").unwrap(), RollMode::Best(3), &mut rng).is_err()
        );
        assert!(
            roll(
                &RollExpr::parse("2d6+1d4").unwrap(),
                RollMode::Best(1),
                &mut rng
            )
            .is_err()
        );
    }

    #[test]
    fn display_formats_kept_dice_and_bonus() {
        let result = RollResult {
            dice: vec![3, 5],
            bonus: 2,
        };
        assert_eq!(result.to_string(), "[3, 5] + 2 = 10");
        let negative = RollResult {
            dice: vec![4],
            bonus: -1,
        };
        assert_eq!(negative.to_string(), "[4] - 1 = 3");
    }
}
