//! Roll expressions: `NdM` terms chained with `+`/`-` and flat bonuses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DiceError, DiceResult};

/// Sign of one chunk in a roll expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    /// The chunk adds to the total.
    Plus,
    /// The chunk subtracts from the total.
    Minus,
}

impl Sign {
    /// +1 or -1 as a multiplier.
    pub fn factor(self) -> i64 {
        match self {
            Self::Plus => 1,
            Self::Minus => -1,
        }
    }
}

/// One dice term: `count` dice with `sides` sides, added or subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTerm {
    /// Whether the term's dice add to or subtract from the total.
    pub sign: Sign,
    /// Number of dice rolled for this term.
    pub count: u32,
    /// Sides per die; values run 1..=sides.
    pub sides: u32,
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// A parsed roll expression such as `3d6+4-1d4-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollExpr {
    /// The dice terms in source order.
    pub terms: Vec<DiceTerm>,
    /// Net flat bonus across all plain-number chunks.
    pub bonus: i64,
}

impl RollExpr {
    /// Parse a roll expression.
    ///
    /// Chunks are separated by `+`/`-`; a chunk containing `d` is a dice
    /// term (`d6` means `1d6`), anything else is a flat bonus. A bare bonus
    /// with no dice at all is allowed (`5` rolls nothing and totals 5).
    pub fn parse(input: &str) -> DiceResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DiceError::Parse("empty expression".to_string()));
        }

        let mut terms = Vec::new();
        let mut bonus: i64 = 0;
        let mut sign = Sign::Plus;
        let mut chunk = String::new();

        let mut chunks: Vec<(Sign, String)> = Vec::new();
        for c in input.chars() {
            match c {
                '+' | '-' => {
                    chunks.push((sign, std::mem::take(&mut chunk)));
                    sign = if c == '+' { Sign::Plus } else { Sign::Minus };
                }
                _ if c.is_whitespace() => {}
                _ => chunk.push(c),
            }
        }
        chunks.push((sign, chunk));

        for (i, (sign, chunk)) in chunks.into_iter().enumerate() {
            if chunk.is_empty() {
                // A leading sign owns the first chunk; anything else means
                // two operators in a row or a trailing operator.
                if i == 0 {
                    continue;
                }
                return Err(DiceError::Parse(format!(
                    "dangling operator in '{input}'"
                )));
            }
            if let Some((count_part, sides_part)) = chunk.split_once('d') {
                let count: u32 = if count_part.is_empty() {
                    1
                } else {
                    count_part
                        .parse()
                        .map_err(|_| DiceError::Parse(format!("bad dice count in '{chunk}'")))?
                };
                let sides: u32 = sides_part
                    .parse()
                    .map_err(|_| DiceError::Parse(format!("bad die size in '{chunk}'")))?;
                if sides == 0 {
                    return Err(DiceError::Parse(format!("die in '{chunk}' has no sides")));
                }
                terms.push(DiceTerm { sign, count, sides });
            } else {
                let value: i64 = chunk
                    .parse()
                    .map_err(|_| DiceError::Parse(format!("bad bonus in '{chunk}'")))?;
                bonus += sign.factor() * value;
            }
        }

        Ok(Self { terms, bonus })
    }
}

impl fmt::Display for RollExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                if term.sign == Sign::Minus {
                    write!(f, "-")?;
                }
            } else {
                write!(f, "{}", if term.sign == Sign::Minus { "-" } else { "+" })?;
            }
            write!(f, "{term}")?;
        }
        if self.terms.is_empty() {
            return write!(f, "{}", self.bonus);
        }
        match self.bonus.cmp(&0) {
            std::cmp::Ordering::Greater => write!(f, "+{}", self.bonus),
            std::cmp::Ordering::Less => write!(f, "{}", self.bonus),
            std::cmp::Ordering::Equal => Ok(()),
        }
    }
}
