//! Dice-expression parsing and rolling.
//!
//! Parses `NdM+k` style roll expressions (`3d6+4-1d4-1`) and rolls them
//! under the usual tabletop selection modes: advantage, disadvantage,
//! critical-hit doubling, and best-/worst-N selection.

pub mod error;
pub mod expr;
pub mod roll;

pub use error::{DiceError, DiceResult};
pub use expr::{DiceTerm, RollExpr, Sign};
pub use roll::{RollMode, RollResult, roll};
