//! Template-driven random content generation for tabletop games.
//!
//! A template file describes named fields, each resolved by a composable
//! stochastic generator: fixed values, uniform picks from external line
//! lists, weighted and uniform choices, without-replacement repeats, nested
//! sub-statements, and choices that depend on another field's
//! already-sampled value. The crate splits into a [`lexer`] and [`parser`]
//! that turn field lines into [`generator::GeneratorNode`] trees, an
//! [`eval`] module that runs the two-pass aggregate evaluation, and a
//! [`render`] module for the console/log output layout.

pub mod error;
pub mod eval;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod template;

pub use error::{TemplateError, TemplateResult};
pub use eval::{EvalOptions, Sample};
pub use generator::{ContentMap, GeneratorNode, MatchLabel, SampleValue};
pub use template::{Field, Template, TemplateFile};
