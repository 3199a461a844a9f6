//! Recursive-descent parser for field statements.
//!
//! Grammar per field line: `name ":" statement`. A statement is one or more
//! choices separated by top-level commas, optionally followed by a trailing
//! `| depfield` dependency clause. Each choice is `value` or
//! `value "-" condition`; a condition containing a decimal point is a
//! weight, anything else is a match label for dependency resolution. A value
//! may carry an `N*` repeat-multiplier prefix, and a fully parenthesized
//! value is recursively parsed as its own statement.
//!
//! Which delimiters count is position-sensitive: a pipe only starts the
//! dependency clause when it sits after the statement's last closing
//! parenthesis, and a dash only separates a condition when it sits after the
//! choice's last closing parenthesis. Commas split only at parenthesis
//! depth zero. The parser works on the lexer's token stream and carries
//! byte spans so errors point into the template file.

use std::ops::Range;

use crate::error::{TemplateError, TemplateResult};
use crate::generator::{ANY_LABEL, GeneratorNode, MatchLabel};
use crate::lexer::{self, Span, Token};
use crate::template::Field;

/// Parse one field line (`name ":" statement`) at the given byte offset
/// into the template source.
pub fn parse_line(line: &str, offset: usize) -> TemplateResult<Field> {
    let Some(colon) = line.find(':') else {
        return Err(TemplateError::parse(
            offset..offset + line.len(),
            "missing ':' between field name and statement",
        ));
    };
    let name = line[..colon].trim();
    if name.is_empty() {
        return Err(TemplateError::parse(
            offset..offset + colon + 1,
            "empty field name",
        ));
    }
    let node = parse_statement(&line[colon + 1..], offset + colon + 1)?;
    Ok(Field {
        name: name.to_string(),
        node,
    })
}

/// Parse one statement at the given byte offset into the template source.
pub fn parse_statement(statement: &str, offset: usize) -> TemplateResult<GeneratorNode> {
    let parser = StmtParser {
        src: statement,
        base: offset,
        tokens: lexer::lex(statement),
    };
    let len = parser.tokens.len();
    parser.statement(0..len)
}

/// A parsed choice before the statement's node kind is decided.
struct Choice {
    node: GeneratorNode,
    /// Raw condition text after the dash, if any.
    condition: Option<String>,
    /// Span of the condition (or of the whole choice when absent).
    span: Span,
}

impl Choice {
    /// The condition parsed as a weight. Conditions containing a decimal
    /// point were already validated as floats in `choice()`, so this is
    /// `Some` exactly for numeric conditions.
    fn weight(&self) -> Option<f64> {
        let cond = self.condition.as_deref()?;
        if cond.contains('.') {
            cond.parse().ok()
        } else {
            None
        }
    }
}

struct StmtParser<'a> {
    src: &'a str,
    base: usize,
    tokens: Vec<(Token, Span)>,
}

impl StmtParser<'_> {
    fn err(&self, span: Span, message: impl Into<String>) -> TemplateError {
        TemplateError::parse(self.base + span.start..self.base + span.end, message)
    }

    /// Span covering a token range (or the whole statement when empty).
    fn span_of(&self, range: &Range<usize>) -> Span {
        if range.is_empty() {
            return 0..self.src.len();
        }
        self.tokens[range.start].1.start..self.tokens[range.end - 1].1.end
    }

    /// Raw source text covered by a token range.
    fn text_of(&self, range: &Range<usize>) -> &str {
        let span = self.span_of(range);
        &self.src[span]
    }

    /// Shrink a token range past leading/trailing whitespace-only text.
    fn trim(&self, mut range: Range<usize>) -> Range<usize> {
        let blank = |i: usize| matches!(&self.tokens[i].0, Token::Text(t) if t.trim().is_empty());
        while !range.is_empty() && blank(range.start) {
            range.start += 1;
        }
        while !range.is_empty() && blank(range.end - 1) {
            range.end -= 1;
        }
        range
    }

    /// Parse a (sub-)statement spanning the given token range.
    fn statement(&self, range: Range<usize>) -> TemplateResult<GeneratorNode> {
        let range = self.trim(range);
        if range.is_empty() {
            return Err(self.err(self.span_of(&range), "empty statement"));
        }

        let (body, dependency) = self.split_dependency(range)?;
        let choice_ranges = self.split_choices(body)?;

        let mut choices = Vec::with_capacity(choice_ranges.len());
        for choice_range in choice_ranges {
            choices.push(self.choice(choice_range)?);
        }

        if let Some(dependency) = dependency {
            let arms = choices
                .into_iter()
                .map(|c| {
                    let label = match c.condition.as_deref() {
                        Some(ANY_LABEL) => MatchLabel::Any,
                        Some(other) => MatchLabel::Exact(other.to_string()),
                        None => MatchLabel::Exact(String::new()),
                    };
                    (c.node, label)
                })
                .collect();
            return Ok(GeneratorNode::dependent(dependency, arms));
        }

        // The last choice's condition type decides the branch for the whole
        // statement: numeric means weighted, and then every choice needs a
        // positive numeric weight.
        let weighted = choices.last().is_some_and(|c| c.weight().is_some());
        if weighted {
            let mut pairs = Vec::with_capacity(choices.len());
            for c in choices {
                let Some(weight) = c.weight() else {
                    return Err(self.err(c.span, "expected a numeric weight on every choice"));
                };
                if weight <= 0.0 {
                    return Err(self.err(c.span, "weight must be positive"));
                }
                pairs.push((c.node, weight));
            }
            return Ok(GeneratorNode::Weighted(pairs));
        }

        let mut nodes: Vec<GeneratorNode> = choices.into_iter().map(|c| c.node).collect();
        if nodes.len() == 1 {
            Ok(GeneratorNode::Single(Box::new(nodes.remove(0))))
        } else {
            // Non-numeric conditions, if any, are ignored in this branch.
            Ok(GeneratorNode::Uniform(nodes))
        }
    }

    /// Split off the trailing dependency clause, if present.
    ///
    /// The last pipe starts a dependency clause only when no closing
    /// parenthesis follows it; a pipe nested inside a parenthesized
    /// sub-statement never triggers dependency mode for the outer statement.
    fn split_dependency(
        &self,
        range: Range<usize>,
    ) -> TemplateResult<(Range<usize>, Option<String>)> {
        let last_pipe = range
            .clone()
            .rev()
            .find(|&i| matches!(self.tokens[i].0, Token::Pipe));
        let Some(pipe) = last_pipe else {
            return Ok((range, None));
        };
        let rparen_after = (pipe + 1..range.end)
            .any(|i| matches!(self.tokens[i].0, Token::RParen));
        if rparen_after {
            return Ok((range, None));
        }

        let dep_range = self.trim(pipe + 1..range.end);
        let dependency = self.text_of(&dep_range).trim();
        if dependency.is_empty() {
            return Err(self.err(
                self.tokens[pipe].1.clone(),
                "missing dependency field name after '|'",
            ));
        }
        Ok((range.start..pipe, Some(dependency.to_string())))
    }

    /// Split a statement body at parenthesis-depth-zero commas, validating
    /// balance along the way.
    fn split_choices(&self, range: Range<usize>) -> TemplateResult<Vec<Range<usize>>> {
        let mut ranges = Vec::new();
        let mut depth: i32 = 0;
        let mut start = range.start;

        for i in range.clone() {
            match self.tokens[i].0 {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(self.err(self.tokens[i].1.clone(), "unmatched ')'"));
                    }
                }
                Token::Comma if depth == 0 => {
                    ranges.push(start..i);
                    start = i + 1;
                }
                _ => {}
            }
        }
        if depth > 0 {
            return Err(self.err(self.span_of(&range), "unbalanced parentheses"));
        }
        ranges.push(start..range.end);
        Ok(ranges)
    }

    /// Parse one choice: `value` or `value "-" condition`, with an optional
    /// `N*` multiplier prefix on the value.
    fn choice(&self, range: Range<usize>) -> TemplateResult<Choice> {
        let range = self.trim(range);
        if range.is_empty() {
            return Err(self.err(self.span_of(&range), "empty choice"));
        }
        let choice_span = self.span_of(&range);

        // The condition dash is the last dash after the choice's last ')'.
        let last_rparen = range
            .clone()
            .rev()
            .find(|&i| matches!(self.tokens[i].0, Token::RParen));
        let dash_floor = last_rparen.map_or(range.start, |i| i + 1);
        let dash = (dash_floor..range.end)
            .rev()
            .find(|&i| matches!(self.tokens[i].0, Token::Dash));

        let (value_range, condition, cond_span) = match dash {
            Some(d) => {
                let cond_range = self.trim(d + 1..range.end);
                let cond = self.text_of(&cond_range).trim().to_string();
                let span = if cond_range.is_empty() {
                    self.tokens[d].1.clone()
                } else {
                    self.span_of(&cond_range)
                };
                (self.trim(range.start..d), Some(cond), span)
            }
            None => (range, None, choice_span.clone()),
        };

        // A condition with a decimal point must be a well-formed weight.
        if let Some(cond) = condition.as_deref()
            && cond.contains('.')
            && cond.parse::<f64>().is_err()
        {
            return Err(self.err(cond_span.clone(), format!("invalid numeric condition: {cond}")));
        }

        if value_range.is_empty() {
            return Err(self.err(choice_span, "empty choice"));
        }

        // Multiplier prefix: integer text immediately followed by '*'.
        let (count, value_range) = self.multiplier(value_range);
        let node = self.value(value_range)?;
        let node = match count {
            Some(count) if count != 1 => GeneratorNode::Repeat {
                count,
                inner: Box::new(node),
            },
            _ => node,
        };

        Ok(Choice {
            node,
            condition,
            span: cond_span,
        })
    }

    /// Detect an `N*` prefix. Returns the multiplier and the remaining value
    /// range; a prefix that does not parse as an integer leaves the asterisk
    /// as literal text.
    fn multiplier(&self, range: Range<usize>) -> (Option<usize>, Range<usize>) {
        if range.len() < 3 {
            return (None, range);
        }
        let (Token::Text(prefix), _) = &self.tokens[range.start] else {
            return (None, range);
        };
        if !matches!(self.tokens[range.start + 1].0, Token::Star) {
            return (None, range);
        }
        match prefix.trim().parse::<usize>() {
            Ok(count) => {
                let rest = self.trim(range.start + 2..range.end);
                if rest.is_empty() {
                    (None, range)
                } else {
                    (Some(count), rest)
                }
            }
            Err(_) => (None, range),
        }
    }

    /// Parse a value: a fully parenthesized sub-statement or a literal leaf.
    fn value(&self, range: Range<usize>) -> TemplateResult<GeneratorNode> {
        if matches!(self.tokens[range.start].0, Token::LParen) {
            // Find the parenthesis that closes the opening one; the value is
            // a sub-statement only when that is the range's final token.
            let mut depth = 0;
            for i in range.clone() {
                match self.tokens[i].0 {
                    Token::LParen => depth += 1,
                    Token::RParen => {
                        depth -= 1;
                        if depth == 0 {
                            if i == range.end - 1 {
                                return self.statement(range.start + 1..i);
                            }
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }

        let literal = self.text_of(&range).trim();
        if literal.contains('.') {
            Ok(GeneratorNode::FileChoice(literal.to_string()))
        } else {
            Ok(GeneratorNode::Value(literal.to_string()))
        }
    }
}
