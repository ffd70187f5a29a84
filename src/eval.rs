//! Evaluation of constant string expressions.
//!
//! The analyzed codebase writes module specifiers and decorator fields as
//! string literals, occasionally split across `+` concatenations. This
//! evaluator handles exactly that shape: single- or double-quoted string
//! literals, template strings without substitutions, and `+` chains of
//! the above. Anything else is an extraction error carrying the node's
//! source text and the containing file path.

use oxc_ast::ast::Expression;
use oxc_span::GetSpan;
use oxc_syntax::operator::BinaryOperator;

use crate::error::Error;

/// Source text of a node, trimmed and bounded for error messages.
pub fn node_text(expr: &Expression<'_>, source: &str) -> String {
    let span = expr.span();
    let start = span.start as usize;
    let end = (span.end as usize).min(source.len());
    let text = source.get(start..end).unwrap_or("").trim();
    if text.len() > 120 {
        format!("{}...", &text[..120])
    } else {
        text.to_string()
    }
}

/// Evaluate an expression known to be a constant string.
pub fn evaluate_string(expr: &Expression<'_>, source: &str, file: &str) -> Result<String, Error> {
    match expr {
        Expression::StringLiteral(lit) => Ok(lit.value.to_string()),
        Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => {
            let mut out = String::new();
            for quasi in &tpl.quasis {
                match &quasi.value.cooked {
                    Some(cooked) => out.push_str(cooked),
                    None => out.push_str(&quasi.value.raw),
                }
            }
            Ok(out)
        }
        Expression::BinaryExpression(bin) if bin.operator == BinaryOperator::Addition => {
            let left = evaluate_string(&bin.left, source, file)?;
            let right = evaluate_string(&bin.right, source, file)?;
            Ok(left + &right)
        }
        Expression::ParenthesizedExpression(paren) => {
            evaluate_string(&paren.expression, source, file)
        }
        _ => Err(Error::NotALiteral {
            text: node_text(expr, source),
            file: file.to_string(),
        }),
    }
}
