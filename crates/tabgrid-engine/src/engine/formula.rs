//! Formula resolution pipeline.
//!
//! A formula arrives as text (`=SUM(A1:B2)*2`) and leaves as a number. The
//! rewrite stages run in a fixed order: range SUM expansion first, so the
//! corner addresses inside a range token survive; then bare reference
//! substitution; percent literals; PRODUCT and comma-form SUM over already
//! reference-free operands; and finally arithmetic evaluation of the fully
//! numeric text. Reordering the stages corrupts references.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::addr::CellAddr;
use super::expr::{ExprError, evaluate_expr};
use super::grid::Grid;

/// Ranges larger than this are treated as unresolvable (they read as 0).
const MAX_RANGE_CELLS: usize = 1_000_000;

#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("arithmetic error: {0}")]
    Expr(#[from] ExprError),

    #[error("result is not finite")]
    NonFinite,
}

fn cell_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]+[0-9]+\b").expect("cell token regex must compile"))
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9.]+)%").expect("percent regex must compile"))
}

fn letters_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]+").expect("letters regex must compile"))
}

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("digits regex must compile"))
}

/// Resolve one formula against the grid. A leading `=` is optional.
///
/// Any failure (malformed expression, non-finite result) is returned as an
/// error; callers leave the cell's displayed text untouched in that case.
pub fn evaluate_formula(formula: &str, grid: &Grid) -> Result<f64, FormulaError> {
    let text = formula.strip_prefix('=').unwrap_or(formula);
    let text = expand_range_sums(text, grid);
    let text = substitute_refs(&text, grid);
    let text = expand_percents(&text);
    let text = expand_products(&text)?;
    let text = expand_list_sums(&text)?;

    let value = evaluate_expr(&text)?;
    if !value.is_finite() {
        return Err(FormulaError::NonFinite);
    }
    Ok(value)
}

/// Rewrites every `name(...)` call in the text, the argument list taken
/// up to the parenthesis that balances the call so parenthesized
/// operands survive intact. `apply` returning `None` leaves the call
/// as written; a call never closed is left as written too.
fn expand_calls(
    text: &str,
    name: &str,
    apply: &mut impl FnMut(&str) -> Option<String>,
) -> String {
    let pattern = format!("{name}(");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(&pattern) {
        let args_start = start + pattern.len();
        let Some(args_len) = balanced_args_len(&rest[args_start..]) else {
            break;
        };
        let args = &rest[args_start..args_start + args_len];
        out.push_str(&rest[..start]);
        match apply(args) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&rest[start..args_start + args_len + 1]),
        }
        rest = &rest[args_start + args_len + 1..];
    }
    out.push_str(rest);
    out
}

/// Length of the argument text up to the parenthesis closing the call.
fn balanced_args_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Splits an argument list at its top-level commas only; commas inside
/// nested parentheses belong to the operand around them.
fn split_operands(args: &str) -> Vec<&str> {
    let mut operands = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                operands.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    operands.push(&args[start..]);
    operands
}

/// Replace `SUM(A1:B2)`-style calls with the summed value. Arguments
/// without a `:` are left for [`expand_list_sums`] after substitution.
fn expand_range_sums(text: &str, grid: &Grid) -> String {
    expand_calls(text, "SUM", &mut |args| {
        args.contains(':').then(|| literal(range_sum(grid, args)))
    })
}

/// Sum the inclusive rectangle spanned by the two corner addresses of
/// `range`. Corner order does not matter: row and column bounds are
/// min/maxed independently. An unparseable corner or an oversized
/// rectangle reads as 0.
fn range_sum(grid: &Grid, range: &str) -> f64 {
    let Some((start, end)) = range.split_once(':') else {
        return 0.0;
    };
    let (Some(a), Some(b)) = (corner(start), corner(end)) else {
        return 0.0;
    };

    let (row_lo, row_hi) = (a.row.min(b.row), a.row.max(b.row));
    let (col_lo, col_hi) = (a.col.min(b.col), a.col.max(b.col));
    let cell_count = (row_hi - row_lo + 1).saturating_mul(col_hi - col_lo + 1);
    if cell_count > MAX_RANGE_CELLS {
        return 0.0;
    }

    let mut sum = 0.0;
    for row in row_lo..=row_hi {
        for col in col_lo..=col_hi {
            sum += grid.value(&CellAddr::new(col, row));
        }
    }
    sum
}

/// Extract a corner address leniently: the first run of uppercase letters
/// and the first run of digits, wherever they sit in the text.
fn corner(text: &str) -> Option<CellAddr> {
    let letters = letters_re().find(text)?.as_str();
    let digits = digits_re().find(text)?.as_str();
    let col = CellAddr::letters_to_col(letters)?;
    let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
    Some(CellAddr::new(col, row))
}

/// Replace each bare reference token with its grid value. Negative values
/// are parenthesized so the sign survives adjacent operators.
fn substitute_refs(text: &str, grid: &Grid) -> String {
    cell_token_re()
        .replace_all(text, |caps: &regex::Captures| {
            let value = CellAddr::from_str(&caps[0])
                .map(|addr| grid.value(&addr))
                .unwrap_or(0.0);
            if value < 0.0 {
                format!("({})", literal(value))
            } else {
                literal(value)
            }
        })
        .to_string()
}

fn expand_percents(text: &str) -> String {
    percent_re().replace_all(text, "${1}*0.01").to_string()
}

fn expand_products(text: &str) -> Result<String, FormulaError> {
    let mut failed: Option<ExprError> = None;
    let out = expand_calls(text, "PRODUCT", &mut |args| match evaluate_operands(args) {
        Ok(operands) => Some(literal(operands.into_iter().product())),
        Err(err) => {
            failed = Some(err);
            Some(String::new())
        }
    });
    match failed {
        Some(err) => Err(err.into()),
        None => Ok(out),
    }
}

fn expand_list_sums(text: &str) -> Result<String, FormulaError> {
    let mut failed: Option<ExprError> = None;
    let out = expand_calls(text, "SUM", &mut |args| match evaluate_operands(args) {
        Ok(operands) => Some(literal(operands.into_iter().sum())),
        Err(err) => {
            failed = Some(err);
            Some(String::new())
        }
    });
    match failed {
        Some(err) => Err(err.into()),
        None => Ok(out),
    }
}

/// Evaluate a comma-separated operand list. Each operand is a full
/// expression by this point, possibly parenthesized — reference
/// substitution wraps negative values in parentheses.
fn evaluate_operands(args: &str) -> Result<Vec<f64>, ExprError> {
    split_operands(args).into_iter().map(evaluate_expr).collect()
}

/// Format a value for re-insertion into expression text. Zero is
/// normalized so negative zero never prints as "-0".
fn literal(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x2() -> Grid {
        // A1=1 B1=2 / A2=3 B2=4
        let mut grid = Grid::new();
        grid.set(CellAddr::new(0, 0), 1.0);
        grid.set(CellAddr::new(1, 0), 2.0);
        grid.set(CellAddr::new(0, 1), 3.0);
        grid.set(CellAddr::new(1, 1), 4.0);
        grid
    }

    #[test]
    fn test_sum_range_2x2() {
        let grid = grid_2x2();
        assert_eq!(evaluate_formula("=SUM(A1:B2)", &grid).unwrap(), 10.0);
    }

    #[test]
    fn test_sum_range_any_corner_order() {
        let grid = grid_2x2();
        assert_eq!(evaluate_formula("=SUM(B2:A1)", &grid).unwrap(), 10.0);
        assert_eq!(evaluate_formula("=SUM(B1:A2)", &grid).unwrap(), 10.0);
    }

    #[test]
    fn test_negative_reference_parenthesized() {
        let mut grid = Grid::new();
        grid.set(CellAddr::new(0, 0), 5.0);
        grid.set(CellAddr::new(1, 0), -3.0);
        assert_eq!(evaluate_formula("=A1+B1", &grid).unwrap(), 2.0);
        assert_eq!(evaluate_formula("=A1-B1", &grid).unwrap(), 8.0);
        assert_eq!(evaluate_formula("=A1*B1", &grid).unwrap(), -15.0);
    }

    #[test]
    fn test_missing_reference_reads_zero() {
        let grid = Grid::new();
        assert_eq!(evaluate_formula("=Z9+1", &grid).unwrap(), 1.0);
    }

    #[test]
    fn test_equals_prefix_optional() {
        let grid = grid_2x2();
        assert_eq!(evaluate_formula("A1*2", &grid).unwrap(), 2.0);
    }

    #[test]
    fn test_percent_literal() {
        let grid = Grid::new();
        assert_eq!(evaluate_formula("=50%", &grid).unwrap(), 0.5);
        assert_eq!(evaluate_formula("=200*10%", &grid).unwrap(), 20.0);
    }

    #[test]
    fn test_percent_of_reference() {
        let mut grid = Grid::new();
        grid.set(CellAddr::new(0, 0), 40.0);
        // refs substitute before the percent rewrite sees the text
        assert_eq!(evaluate_formula("=A1%", &grid).unwrap(), 0.4);
    }

    #[test]
    fn test_product_expansion() {
        let grid = Grid::new();
        assert_eq!(evaluate_formula("=PRODUCT(2,3,4)", &grid).unwrap(), 24.0);
    }

    #[test]
    fn test_product_with_references() {
        let mut grid = Grid::new();
        grid.set(CellAddr::new(0, 0), 5.0);
        grid.set(CellAddr::new(1, 0), -3.0);
        assert_eq!(evaluate_formula("=PRODUCT(A1,B1)", &grid).unwrap(), -15.0);
    }

    #[test]
    fn test_comma_sum_with_negative_reference() {
        let mut grid = Grid::new();
        grid.set(CellAddr::new(0, 0), 5.0);
        grid.set(CellAddr::new(1, 0), -3.0);
        // B1 substitutes as (-3); the operand split must keep the
        // parentheses with their operand
        assert_eq!(evaluate_formula("=SUM(A1,B1)", &grid).unwrap(), 2.0);
    }

    #[test]
    fn test_parenthesized_operands_stay_whole() {
        let grid = Grid::new();
        assert_eq!(evaluate_formula("=PRODUCT((2+3),2)", &grid).unwrap(), 10.0);
        assert_eq!(evaluate_formula("=SUM((1+2)*2,4)", &grid).unwrap(), 10.0);
    }

    #[test]
    fn test_unterminated_call_fails_cleanly() {
        let grid = Grid::new();
        assert!(evaluate_formula("=PRODUCT(2,3", &grid).is_err());
    }

    #[test]
    fn test_comma_sum_expansion() {
        let grid = grid_2x2();
        assert_eq!(evaluate_formula("=SUM(1,2,3)", &grid).unwrap(), 6.0);
        assert_eq!(evaluate_formula("=SUM(A1,B1)+1", &grid).unwrap(), 4.0);
    }

    #[test]
    fn test_malformed_range_reads_zero() {
        let grid = grid_2x2();
        assert_eq!(evaluate_formula("=SUM(A:B2)+5", &grid).unwrap(), 5.0);
        assert_eq!(evaluate_formula("=SUM(A0:B2)+5", &grid).unwrap(), 5.0);
    }

    #[test]
    fn test_oversized_range_reads_zero() {
        let grid = grid_2x2();
        assert_eq!(evaluate_formula("=SUM(A1:ZZ9999999)", &grid).unwrap(), 0.0);
    }

    #[test]
    fn test_division_to_infinity_fails() {
        let grid = Grid::new();
        assert!(matches!(
            evaluate_formula("=1/0", &grid),
            Err(FormulaError::NonFinite)
        ));
    }

    #[test]
    fn test_malformed_expression_fails() {
        let grid = Grid::new();
        assert!(evaluate_formula("=2+", &grid).is_err());
        assert!(evaluate_formula("=what", &grid).is_err());
        assert!(evaluate_formula("=PRODUCT(2,)", &grid).is_err());
    }

    #[test]
    fn test_fractional_result_preserved() {
        let grid = Grid::new();
        assert_eq!(evaluate_formula("=7/2", &grid).unwrap(), 3.5);
    }

    #[test]
    fn test_combined_pipeline() {
        let grid = grid_2x2();
        // ranges, refs, percent, and arithmetic together
        assert_eq!(
            evaluate_formula("=SUM(A1:B2)*10%+A1", &grid).unwrap(),
            2.0
        );
    }
}
