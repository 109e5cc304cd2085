//! # Quantity Parser
//!
//! This module extracts leading numeric quantities from free-text ingredient
//! lines and re-renders scaled quantities as kitchen fractions.
//!
//! ## Features
//!
//! - Integers, decimals and fractions ("2", "1.5", "3/4")
//! - Unicode vulgar fractions ("½", "⅔", "⅞")
//! - Ranges, reduced to their mean ("1-2" → 1.5)
//! - Multi-token quantities ("1 1/2 cups" → 1.5)
//! - Fraction rendering with a bounded denominator ("0.333" → "1/3")
//!
//! ## Usage
//!
//! ```rust
//! use nutrition_advisor::quantity_parser::scale_lines;
//!
//! let lines = vec!["2 cups rice".to_string(), "salt to taste".to_string()];
//! let per_serving = scale_lines(&lines, 0.25);
//!
//! assert_eq!(per_serving, vec!["1/2 cups rice", "salt to taste"]);
//! ```

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;
use std::collections::HashMap;

/// Largest denominator used when rendering quantities
pub const MAX_DENOMINATOR: u32 = 16;

lazy_static! {
    /// Unicode fraction glyphs and their ASCII equivalents
    static ref UNICODE_FRACTIONS: HashMap<&'static str, &'static str> = HashMap::from([
        ("¼", "1/4"),
        ("½", "1/2"),
        ("¾", "3/4"),
        ("⅐", "1/7"),
        ("⅑", "1/9"),
        ("⅒", "1/10"),
        ("⅓", "1/3"),
        ("⅔", "2/3"),
        ("⅕", "1/5"),
        ("⅖", "2/5"),
        ("⅗", "3/5"),
        ("⅘", "4/5"),
        ("⅙", "1/6"),
        ("⅚", "5/6"),
        ("⅛", "1/8"),
        ("⅜", "3/8"),
        ("⅝", "5/8"),
        ("⅞", "7/8"),
    ]);

    /// Exact rational literal: "3", "-2", "1.5", ".5", "2.", "1e3", "3/4"
    static ref RATIONAL: Regex = Regex::new(
        r"^(?P<sign>[+-]?)(?:(?P<num>\d+)/(?P<den>\d+)|(?P<dec>(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?))$"
    )
    .expect("Rational pattern should be valid");
}

/// Parse one exact rational number, or `None` if the text is not one
fn parse_rational(text: &str) -> Option<f64> {
    let captures = RATIONAL.captures(text.trim())?;
    let negative = &captures["sign"] == "-";

    let value = if let Some(decimal) = captures.name("dec") {
        decimal.as_str().parse::<f64>().ok()?
    } else {
        let numerator: f64 = captures["num"].parse().ok()?;
        let denominator: f64 = captures["den"].parse().ok()?;
        if denominator == 0.0 {
            return None;
        }
        numerator / denominator
    };

    Some(if negative { -value } else { value })
}

/// Parse a single whitespace-delimited token as a quantity
///
/// Returns `None` for anything that is not a quantity, which is the common
/// case for most words of an ingredient line.
///
/// # Examples
///
/// ```rust
/// use nutrition_advisor::quantity_parser::parse_quantity_token;
///
/// assert_eq!(parse_quantity_token("3/4"), Some(0.75));
/// assert_eq!(parse_quantity_token("½"), Some(0.5));
/// assert_eq!(parse_quantity_token("1-2"), Some(1.5));
/// assert_eq!(parse_quantity_token("cups"), None);
/// ```
pub fn parse_quantity_token(token: &str) -> Option<f64> {
    let token = token.trim();
    let token = UNICODE_FRACTIONS.get(token).copied().unwrap_or(token);

    if token.find('-').is_some_and(|pos| pos > 0) {
        let parts: Vec<&str> = token.split('-').collect();
        if let [low, high] = parts.as_slice() {
            if let (Some(low), Some(high)) = (parse_rational(low), parse_rational(high)) {
                return Some((low + high) / 2.0);
            }
        }
    }

    parse_rational(token)
}

/// Split a line into its leading quantity and the remaining text
///
/// Consecutive leading quantity tokens are summed, so "1 1/2 cups flour"
/// yields `(Some(1.5), "cups flour")`. A line without a leading quantity is
/// returned unchanged.
pub fn split_quantity_from_line(line: &str) -> (Option<f64>, String) {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let mut quantity = 0.0;
    let mut consumed = 0;
    for token in &tokens {
        match parse_quantity_token(token) {
            Some(value) => {
                quantity += value;
                consumed += 1;
            }
            None => break,
        }
    }

    if consumed == 0 {
        return (None, line.to_string());
    }

    (Some(quantity), tokens[consumed..].join(" "))
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Render `value` as the closest fraction whose denominator is at most
/// `max_denominator`
///
/// Whole numbers render without a denominator ("2"), everything else as
/// an improper fraction ("3/2").
pub fn format_as_fraction(value: f64, max_denominator: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let mut best_numerator = value.round();
    let mut best_denominator = 1.0;
    let mut best_error = (value - best_numerator).abs();

    for denominator in 2..=max_denominator.max(1) {
        let denominator = f64::from(denominator);
        let numerator = (value * denominator).round();
        let error = (value - numerator / denominator).abs();
        if error < best_error {
            best_numerator = numerator;
            best_denominator = denominator;
            best_error = error;
        }
    }

    let negative = best_numerator < 0.0;
    let numerator = best_numerator.abs() as u64;
    let denominator = best_denominator as u64;
    let divisor = gcd(numerator, denominator).max(1);
    let (numerator, denominator) = (numerator / divisor, denominator / divisor);

    let sign = if negative && numerator != 0 { "-" } else { "" };
    if denominator == 1 {
        format!("{sign}{numerator}")
    } else {
        format!("{sign}{numerator}/{denominator}")
    }
}

/// Multiply the leading quantity of every line by `factor`
///
/// Lines without a detected quantity pass through verbatim.
pub fn scale_lines(lines: &[String], factor: f64) -> Vec<String> {
    lines
        .iter()
        .map(|line| match split_quantity_from_line(line) {
            (Some(quantity), rest) => {
                let scaled = format_as_fraction(quantity * factor, MAX_DENOMINATOR);
                trace!("Scaled '{}' by {:.3} -> {} {}", line, factor, scaled, rest);
                format!("{scaled} {rest}").trim().to_string()
            }
            (None, _) => line.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_and_decimal() {
        assert_eq!(parse_quantity_token("2"), Some(2.0));
        assert_eq!(parse_quantity_token("1.5"), Some(1.5));
        assert_eq!(parse_quantity_token(".5"), Some(0.5));
        assert_eq!(parse_quantity_token("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_quantity_token("1/2"), Some(0.5));
        assert_eq!(parse_quantity_token("-1/4"), Some(-0.25));
        assert_eq!(parse_quantity_token("1/0"), None);
    }

    #[test]
    fn test_parse_unicode_fraction() {
        assert_eq!(parse_quantity_token("¾"), Some(0.75));
        assert_eq!(parse_quantity_token("⅛"), Some(0.125));
        // Only whole-token glyphs are substituted
        assert_eq!(parse_quantity_token("1½"), None);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_quantity_token("1-2"), Some(1.5));
        assert_eq!(parse_quantity_token("1/2-1"), Some(0.75));
        assert_eq!(parse_quantity_token("1-2-3"), None);
        assert_eq!(parse_quantity_token("2-"), None);
        assert_eq!(parse_quantity_token("-1-2"), None);
    }

    #[test]
    fn test_parse_non_quantity() {
        assert_eq!(parse_quantity_token("cups"), None);
        assert_eq!(parse_quantity_token("low-fat"), None);
        assert_eq!(parse_quantity_token(""), None);
        assert_eq!(parse_quantity_token("1/2cup"), None);
    }

    #[test]
    fn test_split_multi_token_quantity() {
        let (qty, rest) = split_quantity_from_line("1 1/2 cups flour");
        assert_eq!(qty, Some(1.5));
        assert_eq!(rest, "cups flour");
    }

    #[test]
    fn test_split_stops_at_first_word() {
        let (qty, rest) = split_quantity_from_line("2 eggs, 3 whites");
        assert_eq!(qty, Some(2.0));
        assert_eq!(rest, "eggs, 3 whites");
    }

    #[test]
    fn test_split_without_quantity() {
        let (qty, rest) = split_quantity_from_line("salt  to taste");
        assert_eq!(qty, None);
        assert_eq!(rest, "salt  to taste");
    }

    #[test]
    fn test_format_as_fraction() {
        assert_eq!(format_as_fraction(2.0, MAX_DENOMINATOR), "2");
        assert_eq!(format_as_fraction(0.5, MAX_DENOMINATOR), "1/2");
        assert_eq!(format_as_fraction(1.5, MAX_DENOMINATOR), "3/2");
        assert_eq!(format_as_fraction(1.0 / 3.0, MAX_DENOMINATOR), "1/3");
        assert_eq!(format_as_fraction(0.3333, MAX_DENOMINATOR), "1/3");
        assert_eq!(format_as_fraction(-0.25, MAX_DENOMINATOR), "-1/4");
        assert_eq!(format_as_fraction(0.01, MAX_DENOMINATOR), "0");
    }

    #[test]
    fn test_scale_lines() {
        let lines = vec![
            "2 cups rice".to_string(),
            "1 1/2 lb chicken breast".to_string(),
            "pepper".to_string(),
        ];
        let scaled = scale_lines(&lines, 0.5);
        assert_eq!(scaled, vec!["1 cups rice", "3/4 lb chicken breast", "pepper"]);
    }

    #[test]
    fn test_scale_quantity_only_line() {
        let lines = vec!["4".to_string()];
        assert_eq!(scale_lines(&lines, 0.25), vec!["1"]);
    }
}
