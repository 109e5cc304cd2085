//! # Ingredient Cell Parsing
//!
//! The recipe dataset stores ingredient lists in loosely structured cells:
//! a Python-style list of strings (`['2 cups rice', 'salt']`), a list of
//! dictionaries carrying a `text` key (`[{'text': '2 cups rice'}]`), JSON
//! versions of either, or plain comma separated text. This module turns all
//! of them into a plain `Vec<String>`.

use log::trace;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// One entry of a structured ingredient list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IngredientEntry {
    Text(String),
    Structured { text: String },
    Other(Value),
}

impl IngredientEntry {
    fn into_text(self) -> String {
        match self {
            IngredientEntry::Text(text) | IngredientEntry::Structured { text } => text,
            IngredientEntry::Other(Value::String(text)) => text,
            IngredientEntry::Other(value) => value.to_string(),
        }
    }
}

/// Normalized ingredient tokens: lowercase, trimmed, no empties
pub fn parse_ingredient_tokens(cell: Option<&str>) -> Vec<String> {
    parse_cell(cell)
        .into_iter()
        .map(|text| text.trim().to_lowercase())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Display lines: trimmed with original casing, no empties
pub fn parse_ingredient_lines(cell: Option<&str>) -> Vec<String> {
    parse_cell(cell)
        .into_iter()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

fn parse_cell(cell: Option<&str>) -> Vec<String> {
    let Some(cell) = cell.map(str::trim).filter(|cell| !cell.is_empty()) else {
        return Vec::new();
    };

    if let Some(entries) = parse_structured(cell) {
        return entries.into_iter().map(IngredientEntry::into_text).collect();
    }

    trace!("Falling back to comma split for cell '{}'", cell);
    cell.split(',').map(str::to_string).collect()
}

fn parse_structured(cell: &str) -> Option<Vec<IngredientEntry>> {
    let value = serde_json::from_str::<Value>(cell)
        .ok()
        .or_else(|| LiteralParser::new(cell).parse_document())?;

    match value {
        Value::Array(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// Nesting limit for literal cells, matching serde_json's recursion limit
const MAX_NESTING_DEPTH: usize = 128;

/// Reader for the subset of Python literal syntax found in the dataset:
/// lists, tuples, dicts, quoted strings, numbers, `True`, `False`, `None`.
struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl LiteralParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    /// Parse one complete literal; trailing content makes the whole cell invalid
    fn parse_document(mut self) -> Option<Value> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        (self.pos == self.chars.len()).then_some(value)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        self.skip_whitespace();
        (self.next()? == expected).then_some(())
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.peek()? {
            '[' => self.nested(|parser| parser.parse_sequence('[', ']')),
            '(' => self.nested(|parser| parser.parse_sequence('(', ')')),
            '{' => self.nested(Self::parse_dict),
            '\'' | '"' => self.parse_string().map(Value::String),
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.parse_number(),
            _ => self.parse_keyword(),
        }
    }

    /// Run a container parser one level deeper, giving up past the nesting limit
    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Option<Value>) -> Option<Value> {
        if self.depth >= MAX_NESTING_DEPTH {
            trace!("Literal nesting deeper than {} levels", MAX_NESTING_DEPTH);
            return None;
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Option<Value> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek()? == close {
                self.pos += 1;
                return Some(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.next()? {
                ',' => continue,
                c if c == close => return Some(Value::Array(items)),
                _ => return None,
            }
        }
    }

    fn parse_dict(&mut self) -> Option<Value> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.peek()? == '}' {
                self.pos += 1;
                return Some(Value::Object(map));
            }
            let key = match self.parse_value()? {
                Value::String(key) => key,
                other => other.to_string(),
            };
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.next()? {
                ',' => continue,
                '}' => return Some(Value::Object(map)),
                _ => return None,
            }
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let quote = self.next()?;
        let mut text = String::new();
        loop {
            match self.next()? {
                c if c == quote => return Some(text),
                '\\' => match self.next()? {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    'r' => text.push('\r'),
                    'x' => text.push(self.parse_hex_escape(2)?),
                    'u' => text.push(self.parse_hex_escape(4)?),
                    'U' => text.push(self.parse_hex_escape(8)?),
                    '\n' => {}
                    c @ ('\\' | '\'' | '"') => text.push(c),
                    other => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                c => text.push(c),
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Option<char> {
        let end = self.pos.checked_add(digits)?;
        let hex: String = self.chars.get(self.pos..end)?.iter().collect();
        self.pos = end;
        char::from_u32(u32::from_str_radix(&hex, 16).ok()?)
    }

    fn parse_number(&mut self) -> Option<Value> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'))
        {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();

        if let Ok(integer) = raw.parse::<i64>() {
            return Some(Value::Number(integer.into()));
        }
        let float = raw.parse::<f64>().ok()?;
        Number::from_f64(float).map(Value::Number)
    }

    fn parse_keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            "None" => Some(Value::Null),
            _ => None,
        }
    }
}
