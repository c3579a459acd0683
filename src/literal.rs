//! Allow-list parser for Python-style literal structures.
//!
//! Models asked for "a list of dictionaries" often answer with Python syntax:
//! single-quoted strings, `True`/`False`/`None`, tuples, trailing commas.
//! This parser accepts exactly those primitives and containers and produces a
//! `serde_json::Value`. Names, calls, operators and attribute access are rejected,
//! so nothing in a reply can ever be evaluated.

use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("{message} at byte {pos}")]
pub struct LiteralError {
  pub pos: usize,
  pub message: String,
}

/// Deepest container nesting accepted; matches serde_json's recursion limit.
pub const MAX_DEPTH: usize = 128;

/// Parse a complete literal; trailing non-whitespace is an error.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
  let mut p = Parser { src: input, pos: 0, depth: 0 };
  let value = p.value()?;
  p.skip_ws();
  if p.pos < p.src.len() {
    return Err(p.err("unexpected trailing input"));
  }
  Ok(value)
}

struct Parser<'a> {
  src: &'a str,
  pos: usize,
  depth: usize,
}

impl<'a> Parser<'a> {
  fn err(&self, message: impl Into<String>) -> LiteralError {
    LiteralError { pos: self.pos, message: message.into() }
  }

  fn peek(&self) -> Option<char> {
    self.src[self.pos..].chars().next()
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += c.len_utf8();
    Some(c)
  }

  /// Skips whitespace and `#` line comments.
  fn skip_ws(&mut self) {
    while let Some(c) = self.peek() {
      if c.is_whitespace() {
        self.bump();
      } else if c == '#' {
        while let Some(c) = self.bump() {
          if c == '\n' {
            break;
          }
        }
      } else {
        break;
      }
    }
  }

  fn expect(&mut self, want: char) -> Result<(), LiteralError> {
    self.skip_ws();
    match self.peek() {
      Some(c) if c == want => {
        self.bump();
        Ok(())
      }
      Some(c) => Err(self.err(format!("expected '{want}', found '{c}'"))),
      None => Err(self.err(format!("expected '{want}', found end of input"))),
    }
  }

  fn value(&mut self) -> Result<Value, LiteralError> {
    self.skip_ws();
    match self.peek() {
      Some('[') => self.nested(|p| p.sequence('[', ']')),
      Some('(') => self.nested(|p| p.sequence('(', ')')),
      Some('{') => self.nested(Self::mapping),
      Some('\'') | Some('"') => self.strings().map(Value::String),
      Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
      Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
      Some(c) => Err(self.err(format!("unexpected character '{c}'"))),
      None => Err(self.err("unexpected end of input")),
    }
  }

  /// Runs a container parser one level deeper, refusing input nested past `MAX_DEPTH`.
  fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Result<Value, LiteralError>) -> Result<Value, LiteralError> {
    if self.depth >= MAX_DEPTH {
      return Err(self.err("nesting too deep"));
    }
    self.depth += 1;
    let out = parse(self);
    self.depth -= 1;
    out
  }

  fn sequence(&mut self, open: char, close: char) -> Result<Value, LiteralError> {
    self.expect(open)?;
    let mut items = Vec::new();
    loop {
      self.skip_ws();
      if self.peek() == Some(close) {
        self.bump();
        return Ok(Value::Array(items));
      }
      items.push(self.value()?);
      self.skip_ws();
      match self.peek() {
        Some(',') => {
          self.bump();
        }
        Some(c) if c == close => {}
        Some(c) => return Err(self.err(format!("expected ',' or '{close}', found '{c}'"))),
        None => return Err(self.err(format!("unclosed '{open}'"))),
      }
    }
  }

  fn mapping(&mut self) -> Result<Value, LiteralError> {
    self.expect('{')?;
    let mut map = Map::new();
    loop {
      self.skip_ws();
      if self.peek() == Some('}') {
        self.bump();
        return Ok(Value::Object(map));
      }
      let key = match self.value()? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => return Err(self.err("mapping keys must be scalars")),
      };
      self.expect(':')?;
      let v = self.value()?;
      map.insert(key, v);
      self.skip_ws();
      match self.peek() {
        Some(',') => {
          self.bump();
        }
        Some('}') => {}
        Some(c) => return Err(self.err(format!("expected ',' or '}}', found '{c}'"))),
        None => return Err(self.err("unclosed '{'")),
      }
    }
  }

  /// One string literal, plus any adjacent literals (implicit concatenation).
  fn strings(&mut self) -> Result<String, LiteralError> {
    let mut out = self.string()?;
    loop {
      let save = self.pos;
      self.skip_ws();
      match self.peek() {
        Some('\'') | Some('"') => out.push_str(&self.string()?),
        _ => {
          self.pos = save;
          return Ok(out);
        }
      }
    }
  }

  fn string(&mut self) -> Result<String, LiteralError> {
    let quote = match self.bump() {
      Some(q @ ('\'' | '"')) => q,
      _ => return Err(self.err("expected string")),
    };
    if self.src[self.pos..].starts_with(&format!("{quote}{quote}")) {
      return Err(self.err("triple-quoted strings are not supported"));
    }
    let mut out = String::new();
    loop {
      match self.bump() {
        None | Some('\n') => return Err(self.err("unterminated string")),
        Some(c) if c == quote => return Ok(out),
        Some('\\') => match self.bump() {
          Some('n') => out.push('\n'),
          Some('t') => out.push('\t'),
          Some('r') => out.push('\r'),
          Some('0') => out.push('\0'),
          Some('\\') => out.push('\\'),
          Some('\'') => out.push('\''),
          Some('"') => out.push('"'),
          Some('\n') => {}
          Some('u') => out.push(self.unicode_escape()?),
          Some(c) => {
            // Unknown escapes keep the backslash.
            out.push('\\');
            out.push(c);
          }
          None => return Err(self.err("unterminated escape")),
        },
        Some(c) => out.push(c),
      }
    }
  }

  fn unicode_escape(&mut self) -> Result<char, LiteralError> {
    let end = self.pos + 4;
    let hex = self.src.get(self.pos..end).ok_or_else(|| self.err("short \\u escape"))?;
    let code = u32::from_str_radix(hex, 16).map_err(|_| self.err("invalid \\u escape"))?;
    self.pos = end;
    char::from_u32(code).ok_or_else(|| self.err("invalid code point"))
  }

  fn number(&mut self) -> Result<Value, LiteralError> {
    let start = self.pos;
    if matches!(self.peek(), Some('-') | Some('+')) {
      self.bump();
    }
    let mut is_float = false;
    while let Some(c) = self.peek() {
      match c {
        '0'..='9' | '_' => {}
        '.' => is_float = true,
        'e' | 'E' => {
          is_float = true;
          self.bump();
          if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
          }
          continue;
        }
        _ => break,
      }
      self.bump();
    }
    let text: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();
    let text = text.trim_start_matches('+');
    let bad = || LiteralError { pos: start, message: format!("invalid number '{text}'") };
    if !is_float {
      if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Number(i.into()));
      }
    }
    let f = text.parse::<f64>().map_err(|_| bad())?;
    Number::from_f64(f).map(Value::Number).ok_or_else(bad)
  }

  fn keyword(&mut self) -> Result<Value, LiteralError> {
    let start = self.pos;
    while let Some(c) = self.peek() {
      if c.is_alphanumeric() || c == '_' {
        self.bump();
      } else {
        break;
      }
    }
    match &self.src[start..self.pos] {
      "True" | "true" => Ok(Value::Bool(true)),
      "False" | "false" => Ok(Value::Bool(false)),
      "None" | "null" => Ok(Value::Null),
      other => Err(LiteralError { pos: start, message: format!("name '{other}' is not a literal") }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn parses_python_list_of_dicts() {
    let src = r#"[
      {'content_id': 'PROG101', 'explanation': "It's the basics", 'ok': True, 'n': None},
      {'content_id': 'AI101', 'explanation': 'Next' ' step', 'score': 0.75,},  # trailing comma
    ]"#;
    let v = parse_literal(src).unwrap();
    assert_eq!(
      v,
      json!([
        {"content_id": "PROG101", "explanation": "It's the basics", "ok": true, "n": null},
        {"content_id": "AI101", "explanation": "Next step", "score": 0.75}
      ])
    );
  }

  #[test]
  fn tuples_become_arrays_and_scalar_keys_become_strings() {
    let v = parse_literal("{1: ('a', -2), 'x': 1e3}").unwrap();
    assert_eq!(v, json!({"1": ["a", -2], "x": 1000.0}));
  }

  #[test]
  fn escapes_are_decoded() {
    let v = parse_literal(r#"'line\nnext \'q\' é'"#).unwrap();
    assert_eq!(v, json!("line\nnext 'q' é"));
  }

  #[test]
  fn rejects_executable_input() {
    assert!(parse_literal("__import__('os').system('ls')").is_err());
    assert!(parse_literal("[1, 2] + [3]").is_err());
    assert!(parse_literal("{'a': open('x')}").is_err());
    assert!(parse_literal("[x for x in range(3)]").is_err());
  }

  #[test]
  fn deep_nesting_is_an_error_not_a_crash() {
    let e = parse_literal(&"[".repeat(10_000)).unwrap_err();
    assert_eq!(e.message, "nesting too deep");
    let tuples = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
    assert!(parse_literal(&tuples).is_err());

    let at_limit = format!("{}1{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
    assert!(parse_literal(&at_limit).is_ok());
    let past_limit = format!("{}1{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
    assert!(parse_literal(&past_limit).is_err());
  }

  #[test]
  fn reports_unclosed_containers() {
    let e = parse_literal("[{'a': 1}").unwrap_err();
    assert!(e.message.contains("unclosed") || e.message.contains("end of input"), "{e}");
  }
}
