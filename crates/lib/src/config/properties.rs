//! Reader for Java-style `.properties` files.
//!
//! Follows the `java.util.Properties` line format: `=`, `:` or whitespace
//! separates key and value, a trailing odd `\` continues the logical line and
//! backslash escapes (including `\uXXXX`) are decoded in keys and values.

use std::collections::BTreeMap;

/// Parsed key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(BTreeMap<String, String>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: malformed \\uXXXX escape in {content:?}")]
pub struct PropertiesError {
  pub line: usize,
  pub content: String,
}

impl Properties {
  /// Parse the file content. `#` and `!` start comments. Later keys win.
  ///
  /// A key without separator gets an empty value. The only malformed input is
  /// an invalid unicode escape.
  pub fn parse(content: &str) -> Result<Self, PropertiesError> {
    let mut map = BTreeMap::new();
    let mut lines = content.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
      let first = raw.trim_start();
      if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
        continue;
      }

      let mut logical = first.to_string();
      while ends_with_continuation(&logical) {
        logical.pop();
        match lines.next() {
          Some((_, next)) => logical.push_str(next.trim_start()),
          None => break,
        }
      }

      let (key, value) = split_entry(&logical);
      let malformed = || PropertiesError {
        line: idx + 1,
        content: raw.to_string(),
      };
      let key = unescape(key).ok_or_else(malformed)?;
      let value = unescape(value).ok_or_else(malformed)?;
      map.insert(key, value);
    }

    Ok(Self(map))
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  /// Comma-separated list value. Empty entries are dropped.
  pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
    self.get(key).map(|v| {
      v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
    })
  }

  pub fn insert(&mut self, key: &str, value: &str) {
    self.0.insert(key.to_string(), value.to_string());
  }
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
  line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace.
///
/// Whitespace around the separator is skipped; a whitespace separator may be
/// followed by one `=` or `:`.
fn split_entry(line: &str) -> (&str, &str) {
  let mut escaped = false;
  let mut key_end = line.len();
  for (i, c) in line.char_indices() {
    if escaped {
      escaped = false;
    } else if c == '\\' {
      escaped = true;
    } else if c == '=' || c == ':' || c.is_whitespace() {
      key_end = i;
      break;
    }
  }

  let key = &line[..key_end];
  let mut rest = line[key_end..].trim_start();
  if let Some(stripped) = rest.strip_prefix(['=', ':']) {
    rest = stripped.trim_start();
  }
  (key, rest)
}

/// Decode backslash escapes. `None` on a malformed `\u` escape.
fn unescape(s: &str) -> Option<String> {
  let mut out = String::with_capacity(s.len());
  let mut chars = s.chars();

  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('t') => out.push('\t'),
      Some('n') => out.push('\n'),
      Some('r') => out.push('\r'),
      Some('f') => out.push('\u{c}'),
      Some('u') => {
        let hex: String = chars.by_ref().take(4).collect();
        if hex.len() != 4 {
          return None;
        }
        let code = u32::from_str_radix(&hex, 16).ok()?;
        out.push(char::from_u32(code)?);
      }
      Some(other) => out.push(other),
      None => {}
    }
  }

  Some(out)
}
