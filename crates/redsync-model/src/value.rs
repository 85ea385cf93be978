//! Typed relational cell values, used both for scanned rows and bind parameters.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render as a MySQL literal with string escaping applied.
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(text) => quote_string(text),
            Self::Bytes(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2 + 3);
                out.push_str("X'");
                for byte in bytes {
                    let _ = write!(out, "{byte:02X}");
                }
                out.push('\'');
                out
            }
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\u{1a}' => out.push_str("\\Z"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_escaped() {
        assert_eq!(SqlValue::Null.to_literal(), "NULL");
        assert_eq!(SqlValue::Int(-4).to_literal(), "-4");
        assert_eq!(
            SqlValue::from("O'Brien \\ co").to_literal(),
            r"'O\'Brien \\ co'"
        );
        assert_eq!(SqlValue::from("a\nb").to_literal(), r"'a\nb'");
        assert_eq!(SqlValue::Bytes(vec![0x0a, 0xff]).to_literal(), "X'0AFF'");
    }
}
