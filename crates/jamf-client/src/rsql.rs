//! RSQL filter expressions for Jamf Pro list endpoints.
//!
//! ```rust
//! use jamfpro_client::RsqlBuilder;
//!
//! let filter = RsqlBuilder::new()
//!     .equal_to("general.name", "MacBook Pro")
//!     .and()
//!     .greater_than("hardware.totalRamMegabytes", "8192")
//!     .build();
//! assert_eq!(filter, r#"general.name=="MacBook Pro";hardware.totalRamMegabytes>"8192""#);
//! ```

use std::fmt;
use std::fmt::Write;

/// Fluent builder that appends RSQL tokens in call order.
///
/// Nothing is validated; the builder writes exactly what is asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RsqlBuilder {
    buf: String,
}

impl RsqlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn compare(mut self, field: &str, op: &str, value: &str) -> Self {
        let _ = write!(self.buf, "{field}{op}{}", quote(value));
        self
    }

    fn list(mut self, field: &str, op: &str, values: &[&str]) -> Self {
        let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
        let _ = write!(self.buf, "{field}{op}({})", quoted.join(","));
        self
    }

    fn pattern(mut self, field: &str, prefix: &str, value: &str, suffix: &str) -> Self {
        let _ = write!(
            self.buf,
            "{field}==\"{prefix}{}{suffix}\"",
            escape_literal_wildcard(value)
        );
        self
    }

    /// `field=="value"`. A `*` in `value` stays a wildcard.
    pub fn equal_to(self, field: &str, value: &str) -> Self {
        self.compare(field, "==", value)
    }

    /// `field!="value"`
    pub fn not_equal_to(self, field: &str, value: &str) -> Self {
        self.compare(field, "!=", value)
    }

    /// `field<"value"`
    pub fn less_than(self, field: &str, value: &str) -> Self {
        self.compare(field, "<", value)
    }

    /// `field<="value"`
    pub fn less_or_equal(self, field: &str, value: &str) -> Self {
        self.compare(field, "<=", value)
    }

    /// `field>"value"`
    pub fn greater_than(self, field: &str, value: &str) -> Self {
        self.compare(field, ">", value)
    }

    /// `field>="value"`
    pub fn greater_or_equal(self, field: &str, value: &str) -> Self {
        self.compare(field, ">=", value)
    }

    /// `field=in=("a","b")`
    pub fn in_list(self, field: &str, values: &[&str]) -> Self {
        self.list(field, "=in=", values)
    }

    /// `field=out=("a","b")`
    pub fn not_in(self, field: &str, values: &[&str]) -> Self {
        self.list(field, "=out=", values)
    }

    /// `field=="*value*"`, with `*` in `value` matched literally.
    pub fn contains(self, field: &str, value: &str) -> Self {
        self.pattern(field, "*", value, "*")
    }

    /// `field=="value*"`
    pub fn starts_with(self, field: &str, value: &str) -> Self {
        self.pattern(field, "", value, "*")
    }

    /// `field=="*value"`
    pub fn ends_with(self, field: &str, value: &str) -> Self {
        self.pattern(field, "*", value, "")
    }

    /// Logical AND (`;`).
    pub fn and(mut self) -> Self {
        self.buf.push(';');
        self
    }

    /// Logical OR (`,`).
    pub fn or(mut self) -> Self {
        self.buf.push(',');
        self
    }

    pub fn open_group(mut self) -> Self {
        self.buf.push('(');
        self
    }

    pub fn close_group(mut self) -> Self {
        self.buf.push(')');
        self
    }

    /// The expression built so far.
    pub fn build(&self) -> String {
        self.buf.clone()
    }

    /// True until the first token is appended.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl fmt::Display for RsqlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

/// Wrap `value` in double quotes, escaping embedded quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Escape `\`, `*` and `"` so a value matches literally inside a pattern.
pub fn escape_literal_wildcard(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '*' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Inverse of [`escape_literal_wildcard`].
pub fn unescape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_expression() {
        let filter = RsqlBuilder::new()
            .equal_to("general.name", "MacBook Pro")
            .and()
            .greater_than("hardware.totalRamMegabytes", "8192")
            .build();
        assert_eq!(
            filter,
            r#"general.name=="MacBook Pro";hardware.totalRamMegabytes>"8192""#
        );
    }

    #[test]
    fn test_comparison_operators() {
        let b = RsqlBuilder::new()
            .not_equal_to("a", "1")
            .or()
            .less_than("b", "2")
            .or()
            .less_or_equal("c", "3")
            .or()
            .greater_or_equal("d", "4");
        assert_eq!(b.build(), r#"a!="1",b<"2",c<="3",d>="4""#);
    }

    #[test]
    fn test_groups_and_lists() {
        let filter = RsqlBuilder::new()
            .open_group()
            .in_list("general.platform", &["Mac", "iOS"])
            .or()
            .not_in("id", &["1", "2"])
            .close_group()
            .and()
            .equal_to("general.site.name", "HQ*")
            .build();
        assert_eq!(
            filter,
            r#"(general.platform=in=("Mac","iOS"),id=out=("1","2"));general.site.name=="HQ*""#
        );
    }

    #[test]
    fn test_patterns_escape_literals() {
        assert_eq!(RsqlBuilder::new().contains("name", "a*b").build(), r#"name=="*a\*b*""#);
        assert_eq!(RsqlBuilder::new().starts_with("name", "Lab").build(), r#"name=="Lab*""#);
        assert_eq!(RsqlBuilder::new().ends_with("name", "01").build(), r#"name=="*01""#);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let filter = RsqlBuilder::new().equal_to("name", r#"say "hi""#).build();
        assert_eq!(filter, r#"name=="say \"hi\"""#);
    }

    #[test]
    fn test_escape_round_trip() {
        for value in ["a*b", r"back\slash", r#"q"uote"#, "plain", r"\*\", ""] {
            assert_eq!(unescape_literal(&escape_literal_wildcard(value)), value);
        }
    }

    #[test]
    fn test_is_empty_and_repeatable_build() {
        let fresh = RsqlBuilder::new();
        assert!(fresh.is_empty());

        let grouped = RsqlBuilder::new().open_group();
        assert!(!grouped.is_empty());
        assert_eq!(grouped.build(), grouped.build());
        assert_eq!(grouped.to_string(), "(");
    }
}
