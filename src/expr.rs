//! Parsing of generator expressions into a kind name and raw arguments.

use crate::error::{Error, ErrorRepr};
use log::trace;
use peg::parser;

/// A parsed generator expression: the kind to look up and its arguments.
///
/// Arguments are kept as raw text. An argument wrapped in parentheses has its
/// outermost pair removed and everything inside left unparsed, so it can be
/// parsed again as an expression by whichever kind consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub kind: String,
    pub arguments: Vec<String>,
}

impl Invocation {
    fn shorthand(kind: &str, expression: &str) -> Self {
        Self {
            kind: kind.to_string(),
            arguments: vec![expression.to_string()],
        }
    }
}

parser! {
/// Expressions are short and parsed once per node, so the grammar favours
/// readability over speed.
pub(crate) grammar dsl() for str {
    /// `12*(expr)`
    pub rule repetition() -> (&'input str, &'input str)
        = n:$(['0'..='9']+) "*(" inner:$((!(")" ![_]) [_])+) ")" ![_] { (n, inner) }

    /// `1-10`, `-20--10`, `0.1-0.9`
    pub rule number_range()
        = "-"? ['0'..='9' | '.']+ "-" "-"? ['0'..='9' | '.']+ ![_]

    /// `A-Z`, `a-f`
    pub rule char_range()
        = letter() "-" letter() ![_]

    /// `"anything"`
    pub rule quoted()
        = "\"" (!("\"" ![_]) [_])+ "\"" ![_]

    /// Both bounds of a `lo-hi` range, unvalidated.
    pub rule range() -> (&'input str, &'input str)
        = lo:bound() "-" hi:bound() ![_] { (lo, hi) }

    pub rule invocation() -> Invocation
        = kind:kind() arguments:(":" a:segment() { a })* ![_] {
            Invocation { kind, arguments }
        }

    rule kind() -> String
        = s:segment() {? if s.is_empty() { Err("generator kind") } else { Ok(s) } }

    rule segment() -> String
        = parts:(group() / bare())* { parts.concat() }

    // outermost parentheses are dropped, nested ones kept verbatim
    rule group() -> &'input str
        = "(" inner:$(balanced()*) ")" { inner }

    rule balanced()
        = "(" balanced()* ")"
        / [^ '(' | ')']

    rule bare() -> &'input str
        = $([^ ':' | '(' | ')']+)

    rule letter() = ['a'..='z' | 'A'..='Z']

    rule bound() -> &'input str
        = $("-"? [^ '-']+)
}}

/// Parses a generator expression.
///
/// Shorthands are tried first, in this order: repetition (`3*(int:1-10)`),
/// numeric range (`1-10`), character range (`A-Z`) and quoted literal
/// (`"text"`). Anything else is split on the colons that are not inside
/// parentheses; the first segment is the kind and the rest are arguments.
///
/// Parsing does not consult the registry, so an unknown kind is only
/// reported when a [`crate::GeneratorNode`] is built from the result.
///
/// # Errors
/// Unbalanced parentheses, or an empty kind, are rejected as a malformed
/// expression.
pub fn parse(expression: &str) -> Result<Invocation, Error> {
    if let Ok((count, inner)) = dsl::repetition(expression) {
        trace!("rewriting {:?} as repeat", expression);
        return parse(&format!("repeat:{}:({})", count, inner));
    }

    if dsl::number_range(expression).is_ok() {
        return Ok(Invocation::shorthand("number", expression));
    }

    if dsl::char_range(expression).is_ok() {
        return Ok(Invocation::shorthand("char", expression));
    }

    if dsl::quoted(expression).is_ok() {
        return Ok(Invocation::shorthand("literal", expression));
    }

    dsl::invocation(expression)
        .map_err(|e| Error(ErrorRepr::Malformed(expression.to_string(), e)))
}

/// Returns `true` if `s` is a numeric range such as `5-10` or `-2.5--1`.
pub(crate) fn is_number_range(s: &str) -> bool {
    dsl::number_range(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn parsed(expression: &str) -> (String, Vec<String>) {
        let invocation = parse(expression).unwrap();
        (invocation.kind, invocation.arguments)
    }

    fn args(a: &[&str]) -> Vec<String> {
        a.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn simple_kinds() {
        assert_eq!(parsed("foobar"), ("foobar".into(), vec![]));
        assert_eq!(parsed("foobar:test"), ("foobar".into(), args(&["test"])));
        assert_eq!(
            parsed("foobar:test:two"),
            ("foobar".into(), args(&["test", "two"]))
        );
    }

    #[test]
    fn nested_arguments() {
        assert_eq!(
            parsed("foobar:(test:test)"),
            ("foobar".into(), args(&["test:test"]))
        );
        assert_eq!(
            parsed("foo:(a:b):(c:d)"),
            ("foo".into(), args(&["a:b", "c:d"]))
        );
        // only the outermost parentheses are removed
        assert_eq!(
            parsed("array:(string:(char:A-F)):(int:1-2)"),
            ("array".into(), args(&["string:(char:A-F)", "int:1-2"]))
        );
    }

    #[test]
    fn empty_segments_are_kept() {
        assert_eq!(parsed("int:"), ("int".into(), args(&[""])));
        assert_eq!(parsed("foo::bar"), ("foo".into(), args(&["", "bar"])));
    }

    #[test]
    fn repetition() {
        assert_eq!(parsed("3*(test)"), ("repeat".into(), args(&["3", "test"])));
        assert_eq!(
            parsed("3*(int:1-10)"),
            ("repeat".into(), args(&["3", "int:1-10"]))
        );
        assert_eq!(
            parsed("12*(string:(char:A-C))"),
            ("repeat".into(), args(&["12", "string:(char:A-C)"]))
        );
    }

    #[test]
    fn ranges() {
        assert_eq!(parsed("10-2000"), ("number".into(), args(&["10-2000"])));
        assert_eq!(parsed("-20--10"), ("number".into(), args(&["-20--10"])));
        assert_eq!(parsed("0.1-0.9"), ("number".into(), args(&["0.1-0.9"])));
        assert_eq!(parsed("F-M"), ("char".into(), args(&["F-M"])));
        assert_eq!(parsed("a-z"), ("char".into(), args(&["a-z"])));
        // not a shorthand: falls through to the general form
        assert_eq!(parsed("AB-C"), ("AB-C".into(), vec![]));
    }

    #[test]
    fn quoted_literal_wins_over_colons() {
        assert_eq!(
            parsed("\"a:(b\""),
            ("literal".into(), args(&["\"a:(b\""]))
        );
        assert_eq!(parsed("\"test\""), ("literal".into(), args(&["\"test\""])));
    }

    #[test]
    fn rejects_unbalanced() {
        for x in ["foo:(a:b", "foo:a)", "(", ")", "foo:((a)", "3*((a)"] {
            let e = parse(x).unwrap_err();
            assert_eq!(e.kind(), ErrorKind::MalformedExpression, "{}", x);
        }
    }

    #[test]
    fn rejects_empty_kind() {
        for x in ["", ":a", ":"] {
            assert_eq!(parse(x).unwrap_err().kind(), ErrorKind::MalformedExpression);
        }
    }

    #[test]
    fn range_bounds() {
        assert_eq!(dsl::range("5-10"), Ok(("5", "10")));
        assert_eq!(dsl::range("-20--10"), Ok(("-20", "-10")));
        assert_eq!(dsl::range("F-X"), Ok(("F", "X")));
        assert!(dsl::range("5").is_err());
        assert!(dsl::range("1-2-3").is_err());
    }
}
