//! Parse outcomes for speculative grammar rules.
//!
//! Every grammar rule returns a [`RuleResult`], which has three shapes:
//!
//! | Shape | Meaning |
//! |-------|---------|
//! | `Ok(Matched { value, consumed })` | The production applies and read exactly `consumed` tokens |
//! | `Ok(NoMatch)` | The production does not apply here; try an alternative |
//! | `Err(ParseError)` | A committed production failed; propagate to the entry point |
//!
//! Rules take their cursor by value, so a `NoMatch` needs no rewind: the caller
//! still holds the cursor it passed in.

use crate::ParseError;

/// Soft outcome of a grammar rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// The production matched after reading `consumed` tokens.
    Matched { value: T, consumed: usize },

    /// The production does not apply at this position.
    NoMatch,
}

/// The result of a grammar rule: a soft outcome, or a hard error in flight.
pub type RuleResult<T> = Result<ParseOutcome<T>, ParseError>;

impl<T> ParseOutcome<T> {
    // === Constructors ===

    #[inline]
    pub fn matched(value: T, consumed: usize) -> Self {
        Self::Matched { value, consumed }
    }

    #[inline]
    pub fn no_match() -> Self {
        Self::NoMatch
    }

    /// Pass a nested rule's outcome through unchanged, converting the value.
    ///
    /// Used when a rule fully delegates to a single sub-rule: the consumed
    /// count is carried over as-is.
    #[inline]
    pub fn forward<U: Into<T>>(inner: ParseOutcome<U>) -> Self {
        inner.map(Into::into)
    }

    // === Predicates ===

    #[inline]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    #[inline]
    pub fn is_no_match(&self) -> bool {
        !self.is_matched()
    }

    /// Number of tokens read, or `None` when the production did not match.
    #[inline]
    pub fn consumed(&self) -> Option<usize> {
        match self {
            Self::Matched { consumed, .. } => Some(*consumed),
            Self::NoMatch => None,
        }
    }

    // === Transformations ===

    /// Map the matched value, preserving the consumed count.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ParseOutcome<U> {
        match self {
            Self::Matched { value, consumed } => ParseOutcome::Matched {
                value: f(value),
                consumed,
            },
            Self::NoMatch => ParseOutcome::NoMatch,
        }
    }

    /// Convert into `Some((value, consumed))` or `None`.
    pub fn into_option(self) -> Option<(T, usize)> {
        match self {
            Self::Matched { value, consumed } => Some((value, consumed)),
            Self::NoMatch => None,
        }
    }

    /// Take the matched value.
    ///
    /// # Panics
    ///
    /// Panics on `NoMatch`. Callers must check [`Self::is_matched`] first;
    /// reading the value of a failed rule is a bug in the caller.
    #[track_caller]
    pub fn into_value(self) -> T {
        match self {
            Self::Matched { value, .. } => value,
            Self::NoMatch => panic!("called `ParseOutcome::into_value()` on a `NoMatch` outcome"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matched_reports_consumed() {
        let outcome = ParseOutcome::matched("x", 2);
        assert!(outcome.is_matched());
        assert_eq!(outcome.consumed(), Some(2));
        assert_eq!(outcome.into_value(), "x");
    }

    #[test]
    fn test_no_match_has_no_consumed_count() {
        let outcome: ParseOutcome<&str> = ParseOutcome::no_match();
        assert!(outcome.is_no_match());
        assert_eq!(outcome.consumed(), None);
        assert_eq!(outcome.into_option(), None);
    }

    #[test]
    fn test_forward_keeps_consumed_count() {
        let inner: ParseOutcome<u8> = ParseOutcome::matched(7, 3);
        let outer: ParseOutcome<u32> = ParseOutcome::forward(inner);
        assert_eq!(outer, ParseOutcome::matched(7u32, 3));

        let inner: ParseOutcome<u8> = ParseOutcome::no_match();
        let outer: ParseOutcome<u32> = ParseOutcome::forward(inner);
        assert_eq!(outer, ParseOutcome::NoMatch);
    }

    #[test]
    fn test_map_preserves_consumed() {
        let outcome = ParseOutcome::matched(2, 5).map(|n| n * 10);
        assert_eq!(outcome.into_option(), Some((20, 5)));
    }

    #[test]
    #[should_panic(expected = "NoMatch")]
    fn test_into_value_on_no_match_panics() {
        let outcome: ParseOutcome<()> = ParseOutcome::no_match();
        outcome.into_value();
    }
}
