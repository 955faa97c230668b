//! Fluent assertions against a captured value
//!
//! An [`Assertion`] wraps one [`Subject`] together with a negation flag and
//! a borrow of the owning test context. Every predicate funnels through
//! [`Assertion::check`], which increments the test's assertion counter
//! exactly once per evaluation (pass or fail) and, on failure, produces the
//! formatted message for the failure error.
//!
//! Message templates carry a polarity placeholder of the form
//! `{{positive|negative}}`; `check` selects the branch matching the current
//! negation state before the message is emitted. Predicates return
//! `Result<Assertion, TestError>` so chains compose with `?`:
//!
//! ```
//! # use vouch_core::test::{TestCtx, TestResult};
//! # fn demo(t: &TestCtx) -> TestResult<()> {
//! t.is(5).equal(5)?.size(5)?;
//! t.is("hello").not().blank()?;
//! # Ok(())
//! # }
//! ```

use crate::subject::{Subject, SubjectKind};
use crate::test::{TestCtx, TestError, TestResult};
use regex::Regex;
use std::sync::OnceLock;

/// Result of evaluating one assertion predicate: the assertion itself for
/// further chaining, or the assertion-failure error.
pub type Asserted<'t> = TestResult<Assertion<'t>>;

/// Polarity tokens shared by the message templates.
const NOT: &str = "{{not|}}";
const DOES_NOT_HAVE: &str = "{{does not have|has}}";
const DOES_NOT_CONTAIN: &str = "{{does not contain|contains}}";
const DOES_NOT_MATCH: &str = "{{does not match|matches}}";

/// An assertion chain over one captured value. Constructed via
/// [`TestCtx::is`], discarded when the chain ends.
pub struct Assertion<'t> {
    subject: Subject,
    negative: bool,
    test: &'t TestCtx,
}

impl<'t> Assertion<'t> {
    pub(crate) fn new(subject: Subject, test: &'t TestCtx) -> Self {
        Assertion {
            subject,
            negative: false,
            test,
        }
    }

    /// Negate the assertion. One-way: repeated calls leave the flag set
    /// rather than toggling it back.
    pub fn not(mut self) -> Self {
        self.negative = true;
        self
    }

    /// Evaluate one predicate result. Counts the assertion, applies the
    /// negation flag, and on failure resolves the polarity placeholder in
    /// `template` into the final message.
    fn check(self, outcome: bool, template: String) -> Asserted<'t> {
        self.test.count_assertion();

        let outcome = if self.negative { !outcome } else { outcome };

        if !outcome {
            return Err(TestError::AssertionFailure(resolve_polarity(
                &template,
                self.negative,
            )));
        }

        Ok(self)
    }

    /// Assert that the value is a boolean.
    pub fn boolean(self) -> Asserted<'t> {
        let template = format!("{} is {} a boolean", self.subject, NOT);
        let outcome = self.subject.kind() == SubjectKind::Bool;
        self.check(outcome, template)
    }

    /// Assert that the value is `true`.
    pub fn is_true(self) -> Asserted<'t> {
        let template = format!("{} is {} true", self.subject, NOT);
        let outcome = self.subject == Subject::Bool(true);
        self.check(outcome, template)
    }

    /// Assert that the value is `false`.
    pub fn is_false(self) -> Asserted<'t> {
        let template = format!("{} is {} false", self.subject, NOT);
        let outcome = self.subject == Subject::Bool(false);
        self.check(outcome, template)
    }

    /// Assert strict equality: same kind, same value.
    pub fn equal(self, value: impl Into<Subject>) -> Asserted<'t> {
        let value = value.into();
        let template = format!("{} is {} equal to {}", self.subject, NOT, value);
        let outcome = self.subject == value;
        self.check(outcome, template)
    }

    /// Assert loose equivalence, with cross-kind coercion
    /// (see [`Subject::loosely_equals`]).
    pub fn equivalent_to(self, value: impl Into<Subject>) -> Asserted<'t> {
        let value = value.into();
        let template = format!("{} is {} equivalent to {}", self.subject, NOT, value);
        let outcome = self.subject.loosely_equals(&value);
        self.check(outcome, template)
    }

    /// Assert the size of the value, dispatching per kind: text compares its
    /// character count, an integer compares its literal value, sequences and
    /// mappings compare their element count. Kinds with no notion of size
    /// record no assertion at all; the chain continues untouched.
    pub fn size(self, len: usize) -> Asserted<'t> {
        match self.subject.kind() {
            SubjectKind::Text => {
                let template = format!(
                    "{} {} a string length of {}",
                    self.subject, DOES_NOT_HAVE, len
                );
                let outcome = self.subject.len() == Some(len);
                self.check(outcome, template)
            }
            SubjectKind::Int => {
                let template =
                    format!("Integer {} {} a size of {}", self.subject, DOES_NOT_HAVE, len);
                let outcome = self.subject == Subject::Int(len as i64);
                self.check(outcome, template)
            }
            SubjectKind::Seq | SubjectKind::Map => {
                let template = format!("Array {} a size of {}", DOES_NOT_HAVE, len);
                let outcome = self.subject.len() == Some(len);
                self.check(outcome, template)
            }
            // No defined notion of size: deliberate pass-through.
            _ => Ok(self),
        }
    }

    /// Alias of [`Assertion::size`].
    pub fn length(self, len: usize) -> Asserted<'t> {
        self.size(len)
    }

    /// Assert that the value is blank (see [`Subject::is_blank`]).
    pub fn blank(self) -> Asserted<'t> {
        let template = format!("{} is {} empty", self.subject, NOT);
        let outcome = self.subject.is_blank();
        self.check(outcome, template)
    }

    /// Assert that the value is a sequence.
    pub fn a_sequence(self) -> Asserted<'t> {
        let template = format!("{} is {} an array", self.subject, NOT);
        let outcome = self.subject.kind() == SubjectKind::Seq;
        self.check(outcome, template)
    }

    /// Assert that the value can be iterated (a sequence or a mapping).
    pub fn traversable(self) -> Asserted<'t> {
        let template = format!("{} is {} traversable", self.subject, NOT);
        let kind = self.subject.kind();
        let outcome = kind == SubjectKind::Seq || kind == SubjectKind::Map;
        self.check(outcome, template)
    }

    /// Assert that the value is an object of the named type. Non-object
    /// values evaluate false.
    pub fn an_instance_of(self, type_name: &str) -> Asserted<'t> {
        let template = format!(
            "{} is {} an instance of \"{}\"",
            self.subject, NOT, type_name
        );
        let outcome = matches!(&self.subject, Subject::Object(name) if name == type_name);
        self.check(outcome, template)
    }

    /// Assert membership: text contains the needle as a substring, a
    /// sequence contains it as an element, a mapping contains it as a key.
    /// Other kinds record no assertion.
    pub fn contains(self, needle: impl Into<Subject>) -> Asserted<'t> {
        let needle = needle.into();
        let template = format!("{} {} {}", self.subject, DOES_NOT_CONTAIN, needle);

        let outcome = match (&self.subject, &needle) {
            (Subject::Text(haystack), Subject::Text(sub)) => haystack.contains(sub.as_str()),
            (Subject::Seq(items), _) => items.contains(&needle),
            (Subject::Map(entries), Subject::Text(key)) => entries.contains_key(key),
            (Subject::Text(_), _) | (Subject::Map(_), _) => false,
            _ => return Ok(self),
        };

        self.check(outcome, template)
    }

    /// Assert that the value matches a regular expression. Only text can
    /// match; an invalid pattern surfaces as a raised `PatternError`, not an
    /// assertion failure.
    pub fn matches(self, pattern: &str) -> Asserted<'t> {
        let regex = Regex::new(pattern)
            .map_err(|e| TestError::raise("PatternError", e.to_string()))?;

        let template = format!(
            "{} {} the regular expression \"{}\"",
            self.subject, DOES_NOT_MATCH, pattern
        );
        let outcome = matches!(&self.subject, Subject::Text(s) if regex.is_match(s));
        self.check(outcome, template)
    }
}

/// Resolve `{{positive|negative}}` placeholders against the negation state
/// and collapse any whitespace runs left by an empty branch.
fn resolve_polarity(template: &str, negative: bool) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let placeholder = PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{(?P<positive>[^{}|]*)\|(?P<negative>[^{}|]*)\}\}")
            .expect("polarity placeholder pattern is valid")
    });
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

    let branch = if negative { "$negative" } else { "$positive" };
    let resolved = placeholder.replace_all(template, branch);
    spaces.replace_all(resolved.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestCtx;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ctx() -> TestCtx {
        TestCtx::new("assertion tests")
    }

    fn failure_message(result: Asserted<'_>) -> String {
        match result {
            Err(TestError::AssertionFailure(msg)) => msg,
            Err(other) => panic!("expected an assertion failure, got {other:?}"),
            Ok(_) => panic!("expected the assertion to fail"),
        }
    }

    #[test]
    fn passing_assertion_counts_once() {
        let t = ctx();
        t.is(5).equal(5).unwrap();
        assert_eq!(t.assertion_count(), 1);
    }

    #[test]
    fn failing_assertion_counts_too() {
        let t = ctx();
        assert!(t.is(5).equal(6).is_err());
        assert_eq!(t.assertion_count(), 1);
    }

    #[test]
    fn chained_assertions_count_each_evaluation() {
        let t = ctx();
        t.is("abc").size(3).unwrap().contains("b").unwrap();
        assert_eq!(t.assertion_count(), 2);
    }

    #[test]
    fn equal_failure_message() {
        let t = ctx();
        assert_eq!(failure_message(t.is(5).equal(6)), "5 is not equal to 6");
    }

    #[test]
    fn negated_failure_message_drops_polarity_word() {
        let t = ctx();
        assert_eq!(failure_message(t.is(5).not().equal(5)), "5 is equal to 5");
    }

    #[test]
    fn array_size_failure_message() {
        let t = ctx();
        assert_eq!(
            failure_message(t.is(vec![1, 2, 3]).size(4)),
            "Array does not have a size of 4"
        );
    }

    #[test]
    fn string_size_counts_characters() {
        let t = ctx();
        t.is("héllo").size(5).unwrap();
        assert_eq!(
            failure_message(t.is("ab").size(3)),
            "\"ab\" does not have a string length of 3"
        );
    }

    #[test]
    fn integer_size_is_literal_equality() {
        let t = ctx();
        t.is(4).size(4).unwrap();
        assert_eq!(
            failure_message(t.is(4).size(5)),
            "Integer 4 does not have a size of 5"
        );
    }

    #[test]
    fn size_on_boolean_is_a_no_op() {
        let t = ctx();
        t.is(true).size(12).unwrap();
        assert_eq!(t.assertion_count(), 0);
    }

    #[test]
    fn not_is_one_way() {
        // Negation clamps: a second not() does not toggle back.
        let t = ctx();
        assert!(t.is(5).not().not().equal(5).is_err());
    }

    #[rstest]
    #[case(Subject::from(true), true)]
    #[case(Subject::from(false), true)]
    #[case(Subject::from(1), false)]
    #[case(Subject::from("true"), false)]
    fn boolean_predicate(#[case] subject: Subject, #[case] expected: bool) {
        let t = ctx();
        let result = Assertion::new(subject, &t).boolean();
        assert_eq!(result.is_ok(), expected);
    }

    #[test]
    fn true_and_false_predicates() {
        let t = ctx();
        t.is(true).is_true().unwrap();
        t.is(false).is_false().unwrap();
        assert_eq!(
            failure_message(t.is(false).is_true()),
            "FALSE is not true"
        );
    }

    #[test]
    fn equivalence_is_loose() {
        let t = ctx();
        t.is(1).equivalent_to(true).unwrap();
        t.is("5").equivalent_to(5).unwrap();
        assert!(t.is("5").equal(5).is_err());
    }

    #[test]
    fn blank_predicate() {
        let t = ctx();
        t.is("").blank().unwrap();
        t.is("text").not().blank().unwrap();
        assert_eq!(failure_message(t.is("text").blank()), "\"text\" is not empty");
    }

    #[test]
    fn sequence_and_traversable() {
        let t = ctx();
        t.is(vec![1]).a_sequence().unwrap();
        t.is(vec![1]).traversable().unwrap();
        assert!(t.is(5).a_sequence().is_err());
        assert_eq!(
            failure_message(t.is(5).traversable()),
            "5 is not traversable"
        );
    }

    #[test]
    fn instance_of_matches_type_name() {
        struct Widget;
        let t = ctx();
        let subject = Subject::object::<Widget>();
        Assertion::new(subject.clone(), &t)
            .an_instance_of("Widget")
            .unwrap();
        assert_eq!(
            failure_message(Assertion::new(subject, &t).an_instance_of("Gadget")),
            "Object of type \"Widget\" is not an instance of \"Gadget\""
        );
    }

    #[test]
    fn contains_dispatches_per_kind() {
        let t = ctx();
        t.is("haystack").contains("stack").unwrap();
        t.is(vec![1, 2, 3]).contains(2).unwrap();
        assert_eq!(
            failure_message(t.is(vec![1, 2, 3]).contains(9)),
            "Array does not contain 9"
        );
        // Unsupported kind: pass-through, no assertion recorded.
        let fresh = ctx();
        fresh.is(5).contains(5).unwrap();
        assert_eq!(fresh.assertion_count(), 0);
    }

    #[test]
    fn matches_uses_regex() {
        let t = ctx();
        t.is("vouch-0.1.0").matches(r"\d+\.\d+\.\d+").unwrap();
        assert_eq!(
            failure_message(t.is("abc").matches("^z")),
            "\"abc\" does not match the regular expression \"^z\""
        );
    }

    #[test]
    fn invalid_pattern_is_not_an_assertion_failure() {
        let t = ctx();
        match t.is("abc").matches("(") {
            Err(TestError::Raised { kind, .. }) => assert_eq!(kind, "PatternError"),
            Err(other) => panic!("expected a raised PatternError, got {other:?}"),
            Ok(_) => panic!("expected the pattern to be rejected"),
        }
    }

    #[test]
    fn polarity_resolution() {
        assert_eq!(
            resolve_polarity("5 is {{not|}} equal to 6", false),
            "5 is not equal to 6"
        );
        assert_eq!(
            resolve_polarity("5 is {{not|}} equal to 5", true),
            "5 is equal to 5"
        );
        assert_eq!(
            resolve_polarity("Array {{does not have|has}} a size of 4", true),
            "Array has a size of 4"
        );
    }
}
