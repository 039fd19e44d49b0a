//! The universal properties from spec §8, each checked against a representative
//! rule rather than proved generically.

use stringozzi::prelude::*;

#[test]
fn failed_test_leaves_context_unchanged() {
    // Property 1.
    let r = Rule::is_str("XYZ");
    let mut ctx = Context::from_str("ABC");
    assert!(!r.check(&mut ctx));
    assert_eq!(ctx.position(), 0);
    assert_eq!(ctx.matches().count_keys(), 0);
}

#[test]
fn search_equals_until_then_rule() {
    // Property 2.
    let needle = Rule::is_str("needle");
    let combined = needle.until().then(&needle);
    let input = b"hay hay needle hay";
    assert_eq!(
        driver::search(&needle, input, Flags::NONE),
        driver::test(&combined, input, Flags::NONE),
    );
}

#[test]
fn double_negation_matches_plain_rule_without_captures() {
    // Property 3.
    let r = Rule::is('a');
    let doubled = r.not().not();
    assert_eq!(
        driver::test(&r, b"abc", Flags::NONE),
        driver::test(&doubled, b"abc", Flags::NONE),
    );
    assert_eq!(
        driver::test(&r, b"xyz", Flags::NONE),
        driver::test(&doubled, b"xyz", Flags::NONE),
    );
}

#[test]
fn look_ahead_never_advances_cursor() {
    // Property 4.
    let r = Rule::is_str("abc").look_ahead();
    let mut ctx = Context::from_str("abc");
    assert!(r.check(&mut ctx));
    assert_eq!(ctx.position(), 0);
}

#[test]
fn ordered_choice_against_never_equals_plain_rule() {
    // Property 5: OrderedChoice(R, Never) == R, where Never = Not(Any).
    let r = Rule::is_str("abc");
    let never = Rule::any().not();
    let choice = r.or(&never);
    for input in ["abc", "xyz", ""] {
        assert_eq!(
            driver::test(&r, input.as_bytes(), Flags::NONE),
            driver::test(&choice, input.as_bytes(), Flags::NONE),
        );
    }
}

#[test]
fn repeat_exact_n_requires_exactly_n_successes() {
    // Property 6.
    let digit = Rule::between('0', '9');
    let exactly_three = digit.repeat(3, 3);
    assert!(driver::test(&exactly_three, b"123", Flags::NONE));
    assert!(!driver::test(&exactly_three, b"12", Flags::NONE));
    // "1234" still matches since repeat doesn't require End; only the first 3
    // digits are required to succeed from the start.
    assert!(driver::test(&exactly_three, b"1234", Flags::NONE));
}

#[test]
fn successful_primitive_emits_exactly_one_unnamed_span() {
    // Property 7.
    let r = Rule::is_str("abc");
    let mut ctx = Context::from_str("abc");
    ctx.flags_mut().set(Flags::COLLECT_UNNAMED, true);
    assert!(r.check(&mut ctx));
    assert_eq!(ctx.matches().count(stringozzi::span::MATCHES_KEY), 1);
    let span = ctx.matches().spans(stringozzi::span::MATCHES_KEY)[0];
    assert_eq!(span.len(), 3);
}
