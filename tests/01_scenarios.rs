//! The literal scenario table (spec §8 S1–S14), as black-box integration tests
//! against the public driver surface rather than `Rule::check` directly.

use stringozzi::prelude::*;

fn end() -> Rule {
    Rule::any().not()
}

#[test]
fn s1_until_then_literal_then_end() {
    let r = Rule::is('B').until().then(&Rule::is_str("BBB")).then(&end());
    assert!(driver::test(&r, b"AAABBB", Flags::NONE));
}

#[test]
fn s2_enclosed_literal_accepts() {
    let enclosed = Rule::is('\'')
        .then(&Rule::is_str("ABC"))
        .then(&Rule::is('\''));
    let r = enclosed.then(&end());
    assert!(driver::test(&r, b"'ABC'", Flags::NONE));
}

#[test]
fn s3_enclosed_literal_rejects_bare_input() {
    let enclosed = Rule::is('\'')
        .then(&Rule::is_str("ABC"))
        .then(&Rule::is('\''));
    let r = enclosed.then(&end());
    assert!(!driver::test(&r, b"ABC", Flags::NONE));
}

#[test]
fn s4_ordered_choice_prefers_longer_first_alternative() {
    let r = Rule::is_str("Via").or(&Rule::is('V')).then(&end());
    assert!(driver::test(&r, b"Via", Flags::NONE));
}

#[test]
fn s5_ordered_choice_first_wins_even_if_shorter() {
    let r = Rule::is('V').or(&Rule::is_str("Via")).then(&end());
    assert!(!driver::test(&r, b"Via", Flags::NONE));
}

#[test]
fn s6_greedy_choice_picks_longer_alternative() {
    let r = Rule::is('V').greedy_or(&Rule::is_str("Via")).then(&end());
    assert!(driver::test(&r, b"Via", Flags::NONE));
}

#[test]
fn s7_ipv4_accepts_all_zero() {
    let r = stringozzi::derived::ipv4().then(&end());
    assert!(driver::test(&r, b"0.0.0.0", Flags::NONE));
}

#[test]
fn s8_ipv4_rejects_out_of_range_octets() {
    let r = stringozzi::derived::ipv4().then(&end());
    assert!(!driver::test(&r, b"757.466.223.55", Flags::NONE));
}

#[test]
fn s9_ipv6_accepts_mapped_address() {
    let r = stringozzi::derived::ipv6().then(&end());
    assert!(driver::test(&r, b"::ffff:192.0.2.128", Flags::NONE));
}

#[test]
fn s10_extract_with_if_matched_and_flags() {
    let o = Rule::is('O').extract(Some("O"));
    let s = Rule::is('S').extract(Some("S"));
    let r = o
        .or(&s)
        .repeat(0, usize::MAX)
        .then(&end())
        .then(&Rule::if_matched("O", 3, 3));

    let flags = Flags::CASE_INSENSITIVE | Flags::SKIP_SPACES | Flags::COLLECT_NAMED;
    let matches = driver::match_(&r, b"OOOS", flags).expect("match");
    assert_eq!(matches.count("O"), 3);
    assert_eq!(matches.count("S"), 1);
}

#[test]
fn s11_replace_stops_after_count() {
    let r = Rule::is_str("Osama");
    let out = driver::replace(&r, "1234567OsamaOsamadddd", "lol", Flags::NONE, Some(2));
    assert_eq!(out, "1234567lolloldddd");
}

#[test]
fn s12_in_chain_requires_successive_code_points() {
    let r = Rule::any()
        .then(&Rule::in_chain())
        .then(&Rule::in_chain())
        .then(&end());
    assert!(driver::test(&r, b"ABC", Flags::NONE));
}

#[test]
fn s13_beginning_with_skip_spaces() {
    let r = Rule::beginning().then(&Rule::is('B')).then(&end());
    assert!(driver::test(&r, "     B".as_bytes(), Flags::SKIP_SPACES));
}

#[test]
fn s14_recursive_rule_matches_balanced_parens() {
    let placeholder = Rule::forward_declare();
    let not_paren = Rule::in_set(['(', ')']).not().then(&Rule::any());
    let inner = not_paren.or(&Rule::refer(&placeholder));
    let body = Rule::is('(')
        .then(&inner.repeat(0, usize::MAX))
        .then(&Rule::is(')'));
    placeholder.bind(&body);

    assert!(driver::test(
        &placeholder,
        b"(fdkjfd(fdj(d))jds(xx))",
        Flags::NONE
    ));
}
