//! Derived rules built purely by composition (spec §4.6) — functions returning a
//! freshly constructed [`Rule`] each call, per the Design Notes' "replace global
//! singletons with functions returning freshly constructed rules" (spec §9),
//! generalizing the teacher's `regex!`/character-class constant idiom away from
//! mutable process-global state.

use crate::rule::Rule;

pub fn digit() -> Rule {
    Rule::between('0', '9')
}

pub fn hex() -> Rule {
    digit()
        .or(&Rule::between('a', 'f'))
        .or(&Rule::between('A', 'F'))
}

pub fn octet() -> Rule {
    Rule::between('0', '7')
}

pub fn binary() -> Rule {
    Rule::between('0', '1')
}

pub fn alphabet() -> Rule {
    Rule::between('a', 'z').or(&Rule::between('A', 'Z'))
}

pub fn alphanumeric() -> Rule {
    alphabet().or(&digit())
}

/// `Any & Not(Alphanumeric)`.
pub fn symbol() -> Rule {
    Rule::any().and(&alphanumeric().not())
}

pub fn whitespace() -> Rule {
    Rule::in_set([' ', '\t', '\r', '\n'])
}

pub fn end_of_line() -> Rule {
    Rule::is_str("\r\n").or(&Rule::in_set(['\n', '\r']))
}

pub fn beginning_of_line() -> Rule {
    Rule::beginning().or(&end_of_line().look_back())
}

pub fn word_start() -> Rule {
    alphanumeric().not().look_back()
}

pub fn word_end() -> Rule {
    alphanumeric().not().look_ahead()
}

/// Optional `a`: `a | Sequence()` modeled as ordered choice against a
/// zero-width always-succeeding rule, i.e. `a` or nothing.
fn optional(a: &Rule) -> Rule {
    a.or(&a.repeat(0, 0))
}

pub fn natural() -> Rule {
    digit().repeat(1, usize::MAX)
}

pub fn integer() -> Rule {
    optional(&Rule::in_set(['+', '-'])).then(&natural())
}

pub fn rational() -> Rule {
    integer().then(&optional(&Rule::is('.').then(&natural())))
}

pub fn scientific() -> Rule {
    rational().then(&optional(
        &Rule::in_set(['e', 'E']).then(&Rule::in_set(['+', '-'])).then(&natural()),
    ))
}

/// One decimal octet, `0`–`255`, via the canonical ordered-choice shape from
/// spec §4.6: `25[0-5] | 2[0-4]d | 1dd | [1-9]d | d`.
fn decimal_octet() -> Rule {
    let d = digit;
    Rule::is_str("25")
        .then(&Rule::between('0', '5'))
        .or(&Rule::is('2').then(&Rule::between('0', '4')).then(&d()))
        .or(&Rule::is('1').then(&d()).then(&d()))
        .or(&Rule::between('1', '9').then(&d()))
        .or(&d())
}

pub fn ipv4() -> Rule {
    let octet = decimal_octet;
    octet()
        .then(&Rule::is('.'))
        .then(&octet())
        .then(&Rule::is('.'))
        .then(&octet())
        .then(&Rule::is('.'))
        .then(&octet())
}

/// `h16 = 1..4 * Hex`.
fn h16() -> Rule {
    hex().repeat(1, 4)
}

/// `ls32 = (h16 ":" h16) | IPv4`.
fn ls32() -> Rule {
    h16().then(&Rule::is(':')).then(&h16()).or(&ipv4())
}

/// The RFC 3986 `IPv6address` production expressed as a greedy choice over its
/// eight documented shapes (spec §4.6), so the alternative consuming the most
/// input wins regardless of source order.
pub fn ipv6() -> Rule {
    let h16_colon = || h16().then(&Rule::is(':'));

    let shapes: Vec<Rule> = vec![
        // 6( h16 ":" ) ls32
        h16_colon().repeat(6, 6).then(&ls32()),
        // "::" 5( h16 ":" ) ls32
        Rule::is_str("::").then(&h16_colon().repeat(5, 5)).then(&ls32()),
        // [ h16 ] "::" 4( h16 ":" ) ls32
        optional(&h16())
            .then(&Rule::is_str("::"))
            .then(&h16_colon().repeat(4, 4))
            .then(&ls32()),
        // [ *1( h16 ":" ) h16 ] "::" 3( h16 ":" ) ls32
        optional(&h16_colon().repeat(0, 1).then(&h16()))
            .then(&Rule::is_str("::"))
            .then(&h16_colon().repeat(3, 3))
            .then(&ls32()),
        // [ *2( h16 ":" ) h16 ] "::" 2( h16 ":" ) ls32
        optional(&h16_colon().repeat(0, 2).then(&h16()))
            .then(&Rule::is_str("::"))
            .then(&h16_colon().repeat(2, 2))
            .then(&ls32()),
        // [ *3( h16 ":" ) h16 ] "::" h16 ":" ls32
        optional(&h16_colon().repeat(0, 3).then(&h16()))
            .then(&Rule::is_str("::"))
            .then(&h16_colon())
            .then(&ls32()),
        // [ *4( h16 ":" ) h16 ] "::" ls32
        optional(&h16_colon().repeat(0, 4).then(&h16()))
            .then(&Rule::is_str("::"))
            .then(&ls32()),
        // [ *5( h16 ":" ) h16 ] "::" h16
        optional(&h16_colon().repeat(0, 5).then(&h16()))
            .then(&Rule::is_str("::"))
            .then(&h16()),
        // [ *6( h16 ":" ) h16 ] "::"
        optional(&h16_colon().repeat(0, 6).then(&h16())).then(&Rule::is_str("::")),
    ];

    shapes
        .into_iter()
        .reduce(|acc, shape| acc.greedy_or(&shape))
        .expect("fixed non-empty shape list")
}

/// One-or-more of `%`-hex-hex, alphanumeric, or `-_.~!$&'()*+,;=`, with greedy
/// fallback to `IPv4` or `IPv6` (spec §4.6).
pub fn host() -> Rule {
    let pct_encoded = Rule::is('%').then(&hex()).then(&hex());
    let unreserved_or_sub_delim = alphanumeric().or(&Rule::in_set([
        '-', '_', '.', '~', '!', '$', '&', '\'', '(', ')', '*', '+', ',', ';', '=',
    ]));
    let reg_name = pct_encoded.or(&unreserved_or_sub_delim).repeat(1, usize::MAX);
    reg_name.greedy_or(&ipv4()).greedy_or(&ipv6())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Context;

    fn accepts_fully(rule: &Rule, s: &str) -> bool {
        let end = Rule::any().not();
        let r = rule.then(&end);
        let mut ctx = Context::from_str(s);
        r.check(&mut ctx)
    }

    #[test]
    fn ipv4_accepts_all_zero() {
        // S7
        assert!(accepts_fully(&ipv4(), "0.0.0.0"));
    }

    #[test]
    fn ipv4_rejects_out_of_range_octets() {
        // S8
        assert!(!accepts_fully(&ipv4(), "757.466.223.55"));
    }

    #[test]
    fn ipv6_accepts_ipv4_mapped_form() {
        // S9
        assert!(accepts_fully(&ipv6(), "::ffff:192.0.2.128"));
    }

    #[test]
    fn natural_requires_at_least_one_digit() {
        let mut ctx = Context::from_str("");
        assert!(!natural().check(&mut ctx));
    }

    #[test]
    fn scientific_accepts_exponent_form() {
        let mut ctx = Context::from_str("-12.5e+10");
        assert!(scientific().check(&mut ctx));
        assert_eq!(ctx.position(), 9);
    }

    #[test]
    fn word_boundaries_bracket_alphanumeric_runs() {
        let r = word_start().then(&alphanumeric().repeat(1, usize::MAX)).then(&word_end());
        assert!(accepts_fully(&r, "abc123"));
    }
}
