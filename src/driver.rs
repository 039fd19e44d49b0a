//! Entry points built atop the combinator core (spec §4.7): `test`, `search`,
//! `match_`, `replace`, `split`. All failure is boolean or `Option`-shaped; none of
//! these raise.

use crate::ctx::Context;
use crate::decode::CodeUnit;
use crate::flags::Flags;
use crate::rule::Rule;
use crate::span::{CaptureStore, MATCHES_KEY};

/// `test(rule, s, flags)`: run `rule` once at the start of `s`.
pub fn test<U: CodeUnit>(rule: &Rule, input: &[U], flags: Flags) -> bool {
    let mut ctx = Context::with_flags(input, flags);
    rule.check(&mut ctx)
}

/// `search(rule, s, flags)`, equivalent to `test(Until(rule) > rule, s)` (spec
/// §8 property 2). On success the context's cursor sits just past the match.
pub fn search<U: CodeUnit>(rule: &Rule, input: &[U], flags: Flags) -> bool {
    let mut ctx = Context::with_flags(input, flags);
    search_in(rule, &mut ctx)
}

fn search_in<U: CodeUnit>(rule: &Rule, ctx: &mut Context<U>) -> bool {
    let combined = rule.until().then(rule);
    combined.check(ctx)
}

/// As [`search`], but returns the byte offset the match started at.
pub fn search_and_get_index<U: CodeUnit>(rule: &Rule, input: &[U], flags: Flags) -> Option<usize> {
    let mut ctx = Context::with_flags(input, flags);
    let start = ctx.position();
    if search_in(rule, &mut ctx) {
        // The match's start is wherever Until(rule) left the cursor before rule
        // itself ran; recompute it by re-running rule's Until half alone.
        let mut probe = Context::with_flags(input, ctx.flags());
        probe.rebase(start);
        if rule.until().check(&mut probe) {
            return Some(probe.position());
        }
    }
    None
}

/// As [`search_and_get_index`], but returns a raw pointer into `input` at the
/// match start, or null if there is no match — the pointer equivalent spec §4.7
/// calls for alongside the index form.
pub fn search_and_get_ptr<U: CodeUnit>(rule: &Rule, input: &[U], flags: Flags) -> *const U {
    match search_and_get_index(rule, input, flags) {
        Some(idx) => unsafe { input.as_ptr().add(idx) },
        None => std::ptr::null(),
    }
}

/// `match_(rule, s, flags)`: forces `collect-named`/`collect-unnamed` on, searches,
/// then re-runs `rule` at the match point to populate the returned
/// [`CaptureStore`]. Named `match_` since `match` is a reserved word.
pub fn match_<U: CodeUnit>(rule: &Rule, input: &[U], flags: Flags) -> Option<CaptureStore> {
    let flags = flags | Flags::COLLECT_NAMED | Flags::COLLECT_UNNAMED;
    let start = search_and_get_index(rule, input, flags)?;
    let mut ctx = Context::with_flags(input, flags);
    ctx.rebase(start);
    if rule.check(&mut ctx) {
        Some(ctx.matches().clone())
    } else {
        None
    }
}

/// `replace(rule, s, rep, flags, count)`: repeatedly searches for `rule`; on each
/// hit appends the pre-hit slice plus `rep`; stops after `count` hits (`None` for
/// unbounded) or when no more matches; appends the tail.
pub fn replace(rule: &Rule, input: &str, rep: &str, flags: Flags, count: Option<usize>) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0usize;
    let mut hits = 0usize;

    while count.map_or(true, |c| hits < c) {
        let Some(start) = search_and_get_index(rule, &bytes[pos..], flags) else {
            break;
        };
        let abs_start = pos + start;
        let mut ctx = Context::with_flags(bytes, flags);
        ctx.rebase(abs_start);
        if !rule.check(&mut ctx) {
            break;
        }
        let abs_end = ctx.position();
        out.push_str(&input[pos..abs_start]);
        out.push_str(rep);
        hits += 1;
        if abs_end == pos {
            // Zero-width match at the same position as last time: force progress.
            if abs_end >= bytes.len() {
                pos = bytes.len();
                break;
            }
        }
        pos = abs_end;
    }
    out.push_str(&input[pos..]);
    out
}

/// `split(rule, s, flags, drop_empty, count)`: like [`replace`], but yields the
/// slices between matches instead of replacing them.
pub fn split(
    rule: &Rule,
    input: &str,
    flags: Flags,
    drop_empty: bool,
    count: Option<usize>,
) -> Vec<String> {
    split_iter(rule, input, flags, drop_empty, count).collect()
}

/// Lazy form of [`split`].
pub fn split_iter<'a>(
    rule: &'a Rule,
    input: &'a str,
    flags: Flags,
    drop_empty: bool,
    count: Option<usize>,
) -> impl Iterator<Item = String> + 'a {
    let bytes = input.as_bytes();
    let mut pos = 0usize;
    let mut hits = 0usize;
    let mut done = false;
    std::iter::from_fn(move || {
        loop {
            if done {
                return None;
            }
            if count.is_some_and(|c| hits >= c) {
                done = true;
                let tail = input[pos..].to_string();
                return if drop_empty && tail.is_empty() {
                    None
                } else {
                    Some(tail)
                };
            }
            let Some(start) = search_and_get_index(rule, &bytes[pos..], flags) else {
                done = true;
                let tail = input[pos..].to_string();
                return if drop_empty && tail.is_empty() {
                    None
                } else {
                    Some(tail)
                };
            };
            let abs_start = pos + start;
            let mut ctx = Context::with_flags(bytes, flags);
            ctx.rebase(abs_start);
            if !rule.check(&mut ctx) {
                done = true;
                return Some(input[pos..].to_string());
            }
            let abs_end = ctx.position();
            let slice = input[pos..abs_start].to_string();
            hits += 1;
            pos = if abs_end > abs_start { abs_end } else { abs_start + 1 };
            if drop_empty && slice.is_empty() {
                continue;
            }
            return Some(slice);
        }
    })
}
