//! The parse context (spec §3/§4.1): cursor, flags, variable store, and capture
//! collector, generic over the input's code-unit width (§AMBIENT-5).

use std::collections::HashMap;

use crate::decode::CodeUnit;
use crate::flags::Flags;
use crate::span::{CaptureSnapshot, CaptureStore, Span, MATCHES_KEY, UNNAMED_KEY};

/// Per-match mutable state (spec §3). Not shared across threads; each match owns
/// exactly one context (§5).
pub struct Context<'a, U: CodeUnit> {
    input: &'a [U],
    cursor: usize,
    origin: usize,
    flags: Flags,
    vars: HashMap<String, String>,
    matches: CaptureStore,
}

/// An 8-bit (UTF-8) context — the common case, and the one every derived rule in
/// [`crate::derived`] and every driver entry point in [`crate::driver`] is written
/// against.
pub type Utf8Context<'a> = Context<'a, u8>;
/// A 16-bit context: each code unit is one code point (spec §3), no surrogate pairing.
pub type Utf16Context<'a> = Context<'a, u16>;
/// A 32-bit context: each code unit is one code point (spec §3).
pub type Utf32Context<'a> = Context<'a, u32>;

impl<'a, U: CodeUnit> Context<'a, U> {
    pub fn new(input: &'a [U]) -> Self {
        Self {
            input,
            cursor: 0,
            origin: 0,
            flags: Flags::NONE,
            vars: HashMap::new(),
            matches: CaptureStore::new(),
        }
    }

    pub fn with_flags(input: &'a [U], flags: Flags) -> Self {
        let mut ctx = Self::new(input);
        ctx.flags = flags;
        ctx
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn set_position(&mut self, pos: usize) -> &mut Self {
        debug_assert!(pos <= self.input.len());
        self.cursor = pos;
        self
    }

    /// Resets the cursor to `origin` without touching flags/vars/matches — used by
    /// the driver to retry a rule at a new search origin.
    pub fn rebase(&mut self, pos: usize) -> &mut Self {
        self.origin = pos;
        self.cursor = pos;
        self
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    /// `Beginning` (spec §4.3): true only at the original start.
    pub fn at_beginning(&self) -> bool {
        self.cursor == self.origin
    }

    /// `Not(Any)`, i.e. end of text (spec §3 invariant 4).
    pub fn at_end(&self) -> bool {
        self.cursor >= self.input.len()
    }

    /// Advances the cursor by one code point. Returns `false` at end of text.
    pub fn forward(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        let (_, len) = U::decode_at(self.input, self.cursor);
        self.cursor += len;
        true
    }

    /// Moves the cursor back by one code point. Returns `false` at origin-of-input
    /// (position 0 — `backward` is a raw cursor primitive, unlike `Beginning`, which
    /// tests against the match's `origin`).
    pub fn backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let (_, len) = U::decode_before(self.input, self.cursor);
        self.cursor -= len;
        true
    }

    /// The code point under the cursor, case-folded if `case-insensitive` is set.
    pub fn get(&self) -> Option<char> {
        if self.at_end() {
            return None;
        }
        let (c, _) = U::decode_at(self.input, self.cursor);
        Some(self.fold(c))
    }

    fn fold(&self, c: char) -> char {
        if self.flags.case_insensitive() {
            fold_ascii(c)
        } else {
            c
        }
    }

    /// Compares the code point under the cursor to `c`, under the current case-fold
    /// rule. `-1`/`0`/`+1`, or `None` at end of text.
    pub fn compare(&self, c: char) -> Option<std::cmp::Ordering> {
        let cur = self.get()?;
        Some(cur.cmp(&self.fold(c)))
    }

    /// While `skip-spaces` is set and the current code point is exactly `' '`,
    /// advances. Returns the resulting position.
    pub fn adjust_position(&mut self) -> usize {
        if self.flags.skip_spaces() {
            while !self.at_end() && self.get() == Some(' ') {
                self.forward();
            }
        }
        self.cursor
    }

    /// Records an unnamed span `(start, cursor)` under `"<MATCHES>"` if
    /// `collect-unnamed` is set and the span is non-empty.
    pub fn add_match(&mut self, start: usize) {
        if self.flags.collect_unnamed() && self.cursor > start {
            self.matches.push(MATCHES_KEY, Span::new(start, self.cursor));
        }
    }

    /// Records a span `(start, cursor)` under `key` if `collect-named` is set.
    pub fn add_named_match(&mut self, key: &str, start: usize) {
        if self.flags.collect_named() {
            self.matches.push(key, Span::new(start, self.cursor));
        }
    }

    /// [`Extract`](crate::node::NodeKind::Extract) without an explicit key records
    /// under the reserved `"<UNNAMED>"` key.
    pub fn add_unnamed_extract(&mut self, start: usize) {
        self.add_named_match(UNNAMED_KEY, start);
    }

    pub fn matches(&self) -> &CaptureStore {
        &self.matches
    }

    pub fn matches_mut(&mut self) -> &mut CaptureStore {
        &mut self.matches
    }

    pub fn snapshot_matches(&self) -> CaptureSnapshot {
        self.matches.snapshot()
    }

    pub fn truncate_matches(&mut self, snapshot: &CaptureSnapshot) {
        self.matches.truncate_to(snapshot);
    }

    /// Materializes the text covered by `span` by decoding code point by code
    /// point — the "lazily built cache of materialized substrings" from spec §3 is
    /// the caller's responsibility (see [`crate::rule::Rule::capture`]); this is the
    /// decode primitive it is built on.
    pub fn text(&self, span: Span) -> String {
        let mut out = String::with_capacity(span.len());
        let mut pos = span.start;
        while pos < span.end {
            let (c, len) = U::decode_at(self.input, pos);
            out.push(c);
            pos += len;
        }
        out
    }

    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn del_var(&mut self, key: &str) {
        self.vars.remove(key);
    }
}

/// ASCII-only case fold (spec §4.1, Open Question 3): `'A'..'Z'` maps to `'a'..'z'`;
/// everything else, including non-ASCII letters, is unchanged.
pub fn fold_ascii(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

impl<'a> Context<'a, u8> {
    /// Convenience constructor for the common UTF-8 case.
    pub fn from_str(input: &'a str) -> Self {
        Self::new(input.as_bytes())
    }

    pub fn from_str_with_flags(input: &'a str, flags: Flags) -> Self {
        Self::with_flags(input.as_bytes(), flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_backward_roundtrip() {
        let mut ctx = Context::from_str("a你b");
        assert!(ctx.forward());
        assert_eq!(ctx.position(), 1);
        assert!(ctx.forward());
        assert_eq!(ctx.position(), 4);
        assert!(ctx.backward());
        assert_eq!(ctx.position(), 1);
    }

    #[test]
    fn forward_fails_at_end() {
        let mut ctx = Context::from_str("a");
        assert!(ctx.forward());
        assert!(!ctx.forward());
    }

    #[test]
    fn backward_fails_at_zero() {
        let mut ctx = Context::from_str("a");
        assert!(!ctx.backward());
    }

    #[test]
    fn case_fold_ascii_only() {
        let mut ctx = Context::from_str("A");
        ctx.flags_mut().set(Flags::CASE_INSENSITIVE, true);
        assert_eq!(ctx.get(), Some('a'));
        let mut ctx2 = Context::from_str("Ä");
        ctx2.flags_mut().set(Flags::CASE_INSENSITIVE, true);
        assert_eq!(ctx2.get(), Some('Ä'));
    }

    #[test]
    fn adjust_position_skips_only_plain_space() {
        let mut ctx = Context::from_str("  \ta");
        ctx.flags_mut().set(Flags::SKIP_SPACES, true);
        ctx.adjust_position();
        assert_eq!(ctx.position(), 2);
        assert_eq!(ctx.get(), Some('\t'));
    }

    #[test]
    fn add_match_requires_flag_and_nonempty() {
        let mut ctx = Context::from_str("abc");
        ctx.set_position(2);
        ctx.add_match(0);
        assert_eq!(ctx.matches().count(MATCHES_KEY), 0);
        ctx.flags_mut().set(Flags::COLLECT_UNNAMED, true);
        ctx.add_match(2);
        assert_eq!(ctx.matches().count(MATCHES_KEY), 0, "empty span not recorded");
        ctx.set_position(2);
        ctx.add_match(0);
        assert_eq!(ctx.matches().count(MATCHES_KEY), 1);
    }

    #[test]
    fn vars_roundtrip() {
        let mut ctx = Context::from_str("");
        assert_eq!(ctx.get_var("k"), None);
        ctx.set_var("k", "v");
        assert_eq!(ctx.get_var("k"), Some("v"));
        ctx.del_var("k");
        assert_eq!(ctx.get_var("k"), None);
    }

    #[test]
    fn text_materializes_span() {
        let ctx = Context::from_str("hello world");
        assert_eq!(ctx.text(Span::new(0, 5)), "hello");
        assert_eq!(ctx.text(Span::new(6, 11)), "world");
    }
}
