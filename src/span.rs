use std::collections::HashMap;

/// Reserved capture key for unnamed matches recorded by every successful primitive
/// when `collect-unnamed` is set.
pub const MATCHES_KEY: &str = "<MATCHES>";

/// Reserved capture key for [`Extract`](crate::node::NodeKind::Extract) used without
/// an explicit name.
pub const UNNAMED_KEY: &str = "<UNNAMED>";

/// A half-open `(start, end)` byte-offset span into the input.
///
/// Modeled on the teacher's `Span { beg, len }` (`src/span.rs`), but stores the end
/// offset directly rather than a length — this crate truncates/extends spans during
/// backtracking (e.g. `GreedyChoice`, `And`) far more often than it concatenates
/// adjacent ones, so `end` is the more convenient representation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The capture collector (spec §3): a mapping from capture key to an ordered
/// sequence of spans.
///
/// Grounded in the teacher's `VecStorer` (`src/span.rs`), generalized from a
/// fixed-size numeric-id array of groups to a string-keyed map, since spec.md's
/// capture keys are user-chosen names (plus the two reserved keys above) rather
/// than compile-time-known group indices. Substring materialization (the "lazily
/// built cache" spec §3 calls for) lives on [`Context`](crate::ctx::Context)
/// instead of here, since turning a span into text requires the code-unit decode
/// table, which this type has no knowledge of.
#[derive(Debug, Clone, Default)]
pub struct CaptureStore {
    spans: HashMap<String, Vec<Span>>,
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `span` under `key`.
    pub fn push(&mut self, key: &str, span: Span) {
        self.spans.entry(key.to_string()).or_default().push(span);
    }

    pub fn count_keys(&self) -> usize {
        self.spans.len()
    }

    pub fn count(&self, key: &str) -> usize {
        self.spans.get(key).map_or(0, Vec::len)
    }

    pub fn spans(&self, key: &str) -> &[Span] {
        self.spans.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.spans.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Truncates every key's span list back to the given snapshot lengths. Used to
    /// implement invariant 2 (§3): captures produced by a matcher that ultimately
    /// fails are discarded, by collect-then-truncate-on-failure.
    pub fn truncate_to(&mut self, snapshot: &CaptureSnapshot) {
        self.spans.retain(|k, v| {
            let keep = snapshot.lens.get(k).copied().unwrap_or(0);
            v.truncate(keep);
            !v.is_empty()
        });
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            lens: self
                .spans
                .iter()
                .map(|(k, v)| (k.clone(), v.len()))
                .collect(),
        }
    }
}

/// A cheap snapshot of per-key span counts, used to truncate back to on backtrack.
#[derive(Debug, Clone, Default)]
pub struct CaptureSnapshot {
    lens: HashMap<String, usize>,
}
