//! Rule handles and the `check` dispatcher (spec §4.2–§4.5, §9).
//!
//! Grounded in the teacher's `rec_parser`/`rec_parser_sync` placeholder-inject
//! idiom (`Rc<RefCell<Option<Box<dyn Ctor>>>>>`), generalized per spec §9 Design
//! Notes to an arena of [`NodeKind`] behind `Arc<RwLock<_>>`: every combinator
//! builds a fresh small arena by copying its operands' nodes in (cheap,
//! construction-time only — spec §2 "built once, executed many times"), while
//! [`Rule::forward_declare`] / [`Rule::bind`] / [`Rule::refer`] are the only places
//! that keep two arenas pointing at each other through a shared `Arc`, which is
//! what lets a rule refer to itself before it is fully built.

use std::sync::{Arc, RwLock};

use crate::ctx::Context;
use crate::decode::CodeUnit;
use crate::node::{NodeKind, RefTarget, RuleId};

type Arena = Arc<RwLock<Vec<NodeKind>>>;

/// A shared-ownership handle onto a matcher subgraph (spec §3 "Rule handle").
#[derive(Debug, Clone)]
pub struct Rule {
    arena: Arena,
    root: RuleId,
}

impl Rule {
    fn from_nodes(nodes: Vec<NodeKind>, root: RuleId) -> Self {
        Rule {
            arena: Arc::new(RwLock::new(nodes)),
            root,
        }
    }

    fn leaf(node: NodeKind) -> Self {
        Self::from_nodes(vec![node], RuleId(0))
    }

    /// Runs this rule's matcher against `ctx` from the current cursor (spec §4.2).
    ///
    /// Each recursive step takes and drops its own short-lived read guard (see
    /// [`exec`]) rather than holding one across the whole traversal, so a rule that
    /// refers to itself through [`Rule::bind`] never attempts a reentrant lock on
    /// the same `RwLock`.
    pub fn check<U: CodeUnit>(&self, ctx: &mut Context<U>) -> bool {
        exec(&self.arena, self.root, ctx)
    }

    /// Creates an unbound placeholder (spec §9: "create an unbound Ref id; bind
    /// later"). Use [`Rule::refer`] to embed it inside a body under construction,
    /// then call [`Rule::bind`] once the body is complete to close the cycle.
    pub fn forward_declare() -> Self {
        Self::leaf(NodeKind::Ref(RefTarget::Unbound))
    }

    /// Binds a previously [`forward_declare`](Rule::forward_declare)d placeholder to
    /// `target`, in place, through the placeholder's own arena. Any rule built with
    /// [`Rule::refer(&placeholder)`](Rule::refer) observes the bound target from
    /// this point on, including `placeholder` itself.
    pub fn bind(&self, target: &Rule) {
        let mut guard = self.arena.write().expect("rule arena poisoned");
        guard[self.root.0 as usize] =
            NodeKind::Ref(RefTarget::External(target.arena.clone(), target.root));
    }

    /// `Ref(rule)` (spec §4.4): a one-node indirection that shares `target`'s arena
    /// by `Arc` clone instead of copying its nodes in. Cheaper than normal
    /// combination for large shared subgraphs, and the only way to embed a
    /// not-yet-bound [`forward_declare`](Rule::forward_declare)d rule without
    /// copying its (still unbound) placeholder node by value.
    pub fn refer(target: &Rule) -> Self {
        Self::leaf(NodeKind::Ref(RefTarget::External(
            target.arena.clone(),
            target.root,
        )))
    }

    /// Always fails; never consumes (spec §7 defensive-fallback rule).
    pub fn never() -> Self {
        Self::leaf(NodeKind::Never)
    }

    // ---- Leaves (spec §4.3) -------------------------------------------------

    pub fn is(c: char) -> Self {
        Self::leaf(NodeKind::IsChar(c))
    }

    pub fn is_str(phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        if phrase.is_empty() {
            crate::log::stz_warn!("{}", crate::err::ConstructError::EmptyLiteral);
            return Self::never();
        }
        Self::leaf(NodeKind::IsPhrase(phrase))
    }

    pub fn in_set(set: impl IntoIterator<Item = char>) -> Self {
        let set: Vec<char> = set.into_iter().collect();
        if set.is_empty() {
            crate::log::stz_warn!("{}", crate::err::ConstructError::EmptySet);
            return Self::never();
        }
        Self::leaf(NodeKind::In(set))
    }

    pub fn between(lo: char, hi: char) -> Self {
        if lo > hi {
            crate::log::stz_warn!("{}", crate::err::ConstructError::InvertedRange);
            return Self::never();
        }
        Self::leaf(NodeKind::Between(lo, hi))
    }

    pub fn any() -> Self {
        Self::leaf(NodeKind::Any)
    }

    pub fn beginning() -> Self {
        Self::leaf(NodeKind::Beginning)
    }

    pub fn in_chain() -> Self {
        Self::leaf(NodeKind::InChain)
    }

    // ---- Composites (spec §4.4) ---------------------------------------------

    pub fn then(&self, other: &Rule) -> Self {
        self.combine2(other, NodeKind::Sequence)
    }

    pub fn or(&self, other: &Rule) -> Self {
        self.combine2(other, NodeKind::OrderedChoice)
    }

    pub fn greedy_or(&self, other: &Rule) -> Self {
        self.combine2(other, NodeKind::GreedyChoice)
    }

    pub fn and(&self, other: &Rule) -> Self {
        self.combine2(other, NodeKind::And)
    }

    pub fn not(&self) -> Self {
        self.combine1(NodeKind::Not)
    }

    pub fn look_ahead(&self) -> Self {
        self.combine1(NodeKind::LookAhead)
    }

    pub fn look_back(&self) -> Self {
        self.combine1(NodeKind::LookBack)
    }

    pub fn until(&self) -> Self {
        self.combine1(NodeKind::Until)
    }

    pub fn repeat(&self, min: usize, max: usize) -> Self {
        if min > max {
            crate::log::stz_warn!("Repeat(a, min, max) constructed with min > max");
            return Self::never();
        }
        self.combine1(|id| NodeKind::Repeat(id, min, max))
    }

    pub fn extract(&self, key: Option<&str>) -> Self {
        let key = key.map(str::to_string);
        self.combine1(|id| NodeKind::Extract(id, key.clone()))
    }

    pub fn case_modifier(on: bool) -> Self {
        Self::leaf(NodeKind::CaseModifier(on))
    }

    pub fn set_var(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::SetVar(key.into(), value.into()))
    }

    pub fn del_var(key: impl Into<String>) -> Self {
        Self::leaf(NodeKind::DelVar(key.into()))
    }

    pub fn if_var(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::If(key.into(), value.into()))
    }

    pub fn if_matched(key: impl Into<String>, min: usize, max: usize) -> Self {
        Self::leaf(NodeKind::IfMatched(key.into(), min, max))
    }

    fn combine1(&self, f: impl FnOnce(RuleId) -> NodeKind) -> Self {
        let mut nodes = self.arena.read().expect("rule arena poisoned").clone();
        let a_root = self.root;
        let root = RuleId(nodes.len() as u32);
        nodes.push(f(a_root));
        Self::from_nodes(nodes, root)
    }

    fn combine2(&self, other: &Rule, f: impl FnOnce(RuleId, RuleId) -> NodeKind) -> Self {
        let mut nodes = self.arena.read().expect("rule arena poisoned").clone();
        let a_root = self.root;
        let offset = nodes.len() as u32;
        let b_nodes = other.arena.read().expect("rule arena poisoned");
        nodes.extend(b_nodes.iter().map(|n| remap(n, offset)));
        drop(b_nodes);
        let b_root = RuleId(other.root.0 + offset);
        let root = RuleId(nodes.len() as u32);
        nodes.push(f(a_root, b_root));
        Self::from_nodes(nodes, root)
    }
}

fn remap(node: &NodeKind, offset: u32) -> NodeKind {
    let r = |id: RuleId| RuleId(id.0 + offset);
    match node {
        NodeKind::Sequence(a, b) => NodeKind::Sequence(r(*a), r(*b)),
        NodeKind::OrderedChoice(a, b) => NodeKind::OrderedChoice(r(*a), r(*b)),
        NodeKind::GreedyChoice(a, b) => NodeKind::GreedyChoice(r(*a), r(*b)),
        NodeKind::And(a, b) => NodeKind::And(r(*a), r(*b)),
        NodeKind::Not(a) => NodeKind::Not(r(*a)),
        NodeKind::LookAhead(a) => NodeKind::LookAhead(r(*a)),
        NodeKind::LookBack(a) => NodeKind::LookBack(r(*a)),
        NodeKind::Until(a) => NodeKind::Until(r(*a)),
        NodeKind::Repeat(a, min, max) => NodeKind::Repeat(r(*a), *min, *max),
        NodeKind::Extract(a, key) => NodeKind::Extract(r(*a), key.clone()),
        // `Local` refs point within the source arena being copied in, so they must
        // be remapped too; `External` refs point at a wholly different arena by
        // `Arc` and are copied as-is.
        NodeKind::Ref(RefTarget::Local(id)) => NodeKind::Ref(RefTarget::Local(r(*id))),
        other => other.clone(),
    }
}

/// The single dispatch site (spec §9: "a tagged enum matched at the dispatch
/// site"). Reads and clones exactly one node per call and drops the guard before
/// recursing, so a cycle closed through [`Rule::bind`] never reenters the same
/// `RwLock` while a guard from an earlier frame is still held.
fn exec<U: CodeUnit>(arc: &Arena, id: RuleId, ctx: &mut Context<U>) -> bool {
    let node = arc.read().expect("rule arena poisoned")[id.0 as usize].clone();
    match node {
        NodeKind::IsChar(c) => {
            ctx.adjust_position();
            let start = ctx.position();
            if ctx.compare(c) == Some(std::cmp::Ordering::Equal) {
                ctx.forward();
                ctx.add_match(start);
                true
            } else {
                false
            }
        }
        NodeKind::IsPhrase(phrase) => {
            ctx.adjust_position();
            let start = ctx.position();
            for ch in phrase.chars() {
                if ctx.compare(ch) != Some(std::cmp::Ordering::Equal) {
                    ctx.set_position(start);
                    return false;
                }
                ctx.forward();
            }
            ctx.add_match(start);
            true
        }
        NodeKind::In(set) => {
            ctx.adjust_position();
            let start = ctx.position();
            for c in &set {
                if ctx.compare(*c) == Some(std::cmp::Ordering::Equal) {
                    ctx.forward();
                    ctx.add_match(start);
                    return true;
                }
            }
            false
        }
        NodeKind::Between(lo, hi) => {
            ctx.adjust_position();
            let start = ctx.position();
            match ctx.get() {
                Some(_) if ctx.compare(lo) != Some(std::cmp::Ordering::Less) && {
                    ctx.compare(hi) != Some(std::cmp::Ordering::Greater)
                } =>
                {
                    ctx.forward();
                    ctx.add_match(start);
                    true
                }
                _ => false,
            }
        }
        NodeKind::Any => {
            ctx.adjust_position();
            let start = ctx.position();
            if ctx.forward() {
                ctx.add_match(start);
                true
            } else {
                false
            }
        }
        NodeKind::Beginning => ctx.at_beginning(),
        NodeKind::InChain => {
            let Some(c) = ctx.get() else { return false };
            let start = ctx.position();
            if !ctx.backward() {
                return false;
            }
            let p = ctx.get();
            ctx.set_position(start);
            match p {
                Some(p) if (p as u32) + 1 == c as u32 => {
                    ctx.forward();
                    ctx.add_match(start);
                    true
                }
                _ => false,
            }
        }
        NodeKind::Sequence(a, b) => {
            let start = ctx.position();
            if !exec(arc, a, ctx) {
                return false;
            }
            ctx.adjust_position();
            if !exec(arc, b, ctx) {
                ctx.set_position(start);
                return false;
            }
            ctx.add_match(start);
            true
        }
        NodeKind::OrderedChoice(a, b) => {
            let start = ctx.position();
            if exec(arc, a, ctx) {
                ctx.add_match(start);
                return true;
            }
            if exec(arc, b, ctx) {
                ctx.add_match(start);
                return true;
            }
            ctx.set_position(start);
            false
        }
        NodeKind::GreedyChoice(a, b) => {
            let start = ctx.position();
            let snap = ctx.snapshot_matches();
            let ok_a = exec(arc, a, ctx);
            let e1 = ctx.position();
            ctx.set_position(start);
            ctx.truncate_matches(&snap);
            let ok_b = exec(arc, b, ctx);
            let e2 = ctx.position();
            ctx.set_position(start);
            ctx.truncate_matches(&snap);
            if !ok_a && !ok_b {
                return false;
            }
            // Neither branch's committed captures survived the restores above, so
            // replay whichever one reaches the winning endpoint to materialize them.
            if ok_a && (e1 >= e2 || !ok_b) {
                exec(arc, a, ctx);
            } else {
                exec(arc, b, ctx);
            }
            ctx.set_position(e1.max(e2));
            ctx.add_match(start);
            true
        }
        NodeKind::And(a, b) => {
            let start = ctx.position();
            let snap = ctx.snapshot_matches();
            let ok_a = exec(arc, a, ctx);
            let e1 = ctx.position();
            ctx.set_position(start);
            ctx.truncate_matches(&snap);
            let ok_b = exec(arc, b, ctx);
            let e2 = ctx.position();
            ctx.set_position(start);
            ctx.truncate_matches(&snap);
            if !ok_a || !ok_b {
                return false;
            }
            if e1 <= e2 {
                exec(arc, a, ctx);
            } else {
                exec(arc, b, ctx);
            }
            ctx.set_position(e1.min(e2));
            ctx.add_match(start);
            true
        }
        NodeKind::Not(a) => {
            let start = ctx.position();
            let snap = ctx.snapshot_matches();
            if exec(arc, a, ctx) {
                ctx.set_position(start);
                ctx.truncate_matches(&snap);
                false
            } else {
                true
            }
        }
        NodeKind::LookAhead(a) => {
            let start = ctx.position();
            let snap = ctx.snapshot_matches();
            let ok = exec(arc, a, ctx);
            ctx.set_position(start);
            ctx.truncate_matches(&snap);
            ok
        }
        NodeKind::LookBack(a) => {
            let end = ctx.position();
            let origin = ctx.origin();
            let mut candidate = end;
            loop {
                ctx.set_position(candidate);
                if candidate <= origin || !ctx.backward() {
                    ctx.set_position(end);
                    return false;
                }
                candidate = ctx.position();
                let snap = ctx.snapshot_matches();
                ctx.set_position(candidate);
                let ok = exec(arc, a, ctx);
                if ok && ctx.position() == end {
                    return true;
                }
                ctx.set_position(candidate);
                ctx.truncate_matches(&snap);
            }
        }
        NodeKind::Until(a) => {
            let start = ctx.position();
            loop {
                let probe = ctx.position();
                let snap = ctx.snapshot_matches();
                let ok = exec(arc, a, ctx);
                ctx.set_position(probe);
                ctx.truncate_matches(&snap);
                if ok {
                    ctx.add_match(start);
                    return true;
                }
                if !ctx.forward() {
                    ctx.set_position(start);
                    return false;
                }
            }
        }
        NodeKind::Repeat(a, min, max) => {
            let start = ctx.position();
            let snap = ctx.snapshot_matches();
            let mut count = 0usize;
            while count < max {
                let pre = ctx.position();
                if !exec(arc, a, ctx) {
                    break;
                }
                count += 1;
                if ctx.position() == pre {
                    // Zero-width success: stop to guarantee termination (spec §9
                    // open question 1, break-on-no-progress variant).
                    break;
                }
            }
            if count < min {
                ctx.set_position(start);
                ctx.truncate_matches(&snap);
                return false;
            }
            ctx.add_match(start);
            true
        }
        NodeKind::Extract(a, key) => {
            let start = ctx.position();
            if !exec(arc, a, ctx) {
                return false;
            }
            match &key {
                Some(k) => ctx.add_named_match(k, start),
                None => ctx.add_unnamed_extract(start),
            }
            true
        }
        NodeKind::Ref(RefTarget::Unbound) => false,
        NodeKind::Ref(RefTarget::Local(target)) => exec(arc, target, ctx),
        NodeKind::Ref(RefTarget::External(other_arc, other_id)) => {
            exec(&other_arc, other_id, ctx)
        }
        NodeKind::CaseModifier(on) => {
            ctx.flags_mut().set(crate::flags::Flags::CASE_INSENSITIVE, on);
            true
        }
        NodeKind::SetVar(k, v) => {
            ctx.set_var(&k, &v);
            true
        }
        NodeKind::DelVar(k) => {
            ctx.del_var(&k);
            true
        }
        NodeKind::If(k, v) => ctx.get_var(&k) == Some(v.as_str()),
        NodeKind::IfMatched(key, min, max) => {
            let count = ctx.matches().count(&key);
            count >= min && count <= max
        }
        NodeKind::Never => false,
    }
}
