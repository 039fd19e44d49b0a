//! A PEG-like combinator parsing engine over Unicode text.
//!
//! Rules are small matching primitives — `Is`, `In`, `Between`, `Any`, and friends
//! — composed with operators (sequence, ordered/greedy choice, negation,
//! lookahead/lookbehind, repetition, capture, recursion) into a rule graph, then
//! applied to an input through [`driver::test`], [`driver::search`],
//! [`driver::match_`], [`driver::replace`], or [`driver::split`].
//!
//! ```
//! use stringozzi::prelude::*;
//!
//! let digits = Rule::between('0', '9').repeat(1, usize::MAX);
//! assert!(driver::test(&digits, b"12345", Flags::NONE));
//! ```

#[macro_use]
pub(crate) mod log;

pub mod ctx;
pub mod decode;
pub mod derived;
pub mod driver;
pub mod err;
pub mod flags;
pub mod node;
pub mod rule;
pub mod span;

/// Common imports for building and running rules.
pub mod prelude {
    pub use crate::ctx::{Context, Utf16Context, Utf32Context, Utf8Context};
    pub use crate::driver;
    pub use crate::flags::Flags;
    pub use crate::rule::Rule;
}
