#[cfg(feature = "tracing")]
pub(crate) use tracing::trace as stz_trace;

#[cfg(feature = "tracing")]
pub(crate) use tracing::warn as stz_warn;

#[cfg(all(feature = "log", not(feature = "tracing")))]
pub(crate) use log::trace as stz_trace;

#[cfg(all(feature = "log", not(feature = "tracing")))]
pub(crate) use log::warn as stz_warn;

#[cfg(not(any(feature = "log", feature = "tracing")))]
#[macro_use]
pub(crate) mod inner_log {
    #[macro_export]
    macro_rules! stz_trace {
        ($($arg:tt)*) => {
            ()
        };
    }

    #[macro_export]
    macro_rules! stz_warn {
        ($($arg:tt)*) => {
            ()
        };
    }
}

#[cfg(not(any(feature = "log", feature = "tracing")))]
pub(crate) use stz_trace;
#[cfg(not(any(feature = "log", feature = "tracing")))]
pub(crate) use stz_warn;

/// Traces a single dispatch of a node's `check`, mirroring the teacher's
/// `trace_retval!`/`debug_beg!` shims: a no-op unless `log`/`tracing` is enabled.
macro_rules! trace_check {
    ($kind:expr, $pos:expr, $ret:expr) => {{
        let ret = $ret;
        $crate::stz_trace!("check {:?} at {} -> {}", $kind, $pos, ret);
        ret
    }};
}

pub(crate) use trace_check;
