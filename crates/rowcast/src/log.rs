//! Internal logging macros.
//!
//! With the `tracing` feature these forward to `tracing` events; without it they
//! expand to nothing (arguments are not evaluated).

macro_rules! rowcast_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            ::tracing::debug!($($arg)*);
        }
    }};
}

macro_rules! rowcast_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            ::tracing::warn!($($arg)*);
        }
    }};
}

pub(crate) use rowcast_debug;
pub(crate) use rowcast_warn;
