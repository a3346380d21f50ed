//! Logging shim.
//!
//! Forwards to `defmt` on hardware builds and `tracing` on host builds. With
//! neither feature enabled the arguments are still borrowed so that call
//! sites type-check and do not trigger unused-variable warnings.
#![macro_use]
#![allow(unused_macros)]

macro_rules! log_with {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::$level!($s $(, $x)*);
            #[cfg(all(feature = "tracing", not(feature = "defmt")))]
            ::tracing::$level!($s $(, $x)*);
            #[cfg(not(any(feature = "defmt", feature = "tracing")))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! trace {
    ($($t:tt)*) => { log_with!(trace, $($t)*) };
}

macro_rules! debug {
    ($($t:tt)*) => { log_with!(debug, $($t)*) };
}

macro_rules! info {
    ($($t:tt)*) => { log_with!(info, $($t)*) };
}

macro_rules! warn {
    ($($t:tt)*) => { log_with!(warn, $($t)*) };
}

macro_rules! error {
    ($($t:tt)*) => { log_with!(error, $($t)*) };
}
