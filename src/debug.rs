// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Errors and redactable logging.
//!
//! Every fallible `tkrand` operation returns a [`crate::Result`], whose error
//! wraps a module-specific enum. Errors are created with `fail!` or `check!`,
//! both of which log the error as it is created.
//!
//! The `trace!`, `info!`, `warn!` and `error!` macros forward to the `log`
//! crate when the `log` feature is enabled, and expand to nothing otherwise.
//! Code outside this module logs only through them.
//!
//! The signing key and the CDI are never formatted, and random output is only
//! ever logged at `trace` level.

#![allow(unused)]

/// A `tkrand` error, wrapping a module-specific error `E`.
///
/// Values are only created inside the crate, through `fail!` and `check!`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Error<E> {
    inner: E,
}

impl<E> Error<E> {
    #[doc(hidden)]
    pub fn __new(inner: E) -> Self {
        Self { inner }
    }

    /// Converts the wrapped error into a wider one.
    pub(crate) fn cast<F: From<E>>(self) -> Error<F> {
        Error {
            inner: self.inner.into(),
        }
    }

    /// Gets the wrapped error.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

/// Implements `From<Error<F>> for Error<E>` for each listed `F`.
///
/// A blanket impl over `E: From<F>` would overlap with `From<T> for T`, so
/// every error enum with `From` impls lists its sources here.
macro_rules! debug_from {
    ($e:ty => $($f:ty),+ $(,)?) => {$(
        impl From<$crate::Error<$f>> for $crate::Error<$e> {
            fn from(e: $crate::Error<$f>) -> Self {
                e.cast()
            }
        }
    )*};
}

/// Returns the given error from the current function unless `$cond` holds.
macro_rules! check {
    ($cond:expr, $error:expr) => {
        if !$cond {
            let error = $error;
            fail!(
                error,
                "check failure: `{}`; returned {:?}",
                stringify!($cond),
                error,
            )?;
        }
    };
}

/// Logs a new error and evaluates to `Err` of it.
///
/// Use it as `return fail!(MyError)`, or with `?`.
macro_rules! fail {
    ($error:expr, $($format:tt)+) => {{
        error!($($format)+);
        Err($crate::debug::Error::__new($error))
    }};
    ($error:expr) => {{
        let error = $error;
        error!("generated error: `{:?}`", error);
        Err($crate::debug::Error::__new(error))
    }};
}

/// Logs at `trace` level when the `log` feature is enabled.
macro_rules! trace {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::trace!($($args)*);
    }
}

/// Logs at `info` level when the `log` feature is enabled.
macro_rules! info {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::info!($($args)*);
    }
}

/// Logs at `warn` level when the `log` feature is enabled.
macro_rules! warn {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::warn!($($args)*);
    }
}

/// Logs at `error` level when the `log` feature is enabled.
macro_rules! error {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::error!($($args)*);
    }
}

/// Installs a stderr logger before any test runs.
#[cfg(test)]
#[ctor::ctor]
fn init_test_logger() {
    env_logger::builder()
        .format(move |_, record| {
            use std::io::Write;

            let thread = std::thread::current();
            let name = thread.name().unwrap_or("<unknown>");
            for line in record.args().to_string().trim().lines() {
                // Captured by the test harness for passing tests.
                eprintln!(
                    "[{level}({thread}) {file}:{line}] {msg}",
                    level = record.level(),
                    thread = name,
                    file = record.file().unwrap_or("<unknown>"),
                    line = record.line().unwrap_or(0),
                    msg = line,
                )
            }
            Ok(())
        })
        .init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Inner {
        Bad,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Outer {
        Inner(Inner),
    }

    impl From<Inner> for Outer {
        fn from(e: Inner) -> Self {
            Outer::Inner(e)
        }
    }

    debug_from!(Outer => Inner);

    fn checked(ok: bool) -> crate::Result<u8, Inner> {
        check!(ok, Inner::Bad);
        Ok(5)
    }

    fn outer(ok: bool) -> crate::Result<u8, Outer> {
        Ok(checked(ok)?)
    }

    #[test]
    fn check_and_cast() {
        assert_eq!(checked(true), Ok(5));
        assert_eq!(checked(false).unwrap_err().into_inner(), Inner::Bad);
        assert_eq!(
            outer(false).unwrap_err().into_inner(),
            Outer::Inner(Inner::Bad)
        );
    }
}
