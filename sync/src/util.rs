//! Internal utilities: tracing macros and test helpers.

#[cfg(any(test, feature = "tracing", loom))]
macro_rules! trace {
    ($($t:tt)*) => { tracing::trace!($($t)*) }
}

#[cfg(not(any(test, feature = "tracing", loom)))]
macro_rules! trace {
    ($($t:tt)*) => {};
}

#[cfg(not(test))]
macro_rules! test_dbg {
    ($e:expr) => {
        $e
    };
}

#[cfg(test)]
macro_rules! test_dbg {
    ($e:expr) => {
        match $e {
            e => {
                tracing::debug!(
                    location = %core::panic::Location::caller(),
                    "{} = {:?}",
                    stringify!($e),
                    &e
                );
                e
            }
        }
    };
}

#[cfg(not(test))]
macro_rules! enter_test_debug_span {
    ($($args:tt)+) => {};
}

#[cfg(test)]
macro_rules! enter_test_debug_span {
    ($($args:tt)+) => {
        let _span = tracing::debug_span!($($args)+).entered();
    };
}

macro_rules! loom_const_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident($($arg:ident: $T:ty),*) -> $Ret:ty $body:block
    ) => {
        $(#[$meta])*
        #[cfg(not(loom))]
        $vis const fn $name($($arg: $T),*) -> $Ret $body

        $(#[$meta])*
        #[cfg(loom)]
        $vis fn $name($($arg: $T),*) -> $Ret $body
    }
}

pub(crate) mod fmt {
    #[allow(unused_imports)]
    pub(crate) use core::fmt::*;

    /// Formats a value using its [`Pointer`] implementation.
    #[cfg(any(test, feature = "tracing", loom))]
    #[inline]
    #[must_use]
    pub(crate) fn ptr<T: Pointer>(value: T) -> impl Debug {
        struct Ptr<T>(T);
        impl<T: Pointer> Debug for Ptr<T> {
            fn fmt(&self, f: &mut Formatter<'_>) -> Result {
                Pointer::fmt(&self.0, f)
            }
        }
        Ptr(value)
    }
}
