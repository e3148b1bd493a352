#[allow(unused_imports)]
pub(crate) use self::inner::*;

#[cfg(loom)]
mod inner {
    #![allow(unused_imports)]
    pub(crate) use loom::{model, thread};

    pub(crate) mod sync {
        pub(crate) use loom::sync::*;
    }
}

#[cfg(not(loom))]
mod inner {
    #![allow(dead_code, unused_imports)]

    pub(crate) mod sync {
        pub(crate) use std::sync::*;
    }

    #[cfg(test)]
    pub(crate) mod thread {
        pub(crate) use std::thread::{sleep, yield_now, JoinHandle};

        pub(crate) fn spawn<F, T>(f: F) -> JoinHandle<T>
        where
            F: FnOnce() -> T + Send + 'static,
            T: Send + 'static,
        {
            let dispatch = tracing::Dispatch::default();
            let span = tracing::Span::current();
            std::thread::spawn(move || {
                let _tracing = tracing::dispatcher::set_default(&dispatch);
                let _span = tracing::info_span!(parent: span, "thread").entered();
                test_trace!("thread spawned");
                f()
            })
        }
    }

    #[cfg(test)]
    pub(crate) fn model(f: impl FnOnce()) {
        let _trace = crate::util::test::trace_init();
        f()
    }
}
