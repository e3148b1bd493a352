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


    /// Outside of loom, a "model" just runs the test once with tracing
    /// enabled.
    #[cfg(test)]
    pub(crate) fn model(f: impl FnOnce()) {
        let _trace = crate::util::test::trace_init();
        let _span = tracing::info_span!(
            "test",
            message = std::thread::current().name().unwrap_or("<unnamed>")
        )
        .entered();
        tracing::info!("started test...");
        f();
        tracing::info!("test completed successfully!");
    }
}
