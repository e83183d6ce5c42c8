//! The shared runtime driving the crate's asynchronous internals.
//!
//! Callers of this crate are synchronous; socket operations `block_on` the
//! runtime from the calling thread and resolver backends `spawn` onto it.
//! Driving the crate from inside another async executor is unsupported.

use once_cell::sync::Lazy;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("netbind-runtime")
        .enable_all()
        .build()
        .expect("failed to build netbind runtime")
});

pub(crate) fn global() -> &'static Runtime {
    &RUNTIME
}
