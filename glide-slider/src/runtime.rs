use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn shared() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("glide-commit")
            .enable_all()
            // Only fails when the OS refuses the worker thread. Slider
            // construction has no error channel for that, and without a
            // runtime no commit could ever be delivered.
            .build()
            .expect("failed to build the slider commit runtime")
    })
}

/// Picks the runtime commit and settle tasks are spawned on: the explicit
/// handle, else the ambient runtime, else a lazily built shared one.
pub(crate) fn resolve(explicit: Option<&Handle>) -> Handle {
    explicit
        .cloned()
        .or_else(|| Handle::try_current().ok())
        .unwrap_or_else(|| shared().handle().clone())
}
