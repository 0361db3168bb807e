//! Background task spawning
//!
//! Network work (tiles, data files, weather) runs off the UI thread. With the
//! `tokio-runtime` feature tasks go to the ambient tokio runtime; without it,
//! or when no runtime is entered, each task gets its own thread.

use crate::prelude::{Future, Pin};

/// Handle to a spawned async task
pub struct TaskHandle {
    inner: HandleInner,
}

enum HandleInner {
    #[cfg(feature = "tokio-runtime")]
    Tokio(::tokio::task::JoinHandle<()>),
    Thread(std::thread::JoinHandle<()>),
}

impl TaskHandle {
    /// Check if the task is finished
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            #[cfg(feature = "tokio-runtime")]
            HandleInner::Tokio(handle) => handle.is_finished(),
            HandleInner::Thread(handle) => handle.is_finished(),
        }
    }

    /// Aborts a tokio task; thread-backed tasks run to completion
    pub fn cancel(&self) {
        match &self.inner {
            #[cfg(feature = "tokio-runtime")]
            HandleInner::Tokio(handle) => handle.abort(),
            HandleInner::Thread(_) => {}
        }
    }
}

/// Spawns a fire-and-forget task; results travel back over channels
pub fn spawn<F>(future: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let future: Pin<Box<dyn Future<Output = ()> + Send>> = Box::pin(future);

    #[cfg(feature = "tokio-runtime")]
    if let Ok(handle) = ::tokio::runtime::Handle::try_current() {
        return TaskHandle {
            inner: HandleInner::Tokio(handle.spawn(future)),
        };
    }

    log::debug!("no async runtime entered, running task on a dedicated thread");
    TaskHandle {
        inner: HandleInner::Thread(std::thread::spawn(move || {
            futures::executor::block_on(future)
        })),
    }
}
