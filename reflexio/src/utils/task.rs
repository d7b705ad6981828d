//! Defines the Reflexio runtime task runner.
use std::future::Future;

use log::error;
use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{AbortHandle, JoinHandle};

use crate::errors::{Error, RuntimeError, Unknown};

/// Represents the result of a task.
/// A task may return either `()` or `Result<(), Error>` for flexibility; both are
/// converted to a `TaskResult` when the task completes.
pub enum TaskResult {
    Ok,
    Err(Error),
}

/// Handler to a running task: lets the owner abort it.
pub type TaskHandler = AbortHandle;

/// Globally accessible sender toward the runtime (installed by `#[reflexio::runtime]`).
pub static SENDER: RwLock<Option<UnboundedSender<JoinHandle<()>>>> = RwLock::new(None);

impl From<Result<(), Error>> for TaskResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(_) => TaskResult::Ok,
            Err(e) => TaskResult::Err(e),
        }
    }
}

impl From<()> for TaskResult {
    fn from(_: ()) -> Self {
        TaskResult::Ok
    }
}

/// Runs a given future as a Tokio task while ensuring the main function (marked by
/// `#[reflexio::runtime]`) will not finish before all running tasks are done.
///
/// This is done through the globally accessible [`SENDER`] channel: a monitor handle for
/// each task is communicated to the runtime, which drains them all before exiting. Aborted
/// tasks resolve their monitor as well, so aborting never blocks the runtime.
///
/// # Errors
/// Returns [`RuntimeError`] when called outside a `#[reflexio::runtime]` function, or an
/// error if sending the monitor handle to the runtime fails.
///
/// # Example
/// ```
/// use reflexio::utils::task;
///
/// #[reflexio::runtime]
/// async fn main() {
///     task::run(async move {
///         // whatever
///     }).expect("Task spawned");
/// }
/// ```
pub fn run<F, T>(future: F) -> Result<TaskHandler, Error>
where
    F: Future<Output = T> + Send + 'static,
    T: Into<TaskResult> + Send + 'static,
{
    let guard = SENDER.read();
    let sender = guard.as_ref().ok_or(RuntimeError)?;

    let inner = tokio::task::spawn(async move {
        if let TaskResult::Err(err) = future.await.into() {
            error!("Task failed: {}", err);
        }
    });
    let handler = inner.abort_handle();

    // The monitor completes whether the task finishes or gets aborted.
    let monitor = tokio::task::spawn(async move {
        let _ = inner.await;
    });

    sender.send(monitor).map_err(|err| Unknown {
        info: err.to_string(),
    })?;

    Ok(handler)
}

#[macro_export]
macro_rules! pause {
    ($ms:expr) => {
        tokio::time::sleep(tokio::time::Duration::from_millis($ms as u64)).await
    };
}

#[macro_export]
macro_rules! pause_sync {
    ($ms:expr) => {
        std::thread::sleep(std::time::Duration::from_millis($ms as u64))
    };
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU8, Ordering};
    use std::sync::Arc;
    use std::time::SystemTime;

    use crate::errors::{Error, Unknown};
    use crate::utils::task;

    #[reflexio_macros::runtime]
    async fn my_runtime() -> Result<(), Error> {
        task::run(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            task::run(async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            })?;
            Ok(())
        })?;

        task::run(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
        })?;

        Ok(())
    }

    // Serialized by hand: the runtime installs the global SENDER.
    #[test]
    #[serial_test::serial]
    fn test_task_parallel_execution() {
        // Tasks should be parallel and the function should block until all are done.
        // Therefore `my_runtime()` should take more time than the longest task, but
        // less than the sum of task times.
        let start = SystemTime::now();
        my_runtime().unwrap();
        let end = SystemTime::now();

        let duration = end.duration_since(start).unwrap().as_millis();
        assert!(
            duration >= 500,
            "Duration should be greater than 500ms (found: {})",
            duration,
        );
        assert!(
            duration < 1500,
            "Duration should be lower than 1500ms (found: {})",
            duration,
        );
    }

    #[reflexio_macros::test]
    async fn test_task_abort_execution() {
        let flag = Arc::new(AtomicU8::new(0));
        let flag_clone = flag.clone();

        // Increment the flag after 100ms.
        task::run(async move {
            pause!(100);
            flag_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("Should not panic");

        // The flag should not have been incremented before the 100ms elapsed.
        pause!(50);
        assert_eq!(
            flag.load(Ordering::SeqCst),
            0,
            "Flag should not be updated by the task before 100ms",
        );

        // The flag should have been incremented after the 100ms elapsed.
        pause!(100);
        assert_eq!(
            flag.load(Ordering::SeqCst),
            1,
            "Flag should be updated by the task after 100ms",
        );

        // ######################
        // Same test but aborting
        let flag_clone = flag.clone();

        let handler = task::run(async move {
            pause!(100);
            flag_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("Should not panic");

        pause!(50);
        assert_eq!(
            flag.load(Ordering::SeqCst),
            1,
            "Flag should not be updated by the task before 100ms",
        );

        // Abort the task.
        handler.abort();

        // The flag should not have been incremented after the 100ms elapsed.
        pause!(100);
        assert_eq!(
            flag.load(Ordering::SeqCst),
            1,
            "Flag should not be updated by an aborted task",
        );
    }

    #[reflexio_macros::test]
    async fn test_task_with_result() {
        let task = task::run(async move { Ok(()) });

        assert!(task.is_ok(), "An Ok(()) task does not panic the runtime");

        let task = task::run(async move {
            return Err(Unknown {
                info: "wow panic!".to_string(),
            });
        });

        assert!(task.is_ok(), "A failing task does not panic the runtime");
    }
}
