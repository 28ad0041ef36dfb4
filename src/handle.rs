use super::{
    errors::SpawnError,
    result::SpawnResult,
};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::Duration,
};
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};

type Job = Box<dyn FnOnce(bool) + Send + 'static>;

/// One queued unit of work: a boxed closure plus its absolute expiry time.
///
/// The closure is invoked exactly once by the worker that dequeues the task,
/// with a flag saying whether the expiry already passed. Either way it
/// resolves the paired [`TaskHandle`]: with the callable's result, with
/// `Err(Panic)` if the callable panicked, or with `Err(Expired)` without
/// running the callable at all.
pub struct Task {
    expire_time: i64,
    job: Job,
}

impl Task {
    /// Binds `f` into a task expiring at `expire_time` (`0` = never) and
    /// returns it together with the handle its result will arrive on.
    pub(crate) fn bind<F, T>(expire_time: i64, f: F) -> (Task, TaskHandle<T>)
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let job: Job = Box::new(move |expired: bool| {
            if expired {
                let _ = tx.send(Err(SpawnError::Expired));
                return;
            }
            let result = panic::catch_unwind(AssertUnwindSafe(f))
                .map_err(|payload| SpawnError::Panic(panic_message(payload.as_ref())));
            // Receiver may already be gone; the caller is free to drop the handle.
            let _ = tx.send(result);
        });
        (Task { expire_time, job }, TaskHandle { receiver: rx })
    }

    pub(crate) fn is_expired(&self, now_ms: i64) -> bool {
        self.expire_time != 0 && self.expire_time < now_ms
    }

    pub(crate) fn run(self, expired: bool) {
        (self.job)(expired)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Handle to a submitted task's eventual result.
///
/// Single-producer cell written exactly once by the executing worker. Reads
/// block until the worker writes; if the task is abandoned (pool stopped or
/// dropped before execution) reads yield `Err(Dropped)` instead of blocking
/// forever.
pub struct TaskHandle<T> {
    receiver: Receiver<SpawnResult<T>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task resolves.
    pub fn wait(self) -> SpawnResult<T> {
        self.receiver.recv().unwrap_or(Err(SpawnError::Dropped))
    }

    /// Blocks at most `timeout`; `Err(Timeout)` if the task has not resolved.
    pub fn wait_timeout(self, timeout: Duration) -> SpawnResult<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(SpawnError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(SpawnError::Dropped),
        }
    }

    /// Non-blocking probe; `None` while the task is still pending or running.
    pub fn try_wait(&self) -> Option<SpawnResult<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SpawnError::Dropped)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_task_resolves_without_running() {
        let (task, handle) = Task::bind(5, || -> u32 { unreachable!("must not run") });
        assert!(task.is_expired(10));
        task.run(true);
        assert_eq!(handle.wait(), Err(SpawnError::Expired));
    }

    #[test]
    fn zero_expiry_never_expires() {
        let (task, handle) = Task::bind(0, || 7);
        assert!(!task.is_expired(i64::MAX));
        task.run(false);
        assert_eq!(handle.wait(), Ok(7));
    }

    #[test]
    fn panic_is_captured_into_handle() {
        let (task, handle) = Task::bind(0, || -> u32 { panic!("boom") });
        task.run(false);
        assert_eq!(handle.wait(), Err(SpawnError::Panic("boom".into())));
    }

    #[test]
    fn dropped_sender_reads_as_dropped() {
        let (task, handle) = Task::bind::<_, u32>(0, || 1);
        drop(task);
        assert_eq!(handle.wait(), Err(SpawnError::Dropped));
    }
}
