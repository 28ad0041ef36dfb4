use super::{
    clock::{Clock, SystemClock},
    handle::{Task, TaskHandle},
    model::PoolMetrics,
};
use std::{
    collections::VecDeque,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use log::{debug, trace};
use parking_lot::{Condvar, Mutex};

/// Everything the workers and the barrier agree on, under one lock.
///
/// The queue, the termination flag and the in-flight counter must only ever
/// be read or written together: the completion barrier's predicate is
/// "queue empty AND nothing in flight", and a task popped off the queue has
/// to become in-flight in the same critical section or the barrier could
/// observe a moment where the task is counted nowhere.
struct PoolState {
    queue: VecDeque<Task>,
    terminating: bool,
    in_flight: usize,
    completed: usize,
    expired: usize,
}

struct Shared {
    state: Mutex<PoolState>,
    /// Woken once per enqueue, broadcast on termination.
    work_available: Condvar,
    /// Broadcast whenever the pool goes quiescent. Kept separate from
    /// `work_available` so an enqueue's notify_one cannot be eaten by a
    /// barrier waiter while a worker sleeps on.
    all_done: Condvar,
    clock: Arc<dyn Clock>,
}

impl Shared {
    fn enqueue(&self, task: Task) {
        let mut state = self.state.lock();
        state.queue.push_back(task);
        self.work_available.notify_one();
    }

    /// Blocks until a task is available or the pool is terminating.
    /// Termination wins: once the flag is set this returns `None` even if
    /// tasks remain queued.
    fn dequeue(&self) -> Option<Task> {
        let mut state = self.state.lock();
        while state.queue.is_empty() && !state.terminating {
            self.work_available.wait(&mut state);
        }
        if state.terminating {
            return None;
        }
        let task = state.queue.pop_front();
        if task.is_some() {
            state.in_flight += 1;
        }
        task
    }

    fn task_finished(&self, expired: bool) {
        let mut state = self.state.lock();
        state.in_flight -= 1;
        if expired {
            state.expired += 1;
        } else {
            state.completed += 1;
        }
        if state.in_flight == 0 && state.queue.is_empty() {
            self.all_done.notify_all();
        }
    }

    fn quiescent(state: &PoolState) -> bool {
        state.queue.is_empty() && state.in_flight == 0
    }
}

fn worker_loop(shared: &Shared, id: usize) {
    debug!("worker {id} started");
    while let Some(task) = shared.dequeue() {
        let expired = task.is_expired(shared.clock.now_ms());
        if expired {
            debug!("worker {id}: task expired before pickup, resolving as expired");
        } else {
            trace!("worker {id}: picked up a task");
        }
        task.run(expired);
        shared.task_finished(expired);
    }
    debug!("worker {id} exiting");
}

/// Fixed-size pool of OS worker threads sharing one FIFO task queue.
///
/// Lifecycle is `init` → `start` → (`submit` / `wait_for_all_done`) →
/// `stop`; dropping the pool stops it. `stop` abandons queued tasks: their
/// handles resolve `Err(Dropped)` rather than executing.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
    thread_num: usize,
}

impl ThreadPool {
    /// Pool sized to the machine's logical CPU count, wall-clock expiry.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Pool with an injected time source for expiry evaluation.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        ThreadPool {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    queue: VecDeque::new(),
                    terminating: false,
                    in_flight: 0,
                    completed: 0,
                    expired: 0,
                }),
                work_available: Condvar::new(),
                all_done: Condvar::new(),
                clock,
            }),
            workers: Vec::new(),
            thread_num: num_cpus::get(),
        }
    }

    /// Sets the worker count. `false` if the pool is already running.
    pub fn init(&mut self, num: usize) -> bool {
        if !self.workers.is_empty() {
            return false;
        }
        self.thread_num = num;
        true
    }

    /// Spawns the workers. `false` if the pool is already running.
    pub fn start(&mut self) -> bool {
        if !self.workers.is_empty() {
            return false;
        }
        for id in 0..self.thread_num {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("taskpool-worker-{id}"))
                .spawn(move || worker_loop(&shared, id));
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    debug!("failed to spawn worker {id}: {e}");
                    self.stop();
                    return false;
                }
            }
        }
        debug!("pool started with {} workers", self.thread_num);
        true
    }

    /// Stops all workers and joins them. Idempotent.
    ///
    /// Queued-but-unstarted tasks are abandoned; dropping them resolves
    /// their handles with `Err(Dropped)`. The termination flag is reset
    /// afterwards, so a stopped pool can be started again.
    pub fn stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        {
            let mut state = self.shared.state.lock();
            state.terminating = true;
            self.shared.work_available.notify_all();
            self.shared.all_done.notify_all();
        }
        // The lock must not be held across join: a worker finishing its last
        // task needs it for the final all_done notification.
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        let mut state = self.shared.state.lock();
        state.queue.clear();
        state.terminating = false;
        self.shared.all_done.notify_all();
        debug!("pool stopped");
    }

    /// Submits `f` with no expiry; returns immediately with the handle the
    /// result will arrive on.
    pub fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit_timeout(0, f)
    }

    /// Submits `f` with an expiry `timeout_ms` from now (`0` = no expiry).
    /// A task still queued past its expiry is not executed; its handle
    /// resolves `Err(Expired)`.
    pub fn submit_timeout<F, T>(&self, timeout_ms: i64, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let expire_time = if timeout_ms == 0 {
            0
        } else {
            self.shared.clock.now_ms() + timeout_ms
        };
        let (task, handle) = Task::bind(expire_time, f);
        self.shared.enqueue(task);
        handle
    }

    /// Blocks until no task is queued or executing.
    ///
    /// A negative `timeout_ms` waits forever and returns `true`; otherwise
    /// returns whether quiescence was reached within the timeout. Concurrent
    /// submitters can enqueue again the instant this returns; callers
    /// needing a strict barrier must quiesce their producers first.
    pub fn wait_for_all_done(&self, timeout_ms: i64) -> bool {
        let mut state = self.shared.state.lock();
        if timeout_ms < 0 {
            while !Shared::quiescent(&state) {
                self.shared.all_done.wait(&mut state);
            }
            return true;
        }
        let deadline = Instant::now() + Duration::from_millis(timeout_ms as u64);
        while !Shared::quiescent(&state) {
            if self
                .shared
                .all_done
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return Shared::quiescent(&state);
            }
        }
        true
    }

    /// Number of live worker threads.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of tasks waiting in the queue (excludes in-flight ones).
    pub fn queue_depth(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn metrics(&self) -> PoolMetrics {
        let state = self.shared.state.lock();
        PoolMetrics {
            threads: self.workers.len(),
            queued_tasks: state.queue.len(),
            in_flight: state.in_flight,
            completed_tasks: state.completed,
            expired_tasks: state.expired,
        }
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop();
    }
}
