//! Fixed-size blocking worker-thread pool with per-task result handles
//!
//! # Features
//! - FIFO task queue shared by all workers, one lock + condvars
//! - Generic submission: any `FnOnce() -> T` yields a `TaskHandle<T>`
//! - Per-task expiry: stale tasks resolve as `Expired`, never run
//! - Panics captured into the handle, never swallowed
//! - Completion barrier with optional timeout (`wait_for_all_done`)
//! - Restartable `init`/`start`/`stop` lifecycle, stop-on-drop

pub mod clock;
pub mod errors;
pub mod handle;
pub mod model;
pub mod pool;
pub mod result;

pub use clock::{now_ms, Clock, SystemClock};
pub use errors::SpawnError;
pub use handle::TaskHandle;
pub use model::PoolMetrics;
pub use pool::ThreadPool;
pub use result::SpawnResult;
