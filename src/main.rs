use taskpool::ThreadPool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

fn main() {
    env_logger::init();

    let mut pool = ThreadPool::new();
    pool.init(8);
    pool.start();

    let now = Instant::now();
    let sum = Arc::new(AtomicU64::new(0));
    for i in 0..1_000_000u64 {
        let sum = Arc::clone(&sum);
        pool.submit(move || {
            sum.fetch_add(i, Ordering::Relaxed);
        });
    }
    pool.wait_for_all_done(-1);
    println!("sum: {}", sum.load(Ordering::Relaxed));
    println!("elapsed: {:?}", now.elapsed());

    let handle = pool.submit(|| 21 * 2);
    println!("answer: {:?}", handle.wait());

    pool.stop();
}
