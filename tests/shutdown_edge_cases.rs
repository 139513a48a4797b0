use chunkpool::{Counter, Error, PoolState, Task, WorkerPool};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn test_close_during_task_execution() {
    let pool = WorkerPool::new(2).expect("Pool creation failed");
    let finished = Arc::new(AtomicUsize::new(0));

    // Submit multiple tasks that take some time
    for _ in 0..10 {
        let finished = finished.clone();
        pool.submit(Task::new(move || {
            thread::sleep(Duration::from_millis(10));
            finished.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("Submit failed");
    }

    // Close immediately; queued tasks are ahead of the sentinels
    pool.close();
    let result = pool.join();
    assert!(result.is_ok(), "Shutdown should succeed after tasks complete");
    assert_eq!(finished.load(Ordering::SeqCst), 10);
}

#[test]
fn test_close_returns_without_waiting() {
    let pool = WorkerPool::new(1).expect("Pool creation failed");
    let counter = pool
        .run(|| thread::sleep(Duration::from_millis(200)))
        .expect("Submit failed");

    let start = std::time::Instant::now();
    pool.close();
    assert!(start.elapsed() < Duration::from_millis(150));
    assert_eq!(pool.state(), PoolState::Closed);

    // The running task was not interrupted.
    counter.wait();
    pool.join().expect("Shutdown failed");
}

#[test]
fn test_no_submission_accepted_after_close() {
    let pool = Arc::new(WorkerPool::new(2).expect("Pool creation failed"));
    let accepted_after_close = Arc::new(AtomicUsize::new(0));

    let submitters: Vec<_> = (0..4)
        .map(|_| {
            let pool = pool.clone();
            let accepted_after_close = accepted_after_close.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let closed_before = pool.is_closed();
                    match pool.submit(Task::new(|| {})) {
                        Ok(()) if closed_before => {
                            accepted_after_close.fetch_add(1, Ordering::SeqCst);
                        }
                        Ok(()) => {}
                        Err(Error::PoolClosed) => {}
                        Err(other) => panic!("unexpected error: {}", other),
                    }
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(1));
    pool.close();

    for handle in submitters {
        handle.join().expect("submitter panicked");
    }
    assert_eq!(accepted_after_close.load(Ordering::SeqCst), 0);
    assert!(matches!(pool.submit(Task::new(|| {})), Err(Error::PoolClosed)));
}

#[test]
fn test_dropping_pool_closes_it() {
    let counter = Counter::new(1);
    {
        let pool = WorkerPool::new(1).expect("Pool creation failed");
        pool.submit(Task::with_counter(
            || thread::sleep(Duration::from_millis(20)),
            counter.clone(),
        ))
        .expect("Submit failed");
    }
    // Dropped pools still drain what was queued before the sentinels.
    counter.wait();
    assert!(counter.is_complete());
}
