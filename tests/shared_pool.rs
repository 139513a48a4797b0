use chunkpool::{BatchMapper, Error, WorkerPool, apply};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_batches_on_one_pool() {
    let pool = Arc::new(WorkerPool::new(4).expect("Pool creation failed"));

    let callers: Vec<_> = (0..6u64)
        .map(|caller| {
            let pool = pool.clone();
            thread::spawn(move || {
                let mapper = BatchMapper::with_pool(&pool);
                for round in 0..20u64 {
                    let items: Vec<u64> = (0..50).collect();
                    let offset = caller * 1000 + round;
                    let result = mapper
                        .apply(move |x: &u64| x + offset, items, 4)
                        .expect("Batch failed");
                    let expected: Vec<u64> = (0..50).map(|x| x + offset).collect();
                    assert_eq!(result, expected);
                }
            })
        })
        .collect();

    for handle in callers {
        handle.join().expect("caller panicked");
    }
    assert!(!pool.is_closed());
}

#[test]
fn test_batch_larger_than_pool() {
    // More chunks than workers: the extra chunks wait in the queue.
    let pool = WorkerPool::new(2).expect("Pool creation failed");
    let result = apply(|x: &u32| x * 2, (0..100).collect::<Vec<u32>>(), 10, Some(&pool))
        .expect("Batch failed");
    assert_eq!(result, (0..100).map(|x| x * 2).collect::<Vec<_>>());
    pool.join().expect("Shutdown failed");
}

#[test]
fn test_closed_pool_rejects_even_empty_input() {
    let pool = WorkerPool::new(1).expect("Pool creation failed");
    pool.close();
    let result = apply(|x: &u32| *x, Vec::<u32>::new(), 1, Some(&pool));
    assert!(matches!(result, Err(Error::PoolClosed)));
}
