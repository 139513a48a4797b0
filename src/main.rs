use chunkpool::{Reducer, WorkerPool};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("chunkpool - chunked parallel map and reduce\n");

    let num_threads = 4;
    let pool = match WorkerPool::new(num_threads) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to start worker pool: {}", e);
            std::process::exit(1);
        }
    };
    println!("Initialized worker pool with {} worker threads\n", num_threads);

    if let Err(e) = run_examples(&pool) {
        eprintln!("Example failed: {}", e);
    }

    println!("Shutting down worker pool...");
    match pool.join() {
        Ok(()) => println!("Done!"),
        Err(count) => eprintln!("{} worker thread(s) panicked", count),
    }
}

fn run_examples(pool: &WorkerPool) -> chunkpool::Result<()> {
    let reducer = Reducer::with_pool(pool);

    println!("Example 1: Concatenation");
    let text = reducer.concatenate(3, vec!["a", "b", "c", "d", "e"])?;
    println!("  concatenate(3, [a..e]) = {:?}\n", text);

    println!("Example 2: Maximum and minimum");
    let values = vec![5, 3, 9, 1];
    let max = reducer.maximum(2, values.clone(), |a: &i32, b: &i32| a.cmp(b))?;
    let min = reducer.minimum(2, values, |a: &i32, b: &i32| a.cmp(b))?;
    println!("  maximum = {}, minimum = {}\n", max, min);

    println!("Example 3: Filter");
    let evens = reducer.filter(4, vec![1, 2, 3, 4, 5, 6], |x: &i32| x % 2 == 0)?;
    println!("  evens = {:?}\n", evens);

    println!("Example 4: Empty input");
    match reducer.maximum(1, Vec::<i32>::new(), |a: &i32, b: &i32| a.cmp(b)) {
        Ok(v) => println!("  unexpected maximum {}\n", v),
        Err(e) => println!("  maximum([]) -> {}\n", e),
    }

    println!("Example 5: Throughput");
    let n = 1_000_000u64;
    let start = Instant::now();
    let squares = reducer.transform(pool.size(), (0..n).collect::<Vec<_>>(), |x: &u64| x * x)?;
    let all_even_squares = reducer.all_match(pool.size(), squares.clone(), |x: &u64| x % 2 == 0)?;
    let duration = start.elapsed();
    println!("  Mapped {} elements in {:?}", squares.len(), duration);
    println!("  All squares even: {}\n", all_even_squares);

    Ok(())
}
