use std::sync::Arc;
use std::time::Instant;

use enriched_log::noop_sink::NoopSink;
use enriched_log::{error_with_stack, log_entry, Logger, RequestContext};

fn main() {
    let logger = Logger::builder().sink(Arc::new(NoopSink)).build();
    let ctx = RequestContext::new().with_trace_id("load");

    let n: u64 = 100_000;
    let start = Instant::now();
    for i in 0..n {
        log_entry!(logger, Some(&ctx)).with_field("iteration", i).info("load test entry");
    }
    let elapsed = start.elapsed();
    println!("plain entries: {} in {:?} (~{:.0} entries/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    let n: u64 = 1_000;
    let err = std::io::Error::new(std::io::ErrorKind::Other, "load");
    let start = Instant::now();
    for _ in 0..n {
        error_with_stack!(logger, Some(&ctx), err);
    }
    let elapsed = start.elapsed();
    println!("entries with stack: {} in {:?} (~{:.0} entries/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
