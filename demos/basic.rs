use std::io;

use enriched_log::{error_with_stack, errorf_with_stack, init, log_entry, RequestContext};

fn load_order(id: u64) -> Result<(), io::Error> {
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("order {} not found", id),
    ))
}

fn main() {
    // Level names other than debug/info/warn/error fall back to info.
    let logger = init::<io::Stdout>("debug", None);

    let ctx = RequestContext::new()
        .with_trace_id("abc123")
        .with_client_ip("203.0.113.7")
        .with_operator_id("op-17");

    log_entry!(logger, Some(&ctx))
        .with_field("order_id", 42)
        .info("loading order");

    if let Err(err) = load_order(42) {
        error_with_stack!(logger, Some(&ctx), err);
        errorf_with_stack!(logger, Some(&ctx), err, "checkout aborted after {} attempts", 3);
    }

    log_entry!(logger, None).debug("no request context");
}
