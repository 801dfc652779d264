use std::backtrace::{Backtrace, BacktraceStatus};

/// Field name the captured stack is attached under.
pub const STACKTRACE_FIELD: &str = "stacktrace";

/// Render the calling thread's stack as text.
///
/// Capture is forced regardless of `RUST_BACKTRACE`. The result is never
/// empty: platforms without unwinding support still get the thread header
/// and a marker line.
pub fn capture() -> String {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = Backtrace::force_capture();
    match backtrace.status() {
        BacktraceStatus::Captured => format!("thread '{}' [running]:\n{}", name, backtrace),
        _ => format!("thread '{}' [running]:\n<stack unavailable>", name),
    }
}
