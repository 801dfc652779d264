use std::sync::Arc;
use tracing::{error, info};

use enriched_log::context::{self, RequestContext};
use enriched_log::init::{init_tracing, LayerConfig};
use enriched_log::Logger;

#[tracing::instrument(skip_all)]
async fn handle_refund(amount: u64) {
    info!(amount, "refund requested");
    error!(amount, reason = "card expired", "refund failed");
}

#[tokio::main]
async fn main() {
    let logger = Arc::new(Logger::builder().level("info").stack_on_error(true).build());

    if let Err(e) = init_tracing(logger, LayerConfig::default()) {
        eprintln!("{}", e);
        return;
    }

    let ctx = RequestContext::new()
        .with_trace_id("7f3c9a")
        .with_merchant_id("m-1001");
    context::scope(ctx, handle_refund(1250)).await;

    info!("outside of any request");
}
