//! Basic example of throttling repeated log events.
//!
//! Allows three occurrences of each call-site per ten-second window and
//! prints a single overflow notice when a call-site starts being muted.

use log_limiter::{OverflowNotice, RateLimiter, ThrottleFilter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

fn main() {
    let throttle = ThrottleFilter::builder()
        .with_limiter(
            RateLimiter::builder()
                .with_limit(3)
                .with_interval(Duration::from_secs(10)),
        )
        .on_overflow(Arc::new(|notice: &OverflowNotice<'_>| {
            eprintln!("{:>5} {}: {}", notice.level, notice.target, notice.message);
        }))
        .build()
        .expect("valid limiter configuration");

    let handle = throttle.clone();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(throttle))
        .init();

    println!("=== Basic Throttling Example ===\n");

    println!("Emitting 10 identical INFO messages:");
    repeated_info(10);

    println!("\nEmitting 10 identical WARN messages (separate call-site, separate budget):");
    for i in 1..=10 {
        warn!(iteration = i, "This is a repeated warning message");
    }

    println!("\nResetting fixed-window counters and trying again:");
    handle.limiter().reset_all();
    repeated_info(5);

    let snapshot = handle.metrics().snapshot();
    println!(
        "\nallowed={} suppressed={} overflow notices={}",
        snapshot.events_allowed, snapshot.events_suppressed, snapshot.overflow_notices
    );
}

fn repeated_info(times: u32) {
    for i in 1..=times {
        info!(iteration = i, "This is a repeated log message");
    }
}
