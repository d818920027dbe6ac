//! Tick task
//!
//! Feeds the hardware watchdog. Tasks are cooperative, so a task that
//! never yields (a wedged peripheral wait, for example) starves this one
//! and the watchdog restarts the node.

use defmt::*;
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, Instant, Ticker};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 100;

/// Watchdog period; several ticks may be missed before it fires
pub const WATCHDOG_TIMEOUT_MS: u64 = 1_000;

/// Ticks between heartbeat log lines
const HEARTBEAT_TICKS: u32 = 600;

/// Tick task - feeds the watchdog at a fixed rate
#[embassy_executor::task]
pub async fn tick_task(mut watchdog: Watchdog) {
    info!("Tick task started");

    watchdog.start(Duration::from_millis(WATCHDOG_TIMEOUT_MS));

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let start = Instant::now();
    let mut ticks: u32 = 0;

    loop {
        ticker.next().await;
        watchdog.feed();

        ticks = ticks.wrapping_add(1);
        if ticks % HEARTBEAT_TICKS == 0 {
            trace!("Heartbeat, up {} s", start.elapsed().as_secs());
        }
    }
}
