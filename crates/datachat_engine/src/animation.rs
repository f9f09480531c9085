use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_ANIMATION_PERIOD: Duration = Duration::from_millis(250);

/// Calls `on_tick` with a 1-based tick count every `period` until `token` is
/// cancelled. The first tick fires one period after the call.
///
/// Cancellation wins over a tick that is due at the same time, so once the
/// token is observed no further tick is delivered.
pub async fn animate_until_cancelled<F>(period: Duration, token: CancellationToken, mut on_tick: F)
where
    F: FnMut(u64),
{
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                tick += 1;
                on_tick(tick);
            }
        }
    }
}
