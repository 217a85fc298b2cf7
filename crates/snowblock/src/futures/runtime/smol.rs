use core::time::Duration;

use smol::Timer;

use crate::futures::SleepProvider;

/// A [`SleepProvider`] using Smol's timer.
///
/// This is the default provider for use in async applications built on Smol.
pub struct SmolSleep;
impl SleepProvider for SmolSleep {
    async fn sleep_for(dur: Duration) {
        Timer::after(dur).await;
    }
}

/// A [`SleepProvider`] using Smol's yield.
///
/// Yields to the scheduler once instead of arming a timer. The wait may end
/// before the overflow has cleared.
pub struct SmolYield;
impl SleepProvider for SmolYield {
    async fn sleep_for(_dur: Duration) {
        smol::future::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{Config, SnowflakeNode};

    #[test]
    fn overflow_wait_clears() {
        smol::block_on(async {
            let node = SnowflakeNode::with_config(0, Config::default().with_max_overflow_ms(10)).unwrap();
            let (block, overflow) = node.generate_batch(i64::MAX);
            assert_eq!(block.count(), 11 * 4096);

            overflow.wait_until_cleared_async::<SmolSleep>().await;
            assert!(overflow.duration_to_clear().is_zero());

            let next = node.generate_async::<SmolSleep>().await;
            assert!(next > block.iter().last().unwrap());
        });
    }

    #[test]
    fn generates_unique_ids_yield() {
        smol::block_on(async {
            let node = SnowflakeNode::with_config(1, Config::default().with_max_overflow_ms(1)).unwrap();
            let mut seen = HashSet::new();
            for round in 0..2_000 {
                if round % 10 == 0 {
                    let (block, overflow) = node.generate_batch(500);
                    overflow.wait_until_cleared_async::<SmolYield>().await;
                    for id in block {
                        assert!(seen.insert(id));
                    }
                } else {
                    assert!(seen.insert(node.generate_async::<SmolYield>().await));
                }
            }
        });
    }
}
