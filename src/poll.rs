//! Bounded polling with a fixed interval
//!
//! Both the WiFi association and the SNTP clock update are observed by
//! polling a status value with a short delay in between. Instead of looping
//! forever the poll gives up once the configured budget is spent.

use std::time::Duration;

use crate::error::{Error, Result};

/// Something that can block the current task for a while.
///
/// On the device this is a plain thread sleep (a FreeRTOS task delay), in
/// tests a fake that only records the requested durations.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two checks
    pub interval: Duration,
    /// Total time allowed before giving up
    pub timeout: Duration,
}

impl PollPolicy {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Maximum number of sleeps before the budget is exhausted
    pub fn max_waits(&self) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        let waits = self.timeout.as_millis() / self.interval.as_millis().max(1);
        u32::try_from(waits).unwrap_or(u32::MAX)
    }
}

/// Check `ready` until it returns true, sleeping `policy.interval` between
/// checks. Returns the number of sleeps it took.
pub fn poll_until<S, F>(
    what: &'static str,
    policy: &PollPolicy,
    sleeper: &mut S,
    mut ready: F,
) -> Result<u32>
where
    S: Sleeper + ?Sized,
    F: FnMut() -> bool,
{
    let max_waits = policy.max_waits();
    let mut waits = 0u32;

    loop {
        if ready() {
            log::debug!("{} ready after {} polls", what, waits);
            return Ok(waits);
        }
        if waits >= max_waits {
            log::warn!("Gave up on {} after {:?}", what, policy.timeout);
            return Err(Error::Timeout {
                what,
                waited: policy.interval * waits,
            });
        }
        sleeper.sleep(policy.interval);
        waits += 1;
        log::debug!("Waiting for {} ({}/{})", what, waits, max_waits);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every requested sleep instead of blocking.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSleeper {
        pub(crate) slept: Vec<Duration>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&mut self, duration: Duration) {
            self.slept.push(duration);
        }
    }

    const POLICY: PollPolicy = PollPolicy::new(Duration::from_millis(500), Duration::from_secs(2));

    #[test]
    fn ready_immediately_does_not_sleep() {
        let mut sleeper = RecordingSleeper::default();
        let waits = poll_until("thing", &POLICY, &mut sleeper, || true).unwrap();
        assert_eq!(waits, 0);
        assert!(sleeper.slept.is_empty());
    }

    #[test]
    fn sleeps_the_interval_between_checks() {
        let mut sleeper = RecordingSleeper::default();
        let mut checks = 0;
        let waits = poll_until("thing", &POLICY, &mut sleeper, || {
            checks += 1;
            checks == 3
        })
        .unwrap();
        assert_eq!(waits, 2);
        assert_eq!(sleeper.slept, vec![Duration::from_millis(500); 2]);
    }

    #[test]
    fn gives_up_after_timeout() {
        let mut sleeper = RecordingSleeper::default();
        let err = poll_until("link", &POLICY, &mut sleeper, || false).unwrap_err();
        match err {
            Error::Timeout { what, waited } => {
                assert_eq!(what, "link");
                assert_eq!(waited, Duration::from_secs(2));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(sleeper.slept.len(), 4);
    }

    #[test]
    fn zero_interval_checks_once() {
        let policy = PollPolicy::new(Duration::ZERO, Duration::from_secs(1));
        let mut sleeper = RecordingSleeper::default();
        assert!(poll_until("x", &policy, &mut sleeper, || false).is_err());
        assert!(sleeper.slept.is_empty());
    }
}
