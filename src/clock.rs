//! Network time synchronization and local date formatting

use std::time::{SystemTime, UNIX_EPOCH};

use time::{OffsetDateTime, UtcOffset};

use crate::config::ClockConfig;
use crate::error::{Error, Result};
use crate::poll::{poll_until, PollPolicy, Sleeper};

/// Seconds since epoch below which the clock is considered unset.
///
/// A freshly booted ESP32 counts up from zero, so anything past this value
/// means a real time was received.
pub const SANITY_THRESHOLD: i64 = 100_000;

/// Shown in place of the date when the clock cannot be read.
pub const CLOCK_FAILURE_LINE: &str = "Failed to obtain time.";

/// Source of wall-clock time that can be asked to synchronize itself.
pub trait TimeSource {
    /// Start an offset-aware time request against the configured server.
    /// Returns without waiting for the answer.
    fn request(&mut self, config: &ClockConfig) -> Result<()>;

    /// Current seconds since the Unix epoch, UTC.
    fn epoch_secs(&self) -> i64;

    /// Stop background synchronization before the link goes away.
    fn stop(&mut self) {}
}

/// Reads the system clock, which SNTP updates in the background.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn now() -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            Err(_) => 0,
        }
    }
}

pub fn is_sane(epoch: i64) -> bool {
    epoch > SANITY_THRESHOLD
}

pub struct TimeSynchronizer<T> {
    source: T,
    config: ClockConfig,
    policy: PollPolicy,
}

impl<T: TimeSource> TimeSynchronizer<T> {
    pub fn new(source: T, config: ClockConfig, policy: PollPolicy) -> Self {
        Self {
            source,
            config,
            policy,
        }
    }

    /// Request the time and wait until the clock holds a sane value.
    ///
    /// Only meaningful while the network link is up.
    pub fn sync(&mut self, sleeper: &mut impl Sleeper) -> Result<i64> {
        log::info!(
            "Requesting time from {} (UTC offset {}s, DST {}s)",
            self.config.ntp_server,
            self.config.utc_offset_secs,
            self.config.dst_offset_secs
        );
        self.source.request(&self.config)?;

        let source = &self.source;
        poll_until("time sync", &self.policy, sleeper, || {
            is_sane(source.epoch_secs())
        })?;

        let epoch = self.source.epoch_secs();
        log::info!("Clock synchronized, epoch {}", epoch);
        Ok(epoch)
    }

    /// Current local calendar time.
    pub fn read(&self) -> Result<OffsetDateTime> {
        local_time(self.source.epoch_secs(), &self.config)
    }

    pub fn source_mut(&mut self) -> &mut T {
        &mut self.source
    }
}

/// Convert an epoch value to local time using the fixed offsets.
pub fn local_time(epoch: i64, config: &ClockConfig) -> Result<OffsetDateTime> {
    if !is_sane(epoch) {
        return Err(Error::ClockUnset { epoch });
    }
    let offset = config.local_offset_secs();
    let offset = UtcOffset::from_whole_seconds(offset).map_err(|_| Error::Offset(offset))?;
    let utc = OffsetDateTime::from_unix_timestamp(epoch).map_err(|_| Error::ClockUnset { epoch })?;
    Ok(utc.to_offset(offset))
}

/// `Saturday, April 01 2023`
pub fn format_date(date: &OffsetDateTime) -> String {
    format!(
        "{}, {} {:02} {}",
        date.weekday(),
        date.month(),
        date.day(),
        date.year()
    )
}

/// The line drawn in the date slot of the frame.
pub fn date_line(reading: &Result<OffsetDateTime>) -> String {
    match reading {
        Ok(date) => format_date(date),
        Err(e) => {
            log::error!("Failed to obtain time: {}", e);
            CLOCK_FAILURE_LINE.to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use time::macros::{date, datetime};

    use super::*;
    use crate::poll::tests::RecordingSleeper;

    /// 2023-04-01 12:00:00 UTC
    pub(crate) const APRIL_FOOLS_NOON: i64 = 1_680_350_400;

    /// Clock that jumps to `synced` after a number of reads.
    #[derive(Debug, Default)]
    pub(crate) struct FakeClock {
        pub(crate) synced: i64,
        pub(crate) reads_until_synced: Option<u32>,
        pub(crate) reads: Cell<u32>,
        pub(crate) requests: Vec<&'static str>,
        pub(crate) fail_request: bool,
    }

    impl FakeClock {
        pub(crate) fn synced_at(epoch: i64) -> Self {
            Self {
                synced: epoch,
                reads_until_synced: Some(0),
                ..Self::default()
            }
        }
    }

    impl TimeSource for FakeClock {
        fn request(&mut self, config: &ClockConfig) -> Result<()> {
            if self.fail_request {
                return Err(Error::TimeRequest("no route".into()));
            }
            self.requests.push(config.ntp_server);
            Ok(())
        }

        fn epoch_secs(&self) -> i64 {
            let reads = self.reads.get();
            self.reads.set(reads + 1);
            match self.reads_until_synced {
                Some(after) if reads >= after => self.synced,
                _ => 42,
            }
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy::new(Duration::from_millis(100), Duration::from_secs(1))
    }

    #[test]
    fn sync_waits_for_sane_clock() {
        let clock = FakeClock {
            synced: APRIL_FOOLS_NOON,
            reads_until_synced: Some(4),
            ..FakeClock::default()
        };
        let mut sync = TimeSynchronizer::new(clock, ClockConfig::default(), policy());
        let mut sleeper = RecordingSleeper::default();

        let epoch = sync.sync(&mut sleeper).unwrap();

        assert!(epoch > SANITY_THRESHOLD);
        assert_eq!(sleeper.slept, vec![Duration::from_millis(100); 4]);
        assert_eq!(sync.source_mut().requests, vec!["pool.ntp.org"]);
    }

    #[test]
    fn sync_rejects_threshold_value() {
        let clock = FakeClock::synced_at(SANITY_THRESHOLD);
        let mut sync = TimeSynchronizer::new(clock, ClockConfig::default(), policy());

        let err = sync.sync(&mut RecordingSleeper::default()).unwrap_err();
        assert!(matches!(err, Error::Timeout { what: "time sync", .. }));
    }

    #[test]
    fn sync_propagates_request_failure() {
        let clock = FakeClock {
            fail_request: true,
            ..FakeClock::default()
        };
        let mut sync = TimeSynchronizer::new(clock, ClockConfig::default(), policy());
        let mut sleeper = RecordingSleeper::default();

        assert!(matches!(
            sync.sync(&mut sleeper),
            Err(Error::TimeRequest(_))
        ));
        assert!(sleeper.slept.is_empty());
    }

    #[test]
    fn system_clock_is_sane_on_a_set_host() {
        assert!(is_sane(SystemClock::now()));
        assert!(SystemClock::now() > APRIL_FOOLS_NOON);
    }

    #[test]
    fn read_applies_utc_and_dst_offsets() {
        let sync = TimeSynchronizer::new(
            FakeClock::synced_at(APRIL_FOOLS_NOON),
            ClockConfig::default(),
            policy(),
        );
        let local = sync.read().unwrap();
        assert_eq!(local.date(), date!(2023 - 04 - 01));
        assert_eq!(local.hour(), 5);
        assert_eq!(local.offset().whole_seconds(), -25_200);
    }

    #[test]
    fn read_fails_on_unset_clock() {
        let sync = TimeSynchronizer::new(FakeClock::default(), ClockConfig::default(), policy());
        assert!(matches!(sync.read(), Err(Error::ClockUnset { epoch: 42 })));
    }

    #[test]
    fn read_rejects_out_of_range_offset() {
        let config = ClockConfig {
            utc_offset_secs: 30 * 3600,
            ..ClockConfig::default()
        };
        let err = local_time(APRIL_FOOLS_NOON, &config).unwrap_err();
        assert!(matches!(err, Error::Offset(_)));
    }

    #[test]
    fn formats_long_date() {
        let date = datetime!(2023-04-01 09:30 UTC);
        assert_eq!(format_date(&date), "Saturday, April 01 2023");
    }

    #[test]
    fn failed_reading_shows_only_the_failure_line() {
        let line = date_line(&Err(Error::ClockUnset { epoch: 0 }));
        assert_eq!(line, CLOCK_FAILURE_LINE);
    }
}
