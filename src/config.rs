//! Compile-time configuration
//!
//! Everything here is constant for the lifetime of the firmware. WiFi
//! credentials are taken from the `WIFI_SSID` and `WIFI_PASS` environment
//! variables at build time so they stay out of version control.

use std::time::Duration;

use crate::poll::PollPolicy;
use crate::quotes::Selection;

const DEFAULT_WIFI_SSID: &str = "YOUR_WIFI_SSID";
const DEFAULT_WIFI_PASS: &str = "YOUR_WIFI_PASSWORD";

pub const NTP_SERVER: &str = "pool.ntp.org";
/// PST
pub const UTC_OFFSET_SECS: i32 = -28_800;
pub const DST_OFFSET_SECS: i32 = 3_600;

pub const WIFI_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const WIFI_TIMEOUT: Duration = Duration::from_secs(30);
pub const TIME_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const TIME_TIMEOUT: Duration = Duration::from_secs(20);

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(100);
/// Roughly once a day at the default refresh interval
pub const RESYNC_EVERY: u32 = 864;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl Credentials {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }

    /// Credentials baked in at build time, or the placeholders
    pub fn from_build_env() -> Self {
        let ssid = option_env!("WIFI_SSID").unwrap_or(DEFAULT_WIFI_SSID);
        let password = option_env!("WIFI_PASS").unwrap_or(DEFAULT_WIFI_PASS);
        Self { ssid, password }
    }

    pub fn is_placeholder(&self) -> bool {
        self.ssid == DEFAULT_WIFI_SSID
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("password", &format_args!("<{} chars>", self.password.len()))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockConfig {
    pub utc_offset_secs: i32,
    pub dst_offset_secs: i32,
    pub ntp_server: &'static str,
}

impl ClockConfig {
    /// Offset applied to UTC when reading the local calendar date
    pub fn local_offset_secs(&self) -> i32 {
        self.utc_offset_secs.saturating_add(self.dst_offset_secs)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_secs: UTC_OFFSET_SECS,
            dst_offset_secs: DST_OFFSET_SECS,
            ntp_server: NTP_SERVER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleConfig {
    /// Delay between two panel refreshes
    pub refresh_interval: Duration,
    /// Reconnect and re-sync the clock after this many refreshes, 0 disables
    pub resync_every: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            refresh_interval: REFRESH_INTERVAL,
            resync_every: RESYNC_EVERY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub clock: ClockConfig,
    pub wifi_poll: PollPolicy,
    pub time_poll: PollPolicy,
    pub cycle: CycleConfig,
    pub selection: Selection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::from_build_env(),
            clock: ClockConfig::default(),
            wifi_poll: PollPolicy::new(WIFI_POLL_INTERVAL, WIFI_TIMEOUT),
            time_poll: PollPolicy::new(TIME_POLL_INTERVAL, TIME_TIMEOUT),
            cycle: CycleConfig::default(),
            selection: Selection::First,
        }
    }
}
