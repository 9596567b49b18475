use esp_idf_svc::sntp::{EspSntp, SntpConf, SyncStatus};
use log::info;

use crate::clock::{SystemClock, TimeSource};
use crate::config::ClockConfig;
use crate::error::{Error, Result};

/// ESP-IDF SNTP client updating the system clock.
///
/// The UTC and DST offsets are applied when the clock is read, the system
/// clock itself stays in UTC.
#[derive(Default)]
pub struct SntpTimeSource {
    sntp: Option<EspSntp<'static>>,
}

impl TimeSource for SntpTimeSource {
    fn request(&mut self, config: &ClockConfig) -> Result<()> {
        // Only one SNTP service may exist at a time
        self.stop();

        let mut conf = SntpConf::default();
        conf.servers[0] = config.ntp_server;

        let sntp = EspSntp::new(&conf).map_err(|e| Error::TimeRequest(e.to_string()))?;
        info!("SNTP started against {}", config.ntp_server);
        self.sntp = Some(sntp);
        Ok(())
    }

    fn epoch_secs(&self) -> i64 {
        SystemClock::now()
    }

    fn stop(&mut self) {
        if let Some(sntp) = self.sntp.take() {
            let completed = sntp.get_sync_status() == SyncStatus::Completed;
            info!("SNTP stopped (sync completed: {})", completed);
        }
    }
}
