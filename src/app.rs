//! The refresh loop tying the components together
//!
//! Startup joins the network, syncs the clock and drops the link again. After
//! that the device only renders and sleeps, re-syncing every
//! `resync_every` cycles to correct RTC drift.

use crate::clock::{date_line, TimeSource, TimeSynchronizer};
use crate::config::{Config, CycleConfig};
use crate::connectivity::{ConnectivityManager, Link};
use crate::error::Result;
use crate::poll::Sleeper;
use crate::quotes::{QuoteCatalog, Selection};
use crate::render::{Frame, Panel, RenderCycle};

pub struct Device<L, T, P, S> {
    connectivity: ConnectivityManager<L>,
    clock: TimeSynchronizer<T>,
    panel: P,
    sleeper: S,
    catalog: Option<QuoteCatalog>,
    selection: Selection,
    cycle: CycleConfig,
    render: RenderCycle,
    refreshes: u32,
    cycles: u32,
}

impl<L, T, P, S> Device<L, T, P, S>
where
    L: Link,
    T: TimeSource,
    P: Panel,
    S: Sleeper,
{
    pub fn new(config: Config, link: L, time_source: T, panel: P, sleeper: S) -> Self {
        Self {
            connectivity: ConnectivityManager::new(link, config.credentials, config.wifi_poll),
            clock: TimeSynchronizer::new(time_source, config.clock, config.time_poll),
            panel,
            sleeper,
            catalog: QuoteCatalog::embedded(),
            selection: config.selection,
            cycle: config.cycle,
            render: RenderCycle::default(),
            refreshes: 0,
            cycles: 0,
        }
    }

    #[cfg(test)]
    fn with_catalog(mut self, catalog: Option<QuoteCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Connect, sync the clock, disconnect. The radio is switched off again
    /// whether or not the sync worked.
    pub fn setup(&mut self) -> Result<()> {
        let synced = self
            .connectivity
            .connect(&mut self.sleeper)
            .and_then(|()| self.clock.sync(&mut self.sleeper).map(|_| ()));

        self.clock.source_mut().stop();
        let released = self.connectivity.disconnect();
        synced.and(released)
    }

    /// Draw the current date and quote and push them to the panel.
    pub fn refresh(&mut self) -> Result<()> {
        let reading = self.clock.read();
        let today = reading.as_ref().ok().map(|now| now.date());
        let line = date_line(&reading);

        let quote = self
            .catalog
            .as_ref()
            .map(|catalog| catalog.select(self.selection, today));

        let frame = Frame::compose(&line, quote);
        self.render.run(&mut self.panel, &frame)?;
        self.refreshes = self.refreshes.wrapping_add(1);
        log::info!("Refresh {} done: {}", self.refreshes, line);
        Ok(())
    }

    /// One iteration of the main loop, without the sleep.
    ///
    /// The re-sync schedule counts cycles, not successful refreshes, so a
    /// failing panel does not bring the radio up on every cycle.
    pub fn tick(&mut self) {
        if self.resync_due() {
            log::info!("Re-syncing clock after {} cycles", self.cycles);
            if let Err(e) = self.setup() {
                log::warn!("Clock re-sync failed, keeping current time: {}", e);
            }
        }
        if let Err(e) = self.refresh() {
            log::error!("Refresh failed: {}", e);
        }
        self.cycles = self.cycles.wrapping_add(1);
    }

    fn resync_due(&self) -> bool {
        self.cycle.resync_every > 0
            && self.cycles > 0
            && self.cycles % self.cycle.resync_every == 0
    }

    /// Render and sleep forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
            log::info!("Sleeping for {:?}", self.cycle.refresh_interval);
            self.sleeper.sleep(self.cycle.refresh_interval);
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn connectivity(&self) -> &ConnectivityManager<L> {
        &self.connectivity
    }

    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }
}
