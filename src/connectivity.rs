//! WiFi station link management
//!
//! The radio is only needed long enough to fetch the time, so the manager
//! brings the link up, waits for association and tears everything down again.

use crate::config::Credentials;
use crate::error::Result;
use crate::poll::{poll_until, PollPolicy, Sleeper};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatus {
    pub associated: bool,
    pub radio_on: bool,
}

/// A station-mode network link.
pub trait Link {
    /// Configure station mode and start associating with the given network.
    /// Does not wait for the association to complete.
    fn begin(&mut self, credentials: &Credentials) -> Result<()>;

    fn status(&self) -> LinkStatus;

    /// Drop the association and switch the radio off.
    fn shutdown(&mut self) -> Result<()>;

    /// Local address once associated, for diagnostics.
    fn address(&self) -> Option<String> {
        None
    }
}

pub struct ConnectivityManager<L> {
    link: L,
    credentials: Credentials,
    policy: PollPolicy,
}

impl<L: Link> ConnectivityManager<L> {
    pub fn new(link: L, credentials: Credentials, policy: PollPolicy) -> Self {
        Self {
            link,
            credentials,
            policy,
        }
    }

    /// Join the configured network, returning once the link is associated.
    pub fn connect(&mut self, sleeper: &mut impl Sleeper) -> Result<()> {
        log::info!("Connecting to WiFi network {}", self.credentials.ssid);
        self.link.begin(&self.credentials)?;

        let link = &self.link;
        poll_until("wifi association", &self.policy, sleeper, || {
            link.status().associated
        })?;

        match self.link.address() {
            Some(address) => log::info!(
                "WiFi associated with {}, IP {}",
                self.credentials.ssid,
                address
            ),
            None => log::info!("WiFi associated with {}", self.credentials.ssid),
        }
        Ok(())
    }

    /// Disassociate and power the radio off.
    pub fn disconnect(&mut self) -> Result<()> {
        self.link.shutdown()?;
        log::info!("WiFi disconnected, radio off");
        Ok(())
    }

    pub fn status(&self) -> LinkStatus {
        self.link.status()
    }

    pub fn link(&self) -> &L {
        &self.link
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::error::Error;
    use crate::poll::tests::RecordingSleeper;

    /// Associates after a fixed number of status queries.
    #[derive(Debug, Default)]
    pub(crate) struct FakeLink {
        pub(crate) associate_after: Option<u32>,
        pub(crate) queries: Cell<u32>,
        pub(crate) radio_on: bool,
        pub(crate) begun_with: Option<&'static str>,
        pub(crate) shutdowns: u32,
    }

    impl FakeLink {
        pub(crate) fn associating_after(polls: u32) -> Self {
            Self {
                associate_after: Some(polls),
                ..Self::default()
            }
        }
    }

    impl Link for FakeLink {
        fn begin(&mut self, credentials: &Credentials) -> Result<()> {
            self.radio_on = true;
            self.begun_with = Some(credentials.ssid);
            self.queries.set(0);
            Ok(())
        }

        fn status(&self) -> LinkStatus {
            let queries = self.queries.get();
            self.queries.set(queries + 1);
            let associated = self.radio_on
                && self
                    .associate_after
                    .is_some_and(|after| queries >= after);
            LinkStatus {
                associated,
                radio_on: self.radio_on,
            }
        }

        fn shutdown(&mut self) -> Result<()> {
            self.radio_on = false;
            self.associate_after = None;
            self.shutdowns += 1;
            Ok(())
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy::new(Duration::from_millis(500), Duration::from_secs(5))
    }

    #[test]
    fn connect_returns_once_associated() {
        let mut manager = ConnectivityManager::new(
            FakeLink::associating_after(3),
            Credentials::new("home", "secret"),
            policy(),
        );
        let mut sleeper = RecordingSleeper::default();

        manager.connect(&mut sleeper).unwrap();

        assert_eq!(manager.link().begun_with, Some("home"));
        assert_eq!(sleeper.slept, vec![Duration::from_millis(500); 3]);
        assert!(manager.status().associated);
    }

    #[test]
    fn connect_times_out_on_unreachable_network() {
        let mut manager = ConnectivityManager::new(
            FakeLink::default(),
            Credentials::new("nowhere", "secret"),
            policy(),
        );
        let mut sleeper = RecordingSleeper::default();

        let err = manager.connect(&mut sleeper).unwrap_err();
        assert!(matches!(
            err,
            Error::Timeout {
                what: "wifi association",
                ..
            }
        ));
        assert_eq!(sleeper.slept.len(), 10);
    }

    #[test]
    fn disconnect_reports_radio_off() {
        let mut manager = ConnectivityManager::new(
            FakeLink::associating_after(0),
            Credentials::new("home", "secret"),
            policy(),
        );
        manager.connect(&mut RecordingSleeper::default()).unwrap();
        manager.disconnect().unwrap();

        let status = manager.status();
        assert!(!status.associated);
        assert!(!status.radio_on);
    }
}
