/*!
 * Signal Channels
 * Validated signal numbers, including the realtime range
 */

use crate::core::errors::{MailboxError, MailboxResult};
use crate::core::limits::MIN_SIGNAL;
use crate::core::types::SignalNumber;
use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A signal number used as a mailbox channel
///
/// Unlike `nix::sys::signal::Signal`, this covers `SIGRTMIN..=SIGRTMAX`, which is
/// where queued payloads belong: realtime signals queue every instance, standard
/// signals collapse repeated pending deliveries into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Channel(SignalNumber);

impl Channel {
    pub const HANGUP: Channel = Channel(libc::SIGHUP);
    pub const INTERRUPT: Channel = Channel(libc::SIGINT);
    pub const ALARM: Channel = Channel(libc::SIGALRM);
    pub const TERMINATE: Channel = Channel(libc::SIGTERM);
    pub const CHILD: Channel = Channel(libc::SIGCHLD);
    pub const IO: Channel = Channel(libc::SIGIO);
    pub const USER1: Channel = Channel(libc::SIGUSR1);
    pub const USER2: Channel = Channel(libc::SIGUSR2);

    /// Validate a raw signal number
    pub fn new(number: SignalNumber) -> MailboxResult<Self> {
        if (MIN_SIGNAL..=libc::SIGRTMAX()).contains(&number) {
            Ok(Self(number))
        } else {
            Err(MailboxError::InvalidArgument(format!(
                "signal number {} is outside 1..={}",
                number,
                libc::SIGRTMAX()
            )))
        }
    }

    /// `SIGRTMIN + offset`
    pub fn realtime(offset: SignalNumber) -> MailboxResult<Self> {
        let max_offset = libc::SIGRTMAX() - libc::SIGRTMIN();
        if !(0..=max_offset).contains(&offset) {
            return Err(MailboxError::InvalidArgument(format!(
                "realtime offset {} is outside 0..={}",
                offset, max_offset
            )));
        }
        Ok(Self(libc::SIGRTMIN() + offset))
    }

    /// Wrap a number handed to a signal handler; the OS only dispatches valid ones
    pub(crate) const fn from_handler(number: SignalNumber) -> Self {
        Self(number)
    }

    pub const fn number(self) -> SignalNumber {
        self.0
    }

    pub fn is_realtime(self) -> bool {
        self.0 >= libc::SIGRTMIN()
    }

    /// SIGKILL and SIGSTOP can be neither caught nor blocked
    pub fn can_catch(self) -> bool {
        !matches!(self.0, libc::SIGKILL | libc::SIGSTOP)
    }

    /// Standard signal as understood by nix, if this is one
    pub fn as_signal(self) -> Option<Signal> {
        Signal::try_from(self.0).ok()
    }
}

impl TryFrom<i32> for Channel {
    type Error = MailboxError;

    fn try_from(number: i32) -> MailboxResult<Self> {
        Self::new(number)
    }
}

impl From<Channel> for i32 {
    fn from(channel: Channel) -> i32 {
        channel.0
    }
}

impl From<Signal> for Channel {
    fn from(signal: Signal) -> Self {
        Self(signal as SignalNumber)
    }
}

/// Accepts a number, a standard name with or without `SIG`, or `SIGRTMIN+n`
impl FromStr for Channel {
    type Err = MailboxError;

    fn from_str(text: &str) -> MailboxResult<Self> {
        let text = text.trim();
        if let Ok(number) = text.parse::<SignalNumber>() {
            return Self::new(number);
        }

        let upper = text.to_ascii_uppercase();
        let name = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{}", upper)
        };

        if let Some(rest) = name.strip_prefix("SIGRTMIN") {
            let offset = match rest.strip_prefix('+') {
                Some(offset) => offset.parse().map_err(|_| unknown(text))?,
                None if rest.is_empty() => 0,
                None => return Err(unknown(text)),
            };
            return Self::realtime(offset);
        }
        if name == "SIGRTMAX" {
            return Self::new(libc::SIGRTMAX());
        }

        Signal::from_str(&name).map(Self::from).map_err(|_| unknown(text))
    }
}

fn unknown(text: &str) -> MailboxError {
    MailboxError::InvalidArgument(format!("unknown signal '{}'", text))
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_signal() {
            Some(signal) => f.write_str(signal.as_str()),
            None if self.is_realtime() => write!(f, "SIGRTMIN+{}", self.0 - libc::SIGRTMIN()),
            None => write!(f, "SIG{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_bounds() {
        assert!(Channel::new(0).is_err());
        assert!(Channel::new(-3).is_err());
        assert!(Channel::new(libc::SIGRTMAX() + 1).is_err());
        assert_eq!(Channel::new(libc::SIGUSR1).unwrap(), Channel::USER1);
        assert_eq!(Channel::new(libc::SIGRTMAX()).unwrap().number(), libc::SIGRTMAX());
    }

    #[test]
    fn test_realtime_offsets() {
        let first = Channel::realtime(0).unwrap();
        assert_eq!(first.number(), libc::SIGRTMIN());
        assert!(first.is_realtime());
        assert!(!Channel::USER2.is_realtime());
        assert!(Channel::realtime(-1).is_err());
        assert!(Channel::realtime(libc::SIGRTMAX() - libc::SIGRTMIN() + 1).is_err());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Channel::USER1.to_string(), "SIGUSR1");
        assert_eq!(Channel::CHILD.to_string(), "SIGCHLD");
        assert_eq!(Channel::realtime(2).unwrap().to_string(), "SIGRTMIN+2");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("SIGUSR1".parse::<Channel>().unwrap(), Channel::USER1);
        assert_eq!("usr2".parse::<Channel>().unwrap(), Channel::USER2);
        assert_eq!("17".parse::<Channel>().unwrap().number(), 17);
        assert_eq!("SIGRTMIN+3".parse::<Channel>().unwrap(), Channel::realtime(3).unwrap());
        assert_eq!("rtmin".parse::<Channel>().unwrap(), Channel::realtime(0).unwrap());
        assert!("SIGNOPE".parse::<Channel>().is_err());
        assert!("SIGRTMIN-1".parse::<Channel>().is_err());
        assert!("0".parse::<Channel>().is_err());
    }

    #[test]
    fn test_uncatchable() {
        assert!(!Channel::new(libc::SIGKILL).unwrap().can_catch());
        assert!(!Channel::new(libc::SIGSTOP).unwrap().can_catch());
        assert!(Channel::TERMINATE.can_catch());
    }
}
