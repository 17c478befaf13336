/*!
 * Signal API Tests
 * Channels, registration, dispositions and configuration
 */

mod common;

use common::in_child;
use nix::errno::Errno;
use nix::sys::signal::SaFlags;
use pretty_assertions::assert_eq;
use serial_test::serial;
use signal_mailbox::signals::HandlerVariant;
use signal_mailbox::*;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_channel_from_number() {
    assert_eq!(Channel::new(libc::SIGUSR1).unwrap(), Channel::USER1);
    assert_eq!(Channel::try_from(libc::SIGCHLD).unwrap(), Channel::CHILD);
    assert!(Channel::new(0).is_err());
    assert!(Channel::new(libc::SIGRTMAX() + 1).is_err());
}

#[test]
fn test_channel_serde() {
    let channel = Channel::realtime(1).unwrap();
    let json = serde_json::to_string(&channel).unwrap();
    assert_eq!(json, channel.number().to_string());
    assert_eq!(serde_json::from_str::<Channel>(&json).unwrap(), channel);
    assert!(serde_json::from_str::<Channel>("0").is_err());
}

#[test]
fn test_registration_requires_handler() {
    let err = Registration::new(Channel::USER1).install().unwrap_err();
    assert!(matches!(err, MailboxError::InvalidArgument(_)));
}

#[test]
fn test_uncatchable_signal_is_unavailable() {
    let kill = Channel::new(libc::SIGKILL).unwrap();
    let err = register_handler(kill, HandlerVariant::SignalNumber.handler(), SaFlags::empty())
        .unwrap_err();
    assert_eq!(err, MailboxError::Unavailable(Errno::EINVAL));
    assert_eq!(err.errno(), Some(Errno::EINVAL));
}

#[test]
#[serial]
fn test_register_and_restore_disposition() {
    in_child("restore", || {
        let channel = Channel::realtime(9).unwrap();
        let handler = HandlerVariant::QueueInt.handler();

        let original = register_handler(channel, handler, SaFlags::SA_RESTART).unwrap();
        assert!(original.is_default());

        let replaced = restore(channel, &original).unwrap();
        assert!(replaced.is_handler(handler));
        assert!(replaced.flags().contains(SaFlags::SA_SIGINFO | SaFlags::SA_RESTART));

        let current = register_handler(channel, handler, SaFlags::empty()).unwrap();
        assert!(current.is_default());
    });
}

#[test]
#[serial]
fn test_basic_handler_never_gets_siginfo() {
    in_child("basic form", || {
        let channel = Channel::realtime(12).unwrap();
        let handler = HandlerVariant::SignalNumber.handler();

        let original =
            register_handler(channel, handler, SaFlags::SA_SIGINFO | SaFlags::SA_RESTART).unwrap();
        send(nix::unistd::Pid::this(), channel).unwrap();
        assert_eq!(mailbox().take_signal_number(), Some(channel));

        let installed = restore(channel, &original).unwrap();
        assert!(installed.is_handler(handler));
        assert!(!installed.flags().contains(SaFlags::SA_SIGINFO));
        assert!(installed.flags().contains(SaFlags::SA_RESTART));
    });
}

#[test]
#[serial]
fn test_receiver_uninstall_restores_default() {
    in_child("uninstall", || {
        let channel = Channel::realtime(10).unwrap();
        let mut receiver = Receiver::new(channel, MailboxConfig::new());
        receiver.install().unwrap();
        assert!(receiver.is_installed());
        assert!(!is_deferred(channel).unwrap());

        receiver.uninstall().unwrap();
        assert!(!receiver.is_installed());
        let previous =
            register_handler(channel, HandlerVariant::QueueInt.handler(), SaFlags::empty()).unwrap();
        assert!(previous.is_default());
    });
}

#[test]
#[serial]
fn test_mask_round_trip() {
    in_child("mask", || {
        let channel = Channel::realtime(11).unwrap();
        let before = SignalMask::current().unwrap();
        assert!(!before.contains(channel));

        defer(channel).unwrap();
        assert!(is_deferred(channel).unwrap());
        assert!(!is_pending(channel).unwrap());

        restore_mask(&before).unwrap();
        assert!(!is_deferred(channel).unwrap());
    });
}

#[test]
fn test_config_presets() {
    let standard = MailboxConfig::default();
    assert_eq!(standard, MailboxConfig::new());
    assert!(MailboxConfig::aggressive().poll_interval() < standard.poll_interval());
    assert!(MailboxConfig::relaxed().poll_interval() > standard.poll_interval());
    assert_eq!(MailboxConfig::new().without_timeout().receive_timeout(), None);
}

#[test]
fn test_config_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"poll_interval_ms": 5, "restart_interrupted": false}}"#).unwrap();

    let config = MailboxConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.poll_interval(), Duration::from_millis(5));
    assert!(!config.flags().contains(SaFlags::SA_RESTART));
    assert_eq!(config.receive_timeout(), MailboxConfig::new().receive_timeout());
}

#[test]
fn test_config_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        MailboxConfig::from_json_file(&missing),
        Err(MailboxError::Config(_))
    ));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(
        MailboxConfig::from_json_file(&broken),
        Err(MailboxError::Config(_))
    ));
}
