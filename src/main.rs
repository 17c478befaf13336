/*!
 * signal-mailbox - Command Line Entry Point
 *
 * listen <signal>                 print integer deliveries and echo each one back
 * send <pid> <signal> <value>...  queue values, waiting for every echo
 */

use miette::{bail, miette, IntoDiagnostic, Result};
use std::env;
use std::thread;
use tracing::{info, warn};

use signal_mailbox::core::types::Pid;
use signal_mailbox::signals::HandlerVariant;
use signal_mailbox::{
    init_tracing, mailbox, send_int, Channel, MailboxConfig, MailboxError, Payload, Receiver,
    Registration,
};

const USAGE: &str = "usage: signal-mailbox listen <signal>\n       signal-mailbox send <pid> <signal> <value>...";

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = MailboxConfig::from_env()?;

    match args.first().map(String::as_str) {
        Some("listen") if args.len() == 2 => listen(args[1].parse()?, config),
        Some("send") if args.len() >= 4 => {
            let pid = parse_pid(&args[1])?;
            let values = args[3..]
                .iter()
                .map(|raw| raw.parse::<i32>().into_diagnostic())
                .collect::<Result<Vec<_>>>()?;
            send_all(pid, args[2].parse()?, &values, config)
        }
        _ => bail!("{}", USAGE),
    }
}

fn parse_pid(raw: &str) -> Result<Pid> {
    match raw.parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(Pid::from_raw(pid)),
        _ => Err(miette!("invalid process id '{}'", raw)),
    }
}

/// Serve until SIGINT, echoing every integer back to whoever queued it
fn listen(channel: Channel, config: MailboxConfig) -> Result<()> {
    Registration::new(Channel::INTERRUPT)
        .handler(HandlerVariant::Interruptions.handler())
        .install()?;

    let mut receiver = Receiver::new(channel, config.clone());
    receiver.install()?;
    info!(pid = %Pid::this(), channel = %channel, "Listening");
    println!("listening on {} as pid {}", channel, Pid::this());

    while !mailbox().take_interrupted() {
        match receiver.try_recv() {
            Ok(delivery) => {
                let Payload::Integer(value) = delivery.payload else {
                    warn!(channel = %channel, "Ignoring non-integer payload");
                    continue;
                };
                println!(
                    "{} from {}: {} ({})",
                    channel,
                    delivery.sender,
                    value,
                    delivery.describe()
                );
                send_int(delivery.sender.pid, channel, value)?;
            }
            Err(MailboxError::NotReady) => thread::sleep(config.poll_interval()),
            Err(e) => return Err(e.into()),
        }
    }

    receiver.uninstall()?;
    info!(stats = ?mailbox().stats(), "Interrupted, shutting down");
    Ok(())
}

/// Queue each value and wait for the listener to echo it
fn send_all(pid: Pid, channel: Channel, values: &[i32], config: MailboxConfig) -> Result<()> {
    let mut receiver = Receiver::new(channel, config);
    receiver.install()?;

    for &value in values {
        send_int(pid, channel, value)?;
        let receipt = receiver.recv()?;

        if receipt.sender.pid != pid || receipt.payload != Payload::Integer(value) {
            bail!(
                "unexpected receipt {} from {} while waiting for {} from {}",
                receipt.payload,
                receipt.sender,
                value,
                pid
            );
        }
        println!("{} delivered to {}", value, pid);
    }

    receiver.uninstall()?;
    Ok(())
}
