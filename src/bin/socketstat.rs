//! Packet counter poller: attach to an interface and print the packet count
//! every interval until interrupted with Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;
use traffic_gen::{
    cli::SocketstatArgs,
    counter::{poll_counter, InterfaceStatsCounter, PacketCounter},
    logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = SocketstatArgs::parse();
    let _log_guard = logging::init(args.verbose, None)?;

    let counter = InterfaceStatsCounter::default();
    let handle = counter.attach(&args.interface)?;
    info!(
        "Counter attached to {}, counting packets...",
        handle.interface()
    );

    let period = Duration::from_secs(args.interval.max(1));
    let poll = poll_counter(&counter, &handle, period, |count| {
        println!("Packets captured: {}", count);
    });

    tokio::select! {
        _ = poll => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            println!();
            info!("Exiting...");
        }
    }

    Ok(())
}
