//! Latchkey host simulator.
//!
//! Runs the access controller against mock peripherals and drives them from
//! stdin.
//!
//! # Usage
//!
//! ```bash
//! # Keys and configuration in ./data, ./sd standing in for the SD card
//! latchkey --data-dir data --media-dir sd
//!
//! # Then type, one per line:
//! #   scan 12345        present a credential
//! #   exit long         hold the exit button to open an add-mode window
//! #   /print_keys       web UI route
//! #   mqtt unlock       MQTT command
//! ```

mod board;
mod console;

use anyhow::Result;
use board::{Board, Paths};
use clap::Parser;
use console::Input;
use latchkey_controller::LoopExit;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Latchkey access controller simulator
#[derive(Parser, Debug)]
#[command(name = "latchkey")]
#[command(about = "Run the Latchkey access controller against simulated hardware")]
#[command(version)]
struct Args {
    /// Directory holding dl32.cfg and keys.cfg
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Directory standing in for the removable SD card
    #[arg(short, long)]
    media_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let paths = Paths {
        data_dir: args.data_dir,
        media_dir: args.media_dir,
    };

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted");
                shutdown.cancel();
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let (mut controller, board) = Board::boot(&paths)?;
        let stopped = CancellationToken::new();

        let run = async {
            let exit = controller.run(shutdown.clone()).await;
            stopped.cancel();
            exit
        };
        let (exit, driven) = tokio::join!(run, drive(&board, &mut lines, &shutdown, &stopped));
        driven?;

        match exit {
            LoopExit::Restart => info!("restarting controller"),
            LoopExit::Shutdown => break,
        }
    }

    info!("Latchkey stopped");
    Ok(())
}

/// Feed console lines to the board until the controller stops.
///
/// End of input requests shutdown.
async fn drive(
    board: &Board,
    lines: &mut Lines<BufReader<Stdin>>,
    shutdown: &CancellationToken,
    stopped: &CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = stopped.cancelled() => return Ok(()),
            line = lines.next_line() => match line? {
                Some(line) => match Input::parse(&line) {
                    Ok(Some(input)) => board.apply(input),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "type 'help' for commands"),
                },
                None => {
                    info!("end of input");
                    shutdown.cancel();
                    stopped.cancelled().await;
                    return Ok(());
                }
            },
        }
    }
}
