//! Concurrent downloads tracked with `log_promise`, with `tracing` output
//! routed through the board's log buffer instead of raw stderr.

use std::time::Duration;

use taskboard::prelude::*;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const PACKAGES: &[(&str, u64)] = &[
    ("serde", 320),
    ("tokio", 890),
    ("syn", 1240),
    ("quote", 85),
];

#[tokio::main]
async fn main() {
    let mut board = TaskBoard::new().spinner(Spinner::dots());
    tracing_subscriber::registry().with(board.layer()).init();
    board.start();

    tracing::info!("resolving {} packages", PACKAGES.len());

    let downloads: Vec<_> = PACKAGES
        .iter()
        .map(|&(name, size_kb)| tokio::spawn(board.log_promise(name, download(name, size_kb))))
        .collect();

    let mut total = 0;
    for handle in downloads {
        match handle.await.unwrap() {
            Ok(kb) => total += kb,
            Err(err) => tracing::error!("download failed: {err}"),
        }
    }

    tracing::info!("downloaded {total} KB");
    tokio::time::sleep(Duration::from_millis(200)).await;
    board.stop();
}

async fn download(name: &'static str, size_kb: u64) -> Result<u64, &'static str> {
    for chunk in 1..=8u64 {
        tokio::time::sleep(Duration::from_millis(40 + size_kb / 20)).await;
        if name == "syn" && chunk == 6 {
            return Err("checksum mismatch");
        }
    }
    Ok(size_kb)
}
