//! mode1090-feeder: edge binary wiring the mode1090-core decode pipeline to
//! an IQ sample source.
//!
//! Two subcommands:
//! - `demod`: demodulate a raw IQ capture and track aircraft state
//! - `replay`: read a pre-demodulated capture file directly, skipping the
//!   demodulator — used to exercise state accumulation against a recorded
//!   frame corpus

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};

use mode1090_core::aircraft_db::MetadataStore;
use mode1090_core::manager::StateManager;
use mode1090_core::types::AircraftState;

mod capture;
mod pipeline;

use pipeline::PipelineRunner;

#[derive(Parser)]
#[command(
    name = "mode1090-feeder",
    version,
    about = "ADS-B capture, demodulation, and aircraft state tracking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Demodulate a raw IQ capture and print the tracked aircraft table.
    Demod {
        /// Path to a raw IQ binary file (interleaved 12-bit LE samples).
        file: PathBuf,

        /// Power window width in samples.
        #[arg(long, default_value_t = mode1090_core::demod::WINDOW_SIZE)]
        window: usize,

        /// Path to the aircraft metadata archive (ZIP of per-shard CSVs).
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
    /// Replay a capture-file corpus directly into the state manager.
    Replay {
        /// Path to a capture file (timestamp_ns + 14-byte frame records).
        file: PathBuf,

        /// Path to the aircraft metadata archive (ZIP of per-shard CSVs).
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Demod { file, window, metadata } => run_demod(file, window, metadata).await,
        Commands::Replay { file, metadata } => run_replay(file, metadata).await,
    }
}

async fn run_demod(file: PathBuf, window: usize, metadata: Option<PathBuf>) {
    let reader = open_or_exit(&file);
    let runner = match PipelineRunner::spawn_demod(reader, window) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("error starting demodulator: {e}");
            std::process::exit(1);
        }
    };
    run_with_manager(runner, metadata).await;
}

async fn run_replay(file: PathBuf, metadata: Option<PathBuf>) {
    let reader = open_or_exit(&file);
    let runner = PipelineRunner::spawn_replay(reader);
    run_with_manager(runner, metadata).await;
}

fn open_or_exit(path: &PathBuf) -> File {
    match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error opening {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

async fn run_with_manager(runner: PipelineRunner, metadata: Option<PathBuf>) {
    let store = metadata.and_then(|path| match File::open(&path) {
        Ok(f) => MetadataStore::open(BufReader::new(f)).ok(),
        Err(e) => {
            eprintln!("warning: could not open metadata archive {}: {e}", path.display());
            None
        }
    });
    let mut manager = StateManager::new(store);
    runner.run(&mut manager, |mgr| print_table(mgr)).await;
}

fn print_table<R: Read + Seek>(manager: &StateManager<R>) {
    let mut table = Table::new();
    table.set_header(vec![
        "ICAO",
        "Callsign",
        "Category",
        "Altitude (m)",
        "Speed (m/s)",
        "Lat",
        "Lon",
    ]);
    for ac in manager.known_aircraft() {
        table.add_row(row_for(ac));
    }
    println!("{table}");
}

fn row_for(ac: &AircraftState) -> Vec<Cell> {
    let (lat_deg, lon_deg) = ac
        .position
        .map(|p| (p.lat_rad().to_degrees(), p.lon_rad().to_degrees()))
        .unwrap_or((0.0, 0.0));
    vec![
        Cell::new(ac.icao.to_string()),
        Cell::new(
            ac.callsign
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".into()),
        ),
        Cell::new(
            ac.category
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".into()),
        ),
        Cell::new(if ac.altitude_known() {
            format!("{:.0}", ac.altitude_m)
        } else {
            "-".into()
        }),
        Cell::new(if ac.velocity_mps.is_finite() {
            format!("{:.1}", ac.velocity_mps)
        } else {
            "-".into()
        }),
        Cell::new(format!("{lat_deg:.4}")),
        Cell::new(format!("{lon_deg:.4}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Builds a one-record replay capture file on disk and drives it through
    /// `run_replay` end to end, exercising real file I/O instead of an
    /// in-memory reader.
    #[tokio::test]
    async fn run_replay_reads_a_capture_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.bin");

        let mut frame = vec![0x8Du8, 0x11, 0x22, 0x33];
        frame.extend_from_slice(&[0u8; 7]);
        let crc = mode1090_core::crc::crc24(&frame[..11]);
        frame.push(((crc >> 16) & 0xFF) as u8);
        frame.push(((crc >> 8) & 0xFF) as u8);
        frame.push((crc & 0xFF) as u8);

        let mut record = 0i64.to_be_bytes().to_vec();
        record.extend_from_slice(&frame);

        let mut file = File::create(&path).unwrap();
        file.write_all(&record).unwrap();
        drop(file);

        run_replay(path, None).await;
    }
}
