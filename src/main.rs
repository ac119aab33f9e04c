//! Count the frames in xtc trajectories, quickly.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use xtclen::{
    scan_path_with, FrameInfo, ProgressEstimator, ScanError, ScanOptions, TrajectorySummary,
};

/// Report the number of frames, the duration and the number of atoms of xtc trajectories.
///
/// Only the frame headers are read. The compressed positions are skipped over.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input paths (xtc).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Do not print progress estimates while scanning.
    #[arg(short, long)]
    quiet: bool,

    /// Fail on frames that do not start with the xtc magic number.
    #[arg(long)]
    strict: bool,

    /// Print the time value for every frame to standard output.
    #[arg(long)]
    times: bool,

    /// Print the step number for every frame to standard output.
    ///
    /// If both `times` and `steps` are active, they will be separated by tabs and printed in that order.
    #[arg(long)]
    steps: bool,

    /// Log more details to standard error. May be repeated.
    ///
    /// The `RUST_LOG` environment variable takes precedence over this flag.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = ScanOptions::default().strict_magic(args.strict);
    let mut failed = 0;
    for path in &args.inputs {
        match report(path, &args, &options) {
            Ok(summary) => println!(
                "{}: {} frames, {} ns, {} atoms",
                path.display(),
                summary.frame_count,
                summary.final_sim_time_ps / 1000.0,
                summary.atom_count,
            ),
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        tracing::debug!(
            failed,
            total = args.inputs.len(),
            "some inputs could not be scanned"
        );
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Scan a single trajectory, printing progress and per-frame values along the way as requested.
fn report(
    path: &Path,
    args: &Args,
    options: &ScanOptions,
) -> Result<TrajectorySummary, ScanError> {
    // A missing size only disables the progress estimates. Opening the file reports the error.
    let total_size = std::fs::metadata(path).map(|m| m.len()).ok();
    let show_progress = !args.quiet && total_size.is_some();

    let mut estimator = ProgressEstimator::new();
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let mut reported = false;
    // The first failure to write output. It is reported once the scan is done.
    let mut write_error: Option<std::io::Error> = None;
    let mut on_frame = |frame: &FrameInfo| {
        if args.times || args.steps {
            if let Err(err) = print_frame(&mut stdout, frame, args.times, args.steps) {
                write_error = write_error.take().or(Some(err));
            }
        }

        if !show_progress {
            return;
        }
        if let Some(progress) = estimator.observe(frame, total_size.unwrap_or_default()) {
            reported = true;
            let written = write!(
                stderr,
                "\r{}: frame {} ({:.0}%), ~{:.0} frames, ~{:.3} ns",
                path.display(),
                progress.frames,
                progress.percent_complete.min(100.0),
                progress.estimated_total_frames,
                progress.estimated_total_time / 1000.0,
            );
            if let Err(err) = written {
                write_error = write_error.take().or(Some(err));
            }
        }
    };

    let summary = scan_path_with(path, options, &mut on_frame);
    if reported {
        // Clear the progress line.
        eprint!("\r\x1b[2K");
    }
    let summary = summary?;
    match write_error {
        Some(err) => Err(err.into()),
        None => Ok(summary),
    }
}

fn print_frame(
    out: &mut impl Write,
    frame: &FrameInfo,
    times: bool,
    steps: bool,
) -> std::io::Result<()> {
    if times {
        write!(out, "{:.3}\t", frame.header.time)?;
    }
    if steps {
        write!(out, "{}", frame.header.step)?;
    }
    writeln!(out)
}
