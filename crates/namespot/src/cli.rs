use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "namespot",
    about = "Capture camera frames and detect printed names",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Lock capture to a specific camera backend (mock, still, v4l2)
    #[arg(short = 'b', long = "backend")]
    pub backend: Option<String>,

    /// V4L2 device node, e.g. /dev/video0
    #[arg(long = "device")]
    pub device: Option<PathBuf>,

    /// Source directory for the still-image backend
    #[arg(long = "still-dir")]
    pub still_dir: Option<PathBuf>,

    /// Directory for captured frames and reports
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Confidence cutoff for annotating recognized tokens (0-100)
    #[arg(long = "min-confidence")]
    pub min_confidence: Option<f32>,

    /// Recognition language passed to the OCR backend
    #[arg(long = "language")]
    pub language: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture one frame, detect names, and persist the evidence
    Capture {
        /// Also write an annotated frame when names are found
        #[arg(long)]
        annotate: bool,
    },
    /// Capture on a fixed interval until interrupted
    Monitor {
        /// Seconds to wait after each capture completes
        #[arg(long, default_value_t = 30.0, value_parser = parse_interval)]
        interval: f64,
        /// Stop after this many captures instead of running until ctrl-c
        #[arg(long)]
        count: Option<u64>,
    },
    /// Print the camera backends compiled into this build
    ListBackends,
}

fn parse_interval(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if seconds > 0.0 && seconds.is_finite() {
        Ok(seconds)
    } else {
        Err("interval must be a positive number of seconds".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn monitor_rejects_non_positive_intervals() {
        assert!(CliArgs::try_parse_from(["namespot", "monitor", "--interval", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["namespot", "monitor", "--interval", "-5"]).is_err());
        let args =
            CliArgs::try_parse_from(["namespot", "monitor", "--interval", "2.5"]).unwrap();
        match args.command {
            Command::Monitor { interval, .. } => assert_eq!(interval, 2.5),
            _ => panic!("expected monitor command"),
        }
    }
}
