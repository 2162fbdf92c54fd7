//! Command-line parsing for the `physfit` tools.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the physics/fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{
    DEFAULT_EXPORT_PATH, DEFAULT_PLOT_PATH, INITIAL_RUBIDIUM_DECAY_CONSTANT, INITIAL_STRONTIUM_DECAY_CONSTANT,
    SaveMode,
};

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "physfit", version, about = "Decay-chain fitting and bouncy-ball kinematics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit Sr-79/Rb-79 decay constants to activity measurements, report half-lives and plot.
    Decay(DecayArgs),
    /// Count bounces and total flight time of a ball with a restitution coefficient.
    ///
    /// Values not given as flags are asked for interactively.
    Bounce(BounceArgs),
    /// Write a synthetic pair of decay CSV files (noise, outliers, missing fields).
    Simulate(SimulateArgs),
}

/// `--save` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SaveArg {
    /// Ask on stdin.
    Ask,
    Yes,
    No,
}

impl From<SaveArg> for SaveMode {
    fn from(arg: SaveArg) -> Self {
        match arg {
            SaveArg::Ask => SaveMode::Ask,
            SaveArg::Yes => SaveMode::Yes,
            SaveArg::No => SaveMode::No,
        }
    }
}

/// Options for the decay fit.
#[derive(Debug, Parser, Clone)]
pub struct DecayArgs {
    /// Input CSV file (repeatable). Defaults to Nuclear_data_1.csv and Nuclear_data_2.csv.
    #[arg(short = 'd', long = "data", value_name = "CSV", env = "PHYSFIT_DATA")]
    pub data: Vec<PathBuf>,

    /// SVG plot output path.
    #[arg(long, value_name = "SVG", env = "PHYSFIT_PLOT", default_value = DEFAULT_PLOT_PATH)]
    pub plot: PathBuf,

    /// Do not write the SVG plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Also print an ASCII plot to the terminal.
    #[arg(long)]
    pub ascii_plot: bool,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Samples of the fitted curve drawn in the SVG.
    #[arg(long, default_value_t = 2000)]
    pub curve_points: usize,

    /// Path of the filtered-dataset CSV export.
    #[arg(long, value_name = "CSV", default_value = DEFAULT_EXPORT_PATH)]
    pub export: PathBuf,

    /// Whether to save the filtered dataset (ask interactively by default).
    #[arg(long, value_enum, default_value_t = SaveArg::Ask)]
    pub save: SaveArg,

    /// Write a JSON summary of the fit.
    #[arg(long, value_name = "JSON")]
    pub summary_json: Option<PathBuf>,

    /// Outlier threshold in measurement uncertainties.
    #[arg(long, default_value_t = 3.0)]
    pub sigma_threshold: f64,

    /// Report the fitted activity at this time (minutes).
    #[arg(long, default_value_t = 90.0)]
    pub report_minutes: f64,

    /// Levenberg–Marquardt iteration limit per fit.
    #[arg(long, default_value_t = 200)]
    pub max_iterations: usize,
}

/// Options for the bounce calculator.
#[derive(Debug, Parser, Clone)]
pub struct BounceArgs {
    /// Drop height (m).
    #[arg(long)]
    pub initial_height: Option<f64>,

    /// Height floor (m); bounces peaking at or below it are not counted.
    #[arg(long)]
    pub minimum_height: Option<f64>,

    /// Fraction of height kept after each bounce, in (0, 1).
    #[arg(long, short = 'e')]
    pub coefficient: Option<f64>,
}

/// Options for synthetic data generation.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Directory receiving Nuclear_data_1.csv and Nuclear_data_2.csv.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Rows per file.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub points: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// True Sr-79 decay constant (s⁻¹).
    #[arg(long, default_value_t = INITIAL_STRONTIUM_DECAY_CONSTANT)]
    pub strontium: f64,

    /// True Rb-79 decay constant (s⁻¹).
    #[arg(long, default_value_t = INITIAL_RUBIDIUM_DECAY_CONSTANT)]
    pub rubidium: f64,

    /// Relative 1-sigma activity noise.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Probability of a ±10σ outlier per row.
    #[arg(long, default_value_t = 0.03)]
    pub outlier_prob: f64,

    /// Probability of a blanked field per row.
    #[arg(long, default_value_t = 0.03)]
    pub missing_prob: f64,

    /// End of the measurement window (hours).
    #[arg(long, default_value_t = 3.0)]
    pub max_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_defaults_parse() {
        let cli = Cli::parse_from(["physfit", "decay"]);
        let Command::Decay(args) = cli.command else {
            panic!("expected decay");
        };
        assert!(args.data.is_empty() || std::env::var_os("PHYSFIT_DATA").is_some());
        assert_eq!(args.save, SaveArg::Ask);
        assert_eq!(args.sigma_threshold, 3.0);
        assert_eq!(args.export, PathBuf::from(DEFAULT_EXPORT_PATH));
    }

    #[test]
    fn decay_accepts_repeated_data_flags() {
        let cli = Cli::parse_from(["physfit", "decay", "-d", "a.csv", "--data", "b.csv", "--save", "no"]);
        let Command::Decay(args) = cli.command else {
            panic!("expected decay");
        };
        assert_eq!(args.data, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(args.save, SaveArg::No);
    }

    #[test]
    fn data_path_keeps_commas() {
        let cli = Cli::parse_from(["physfit", "decay", "-d", "runs/a,b.csv"]);
        let Command::Decay(args) = cli.command else {
            panic!("expected decay");
        };
        assert_eq!(args.data, vec![PathBuf::from("runs/a,b.csv")]);
    }

    #[test]
    fn bounce_flags_are_optional() {
        let cli = Cli::parse_from(["physfit", "bounce", "--initial-height", "2", "-e", "0.5"]);
        let Command::Bounce(args) = cli.command else {
            panic!("expected bounce");
        };
        assert_eq!(args.initial_height, Some(2.0));
        assert_eq!(args.minimum_height, None);
        assert_eq!(args.coefficient, Some(0.5));
    }
}
