//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the decay pipeline and prints/plots/exports its results
//! - runs the bounce calculator (flags or interactive prompts)
//! - writes synthetic datasets

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::bounce::{BounceParams, simulate_bounces, validate_coefficient, validate_initial_height, validate_minimum_height};
use crate::cli::prompt::Prompter;
use crate::cli::{BounceArgs, Command, DecayArgs, SimulateArgs};
use crate::domain::{
    DEFAULT_DATA_FILES, DecayConfig, DecayConstants, Measurement, SECONDS_PER_MINUTE, SaveMode, SimulateConfig,
};
use crate::error::AppError;

pub mod pipeline;

const POSITIVE_HINT: &str = "Please enter a positive number";
const FRACTION_HINT: &str = "Please enter a positive number between 0 and 1";

/// Entry point for the `physfit` binary.
pub fn run() -> Result<(), AppError> {
    // A local `.env` may provide PHYSFIT_* defaults for clap.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Decay(args) => handle_decay(args),
        Command::Bounce(args) => handle_bounce(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_decay(args: DecayArgs) -> Result<(), AppError> {
    let config = decay_config_from_args(&args)?;
    let run = pipeline::run_decay(&config)?;
    let constants = run.final_fit.constants;

    if let Some(path) = &config.plot_path {
        crate::plot::write_activity_svg(path, &run.split.kept, &constants, config.curve_points)?;
    }

    print!("{}", crate::report::format_decay_report(&run, &config));

    if config.ascii_plot {
        let plot = crate::plot::render_ascii_plot(
            &run.split.kept,
            &run.split.rejected,
            &constants,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.summary_json {
        let summary = crate::io::summary::FitSummary::from_run(&run, &config);
        crate::io::summary::write_summary_json(path, &summary)?;
    }

    save_final_data(&run.split.kept, &config, &mut Prompter::stdio())?;
    Ok(())
}

/// Write the filtered dataset if asked to; returns whether it was written.
fn save_final_data<R: BufRead, W: Write>(
    data: &[Measurement],
    config: &DecayConfig,
    prompter: &mut Prompter<R, W>,
) -> Result<bool, AppError> {
    let save = match config.save {
        SaveMode::Yes => true,
        SaveMode::No => false,
        SaveMode::Ask => prompter.ask_yes_no(&format!(
            "Do you want to save the array for the filtered dataset as a csv file? It will be saved as {} (yes/no) ",
            config.export_path.display()
        ))?,
    };

    if save {
        crate::io::export::write_measurements_csv(&config.export_path, data)?;
        prompter.say(&format!("Saved {} rows to {}", data.len(), config.export_path.display()))?;
    } else {
        prompter.say("Array has not been saved")?;
    }
    Ok(save)
}

fn handle_bounce(args: BounceArgs) -> Result<(), AppError> {
    let params = bounce_params(&args, &mut Prompter::stdio())?;
    let outcome = simulate_bounces(&params);
    print!("{}", crate::report::format_bounce_report(&outcome));
    Ok(())
}

/// Take each value from its flag when given (invalid flags are usage errors),
/// otherwise prompt until a valid value is entered.
fn bounce_params<R: BufRead, W: Write>(
    args: &BounceArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<BounceParams, AppError> {
    let initial_height = match args.initial_height {
        Some(h) => validate_initial_height(h).map_err(|e| flag_error("--initial-height", e))?,
        None => prompter.ask_number(
            "Please enter an initial height assuming units of meters:",
            POSITIVE_HINT,
            validate_initial_height,
        )?,
    };

    let minimum_height = match args.minimum_height {
        Some(h) => validate_minimum_height(h, initial_height).map_err(|e| flag_error("--minimum-height", e))?,
        None => prompter.ask_number(
            "Please enter the minimum height assuming units meters:",
            POSITIVE_HINT,
            |h| validate_minimum_height(h, initial_height),
        )?,
    };

    let coefficient = match args.coefficient {
        Some(e) => validate_coefficient(e).map_err(|e| flag_error("--coefficient", e))?,
        None => prompter.ask_number(
            "Please enter a coefficient of energy loss:",
            FRACTION_HINT,
            |e| BounceParams::new(initial_height, minimum_height, e).map(|p| p.coefficient),
        )?,
    };

    BounceParams::new(initial_height, minimum_height, coefficient).map_err(AppError::usage)
}

fn flag_error(flag: &str, message: String) -> AppError {
    AppError::usage(format!("Invalid {flag}: {message}"))
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = simulate_config_from_args(&args);
    let paths = crate::data::write_sample(&config)?;
    for path in paths {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

pub fn decay_config_from_args(args: &DecayArgs) -> Result<DecayConfig, AppError> {
    if !(args.report_minutes.is_finite() && args.report_minutes >= 0.0) {
        return Err(AppError::usage("--report-minutes must be a non-negative number."));
    }

    let data_files = if args.data.is_empty() {
        DEFAULT_DATA_FILES.iter().map(PathBuf::from).collect()
    } else {
        args.data.clone()
    };

    Ok(DecayConfig {
        data_files,
        plot_path: (!args.no_plot).then(|| args.plot.clone()),
        ascii_plot: args.ascii_plot,
        plot_width: args.width,
        plot_height: args.height,
        curve_points: args.curve_points,
        export_path: args.export.clone(),
        save: args.save.into(),
        summary_json: args.summary_json.clone(),
        sigma_threshold: args.sigma_threshold,
        report_time: args.report_minutes * SECONDS_PER_MINUTE,
        max_iterations: args.max_iterations,
    })
}

pub fn simulate_config_from_args(args: &SimulateArgs) -> SimulateConfig {
    SimulateConfig {
        output_dir: args.output_dir.clone(),
        points: args.points,
        seed: args.seed,
        truth: DecayConstants::new(args.strontium, args.rubidium),
        noise: args.noise,
        outlier_prob: args.outlier_prob,
        missing_prob: args.missing_prob,
        max_hours: args.max_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::error::EXIT_USAGE;

    fn decay_args(extra: &[&str]) -> DecayArgs {
        let mut argv = vec!["physfit", "decay"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Decay(args) => args,
            _ => panic!("expected decay"),
        }
    }

    #[test]
    fn decay_config_defaults() {
        let config = decay_config_from_args(&decay_args(&["-d", "a.csv"])).unwrap();
        assert_eq!(config.data_files, vec![PathBuf::from("a.csv")]);
        assert_eq!(config.report_time, 5400.0);
        assert!(config.plot_path.is_some());

        let config = decay_config_from_args(&decay_args(&["-d", "a.csv", "--no-plot"])).unwrap();
        assert!(config.plot_path.is_none());
    }

    #[test]
    fn save_answer_must_be_exactly_yes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = decay_config_from_args(&decay_args(&["-d", "a.csv"])).unwrap();
        config.export_path = dir.path().join("final_data.csv");
        let data = vec![Measurement::new(60.0, 2.0e10, 1.0e9)];

        let mut out = Vec::new();
        let saved = save_final_data(&data, &config, &mut Prompter::new(&b"Yes\n"[..], &mut out)).unwrap();
        assert!(!saved);
        assert!(!config.export_path.exists());
        assert!(String::from_utf8(out).unwrap().contains("Array has not been saved"));

        let mut out = Vec::new();
        let saved = save_final_data(&data, &config, &mut Prompter::new(&b"yes\n"[..], &mut out)).unwrap();
        assert!(saved);
        let text = std::fs::read_to_string(&config.export_path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn save_mode_flag_skips_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = decay_config_from_args(&decay_args(&["-d", "a.csv", "--save", "yes"])).unwrap();
        config.export_path = dir.path().join("out.csv");

        let mut out = Vec::new();
        let saved = save_final_data(&[], &config, &mut Prompter::new(&b""[..], &mut out)).unwrap();
        assert!(saved);
        assert!(config.export_path.exists());
        assert_eq!(config.save, SaveMode::Yes);
    }

    #[test]
    fn bounce_prompts_until_valid() {
        let args = BounceArgs {
            initial_height: None,
            minimum_height: None,
            coefficient: None,
        };
        let input = b"two\n2\n5\n0.01\n1.5\n0.5\n";
        let mut out = Vec::new();
        let params = bounce_params(&args, &mut Prompter::new(&input[..], &mut out)).unwrap();
        assert_eq!(params, BounceParams::new(2.0, 0.01, 0.5).unwrap());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(POSITIVE_HINT));
        assert!(text.contains("Minimum height must be less than the initial height"));
        assert!(text.contains("Value must be more than 0 and less than 1"));
    }

    #[test]
    fn bounce_flags_skip_prompts_and_invalid_flags_fail() {
        let args = BounceArgs {
            initial_height: Some(2.0),
            minimum_height: Some(0.01),
            coefficient: Some(0.5),
        };
        let mut out = Vec::new();
        let params = bounce_params(&args, &mut Prompter::new(&b""[..], &mut out)).unwrap();
        assert_eq!(params.initial_height, 2.0);
        assert!(out.is_empty());

        let bad = BounceArgs {
            coefficient: Some(1.0),
            ..args
        };
        let err = bounce_params(&bad, &mut Prompter::new(&b""[..], &mut Vec::new())).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let endless = BounceArgs {
            coefficient: Some(0.999_999_999_999_999_9),
            ..args
        };
        let err = bounce_params(&endless, &mut Prompter::new(&b""[..], &mut Vec::new())).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn bounce_prompt_reasks_when_too_many_bounces() {
        let args = BounceArgs {
            initial_height: Some(1.0),
            minimum_height: Some(0.01),
            coefficient: None,
        };
        let mut out = Vec::new();
        let params = bounce_params(&args, &mut Prompter::new(&b"0.9999999999999999
0.9
"[..], &mut out)).unwrap();
        assert_eq!(params.coefficient, 0.9);
        assert!(String::from_utf8(out).unwrap().contains("bounces"));
    }
}
