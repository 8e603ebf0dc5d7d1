//! Command-line front end: argument parsing, the field summary, and the
//! interactive overwrite prompt.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use picpt_core::{FieldError, FieldSelector, ParameterError};
use picpt_field::FieldStore;
use picpt_trajectory::{save_trajectory, ConfirmOverwrite, OverwritePolicy};
use picpt_tracer::{RunError, StopReason, Tracer, TracerConfig};

/// Usage line printed on argument errors.
pub const USAGE: &str = "usage: picpt <config.json> [--dump] [--yes] [--field <Bx|By|Bz|B|Ex|Ey|Ez|E>]";

/// Parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    /// Run configuration file.
    pub config: PathBuf,
    /// Print the effective parameters and exit.
    pub dump: bool,
    /// Overwrite an existing output file without asking.
    pub yes: bool,
    /// Summarise this field of the first bracket and exit.
    pub field: Option<FieldSelector>,
}

impl CliArgs {
    /// Parse arguments (without the program name).
    pub fn parse<I, S>(args: I) -> Result<Self, ParameterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = None;
        let mut dump = false;
        let mut yes = false;
        let mut field = None;
        let mut args = args.into_iter().map(Into::<String>::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dump" => dump = true,
                "--yes" | "-y" => yes = true,
                "--field" => {
                    let value = args.next().ok_or_else(|| {
                        ParameterError::new("--field", "expects a field name")
                    })?;
                    field = Some(value.parse::<FieldSelector>()?);
                }
                flag if flag.starts_with('-') => {
                    return Err(ParameterError::new(flag, "unknown option"));
                }
                _ if config.is_some() => {
                    return Err(ParameterError::new(
                        "arguments",
                        format!("unexpected extra argument {arg:?}"),
                    ));
                }
                _ => config = Some(PathBuf::from(&arg)),
            }
        }
        let config = config
            .ok_or_else(|| ParameterError::new("arguments", "missing configuration file"))?;
        Ok(Self {
            config,
            dump,
            yes,
            field,
        })
    }
}

/// Range and mean of one field selector over a snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSummary {
    /// What was summarised.
    pub selector: FieldSelector,
    /// Smallest site value.
    pub min: f64,
    /// Largest site value.
    pub max: f64,
    /// Mean over all sites.
    pub mean: f64,
    /// Number of sites.
    pub sites: usize,
}

impl FieldSummary {
    /// Summarise `selector` over snapshot "a" of `store`.
    pub fn of(store: &FieldStore, selector: FieldSelector) -> Result<Self, FieldError> {
        let values = store.site_values(selector)?;
        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + v),
        );
        Ok(Self {
            selector,
            min,
            max,
            mean: sum / values.len() as f64,
            sites: values.len(),
        })
    }
}

impl fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: min {:.6e} max {:.6e} mean {:.6e} over {} sites",
            self.selector, self.min, self.max, self.mean, self.sites
        )
    }
}

/// Asks on stdin before replacing an existing output file.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl ConfirmOverwrite for StdinPrompt {
    fn confirm(&mut self, path: &Path) -> bool {
        print!("{} exists. Overwrite? [y/N] ", path.display());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"),
            Err(_) => false,
        }
    }
}

/// Run the tool for parsed arguments.
pub fn execute(args: &CliArgs) -> Result<(), RunError> {
    let config = TracerConfig::from_path(&args.config)?;

    if args.dump {
        config.validate()?;
        for (key, value) in config.dump() {
            println!("{key} = {value}");
        }
        return Ok(());
    }

    let mut tracer = Tracer::from_config(&config)?;

    if let Some(selector) = args.field {
        let bracket = tracer.first_bracket()?.ok_or(FieldError::NoBracket)?;
        tracer.store_mut().update(bracket.a, bracket.b)?;
        let summary = FieldSummary::of(tracer.store(), selector)?;
        log::info!("snapshot {}: {summary}", bracket.a);
        println!("{summary}");
        return Ok(());
    }

    let report = tracer.run()?;
    match &report.stop {
        StopReason::Escaped { step, particles } => {
            log::info!("stopped on step {step}: particle(s) {particles:?} escaped")
        }
        other => log::info!("stopped: {other:?}"),
    }
    log::info!(
        "{} bracket(s), {} snapshot(s) loaded, {} reused, load {} us, push {} us",
        report.metrics.brackets,
        report.metrics.snapshots_loaded,
        report.metrics.snapshots_reused,
        report.metrics.load_us,
        report.metrics.push_us
    );

    let mut confirm: Box<dyn ConfirmOverwrite> = if args.yes {
        Box::new(OverwritePolicy::Always)
    } else {
        Box::new(StdinPrompt)
    };
    save_trajectory(
        &config.output.path,
        &report.trajectory,
        &config.output.scale,
        confirm.as_mut(),
    )?;
    Ok(())
}
