//! CLI command implementations
//!
//! The CLI is a thin collaborator around the engine: it loads the dataset,
//! builds a session from the config file and speaks JSON lines. In session
//! mode stdout carries only protocol responses; log lines go to stderr.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::dataset::{Dataset, DatasetLoader};
use crate::engine::{Command as EngineCommand, Explainer, SessionOptions, Thresholds};
use crate::observability::{Event, LogSink, Logger};

use super::args::{Command, ThresholdArgs};
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_requests, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Dataset JSON file (required); relative paths resolve against the config file
    pub dataset_path: String,

    /// Initial minimum support (optional, default 0)
    #[serde(default)]
    pub support_threshold: i64,

    /// Initial minimum confidence (optional, default 0)
    #[serde(default)]
    pub absolute_confidence_threshold: f64,

    /// Initial number of top-confidence rules kept (optional, default all)
    #[serde(default)]
    pub relative_confidence_threshold: Option<i64>,

    /// Retain derivation results between commands (optional, default true)
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Emit session log lines (optional, default true)
    #[serde(default = "default_true")]
    pub log_events: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let dataset = Path::new(&config.dataset_path);
        if dataset.is_relative() {
            if let Some(dir) = path.parent() {
                config.dataset_path = dir.join(dataset).display().to_string();
            }
        }

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.dataset_path.trim().is_empty() {
            return Err(CliError::config_error("dataset_path must not be empty"));
        }
        if !self.absolute_confidence_threshold.is_finite() {
            return Err(CliError::config_error(
                "absolute_confidence_threshold must be a finite number",
            ));
        }
        Ok(())
    }

    /// Dataset path
    pub fn dataset_path(&self) -> PathBuf {
        PathBuf::from(&self.dataset_path)
    }

    /// Initial thresholds for a dataset with `rule_count` rules, with
    /// command-line overrides applied
    pub fn thresholds(&self, overrides: &ThresholdArgs, rule_count: usize) -> Thresholds {
        let relative = overrides
            .relative
            .or(self.relative_confidence_threshold)
            .unwrap_or(rule_count as i64);
        Thresholds::clamped(
            overrides.support.unwrap_or(self.support_threshold),
            overrides
                .absolute
                .unwrap_or(self.absolute_confidence_threshold),
            relative,
            rule_count,
        )
    }
}

/// Parse arguments and run against the process's stdin/stdout
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    run_command(cli.command, stdin.lock(), &mut stdout)
}

/// Dispatch a parsed command
pub fn run_command<R: BufRead, W: Write>(command: Command, input: R, output: &mut W) -> CliResult<()> {
    match command {
        Command::Validate { dataset } => validate(&dataset, output),
        Command::Report { config, thresholds } => report(&config, &thresholds, output),
        Command::Session { config, thresholds } => session(&config, &thresholds, input, output),
    }
}

/// Load a dataset and print its summary
pub fn validate<W: Write>(path: &Path, output: &mut W) -> CliResult<()> {
    let dataset = DatasetLoader::load_file(path)?;
    write_response(output, &summary(&dataset))
}

/// Derive one view and print it
pub fn report<W: Write>(config_path: &Path, overrides: &ThresholdArgs, output: &mut W) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let explainer = open_session(&config, overrides, session_logger(&config))?;
    write_response(output, &view_json(&explainer))
}

/// Serve a command session until input ends or an input switch is requested
pub fn session<R: BufRead, W: Write>(
    config_path: &Path,
    overrides: &ThresholdArgs,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let mut explainer = open_session(&config, overrides, session_logger(&config))?;
    write_response(output, &view_json(&explainer))?;

    for request in read_requests(input) {
        let request = match request {
            Ok(v) => v,
            // A failing input stream will not recover
            Err(e) if e.code() == &CliErrorCode::IoError => return Err(e),
            Err(e) => {
                write_error(output, e.code_str(), e.message())?;
                continue;
            }
        };

        let command: EngineCommand = match serde_json::from_value(request) {
            Ok(c) => c,
            Err(e) => {
                write_error(output, "RULEVIEW_CLI_COMMAND_ERROR", &format!("Unknown command: {}", e))?;
                continue;
            }
        };

        match explainer.dispatch(command) {
            Ok(outcome) if outcome.switch_requested => {
                write_response(output, &json!({ "switch_input": true }))?;
                break;
            }
            Ok(_) => write_response(output, &view_json(&explainer))?,
            Err(e) => write_error(output, e.code(), &e.to_string())?,
        }
    }

    Ok(())
}

fn session_logger(config: &Config) -> Logger {
    if config.log_events {
        Logger::new(LogSink::Stderr)
    } else {
        Logger::silent()
    }
}

fn open_session(config: &Config, overrides: &ThresholdArgs, logger: Logger) -> CliResult<Explainer> {
    let path = config.dataset_path();
    let dataset = match DatasetLoader::load_file(&path) {
        Ok(ds) => ds,
        Err(e) => {
            let fields = [
                ("path", path.display().to_string()),
                ("code", e.code().code().to_string()),
                ("message", e.message().to_string()),
            ];
            let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
            if e.is_fatal() {
                logger.fatal(Event::DatasetLoad.as_str(), &fields);
            } else {
                logger.error(Event::DatasetLoad.as_str(), &fields);
            }
            return Err(e.into());
        }
    };

    let options = SessionOptions {
        thresholds: Some(config.thresholds(overrides, dataset.rule_count())),
        cache_enabled: config.cache_enabled,
        logger: logger.clone(),
    };
    let explainer = Explainer::with_options(Arc::new(dataset), options)?;

    logger
        .with_session(explainer.session_id().to_string())
        .log_event(Event::DatasetLoad, &[("path", &path.display().to_string())]);
    Ok(explainer)
}

fn summary(dataset: &Dataset) -> Value {
    json!({
        "rules": dataset.rule_count(),
        "tokens": dataset.token_count(),
        "labeled": dataset.labeled_count(),
        "classes": dataset.class_names,
    })
}

/// Display name of the highlighted token's true class, if it has one
fn highlighted_class(explainer: &Explainer) -> Option<String> {
    let dataset = explainer.dataset();
    let token = explainer.highlight().token()?;
    let label = dataset.tokens.get(token)?.label?;
    Some(dataset.class_name(label))
}

fn view_json(explainer: &Explainer) -> Value {
    let metrics = explainer.metrics();
    json!({
        "thresholds": explainer.thresholds(),
        "enabled_rules": explainer.enabled_rules(),
        "enabled": explainer.enabled(),
        "correct": explainer.correct(),
        "metrics": metrics,
        "n_wrong": metrics.n_wrong(),
        "n_disabled": metrics.n_disabled(),
        "highlight": explainer.highlight(),
        "highlight_class": highlighted_class(explainer),
        "features": explainer.highlighted_features(),
    })
}
