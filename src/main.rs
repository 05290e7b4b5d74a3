//! Command-line entry point — Symptom Insight.
//!
//! # Startup sequence
//!
//! 1. Parse arguments and initialise logging.
//! 2. Load [`AppConfig`] (explicit path, or the platform default; defaults
//!    on first run or on a broken file).
//! 3. Build the [`InferenceDispatcher`] once — this is where the model is
//!    probed and the process commits to model-backed or rule-based mode.
//! 4. Read the submission (decoding the image, if any) and run one
//!    assessment.
//! 5. Print the narrative, or the JSON report with `--json`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use symptom_insight::{
    assessment::{InferenceDispatcher, Prompt},
    config::{AppConfig, OperatingMode},
    intake::{AssessmentReport, ErrorReport, RawSubmission},
};

/// Assess free-text symptoms, vitals and an optional image.
#[derive(Parser, Debug)]
#[command(name = "symptom-insight")]
#[command(version)]
#[command(about = "Natural-language symptom assessment with a rule-based fallback")]
#[command(long_about = None)]
struct Args {
    /// Free-text description of the symptoms
    #[arg(short, long, default_value = "")]
    symptoms: String,

    /// Heart rate in bpm
    #[arg(long, default_value = "")]
    heart_rate: String,

    /// Blood pressure, e.g. 120/80
    #[arg(long, default_value = "")]
    blood_pressure: String,

    /// Body temperature in °C
    #[arg(long, default_value = "")]
    temperature: String,

    /// Image of the affected area (PNG, JPEG, GIF, BMP)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the model and use the rule-based engine
    #[arg(long)]
    rule_based: bool,

    /// Print the JSON report instead of the bare narrative
    #[arg(long)]
    json: bool,

    /// Print the normalized prompt and exit
    #[arg(long)]
    print_prompt: bool,

    /// Verbosity: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn submission(&self) -> RawSubmission {
        RawSubmission {
            symptoms: self.symptoms.clone(),
            heart_rate: self.heart_rate.clone(),
            blood_pressure: self.blood_pressure.clone(),
            temperature: self.temperature.clone(),
            image_path: self.image.clone(),
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn load_config(args: &Args) -> AppConfig {
    let loaded = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if args.rule_based {
        config.operating_mode = OperatingMode::RuleBased;
    }
    config
}

fn fail(error: &dyn std::fmt::Display, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(&ErrorReport::new(error)) {
            Ok(body) => println!("{body}"),
            Err(_) => println!("{}", serde_json::json!({ "error": error.to_string() })),
        }
    } else {
        eprintln!("error: {error}");
    }
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Arguments + logging
    let args = Args::parse();
    init_logging(args.verbose);
    log::info!("Symptom Insight starting up");

    // 2. Configuration
    let config = load_config(&args);

    // 3. Request intake (image decode failures stop here)
    let request = match args.submission().into_request() {
        Ok(request) => request,
        Err(e) => {
            log::error!("intake failed: {e}");
            return fail(&e, args.json);
        }
    };

    if args.print_prompt {
        print!("{}", Prompt::from_request(&request));
        return ExitCode::SUCCESS;
    }

    // 4. Dispatcher — inference mode is fixed from here on
    let dispatcher = InferenceDispatcher::from_config(&config).await;
    let mode = dispatcher.mode().label();

    // 5. Assessment
    let result = match dispatcher.assess(&request).await {
        Ok(result) => result,
        Err(e) => return fail(&e, args.json),
    };

    if args.json {
        let report = AssessmentReport::new(&request, result, mode);
        match serde_json::to_string_pretty(&report) {
            Ok(body) => println!("{body}"),
            Err(e) => return fail(&e, false),
        }
    } else {
        println!("{}", result.narrative());
    }

    ExitCode::SUCCESS
}
