//! CLI entrypoint for parley
//!
//! Loads a session settings file, wires the built-in parties through the
//! in-process transport and runs one negotiation session to completion.

use anyhow::{bail, Context, Result};
use clap::Parser;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use parley_application::{ConnectionFactory, ProfileSource, RunMopacUseCase, RunSaopUseCase};
use parley_domain::{
    Deadline, MopacSettings, Parameters, PartyWithProfile, SaopSettings, SessionResult,
    VotingEvaluator,
};
use parley_infrastructure::{
    FileProfileSource, InProcessConnectionFactory, PartyRegistry, TracingConnectionFactory,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parley", about = "Run a negotiation session", version)]
struct Cli {
    /// Session settings file (TOML)
    #[arg(short, long, default_value = "session.toml")]
    settings: PathBuf,

    /// Write a JSONL trace of all session traffic to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The session settings file. Environment variables prefixed `PARLEY_`
/// override individual keys.
#[derive(Debug, Deserialize)]
struct SessionConfig {
    /// "saop" or "mopac"
    protocol: String,
    deadline: Deadline,
    /// MOPAC agreement extraction strategy
    #[serde(default)]
    evaluator: VotingEvaluator,
    /// Base directory for profile references; defaults to the settings
    /// file's directory
    profile_dir: Option<PathBuf>,
    #[serde(rename = "party")]
    parties: Vec<PartyConfig>,
}

#[derive(Debug, Deserialize)]
struct PartyConfig {
    /// Party implementation, e.g. "conceder" or "random"
    r#ref: String,
    /// Profile reference resolved against `profile_dir`
    profile: String,
    #[serde(default)]
    parameters: Parameters,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config: SessionConfig = Figment::new()
        .merge(Toml::file(&cli.settings))
        .merge(Env::prefixed("PARLEY_"))
        .extract()
        .with_context(|| format!("cannot load settings from {}", cli.settings.display()))?;

    if config.parties.len() < 2 {
        bail!("a negotiation needs at least 2 parties");
    }

    let profile_dir = config.profile_dir.clone().unwrap_or_else(|| {
        cli.settings
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let profiles = FileProfileSource::new(profile_dir);

    let mut participants = Vec::new();
    for party in &config.parties {
        let profile = profiles
            .fetch(&party.profile)
            .await
            .with_context(|| format!("cannot load profile '{}'", party.profile))?;
        let mut participant = PartyWithProfile::new(&party.r#ref, profile);
        participant.parameters = party.parameters.clone();
        participants.push(participant);
    }

    info!(
        protocol = config.protocol,
        parties = participants.len(),
        "starting session"
    );

    let factory = InProcessConnectionFactory::new(PartyRegistry::builtin());
    let result = match &cli.trace {
        Some(path) => {
            let traced = Arc::new(TracingConnectionFactory::new(factory, path.clone()));
            run_session(&config, participants, traced).await?
        }
        None => run_session(&config, participants, Arc::new(factory)).await?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

async fn run_session<F: ConnectionFactory + 'static>(
    config: &SessionConfig,
    participants: Vec<PartyWithProfile>,
    factory: Arc<F>,
) -> Result<SessionResult> {
    match config.protocol.to_lowercase().as_str() {
        "saop" => {
            let settings = SaopSettings::new(participants, config.deadline)?;
            Ok(RunSaopUseCase::new(factory).execute(settings).await?)
        }
        "mopac" => {
            let settings = MopacSettings::new(participants, config.deadline, config.evaluator)?;
            Ok(RunMopacUseCase::new(factory).execute(settings).await?)
        }
        other => bail!("unknown protocol '{other}', expected saop or mopac"),
    }
}

fn print_summary(result: &SessionResult) {
    if result.agreements.is_empty() {
        println!("No agreement reached.");
    } else {
        println!("Agreements:");
        for (party, bid) in result.agreements.iter() {
            println!("  {party}: {bid}");
        }
    }
    if let Some(error) = &result.error {
        println!("Session ended with a protocol violation: {error}");
    }
}
