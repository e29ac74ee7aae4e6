//! voiceforge: convert text files to MP3 with a remote TTS service.
//!
//! Usage:
//!   voiceforge convert --input story.txt [--voice <id>] [--preset <name>]
//!   voiceforge list-voices [--ids-only] [--limit <n>]
//!   voiceforge presets
//!   voiceforge config <set-api-key|remove-api-key|set-default-voice|set-output-dir|show|list-providers|reset>

use anyhow::{anyhow, bail, Context};
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use voiceforge::config::{resolve_config_dir, ConfigManager, CredentialStore, KeyringCredentials};
use voiceforge::input::{self, TextStats};
use voiceforge::output::{ensure_output_dir, resolve_output_path};
use voiceforge::tts::{ConversionOutcome, ConversionRequest, Mp3Bitrate, ProviderRegistry, TtsProvider};
use voiceforge::{logging, presets};

#[derive(Parser)]
#[command(name = "voiceforge", version, about = "Convert text files to MP3 audio")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding config.yaml
    #[arg(long, global = true, env = "VOICEFORGE_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Also append logs to <DIR>/voiceforge.log
    #[arg(long, global = true, env = "VOICEFORGE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a text file to MP3
    Convert(ConvertArgs),
    /// List available voices
    ListVoices {
        #[arg(short, long)]
        provider: Option<String>,
        #[arg(long)]
        ids_only: bool,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show speech presets
    Presets,
    /// Manage configuration and API keys
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct ConvertArgs {
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    #[arg(short, long)]
    provider: Option<String>,
    /// Voice or model ID; overrides the preset's voice
    #[arg(long)]
    voice: Option<String>,
    #[arg(long)]
    preset: Option<String>,
    #[arg(
        long,
        default_value_t = 128,
        value_parser = PossibleValuesParser::new(["64", "128", "192"])
            .map(|s| s.parse::<u32>().unwrap_or(128))
    )]
    bitrate: u32,
    #[arg(long)]
    overwrite: bool,
    /// Print the cost estimate and stop
    #[arg(long)]
    estimate_only: bool,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Subcommand)]
enum ConfigAction {
    SetApiKey {
        provider: String,
        /// Read from stdin when omitted
        key: Option<String>,
        /// Store without checking the key against the service
        #[arg(long)]
        no_validate: bool,
    },
    RemoveApiKey {
        provider: String,
    },
    SetDefaultVoice {
        provider: String,
        voice: String,
    },
    SetOutputDir {
        dir: PathBuf,
    },
    Show,
    ListProviders,
    Reset,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("warning: logging disabled: {}", e);
    }
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;
    debug!(config_dir = %config_dir.display(), "configuration directory");
    let mut manager = ConfigManager::load(config_dir);
    let registry = ProviderRegistry::with_defaults();
    let credentials = KeyringCredentials;

    match cli.command {
        Command::Convert(args) => convert(args, &manager, &registry, &credentials).await,
        Command::ListVoices {
            provider,
            ids_only,
            limit,
        } => {
            let name = provider.unwrap_or_else(|| manager.config().default_provider.clone());
            let tts = create_provider(&registry, &manager, &name)?;
            let key = require_credential(&credentials, &name)?;
            let catalog = tts.list_voices(&key, limit).await?;
            if ids_only {
                for v in &catalog.voices {
                    println!("{}", v.id);
                }
            } else {
                println!("{} voices ({} available on the service)", catalog.provider, catalog.total_available);
                println!("\nAI models:");
                for v in catalog.ai_models() {
                    println!("  {:<36} {}  [{}]", v.id, v.name, v.languages.join(", "));
                }
                println!("\nReference voices:");
                for v in catalog.human_voices() {
                    println!("  {:<36} {} by {} ({} likes)", v.id, v.name, v.author, v.like_count);
                    if !v.description.is_empty() {
                        println!("  {:<36} {}", "", v.description);
                    }
                }
                println!("\nDefault voice: {}", catalog.default_voice);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Presets => {
            print!("{}", presets::format_listing());
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { action } => {
            config_command(action, &mut manager, &registry, &credentials).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn convert(
    args: ConvertArgs,
    manager: &ConfigManager,
    registry: &ProviderRegistry,
    credentials: &dyn CredentialStore,
) -> anyhow::Result<ExitCode> {
    let config = manager.config();
    let provider_name = args
        .provider
        .unwrap_or_else(|| config.default_provider.clone());
    let tts = create_provider(registry, manager, &provider_name)?;

    let raw = input::read_text_file(&args.input)?;
    let stats = TextStats::of(&raw);
    let text = input::clean_text(&raw);

    let preset = args.preset.as_deref().map(presets::get).transpose()?;
    let voice = args
        .voice
        .or_else(|| preset.map(|p| p.voice.to_string()))
        .or_else(|| config.default_voice(&provider_name).map(str::to_string))
        .unwrap_or_else(|| tts.default_voice().to_string());
    let settings = preset.map(|p| p.to_settings()).unwrap_or_default();
    let request = ConversionRequest::new(text, voice.clone())
        .with_bitrate(Mp3Bitrate::try_from(args.bitrate)?)
        .with_settings(settings);

    println!("Input:    {}", args.input.display());
    println!(
        "Text:     {} characters, {} words, {} paragraphs",
        stats.characters, stats.words, stats.paragraphs
    );
    println!("Provider: {}", tts.name());
    println!("Voice:    {}", voice);
    if let Some(p) = preset {
        println!("Preset:   {}", p.describe());
    }
    if let Some(cost) = tts.estimate_cost(request.text(), &voice) {
        println!("Cost:     {}", cost);
    }
    if request.char_count() > tts.character_limit() {
        println!(
            "Warning:  text exceeds the {} character limit of {}",
            tts.character_limit(),
            tts.name()
        );
    }
    if args.estimate_only {
        return Ok(ExitCode::SUCCESS);
    }

    let credential = require_credential(credentials, &provider_name)?;
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.output_directory.clone());
    ensure_output_dir(&output_dir)?;
    let destination =
        resolve_output_path(&args.input, &output_dir, &provider_name, &voice, args.overwrite)?;
    println!("Output:   {}", destination.display());

    if !args.yes && !confirm("Proceed with conversion?")? {
        println!("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let bar = progress_bar();
    let on_progress = |percent: u8, message: &str| {
        bar.set_position(u64::from(percent));
        bar.set_message(message.to_string());
    };

    let outcome = tokio::select! {
        outcome = tts.convert(&request, &credential, &destination, &on_progress) => outcome,
        _ = tokio::signal::ctrl_c() => {
            bar.abandon_with_message("Interrupted");
            eprintln!("Conversion interrupted; partial output may remain at {}", destination.display());
            return Ok(ExitCode::from(130));
        }
    };

    match outcome {
        ConversionOutcome::Success {
            path,
            bytes_written,
        } => {
            bar.finish_with_message("Done");
            println!(
                "Saved {} ({:.2} MB)",
                path.display(),
                bytes_written as f64 / (1024.0 * 1024.0)
            );
            Ok(ExitCode::SUCCESS)
        }
        ConversionOutcome::Failure { kind, detail } => {
            bar.abandon_with_message("Failed");
            eprintln!("Error [{} {}]: {}", kind.code(), kind.name(), detail);
            if kind.caller_may_retry() {
                eprintln!("This failure is transient; try again later.");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn config_command(
    action: ConfigAction,
    manager: &mut ConfigManager,
    registry: &ProviderRegistry,
    credentials: &dyn CredentialStore,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::SetApiKey {
            provider,
            key,
            no_validate,
        } => {
            let tts = create_provider(registry, manager, &provider)?;
            let key = match key {
                Some(k) => k,
                None => prompt("API key: ")?,
            };
            let key = key.trim();
            if key.is_empty() {
                bail!("API key is empty");
            }
            if !no_validate && !tts.validate_credential(key).await {
                bail!("{} rejected the API key", tts.name());
            }
            credentials.set_credential(&provider, key)?;
            println!("API key stored for {}", provider);
        }
        ConfigAction::RemoveApiKey { provider } => {
            credentials.remove_credential(&provider)?;
            println!("API key removed for {}", provider);
        }
        ConfigAction::SetDefaultVoice { provider, voice } => {
            manager.set_default_voice(&provider, voice)?;
            manager.save()?;
            println!("Default voice updated for {}", provider);
        }
        ConfigAction::SetOutputDir { dir } => {
            manager.set_output_directory(dir);
            manager.save()?;
            println!(
                "Output directory set to {}",
                manager.config().output_directory.display()
            );
        }
        ConfigAction::Show => {
            println!("# {}", manager.path().display());
            print!("{}", serde_yaml::to_string(manager.config())?);
            for name in manager.list_providers() {
                let status = if credentials.get_credential(name).is_some() {
                    "configured"
                } else {
                    "missing"
                };
                println!("# api key for {}: {}", name, status);
            }
        }
        ConfigAction::ListProviders => {
            for name in registry.names() {
                let default = if name == manager.config().default_provider {
                    " (default)"
                } else {
                    ""
                };
                println!("{}{}", name, default);
            }
        }
        ConfigAction::Reset => {
            manager.reset();
            manager.save()?;
            println!("Configuration reset to defaults");
        }
    }
    Ok(())
}

fn create_provider(
    registry: &ProviderRegistry,
    manager: &ConfigManager,
    name: &str,
) -> anyhow::Result<Box<dyn TtsProvider>> {
    Ok(registry.create(name, manager.config().base_url(name))?)
}

fn require_credential(credentials: &dyn CredentialStore, provider: &str) -> anyhow::Result<String> {
    credentials.get_credential(provider).ok_or_else(|| {
        anyhow!(
            "no API key for {}; run `voiceforge config set-api-key {}` or set {}",
            provider,
            provider,
            KeyringCredentials::env_var_name(provider)
        )
    })
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

