mod cli;

use codecmedia::{
    config, AudioExtractOptions, Engine, ProbeResult, StreamKind, ValidationOptions,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "codecmedia=trace,codecmedia_probe=trace,codecmedia_convert=trace".to_string()
        } else {
            "codecmedia=info,codecmedia_probe=info,codecmedia_convert=info".to_string()
        }
    });

    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::CheckConfig {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            check_config(path.as_deref())
        }
        Commands::Version => {
            println!("codecmedia {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            run(&Engine::new(config), command)
        }
    }
}

fn run(engine: &Engine, command: Commands) -> Result<()> {
    match command {
        Commands::Probe { file, json } => probe_file(engine, &file, json),
        Commands::Validate {
            file,
            strict,
            max_bytes,
            json,
        } => {
            let mut options = engine.validation_defaults();
            options.strict |= strict;
            if let Some(max) = max_bytes {
                options.max_bytes = max;
            }
            validate_file(engine, &file, &options, json)
        }
        Commands::Convert {
            input,
            output,
            format,
            overwrite,
            preset,
        } => {
            let mut options = engine.conversion_defaults();
            options.target_format = format;
            options.overwrite |= overwrite;
            if let Some(preset) = preset {
                options.preset = preset;
            }
            let result = engine
                .convert(&input, &output, options)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            println!(
                "Wrote {} ({}{})",
                result.output_file.display(),
                result.format,
                if result.reencoded { ", re-encoded" } else { "" }
            );
            Ok(())
        }
        Commands::ExtractAudio {
            input,
            output_dir,
            format,
        } => {
            let options = AudioExtractOptions {
                target_format: format,
            };
            let result = engine
                .extract_audio(&input, &output_dir, &options)
                .with_context(|| format!("Failed to extract audio from {}", input.display()))?;
            println!("Wrote {} ({})", result.output_file.display(), result.format);
            Ok(())
        }
        Commands::Metadata { file, set } => metadata(engine, &file, &set),
        Commands::CheckConfig { .. } | Commands::Version => Ok(()),
    }
}

fn probe_file(engine: &Engine, file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let result = engine.probe(file)?;

    if json {
        let json_str = serde_json::to_string_pretty(&result)?;
        println!("{}", json_str);
    } else {
        print_probe(&result);
    }

    Ok(())
}

fn print_probe(result: &ProbeResult) {
    println!("File: {}", result.input.display());
    println!("Type: {} ({})", result.mime_type, result.media_type);
    if let Some(size) = result.size_bytes() {
        println!("Size: {} bytes", size);
    }
    if let Some(ms) = result.duration_millis {
        let secs = ms / 1000;
        let mins = secs / 60;
        let hours = mins / 60;
        println!(
            "Duration: {:02}:{:02}:{:02}.{:03}",
            hours,
            mins % 60,
            secs % 60,
            ms % 1000
        );
    }

    println!("\nStreams: {}", result.streams.len());
    for (i, stream) in result.streams.iter().enumerate() {
        print!("  [{}] {}", i, stream.codec);
        match stream.kind {
            StreamKind::Audio => {
                if let Some(rate) = stream.sample_rate {
                    print!(" {} Hz", rate);
                }
                if let Some(ch) = stream.channels {
                    print!(" {}ch", ch);
                }
                if let Some(kbps) = stream.bitrate_kbps {
                    print!(" {} kbps", kbps);
                }
            }
            _ => {
                if let (Some(w), Some(h)) = (stream.width, stream.height) {
                    print!(" {}x{}", w, h);
                }
            }
        }
        println!();
    }

    let extra: Vec<_> = result
        .tags
        .iter()
        .filter(|(k, _)| k.as_str() != "sizeBytes")
        .collect();
    if !extra.is_empty() {
        println!("\nTags:");
        for (key, value) in extra {
            println!("  {}: {}", key, value);
        }
    }
}

fn validate_file(
    engine: &Engine,
    file: &Path,
    options: &ValidationOptions,
    json: bool,
) -> Result<()> {
    let report = engine.validate(file, options);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for warning in &report.warnings {
            println!("warning: {}", warning);
        }
        for error in &report.errors {
            println!("error: {}", error);
        }
        if report.valid {
            println!("✓ {} is valid", file.display());
        }
    }

    if !report.valid {
        anyhow::bail!("Validation failed for {}", file.display());
    }
    Ok(())
}

fn metadata(engine: &Engine, file: &Path, set: &[String]) -> Result<()> {
    if !set.is_empty() {
        let mut entries = engine.read_sidecar(file)?;
        for pair in set {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("Expected key=value, got '{}'", pair))?;
            entries.insert(key.trim().to_string(), value.to_string());
        }
        engine.write_metadata(file, &entries)?;
    }

    for (key, value) in engine.read_metadata(file)? {
        println!("{}={}", key, value);
    }
    Ok(())
}

fn check_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    println!("  Strict validation: {}", config.validation.strict);
    println!("  Max bytes: {}", config.validation.max_bytes);
    println!("  Strict max bytes: {}", config.validation.strict_max_bytes);
    println!("  Conversion preset: {}", config.conversion.preset);
    println!("  Overwrite: {}", config.conversion.overwrite);
    println!("  Sidecar suffix: {}", config.metadata.sidecar_suffix);
}
