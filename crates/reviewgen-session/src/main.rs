use std::io::{IsTerminal, Read};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use reviewgen_core::{Category, Preset};
use reviewgen_session::config::CliConfig;
use reviewgen_session::output::{format_json, format_text};
use reviewgen_session::{
    copy_target, CopyTarget, Event, Outcome, SessionState, SystemClipboard, Workflow,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Reviews go to stdout; keep logs on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::parse();

    if config.list_categories {
        for c in Category::ALL {
            println!("{:<20} {}", c.as_str(), c.display_name());
        }
        return Ok(());
    }

    let presets = config.generation.load_presets()?;
    if config.list_presets {
        if presets.is_empty() {
            eprintln!("no presets configured (use --presets or REVIEWGEN_PRESETS)");
        }
        for p in &presets {
            println!("{}", p.name);
        }
        return Ok(());
    }

    let mut state = SessionState::new(config.generation.session_config(&config.service));
    state.apply(Event::SetCategory(config.category));

    let workflow = Workflow::new(config.service.build_service());

    let outcome = match &config.preset {
        Some(name) => {
            let preset = Preset::find(&presets, name)?.clone();
            info!("using preset '{}'", preset.name);
            match workflow.select_preset(&mut state, preset).await? {
                Some(outcome) => outcome,
                None => workflow.generate(&mut state).await?,
            }
        }
        None => {
            let text = read_sample_text(&config)?;
            state.apply(Event::SetSampleText(text));
            workflow.generate(&mut state).await?
        }
    };

    match outcome {
        Outcome::Generated(_) => {}
        Outcome::Empty | Outcome::Failed => {
            let msg = state.diagnostic().unwrap_or("generation failed").to_string();
            bail!(msg);
        }
    }

    print_batch(&state, config.json)?;

    if config.copy.is_some() || config.copy_all {
        copy_requested(&config, &mut state)?;
    }

    Ok(())
}

fn read_sample_text(config: &CliConfig) -> Result<String> {
    if let Some(ref text) = config.text {
        return Ok(text.clone());
    }
    if let Some(ref path) = config.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        bail!("no sample text given (pass TEXT, --file, --preset, or pipe it on stdin)");
    }
    let mut buf = String::new();
    stdin
        .lock()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn print_batch(state: &SessionState, json: bool) -> Result<()> {
    // The list was cleared for this batch, so every item belongs to it,
    // including a preamble or segments beyond the requested count.
    let items = state.items();
    if json {
        println!("{}", format_json(items)?);
    } else {
        print!("{}", format_text(items));
    }
    Ok(())
}

fn copy_requested(config: &CliConfig, state: &mut SessionState) -> Result<()> {
    let target = match config.copy {
        Some(n) => {
            let id = state
                .items()
                .get(n.get() - 1)
                .map(|item| item.id.clone())
                .with_context(|| format!("no review {n} in this batch"))?;
            CopyTarget::Item(id)
        }
        None => CopyTarget::Batch,
    };

    if copy_target(state, SystemClipboard::holding(), &target, Instant::now()) {
        eprintln!("Copied!");
    } else {
        warn!("reviews were printed but not copied");
    }
    Ok(())
}
