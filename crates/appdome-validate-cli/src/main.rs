use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use appdome_validate_core::config::check::{ConfigReport, FieldCheck, check_all};
use appdome_validate_core::process::CancelToken;
use appdome_validate_core::report::{model::ToolInfo, render};
use appdome_validate_core::{ValidateConfig, ValidationOrchestrator};

mod args;

fn main() -> Result<()> {
    let args = args::Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if args.check {
        let report = check_all(
            args.token.as_deref(),
            args.app_path.as_deref(),
            args.output_location.as_deref(),
        );
        let output = match args.format {
            args::OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            args::OutputFormat::Text => render_checks(&report),
        };
        emit(&args, &output)?;
        std::process::exit(if report.has_errors() { 1 } else { 0 });
    }

    let tool = ToolInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: args.commit.clone(),
    };

    let config = ValidateConfig {
        app_path: args.app_path.clone(),
        output_location: args.output_location.clone(),
        timeout: args.timeout_secs.map(Duration::from_secs),
        ..ValidateConfig::new(args.token.clone().unwrap_or_default())
    };

    let cancel = CancelToken::new();
    install_signal_handlers(&cancel)?;

    let env = |name: &str| std::env::var(name).ok();
    let report = ValidationOrchestrator::system(&args.workspace_dir)
        .with_tool(tool)
        .with_cancel_token(cancel)
        .run(&config, &env);

    let output = match args.format {
        args::OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        args::OutputFormat::Text => render::render_text(&report),
    };
    emit(&args, &output)?;

    std::process::exit(report.classification.exit_code);
}

/// The first SIGINT/SIGTERM cancels the run so the workspace is still
/// cleaned up; a second one terminates right away.
fn install_signal_handlers(cancel: &CancelToken) -> Result<()> {
    for &signal in signal_hook::consts::TERM_SIGNALS {
        signal_hook::flag::register_conditional_shutdown(signal, 1, cancel.flag())
            .context("failed to install signal handler")?;
        signal_hook::flag::register(signal, cancel.flag())
            .context("failed to install signal handler")?;
    }
    Ok(())
}

fn emit(args: &args::Args, output: &str) -> Result<()> {
    match &args.summary {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("failed to write summary: {}", path.display())),
        None => {
            println!("{output}");
            Ok(())
        }
    }
}

fn render_checks(report: &ConfigReport) -> String {
    [
        ("token", &report.token),
        ("app", &report.app_path),
        ("output", &report.output_location),
    ]
    .iter()
    .map(|(field, check)| match check {
        FieldCheck::Ok(None) => format!("{field}: ok\n"),
        FieldCheck::Ok(Some(msg)) => format!("{field}: ok - {msg}\n"),
        FieldCheck::Warning(msg) => format!("{field}: warning - {msg}\n"),
        FieldCheck::Error(msg) => format!("{field}: error - {msg}\n"),
    })
    .collect()
}
