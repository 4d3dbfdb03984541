//! Lintprof CLI - Lint performance reports from linter timing statistics.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lintprof::cli::{interactive_by_default, AnalyseArgs, Cli, Command, MeasureArgs};
use lintprof::config::Config;
use lintprof::interactive::{InteractiveState, Session};
use lintprof::measure::{self, command_from_filename, MeasureOptions};
use lintprof::output::markdown::{append_section, ReportSource};
use lintprof::output::Theme;
use lintprof::report::{describe, render_view, write_report};
use lintprof::stats::load_stats;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version requests still exit 0; usage errors exit 1
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    // Logs go to stderr; stdout carries the report
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(".")?,
    };

    if cli.no_color {
        colored::control::set_override(false);
    }
    let mut theme = Theme::from_config(&config.display);
    theme.color_enabled &= !cli.no_color;

    match cli.command {
        Command::Analyse(args) => analyse(&args, &config, &theme),
        Command::Measure(args) => run_measure(&args, &config, &theme),
    }
}

fn analyse(args: &AnalyseArgs, config: &Config, theme: &Theme) -> anyhow::Result<()> {
    let stats = load_stats(&args.file)?;
    let view = args.view_options(&config.analyse);
    let source = ReportSource {
        stats_file: Some(args.file.display().to_string()),
        command: command_from_filename(&args.file),
    };

    let interactive = args.interactive.unwrap_or_else(|| {
        interactive_by_default(
            io::stdout().is_terminal(),
            std::env::var("CI").ok().as_deref(),
            std::env::var_os("LINTPROF_NO_INTERACTIVE").is_some(),
        )
    });

    if interactive {
        let state = InteractiveState::from_view(&view, args.out_path.clone());
        Session::new(&stats, view, theme.clone(), source)
            .run(state)
            .context("Interactive session failed")?;
        return Ok(());
    }

    let plain = theme.plain();
    write_report(args.format, &stats, &view, &plain, &mut io::stdout().lock())?;

    if let Some(path) = &args.out_path {
        let table = render_view(&stats.records, &view, &plain);
        append_section(path, &source, &describe(&view), &table)
            .with_context(|| format!("Failed to append report to {}", path.display()))?;
        eprintln!("Report appended to {}", path.display());
    }
    Ok(())
}

fn run_measure(args: &MeasureArgs, config: &Config, theme: &Theme) -> anyhow::Result<()> {
    let options = MeasureOptions {
        command: config.measure.command.clone(),
        linter_args: args.linter_args.clone(),
        out_dir: args
            .out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.measure.out_dir)),
        file_prefix: config.measure.file_prefix.clone(),
        encode_command: args.encode_command,
    };
    let outcome = measure::run(&options)?;
    eprintln!("Stats written to {}", outcome.path.display());

    if args.analyse {
        analyse(&AnalyseArgs::for_file(outcome.path), config, theme)
            .context("Failed to analyse the new stats file")?;
    }
    Ok(())
}
