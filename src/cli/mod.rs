//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::AnalyseConfig;
use crate::output::{Column, Format};
use crate::report::{limits_from_take, ViewOptions};
use crate::stats::{GroupBy, PercentPolicy, SortBy, SortDirection, TestFilter};

/// Lintprof - Lint performance reports from linter timing statistics.
#[derive(Parser)]
#[command(name = "lintprof")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colors
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the linter with stats enabled and save its output
    Measure(MeasureArgs),

    /// Report on a stats file
    #[command(alias = "analyze")]
    Analyse(AnalyseArgs),
}

#[derive(Args)]
pub struct MeasureArgs {
    /// Directory for the stats file (default from config)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Record the linter command in the stats file name
    #[arg(long)]
    pub encode_command: bool,

    /// Analyse the stats file once the linter finishes
    #[arg(long, alias = "analyze")]
    pub analyse: bool,

    /// Arguments passed to the linter
    #[arg(last = true)]
    pub linter_args: Vec<String>,
}

#[derive(Args)]
pub struct AnalyseArgs {
    /// Stats file produced by the linter
    pub file: PathBuf,

    /// Group rows by rule, file, or file then rule
    #[arg(short, long, value_enum, alias = "groupBy")]
    pub group_by: Option<GroupBy>,

    /// Sort key
    #[arg(short, long, value_enum, alias = "sortBy")]
    pub sort_by: Option<SortBy>,

    /// Sort direction
    #[arg(short, long, value_enum)]
    pub direction: Option<SortDirection>,

    /// Columns to show
    #[arg(long, value_enum, value_delimiter = ',', num_args = 1..)]
    pub show: Vec<Column>,

    /// Rows per level: `N` or `FILES RULES` in file-rule mode (0 = no limit)
    #[arg(short, long, num_args = 1..=2, allow_negative_numbers = true)]
    pub take: Vec<i64>,

    /// Append the report to this markdown file
    #[arg(short, long, alias = "outPath")]
    pub out_path: Option<PathBuf>,

    /// Interactive view (default: on when stdout is a terminal outside CI)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "true")]
    pub interactive: Option<bool>,

    /// What nested percentages are relative to
    #[arg(short, long, value_enum)]
    pub percent: Option<PercentPolicy>,

    /// Include, exclude, or only show test files
    #[arg(long, value_enum, default_value = "include")]
    pub tests: TestFilter,

    /// Output format for non-interactive runs
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: Format,
}

impl AnalyseArgs {
    /// Analyse `file` with every flag left at its default.
    pub fn for_file(file: PathBuf) -> Self {
        Self {
            file,
            group_by: None,
            sort_by: None,
            direction: None,
            show: Vec::new(),
            take: Vec::new(),
            out_path: None,
            interactive: None,
            percent: None,
            tests: TestFilter::Include,
            format: Format::Text,
        }
    }

    /// The view these flags ask for, with unset flags taken from `config`.
    pub fn view_options(&self, config: &AnalyseConfig) -> ViewOptions {
        let mut view = ViewOptions::from_config(config);
        if let Some(group_by) = self.group_by {
            view.group_by = group_by;
        }
        if let Some(sort_by) = self.sort_by {
            view.rank.sort_by = sort_by;
        }
        if let Some(direction) = self.direction {
            view.rank.direction = direction;
        }
        if let Some(policy) = self.percent {
            view.rank.policy = policy;
        }
        if !self.take.is_empty() {
            view.rank.limits = limits_from_take(&self.take);
        }
        if !self.show.is_empty() {
            view.columns = dedup(&self.show);
        }
        view.tests = self.tests;
        view
    }
}

/// Whether `analyse` starts the interactive view when `--interactive` is absent.
///
/// `ci` is the value of the `CI` variable; anything but `"false"` counts as
/// running in CI.
pub fn interactive_by_default(stdout_is_tty: bool, ci: Option<&str>, opted_out: bool) -> bool {
    stdout_is_tty && !opted_out && ci.is_none_or(|v| v == "false")
}

fn dedup(columns: &[Column]) -> Vec<Column> {
    let mut out = Vec::with_capacity(columns.len());
    for &column in columns {
        if !out.contains(&column) {
            out.push(column);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn analyse(args: &[&str]) -> AnalyseArgs {
        let argv = ["lintprof", "analyse", "stats.json"].iter().chain(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Analyse(a) => a,
            Command::Measure(_) => panic!("expected analyse"),
        }
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_global_flags() {
        let cli =
            Cli::try_parse_from(["lintprof", "analyse", "s.json", "-v", "--no-color", "-c", "x.toml"])
                .unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_command_analyze_alias() {
        let cli = Cli::try_parse_from(["lintprof", "analyze", "stats.json"]).unwrap();
        assert!(matches!(cli.command, Command::Analyse(_)));
    }

    #[test]
    fn test_analyse_defaults() {
        let args = analyse(&[]);
        assert_eq!(args.file, PathBuf::from("stats.json"));
        assert!(args.group_by.is_none());
        assert!(args.interactive.is_none());
        assert_eq!(args.tests, TestFilter::Include);
        assert_eq!(args.format, Format::Text);
    }

    #[test]
    fn test_camel_case_aliases() {
        let args = analyse(&["--groupBy", "file-rule", "--sortBy", "violations", "--outPath", "r.md"]);
        assert_eq!(args.group_by, Some(GroupBy::FileRule));
        assert_eq!(args.sort_by, Some(SortBy::Violations));
        assert_eq!(args.out_path, Some(PathBuf::from("r.md")));
    }

    #[test]
    fn test_invalid_group_by_rejected() {
        let result = Cli::try_parse_from(["lintprof", "analyse", "s.json", "--group-by", "folder"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_interactive_flag_forms() {
        assert_eq!(analyse(&["--interactive"]).interactive, Some(true));
        assert_eq!(analyse(&["--interactive", "false"]).interactive, Some(false));
        assert_eq!(analyse(&["--interactive=true"]).interactive, Some(true));
    }

    #[test]
    fn test_take_and_show() {
        let args = analyse(&["--take", "10", "3", "--show", "time,errors,time"]);
        assert_eq!(args.take, vec![10, 3]);
        let view = args.view_options(&AnalyseConfig::default());
        assert_eq!(view.rank.limits, vec![10, 3]);
        assert_eq!(view.columns, vec![Column::Time, Column::Errors]);
    }

    #[test]
    fn test_negative_take_means_unlimited() {
        let view = analyse(&["--take", "-1"]).view_options(&AnalyseConfig::default());
        assert_eq!(view.rank.limits, vec![0]);
    }

    #[test]
    fn test_flags_override_config() {
        let config = AnalyseConfig {
            group_by: GroupBy::File,
            direction: SortDirection::Asc,
            ..AnalyseConfig::default()
        };
        let view = analyse(&["--direction", "desc"]).view_options(&config);
        assert_eq!(view.group_by, GroupBy::File);
        assert_eq!(view.rank.direction, SortDirection::Desc);
        assert_eq!(view.rank.limits, vec![20, 5]);
    }

    #[test]
    fn test_interactive_by_default() {
        assert!(interactive_by_default(true, None, false));
        assert!(interactive_by_default(true, Some("false"), false));
        assert!(!interactive_by_default(true, Some("true"), false));
        assert!(!interactive_by_default(true, Some("1"), false));
        assert!(!interactive_by_default(true, None, true));
        assert!(!interactive_by_default(false, None, false));
    }

    #[test]
    fn test_for_file_matches_parsed_defaults() {
        let parsed = analyse(&[]).view_options(&AnalyseConfig::default());
        let built = AnalyseArgs::for_file(PathBuf::from("stats.json"))
            .view_options(&AnalyseConfig::default());
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_measure_args() {
        let cli = Cli::try_parse_from([
            "lintprof",
            "measure",
            "--out-dir",
            "stats",
            "--encode-command",
            "--",
            "src",
            "--ext",
            ".ts",
        ])
        .unwrap();
        match cli.command {
            Command::Measure(m) => {
                assert_eq!(m.out_dir, Some(PathBuf::from("stats")));
                assert!(m.encode_command);
                assert!(!m.analyse);
                assert_eq!(m.linter_args, vec!["src", "--ext", ".ts"]);
            }
            Command::Analyse(_) => panic!("expected measure"),
        }
    }
}
