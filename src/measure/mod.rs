//! Runs the linter with stats enabled and stores its JSON output.
//!
//! The output file is named `<prefix>-<YYYYMMDD-HHMMSS>[__<command>].json`.
//! The optional command part is an escaped form of the linter command line,
//! so `analyse` can show what produced a file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::{DateTime, Local};
use tokio::io::{AsyncBufReadExt, BufReader};
use indicatif::ProgressBar;
use tokio::process::{Child, Command};

use crate::core::progress::create_spinner;
use crate::core::{Error, Result};

/// Flags appended to every linter invocation.
pub const STATS_FLAGS: &str = "--format json --stats";

/// Separates the timestamp from the encoded command in file names.
const COMMAND_SEPARATOR: &str = "__";

/// Longest encoded command kept in a file name.
const MAX_ENCODED_LEN: usize = 180;

/// What to run and where to put the result.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureOptions {
    /// Base linter command, e.g. `npx eslint`.
    pub command: String,
    /// Extra arguments passed after the base command.
    pub linter_args: Vec<String>,
    pub out_dir: PathBuf,
    pub file_prefix: String,
    /// Record the command line in the output file name.
    pub encode_command: bool,
}

impl MeasureOptions {
    /// The command line as the user would type it, without stats flags.
    pub fn display_command(&self) -> String {
        std::iter::once(self.command.clone())
            .chain(self.linter_args.iter().map(|a| shell_quote(a)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The command line handed to the shell.
    pub fn shell_command(&self) -> String {
        format!("{} {STATS_FLAGS}", self.display_command())
    }
}

/// Result of a finished linter run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureOutcome {
    /// The stats file that was written.
    pub path: PathBuf,
    /// Linter exit code; non-zero usually means violations were found.
    pub exit_code: Option<i32>,
}

/// Run the linter and write its stdout to a new stats file.
///
/// A non-zero exit is not an error. Only a process that cannot be started
/// is.
pub fn run(options: &MeasureOptions) -> Result<MeasureOutcome> {
    fs::create_dir_all(&options.out_dir)?;
    let encoded = options
        .encode_command
        .then(|| encode_command(&options.display_command()))
        .filter(|encoded| {
            let fits = encoded.len() <= MAX_ENCODED_LEN;
            if !fits {
                tracing::warn!("Command line too long to encode in the file name; skipping");
            }
            fits
        });
    let name = output_file_name(&options.file_prefix, &Local::now(), encoded.as_deref());
    let path = options.out_dir.join(name);

    let command = options.shell_command();
    tracing::debug!(command = %command, out = %path.display(), "Running linter");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::launch(&command, format!("failed to create runtime: {e}")))?;
    let exit_code = runtime.block_on(run_linter(&command, &path))?;

    let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        tracing::warn!(path = %path.display(), "Linter produced no output");
    }
    match exit_code {
        Some(0) => tracing::info!(path = %path.display(), "Wrote stats file"),
        code => tracing::info!(
            path = %path.display(),
            exit_code = ?code,
            "Linter exited with a non-zero status; stats file written"
        ),
    }

    Ok(MeasureOutcome { path, exit_code })
}

async fn run_linter(command: &str, out: &Path) -> Result<Option<i32>> {
    let stdout = File::create(out)?;

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.args(["/C", command]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", command]);
        c
    };
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::from(stdout));
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| Error::launch(command, e.to_string()))?;

    let spinner = create_spinner(&format!("Running {command}"));
    let forwarded = forward_stderr(&mut child, &spinner).await;
    if let Err(e) = forwarded {
        spinner.finish_and_clear();
        if let Err(kill_err) = child.kill().await {
            tracing::warn!(error = %kill_err, "Failed to stop linter");
        }
        return Err(e.into());
    }
    let status = child.wait().await;
    spinner.finish_and_clear();

    Ok(status?.code())
}

/// Copy the child's stderr to ours, line by line, above the spinner.
async fn forward_stderr(child: &mut Child, spinner: &ProgressBar) -> std::io::Result<()> {
    if let Some(stderr) = child.stderr.take() {
        let mut lines = BufReader::new(stderr).lines();
        while let Some(line) = lines.next_line().await? {
            spinner.suspend(|| eprintln!("{line}"));
        }
    }
    Ok(())
}

/// Build the stats file name for a run started at `time`.
pub fn output_file_name(prefix: &str, time: &DateTime<Local>, encoded: Option<&str>) -> String {
    let stamp = time.format("%Y%m%d-%H%M%S");
    match encoded {
        Some(command) if !command.is_empty() => {
            format!("{prefix}-{stamp}{COMMAND_SEPARATOR}{command}.json")
        }
        _ => format!("{prefix}-{stamp}.json"),
    }
}

/// Escape a command line for use in a file name.
///
/// ASCII letters, digits, `.` and `-` are kept; every other byte becomes
/// `~XX` with two uppercase hex digits.
pub fn encode_command(command: &str) -> String {
    let mut out = String::with_capacity(command.len());
    for byte in command.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'.' || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("~{byte:02X}"));
        }
    }
    out
}

/// Reverse [`encode_command`]. Returns `None` for malformed input.
pub fn decode_command(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'~' {
            let hex = encoded.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Recover the linter command from a stats file name, if it carries one.
pub fn command_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (_, encoded) = stem.split_once(COMMAND_SEPARATOR)?;
    decode_command(encoded).filter(|c| !c.is_empty())
}

/// Quote an argument for the platform shell when it needs it.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if plain {
        arg.to_string()
    } else if cfg!(windows) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}
