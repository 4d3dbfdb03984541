//! Raw-terminal loop that drives [`InteractiveState`].

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType},
};

use super::state::{InteractiveState, Key, Transition};
use crate::core::{Error, Result};
use crate::output::display::format_duration;
use crate::output::markdown::{append_section, ReportSource};
use crate::output::Theme;
use crate::report::{describe, render_view, ViewOptions};
use crate::stats::ParsedStats;

const LEGEND: &str = "Tab group | \u{2190}/\u{2192} sort | \u{2191}/\u{2193} direction | +/- limit | \
                      l switch limit | p percent | Enter export | q quit";

/// Map a terminal key event to an interactive key.
pub fn map_key(event: KeyEvent) -> Option<Key> {
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Quit),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::BackTab => Some(Key::BackTab),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Char('+' | '=') => Some(Key::Plus),
        KeyCode::Char('-' | '_') => Some(Key::Minus),
        KeyCode::Char('l' | 'L') => Some(Key::ToggleLimit),
        KeyCode::Char('p' | 'P') => Some(Key::TogglePercent),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(Key::Quit),
        _ => None,
    }
}

/// Restores cooked mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().map_err(|e| Error::Terminal(e.to_string()))?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!("Failed to restore terminal mode: {e}");
        }
    }
}

/// An interactive view over one loaded stats file.
pub struct Session<'a> {
    stats: &'a ParsedStats,
    base: ViewOptions,
    theme: Theme,
    source: ReportSource,
}

impl<'a> Session<'a> {
    pub fn new(stats: &'a ParsedStats, base: ViewOptions, theme: Theme, source: ReportSource) -> Self {
        Self {
            stats,
            base,
            theme,
            source,
        }
    }

    /// Run until the user quits.
    pub fn run(&self, initial: InteractiveState) -> Result<()> {
        let _guard = RawModeGuard::enable()?;
        let mut stdout = io::stdout();
        let mut state = initial;

        loop {
            self.draw(&mut stdout, &state)?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let Some(key) = map_key(key) else {
                continue;
            };

            state = match state.apply(key) {
                Transition::Render(next) => next,
                Transition::Export(mut next) => {
                    next.notification = Some(match self.export(&next) {
                        Ok(message) => message,
                        Err(e) => format!("Export failed: {e}"),
                    });
                    next
                }
                Transition::Exit => break,
            };
        }

        write!(stdout, "\r\n")?;
        stdout.flush()?;
        Ok(())
    }

    fn draw(&self, stdout: &mut io::Stdout, state: &InteractiveState) -> Result<()> {
        execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        write!(stdout, "{}", self.frame(state).replace('\n', "\r\n"))?;
        stdout.flush()?;
        Ok(())
    }

    /// The full screen for a state, with `\n` line endings.
    pub fn frame(&self, state: &InteractiveState) -> String {
        let view = state.view(&self.base);
        let theme = &self.theme;
        let mut lines = vec![theme.dim(LEGEND)];

        if let Some(command) = &self.source.command {
            lines.push(format!("Command: {command}"));
        }

        let mut status = theme.bold(&describe(&view));
        if let Some(action) = &state.last_action {
            status.push_str(&theme.dim(&format!("  ({action})")));
        }
        lines.push(status);
        lines.push(self.summary_line());
        lines.push(String::new());
        lines.push(render_view(&self.stats.records, &view, theme));

        if let Some(notification) = &state.notification {
            lines.push(String::new());
            lines.push(theme.bold(notification));
        }
        lines.join("\n")
    }

    fn summary_line(&self) -> String {
        let summary = &self.stats.summary;
        let style = self.theme.duration_style;
        format!(
            "Files: {} ({} test) | Rules: {} | Total: {} (parse {}, rules {}, fix {})",
            summary.files,
            summary.test_files,
            summary.rules,
            format_duration(summary.total_ms, style),
            format_duration(summary.parse_ms, style),
            format_duration(summary.rules_ms, style),
            format_duration(summary.fix_ms, style),
        )
    }

    /// Append the state's view to its markdown file and describe the result.
    pub fn export(&self, state: &InteractiveState) -> Result<String> {
        let Some(path) = &state.output_path else {
            return Err(Error::InvalidArgument("no output path set".into()));
        };
        let view = state.view(&self.base);
        let table = render_view(&self.stats.records, &view, &self.theme);
        let created = append_section(path, &self.source, &describe(&view), &table)?;
        Ok(if created {
            format!("Created {}", path.display())
        } else {
            format!("Appended to {}", path.display())
        })
    }
}
