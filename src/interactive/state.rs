//! Pure state machine behind the interactive view.
//!
//! Every key press produces a new [`InteractiveState`]; nothing is mutated in
//! place, so the session loop can render any state from scratch.

use std::fmt;
use std::path::PathBuf;

use crate::report::ViewOptions;
use crate::stats::{GroupBy, PercentPolicy, SortBy, SortDirection};

/// Limit used when `-` is pressed on an unlimited level.
const DEFAULT_LIMITS: [usize; 2] = [20, 5];

/// A key the interactive view reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    BackTab,
    Left,
    Right,
    Up,
    Down,
    Plus,
    Minus,
    /// `l`: switch which limit `+`/`-` adjust.
    ToggleLimit,
    /// `p`: switch between global and parent percentages.
    TogglePercent,
    Enter,
    /// Ctrl+C, `q` or Esc.
    Quit,
}

/// Which hierarchy level `+`/`-` adjust.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LimitTarget {
    #[default]
    Files,
    Rules,
}

impl LimitTarget {
    fn level(self) -> usize {
        match self {
            LimitTarget::Files => 0,
            LimitTarget::Rules => 1,
        }
    }
}

impl fmt::Display for LimitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitTarget::Files => f.write_str("files"),
            LimitTarget::Rules => f.write_str("rules"),
        }
    }
}

/// Outcome of applying a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Render(InteractiveState),
    /// Append the current view to the markdown file, then render.
    Export(InteractiveState),
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveState {
    pub group_by: GroupBy,
    pub sort_by: SortBy,
    pub direction: SortDirection,
    /// Row limit per level; 0 means unlimited.
    pub limits: Vec<usize>,
    pub active_limit: LimitTarget,
    pub policy: PercentPolicy,
    pub last_action: Option<String>,
    pub output_path: Option<PathBuf>,
    /// Shown below the table until the next key press.
    pub notification: Option<String>,
}

impl InteractiveState {
    /// Start from a static view.
    pub fn from_view(view: &ViewOptions, output_path: Option<PathBuf>) -> Self {
        let state = Self {
            group_by: view.group_by,
            sort_by: view.rank.sort_by,
            direction: view.rank.direction,
            limits: view.rank.limits.clone(),
            active_limit: LimitTarget::Files,
            policy: view.rank.policy,
            last_action: None,
            output_path,
            notification: None,
        };
        state.with_levels(|_| 0)
    }

    /// The view this state shows, keeping columns and test filter from `base`.
    pub fn view(&self, base: &ViewOptions) -> ViewOptions {
        let mut view = base.clone();
        view.group_by = self.group_by;
        view.rank.sort_by = self.sort_by;
        view.rank.direction = self.direction;
        view.rank.limits = self.limits[..self.group_by.depth().min(self.limits.len())].to_vec();
        view.rank.policy = self.policy;
        view
    }

    /// The limit currently adjusted by `+`/`-`.
    pub fn active_level(&self) -> usize {
        if self.group_by == GroupBy::FileRule {
            self.active_limit.level()
        } else {
            0
        }
    }

    /// Apply one key press.
    pub fn apply(&self, key: Key) -> Transition {
        let mut next = self.clone();
        next.notification = None;

        match key {
            Key::Quit => return Transition::Exit,
            Key::Tab | Key::BackTab => {
                next.group_by = if key == Key::Tab {
                    self.group_by.next()
                } else {
                    self.group_by.previous()
                };
                if next.group_by != GroupBy::FileRule {
                    next.active_limit = LimitTarget::Files;
                }
                next = next.with_levels(|level| DEFAULT_LIMITS[level.min(1)]);
                next.last_action = Some(format!("Grouped by {}", next.group_by));
            }
            Key::Left | Key::Right => {
                next.sort_by = self.sort_by.next();
                next.last_action = Some(format!("Sorted by {}", next.sort_by));
            }
            Key::Up | Key::Down => {
                next.direction = self.direction.flip();
                next.last_action = Some(format!("Direction {}", next.direction));
            }
            Key::Plus | Key::Minus => {
                let level = self.active_level();
                let current = next.limits[level];
                next.limits[level] = match (key, current) {
                    (Key::Plus, 0) => 0,
                    (Key::Plus, n) => n + 1,
                    (_, 0) => DEFAULT_LIMITS[level],
                    (_, n) => n.saturating_sub(1).max(1),
                };
                next.last_action = Some(match next.limits[level] {
                    0 => format!("No limit on {}", self.limit_name()),
                    n => format!("Showing {n} {}", self.limit_name()),
                });
            }
            Key::ToggleLimit => {
                if self.group_by == GroupBy::FileRule {
                    next.active_limit = match self.active_limit {
                        LimitTarget::Files => LimitTarget::Rules,
                        LimitTarget::Rules => LimitTarget::Files,
                    };
                    next.last_action = Some(format!("Adjusting {} limit", next.active_limit));
                } else {
                    next.notification =
                        Some("Switching limits only applies when grouped by file and rule".into());
                }
            }
            Key::TogglePercent => {
                next.policy = self.policy.toggle();
                next.last_action = Some(format!("Percent relative to {}", next.policy));
            }
            Key::Enter => {
                if self.output_path.is_some() {
                    return Transition::Export(next);
                }
                next.notification =
                    Some("No output path set. Pass --out-path to export the view".into());
            }
        }
        Transition::Render(next)
    }

    fn limit_name(&self) -> &'static str {
        match (self.group_by, self.active_level()) {
            (GroupBy::Rule, _) => "rules",
            (GroupBy::File, _) => "files",
            (GroupBy::FileRule, 0) => "files",
            (GroupBy::FileRule, _) => "rules per file",
        }
    }

    /// Ensure a limit exists for every level of the current grouping.
    fn with_levels(mut self, fill: impl Fn(usize) -> usize) -> Self {
        while self.limits.len() < self.group_by.depth() {
            let level = self.limits.len();
            self.limits.push(fill(level));
        }
        self
    }
}
