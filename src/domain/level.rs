use serde::{Deserialize, Serialize};

/// Severity/category of a log entry.
///
/// `Access` is the pass-through level for pre-formatted HTTP access lines;
/// all other levels are formatted by the router before fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Access,
    Log,
    Info,
    Warn,
    Debug,
    Error,
}

impl Level {
    /// Uppercase tag written into the formatted entry.
    pub fn tag(self) -> &'static str {
        match self {
            Level::Access => "ACCESS",
            Level::Log => "LOG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Debug => "DEBUG",
            Level::Error => "ERROR",
        }
    }

    /// Warn and error lines go to stderr, everything else to stdout.
    pub fn uses_stderr(self) -> bool {
        matches!(self, Level::Warn | Level::Error)
    }
}

/// An ordered set of enabled levels. Duplicates are forbidden.
///
/// The router and each transport own an independent `LevelSet`; a level
/// absent from the set is never delivered to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSet {
    levels: Vec<Level>,
}

impl LevelSet {
    /// All six levels, including `access`. The router default.
    pub fn all() -> Self {
        Self {
            levels: vec![
                Level::Access,
                Level::Log,
                Level::Info,
                Level::Warn,
                Level::Debug,
                Level::Error,
            ],
        }
    }

    /// Every level except `access`. The transport default.
    pub fn non_access() -> Self {
        Self {
            levels: vec![
                Level::Log,
                Level::Info,
                Level::Warn,
                Level::Debug,
                Level::Error,
            ],
        }
    }

    pub fn empty() -> Self {
        Self { levels: Vec::new() }
    }

    pub fn contains(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    /// Adds `level` if absent. Returns whether the set changed.
    pub fn insert(&mut self, level: Level) -> bool {
        if self.contains(level) {
            return false;
        }
        self.levels.push(level);
        true
    }

    /// Removes every occurrence of `level`.
    pub fn remove(&mut self, level: Level) {
        self.levels.retain(|l| *l != level);
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels.iter().copied()
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Level> for LevelSet {
    /// Collects levels, dropping duplicates while preserving first-occurrence
    /// order.
    fn from_iter<I: IntoIterator<Item = Level>>(iter: I) -> Self {
        let mut set = Self::empty();
        for level in iter {
            set.insert(level);
        }
        set
    }
}
