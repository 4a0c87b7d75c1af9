//! Minimal `.gitignore` support for the directory scan.
//!
//! Only a subset of the gitignore grammar is understood: directory patterns
//! (`build/`), rooted patterns (`/dist/js`) and shell globs (`*.ignored.py`).
//! There is no negation, and any matching pattern ignores the path.

use glob::Pattern;
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Name of the ignore file looked up in the scan base directory
pub const IGNORE_FILE: &str = ".gitignore";

/// A single pattern line from an ignore file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnorePattern {
    /// `name/`: matches any path with a segment named `name`;
    /// `/name/` is anchored to the base directory like a rooted pattern
    Directory(String),
    /// `/x/y`: anchored to the base directory
    Rooted(String),
    /// Anything else, matched as a shell glob at any depth
    Glob(String),
}

impl IgnorePattern {
    /// Parse one line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        if let Some(name) = line.strip_suffix('/') {
            Some(IgnorePattern::Directory(name.to_string()))
        } else if let Some(rooted) = line.strip_prefix('/') {
            Some(IgnorePattern::Rooted(rooted.to_string()))
        } else {
            Some(IgnorePattern::Glob(line.to_string()))
        }
    }

    /// Check the pattern against a path relative to the base directory
    fn matches(&self, relative: &Path, relative_str: &str) -> bool {
        match self {
            IgnorePattern::Directory(name) => {
                if let Some(rooted) = name.strip_prefix('/') {
                    return rooted_match(relative_str, rooted.trim_start_matches('/'));
                }
                if name.is_empty() {
                    return false;
                }
                let segment_matches = |segment: &str| {
                    segment == name || (has_glob_meta(name) && fnmatch(segment, name))
                };
                segments(relative).any(|segment| segment_matches(segment.as_ref()))
                    || relative.starts_with(name)
            }
            IgnorePattern::Rooted(rooted) => rooted_match(relative_str, rooted),
            IgnorePattern::Glob(pattern) => {
                fnmatch(relative_str, pattern) || fnmatch(relative_str, &format!("**/{}", pattern))
            }
        }
    }
}

/// Patterns loaded from the ignore file of one base directory
#[derive(Debug, Clone, Default)]
pub struct GitIgnore {
    patterns: Vec<IgnorePattern>,
}

impl GitIgnore {
    /// Parse ignore-file content
    pub fn parse(content: &str) -> Self {
        Self {
            patterns: content.lines().filter_map(IgnorePattern::parse).collect(),
        }
    }

    /// Load `.gitignore` from `base_dir`; a missing or unreadable file ignores nothing
    pub fn load(base_dir: &Path) -> Self {
        let ignore_path = base_dir.join(IGNORE_FILE);
        if !ignore_path.is_file() {
            return Self::default();
        }
        match std::fs::read_to_string(&ignore_path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", ignore_path.display(), e);
                Self::default()
            }
        }
    }

    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    /// Whether `path` (inside `base_dir`) is excluded by any pattern.
    /// Paths outside `base_dir` are never ignored.
    pub fn is_ignored(&self, path: &Path, base_dir: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        match relative_to(path, base_dir) {
            Some(relative) => self.is_ignored_relative(&relative),
            None => false,
        }
    }

    /// Whether a path already relative to the base directory is excluded
    pub fn is_ignored_relative(&self, relative: &Path) -> bool {
        let relative_str = to_slash(relative);
        self.patterns
            .iter()
            .any(|pattern| pattern.matches(relative, &relative_str))
    }
}

/// Check whether a path should be ignored based on the `.gitignore` in `base_dir`.
///
/// The ignore file is read on every call; use [`GitIgnore::load`] when checking
/// many paths against the same directory.
pub fn should_ignore_path(path: &Path, base_dir: &Path) -> bool {
    GitIgnore::load(base_dir).is_ignored(path, base_dir)
}

/// `path` relative to `base_dir`, or `None` when it lies outside.
///
/// `.` components are ignored on both sides, so `a.py` is inside `.` and
/// `./src/a.py` is inside `src`.
pub(crate) fn relative_to(path: &Path, base_dir: &Path) -> Option<PathBuf> {
    if let Ok(relative) = path.strip_prefix(base_dir) {
        return Some(relative.to_path_buf());
    }
    if path.has_root() != base_dir.has_root() {
        return None;
    }
    without_cur_dir(path)
        .strip_prefix(without_cur_dir(base_dir))
        .ok()
        .map(Path::to_path_buf)
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Normal components of a relative path, as strings.
/// Non UTF-8 components are decoded lossily, never dropped.
pub(crate) fn segments<'a>(path: &'a Path) -> impl Iterator<Item = Cow<'a, str>> + 'a {
    path.components().filter_map(|component| match component {
        Component::Normal(part) => Some(part.to_string_lossy()),
        _ => None,
    })
}

/// Render a relative path with `/` separators on every platform
fn to_slash(path: &Path) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

/// `x/y` matches `x/y` itself and everything below it
fn rooted_match(relative_str: &str, rooted: &str) -> bool {
    !rooted.is_empty()
        && (relative_str == rooted
            || relative_str
                .strip_prefix(rooted)
                .is_some_and(|rest| rest.starts_with('/')))
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Shell-style match: `*` crosses `/`, case-sensitive.
/// Invalid patterns only match themselves literally.
fn fnmatch(candidate: &str, pattern: &str) -> bool {
    match Pattern::new(&collapse_stars(pattern)) {
        Ok(compiled) => compiled.matches(candidate),
        Err(_) => candidate == pattern,
    }
}

/// Fold runs of `*` inside a component (`gen**`) into one `*`.
///
/// `glob` only accepts `**` as a whole component; in a shell glob any run of
/// stars means the same as a single one.
fn collapse_stars(pattern: &str) -> Cow<'_, str> {
    let needs_collapse = pattern
        .split('/')
        .any(|component| component != "**" && component.contains("**"));
    if !needs_collapse {
        return Cow::Borrowed(pattern);
    }

    let components: Vec<String> = pattern
        .split('/')
        .map(|component| {
            if component == "**" {
                return component.to_string();
            }
            let mut folded = String::with_capacity(component.len());
            for c in component.chars() {
                if c == '*' && folded.ends_with('*') {
                    continue;
                }
                folded.push(c);
            }
            folded
        })
        .collect();
    Cow::Owned(components.join("/"))
}
