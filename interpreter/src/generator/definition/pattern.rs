use crate::context::{Context, FrameId};
use crate::datatype::{WildcardComparer, ASTERISK};
use crate::generator::Definition;
use crate::lang::RuntimeMsg;
use crate::processing::general::{DirEntry, SortedReadDir};
use crate::processing::paths;

/// Which directory entries a pattern yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Files,
    Directories,
    All,
}

impl EntryKind {
    fn accepts(&self, entry: &DirEntry) -> bool {
        match self {
            Self::Files => !entry.is_directory,
            Self::Directories => entry.is_directory,
            Self::All => true,
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Wild(WildcardComparer),
    /// `**`: any number of directories, none included.
    Recursive,
}

impl Segment {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Literal(l) => l == name,
            Self::Wild(w) => w.matches(name),
            Self::Recursive => true,
        }
    }
}

/// One directory being listed, with every pattern position still alive in it.
#[derive(Debug)]
struct Level {
    relative: String,
    entries: SortedReadDir,
    states: Vec<usize>,
}

/// Paths matching a pattern such as `*.txt`, `src/**/*.rs` or `/tmp/*`.
///
/// Elements are relative to the location the pattern was written in, or absolute
/// for an absolute pattern. Directories are walked depth-first in name order and
/// a directory is yielded before its contents.
#[derive(Debug)]
pub struct PatternDefinition {
    location: FrameId,
    // literal part in front of the first segment with an asterisk
    prefix: String,
    segments: Vec<Segment>,
    kind: EntryKind,
    stack: Vec<Level>,
    started: bool,
    current: Option<String>,
}

impl PatternDefinition {
    pub fn new(pattern: &str, location: FrameId, kind: EntryKind) -> Self {
        let pattern = pattern.replace('\\', "/");
        let absolute = paths::is_absolute(&pattern);
        let mut prefix: Vec<&str> = Vec::new();
        let mut segments: Vec<Segment> = Vec::new();
        for part in pattern.split('/').filter(|p| !p.is_empty()) {
            if segments.is_empty() && !part.contains(ASTERISK) {
                prefix.push(part);
                continue;
            }
            let segment = if part.chars().all(|c| c == ASTERISK) && part.len() > 1 {
                Segment::Recursive
            } else if part.contains(ASTERISK) {
                Segment::Wild(WildcardComparer::new(part))
            } else {
                Segment::Literal(part.to_string())
            };
            if matches!(segment, Segment::Recursive)
                && matches!(segments.last(), Some(Segment::Recursive))
            {
                continue;
            }
            segments.push(segment);
        }
        match segments.last() {
            None => segments.push(Segment::Wild(WildcardComparer::new("*"))),
            Some(Segment::Recursive) => segments.push(Segment::Wild(WildcardComparer::new("*"))),
            _ => {}
        }
        let mut prefix = prefix.join("/");
        if absolute && !paths::is_absolute(&prefix) {
            prefix = format!("/{}", prefix);
        }
        Self {
            location,
            prefix,
            segments,
            kind,
            stack: Vec::new(),
            started: false,
            current: None,
        }
    }

    /// Children of the location (`files`, `directories`, `all`).
    pub fn children(location: FrameId, kind: EntryKind) -> Self {
        Self::new("*", location, kind)
    }

    /// Descendants of the location (`recursiveFiles`, ...).
    pub fn descendants(location: FrameId, kind: EntryKind) -> Self {
        Self::new("**", location, kind)
    }

    fn root(&self, ctx: &Context) -> String {
        paths::join(ctx.location(self.location), &self.prefix)
    }

    fn open(&self, ctx: &mut Context, relative: &str) -> Option<SortedReadDir> {
        let path = paths::join(&self.root(ctx), relative);
        match ctx.filesystem.open_dir(&path) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::trace!("pattern skips `{}`: {}", path, e);
                None
            }
        }
    }

    /// Advance every alive position over `entry`; returns whether the entry
    /// completes the pattern and which positions continue inside it.
    fn step(&self, states: &[usize], entry: &DirEntry) -> (bool, Vec<usize>) {
        let last = self.segments.len() - 1;
        let mut complete = false;
        let mut inside = Vec::new();
        let mut advance = |position: usize, inside: &mut Vec<usize>| {
            if self.segments[position].matches(&entry.name) {
                if position == last {
                    complete = true;
                } else if entry.is_directory {
                    inside.push(position + 1);
                }
            }
        };
        for &state in states {
            match self.segments[state] {
                Segment::Recursive => {
                    if entry.is_directory {
                        inside.push(state);
                    }
                    advance(state + 1, &mut inside);
                }
                _ => advance(state, &mut inside),
            }
        }
        inside.sort_unstable();
        inside.dedup();
        (complete, inside)
    }

    fn element(&self, relative: &str) -> String {
        paths::left_join(&self.prefix, relative)
    }
}

impl Definition for PatternDefinition {
    fn has_next(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        if !self.started {
            self.started = true;
            if let Some(entries) = self.open(ctx, "") {
                self.stack.push(Level {
                    relative: String::new(),
                    entries,
                    states: vec![0],
                });
            }
        }
        loop {
            if !ctx.is_running() {
                self.stack.clear();
                self.current = None;
                return Ok(false);
            }
            let level = match self.stack.last_mut() {
                Some(level) => level,
                None => {
                    self.current = None;
                    return Ok(false);
                }
            };
            let entry = match level.entries.next() {
                Some(entry) => entry,
                None => {
                    self.stack.pop();
                    continue;
                }
            };
            let relative = paths::left_join(&level.relative, &entry.name);
            let states = level.states.clone();
            let (complete, inside) = self.step(&states, &entry);
            if !inside.is_empty() {
                if let Some(entries) = self.open(ctx, &relative) {
                    self.stack.push(Level {
                        relative: relative.clone(),
                        entries,
                        states: inside,
                    });
                }
            }
            if complete && self.kind.accepts(&entry) {
                tracing::trace!("pattern yields `{}`", relative);
                self.current = Some(self.element(&relative));
                return Ok(true);
            }
        }
    }

    fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.started = false;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::definition::tests::drain;
    use crate::generator::DefPtr;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b.rs"), "b").unwrap();
        fs::write(root.join("src/main.rs"), "m").unwrap();
        fs::write(root.join("src/nested/deep.rs"), "d").unwrap();
        fs::write(root.join("src/notes.txt"), "n").unwrap();
        dir
    }

    fn run(pattern: &str, kind: EntryKind) -> Vec<String> {
        let dir = fixture();
        let mut ctx = Context::new(&dir.path().to_string_lossy());
        let location = ctx.current_location();
        let mut def: DefPtr = Box::new(PatternDefinition::new(pattern, location, kind));
        let first = drain(&mut def, &mut ctx);
        assert!(!def.has_next(&mut ctx).unwrap());
        def.reset();
        assert_eq!(drain(&mut def, &mut ctx), first);
        first
    }

    #[test]
    fn children() {
        assert_eq!(run("*", EntryKind::All), vec!["a.txt", "b.rs", "src"]);
        assert_eq!(run("*", EntryKind::Files), vec!["a.txt", "b.rs"]);
        assert_eq!(run("*.txt", EntryKind::All), vec!["a.txt"]);
        assert_eq!(run("src/*.rs", EntryKind::All), vec!["src/main.rs"]);
    }

    #[test]
    fn recursive() {
        assert_eq!(
            run("**", EntryKind::All),
            vec![
                "a.txt",
                "b.rs",
                "src",
                "src/main.rs",
                "src/nested",
                "src/nested/deep.rs",
                "src/notes.txt"
            ]
        );
        assert_eq!(run("**", EntryKind::Directories), vec!["src", "src/nested"]);
        assert_eq!(
            run("**/*.rs", EntryKind::All),
            vec!["b.rs", "src/main.rs", "src/nested/deep.rs"]
        );
        assert_eq!(run("src/**/*.rs", EntryKind::All), vec!["src/main.rs", "src/nested/deep.rs"]);
    }

    #[test]
    fn missing_directory() {
        assert!(run("nothing/*", EntryKind::All).is_empty());
    }

    #[test]
    fn stops_when_halted() {
        let dir = fixture();
        let mut ctx = Context::new(&dir.path().to_string_lossy());
        let location = ctx.current_location();
        let mut def = PatternDefinition::descendants(location, EntryKind::All);
        assert!(def.has_next(&mut ctx).unwrap());
        ctx.running_flag()
            .store(false, std::sync::atomic::Ordering::Relaxed);
        assert!(!def.has_next(&mut ctx).unwrap());
        assert_eq!(def.current(), None);
    }
}
