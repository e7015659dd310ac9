//! String-level path helpers. Paths use `/` internally; `\` is accepted on input.

pub const SEPARATOR: char = '/';

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Strip surrounding whitespace and trailing separators (a lone root stays).
pub fn trim(path: &str) -> String {
    let trimmed = path.trim();
    let without = trimmed.trim_end_matches(is_separator);
    if without.is_empty() && !trimmed.is_empty() {
        SEPARATOR.to_string()
    } else {
        without.replace('\\', "/")
    }
}

pub fn is_absolute(path: &str) -> bool {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(c), _) if is_separator(c) => true,
        (Some(d), Some(':')) => d.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Last path segment, extension included.
pub fn fullname(path: &str) -> String {
    let path = trim(path);
    match path.rfind(SEPARATOR) {
        Some(i) if path.len() > 1 => path[i + 1..].to_string(),
        _ if path == "/" => String::new(),
        _ => path,
    }
}

/// Extension without the dot; empty for dot-files and names without one.
pub fn extension(path: &str) -> String {
    let full = fullname(path);
    match full.rfind('.') {
        Some(0) | None => String::new(),
        Some(i) => full[i + 1..].to_string(),
    }
}

pub fn has_extension(path: &str) -> bool {
    !extension(path).is_empty()
}

/// Last path segment without its extension.
pub fn name(path: &str) -> String {
    let full = fullname(path);
    match full.rfind('.') {
        Some(0) | None => full,
        Some(i) => full[..i].to_string(),
    }
}

pub fn parent(path: &str) -> String {
    let path = trim(path);
    match path.rfind(SEPARATOR) {
        Some(0) if path.len() > 1 => SEPARATOR.to_string(),
        Some(i) if i > 0 => path[..i].to_string(),
        _ => String::new(),
    }
}

/// Drive letter of a Windows-style path (`C:`), empty elsewhere.
pub fn drive(path: &str) -> String {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(d), Some(':')) if d.is_ascii_alphabetic() => format!("{}:", d.to_ascii_uppercase()),
        _ => String::new(),
    }
}

/// Characters that can never appear in a path segment.
pub fn is_invalid(path: &str) -> bool {
    let body = if drive(path).is_empty() { path } else { &path[2..] };
    path.trim().is_empty()
        || body
            .chars()
            .any(|c| matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0'))
}

/// Resolve `.` and `..` segments; never climbs above the root.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with(SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().map(|p| *p != ".." && !p.ends_with(':')).unwrap_or(false) {
                    parts.pop();
                } else if !absolute {
                    parts.push(segment);
                }
            }
            s => parts.push(s),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// `path` resolved against `base`, unless it is already absolute.
pub fn join(base: &str, path: &str) -> String {
    let path = trim(path);
    if is_absolute(&path) || base.is_empty() {
        normalize(&path)
    } else if path.is_empty() {
        normalize(base)
    } else {
        normalize(&format!("{}/{}", trim(base), path))
    }
}

/// Plain concatenation of a relative path under `base`, without normalisation.
pub fn left_join(base: &str, relative: &str) -> String {
    if base.is_empty() {
        relative.to_string()
    } else if relative.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches(is_separator), relative)
    }
}

/// Number of segments below the location a relative path points at, minus one.
pub fn depth(relative: &str) -> i64 {
    relative.chars().filter(|c| is_separator(*c)).count() as i64
}

/// First free variant of `path`: `a.txt`, `a(2).txt`, `a(3).txt`, ...
///
/// The extension stays last when `keep_extension` is set.
pub fn stacked<F: FnMut(&str) -> bool>(path: &str, keep_extension: bool, mut exists: F) -> String {
    if !exists(path) {
        return path.to_string();
    }
    let ext = if keep_extension { extension(path) } else { String::new() };
    let base = if ext.is_empty() {
        path.to_string()
    } else {
        path[..path.len() - ext.len() - 1].to_string()
    };
    let mut index = 2_u64;
    loop {
        let candidate = if ext.is_empty() {
            format!("{}({})", base, index)
        } else {
            format!("{}({}).{}", base, index, ext)
        };
        if !exists(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// True when `descendant` lies inside the directory `ancestor`.
pub fn is_ancestor(ancestor: &str, descendant: &str) -> bool {
    let ancestor = trim(ancestor);
    let descendant = trim(descendant);
    descendant.len() > ancestor.len()
        && descendant.starts_with(&ancestor)
        && (ancestor.ends_with(SEPARATOR) || descendant[ancestor.len()..].starts_with(SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments() {
        assert_eq!(fullname("/home/user/notes.txt"), "notes.txt");
        assert_eq!(name("/home/user/notes.tar.gz"), "notes.tar");
        assert_eq!(extension("/home/user/notes.tar.gz"), "gz");
        assert_eq!(extension("/home/user/.bashrc"), "");
        assert_eq!(name(".bashrc"), ".bashrc");
        assert_eq!(parent("/home/user/"), "/home");
        assert_eq!(parent("/home"), "/");
        assert_eq!(parent("notes.txt"), "");
    }

    #[test]
    fn joining() {
        assert_eq!(join("/home/user", "docs/../music"), "/home/user/music");
        assert_eq!(join("/home/user", "/etc"), "/etc");
        assert_eq!(join("/", ".."), "/");
        assert_eq!(left_join("dir", "a.txt"), "dir/a.txt");
    }

    #[test]
    fn validity() {
        assert!(is_invalid("a?b"));
        assert!(is_invalid("  "));
        assert!(!is_invalid("C:/data/file.txt"));
        assert_eq!(drive("c:/data"), "C:");
        assert!(is_absolute("C:/data"));
        assert!(!is_absolute("data"));
    }

    #[test]
    fn stacking() {
        let taken = ["/d/a.txt", "/d/a(2).txt", "/d/dir"];
        let exists = |p: &str| taken.contains(&p);
        assert_eq!(stacked("/d/a.txt", true, exists), "/d/a(3).txt");
        assert_eq!(stacked("/d/dir", false, exists), "/d/dir(2)");
        assert_eq!(stacked("/d/free.txt", true, exists), "/d/free.txt");
        assert!(is_ancestor("/d", "/d/dir/x"));
        assert!(!is_ancestor("/d/di", "/d/dir"));
    }
}
