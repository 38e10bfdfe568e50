use marquee_core::{ChangedFile, MarqueeError};

/// Split a unified diff (as produced by `git diff`) into per-file entries.
///
/// The result has the same shape as a GitHub pull request file listing:
/// `filename` is the new path (the old path for deletions) and `patch` holds
/// everything from the first `@@` hunk header to the end of that file's
/// section. Binary files and mode-only changes get no patch.
///
/// # Errors
///
/// Returns [`MarqueeError::Parse`] if a hunk header is malformed.
///
/// # Examples
///
/// ```
/// use marquee_difflens::parser::split_unified_diff;
///
/// let diff = "diff --git a/hello.rs b/hello.rs\n\
///             --- a/hello.rs\n\
///             +++ b/hello.rs\n\
///             @@ -1,2 +1,3 @@\n\
///              fn main() {\n\
///             +    println!(\"hello\");\n\
///              }\n";
/// let files = split_unified_diff(diff).unwrap();
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].filename, "hello.rs");
/// assert!(files[0].patch.as_deref().unwrap().starts_with("@@ -1,2 +1,3 @@"));
/// ```
pub fn split_unified_diff(input: &str) -> Result<Vec<ChangedFile>, MarqueeError> {
    let mut files = Vec::new();
    let mut current: Option<FileSection> = None;
    // Lines still expected in the open hunk as (old, new).
    let mut remaining: Option<(u32, u32)> = None;

    for line in input.lines() {
        if let Some((old, new)) = remaining.as_mut() {
            if let Some(file) = current.as_mut() {
                match line.chars().next() {
                    Some(' ') | None => {
                        *old = old.saturating_sub(1);
                        *new = new.saturating_sub(1);
                    }
                    Some('-') => *old = old.saturating_sub(1),
                    Some('+') => *new = new.saturating_sub(1),
                    Some('\\') => {}
                    _ => {
                        remaining = None;
                    }
                }
                if remaining.is_some() {
                    file.patch_lines.push(line);
                    if remaining == Some((0, 0)) {
                        remaining = None;
                    }
                    continue;
                }
            }
        }

        // A marker trailing the last line of a hunk.
        if line.starts_with('\\') {
            if let Some(file) = current.as_mut() {
                if !file.patch_lines.is_empty() {
                    file.patch_lines.push(line);
                }
            }
            continue;
        }

        if let Some(header) = line.strip_prefix("diff --git ") {
            if let Some(file) = current.take() {
                files.push(file.finish());
            }
            let mut section = FileSection::default();
            if let Some((old, new)) = parse_git_header(header) {
                section.old_path = old;
                section.new_path = new;
            }
            current = Some(section);
            continue;
        }

        // Plain patches have no "diff --git" line; a fresh "---" after a
        // completed hunk starts the next file.
        if line.starts_with("--- ") {
            let starts_new = current
                .as_ref()
                .map_or(true, |f| !f.patch_lines.is_empty() || f.saw_old_header);
            if starts_new {
                if let Some(file) = current.take() {
                    files.push(file.finish());
                }
                current = Some(FileSection::default());
            }
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if line.starts_with("Binary files ") && line.ends_with(" differ") {
            file.is_binary = true;
            continue;
        }

        if let Some(path) = line.strip_prefix("--- ") {
            file.saw_old_header = true;
            if let Some(p) = parse_path(path) {
                file.old_path = p;
            }
            continue;
        }

        if let Some(path) = line.strip_prefix("+++ ") {
            match parse_path(path) {
                Some(p) => file.new_path = p,
                None => file.is_deleted = true,
            }
            continue;
        }

        if line.starts_with("deleted file mode") {
            file.is_deleted = true;
            continue;
        }

        if let Some(path) = line.strip_prefix("rename to ") {
            file.new_path = path.to_string();
            continue;
        }

        if line.starts_with("@@ ") {
            let (_, old_lines, _, new_lines) = parse_hunk_header(line)?;
            file.patch_lines.push(line);
            if old_lines > 0 || new_lines > 0 {
                remaining = Some((old_lines, new_lines));
            }
            continue;
        }
    }

    if let Some(file) = current.take() {
        files.push(file.finish());
    }

    files.retain(|f| !f.filename.is_empty());
    Ok(files)
}

#[derive(Default)]
struct FileSection<'a> {
    old_path: String,
    new_path: String,
    patch_lines: Vec<&'a str>,
    is_binary: bool,
    is_deleted: bool,
    saw_old_header: bool,
}

impl FileSection<'_> {
    fn finish(self) -> ChangedFile {
        let filename = if self.is_deleted || self.new_path.is_empty() {
            self.old_path
        } else {
            self.new_path
        };
        let patch = if self.is_binary || self.patch_lines.is_empty() {
            None
        } else {
            Some(self.patch_lines.join("\n"))
        };
        ChangedFile { filename, patch }
    }
}

fn parse_git_header(header: &str) -> Option<(String, String)> {
    let header = header.trim();
    let split = header.rfind(" b/")?;
    let old = header[..split].trim_matches('"');
    let new = header[split + 1..].trim_matches('"');
    Some((
        old.strip_prefix("a/").unwrap_or(old).to_string(),
        new.strip_prefix("b/").unwrap_or(new).to_string(),
    ))
}

/// Strip the `a/` / `b/` prefix and quoting. `None` for `/dev/null`.
fn parse_path(raw: &str) -> Option<String> {
    // git appends a tab and timestamp in some modes
    let raw = raw.split('\t').next().unwrap_or(raw);
    let normalized = raw.trim_matches('"');

    if normalized == "/dev/null" {
        return None;
    }

    let stripped = normalized
        .strip_prefix("a/")
        .or_else(|| normalized.strip_prefix("b/"))
        .unwrap_or(normalized);

    Some(stripped.to_string())
}

fn parse_hunk_header(line: &str) -> Result<(u32, u32, u32, u32), MarqueeError> {
    let inner = line
        .strip_prefix("@@ ")
        .and_then(|s| {
            let end = s.find(" @@")?;
            Some(&s[..end])
        })
        .ok_or_else(|| MarqueeError::Parse(format!("invalid hunk header: {line}")))?;

    let parts: Vec<&str> = inner.split(' ').collect();
    if parts.len() != 2 {
        return Err(MarqueeError::Parse(format!("invalid hunk header: {line}")));
    }

    let old = parts[0]
        .strip_prefix('-')
        .ok_or_else(|| MarqueeError::Parse(format!("invalid old range in hunk: {line}")))?;
    let new = parts[1]
        .strip_prefix('+')
        .ok_or_else(|| MarqueeError::Parse(format!("invalid new range in hunk: {line}")))?;

    let (old_start, old_lines) = parse_range(old, line)?;
    let (new_start, new_lines) = parse_range(new, line)?;

    Ok((old_start, old_lines, new_start, new_lines))
}

fn parse_range(range: &str, context: &str) -> Result<(u32, u32), MarqueeError> {
    if let Some((start, count)) = range.split_once(',') {
        let s = start
            .parse()
            .map_err(|_| MarqueeError::Parse(format!("invalid range number in: {context}")))?;
        let c = count
            .parse()
            .map_err(|_| MarqueeError::Parse(format!("invalid range count in: {context}")))?;
        Ok((s, c))
    } else {
        let s = range
            .parse()
            .map_err(|_| MarqueeError::Parse(format!("invalid range number in: {context}")))?;
        Ok((s, 1))
    }
}
