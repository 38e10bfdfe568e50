use std::fmt::Write;

use marquee_core::ChangedFile;

/// Join the patches of `files` into a single diff text.
///
/// Each file with a non-empty patch contributes a `--- <path>` header line,
/// the raw patch, and a blank separator line. Files without a patch add
/// nothing, so the result may be empty.
///
/// # Examples
///
/// ```
/// use marquee_core::ChangedFile;
/// use marquee_difflens::consolidate::consolidate_diff;
///
/// let a = ChangedFile::new("src/a.rs", "+fn a() {}");
/// let logo = ChangedFile::without_patch("logo.png");
/// let diff = consolidate_diff(&[&a, &logo]);
/// assert_eq!(diff, "--- src/a.rs\n+fn a() {}\n\n");
/// ```
pub fn consolidate_diff(files: &[&ChangedFile]) -> String {
    let mut text = String::new();
    for file in files {
        let Some(patch) = file.patch.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let _ = write!(text, "--- {}\n{patch}\n\n", file.filename);
    }
    text
}

/// Returns `true` if `diff` has anything besides whitespace.
pub fn has_meaningful_content(diff: &str) -> bool {
    !diff.trim().is_empty()
}
