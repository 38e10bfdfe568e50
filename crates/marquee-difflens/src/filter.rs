//! Dependency-lockfile filtering.
//!
//! Lockfile churn drowns out the real change when an LLM is asked to name a
//! pull request. Lockfiles are dropped from the analysis set unless they are
//! the only files that changed, in which case the full set is kept so the
//! model can still suggest a "chore: update dependencies" style title.

use marquee_core::ChangedFile;
use serde::Serialize;

/// Lockfile basenames recognized as dependency files.
pub const DEPENDENCY_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "composer.lock",
    "Gemfile.lock",
    "Pipfile.lock",
    "poetry.lock",
    "requirements.txt",
];

/// Returns `true` if `path` ends with one of [`DEPENDENCY_FILES`].
///
/// Matching is a plain suffix test on the path string, so nested paths
/// qualify.
///
/// # Examples
///
/// ```
/// use marquee_difflens::filter::is_dependency_file;
///
/// assert!(is_dependency_file("package-lock.json"));
/// assert!(is_dependency_file("web/app/yarn.lock"));
/// assert!(!is_dependency_file("src/main.rs"));
/// ```
pub fn is_dependency_file(path: &str) -> bool {
    DEPENDENCY_FILES.iter().any(|lock| path.ends_with(lock))
}

/// Files chosen for analysis.
///
/// # Examples
///
/// ```
/// use marquee_core::ChangedFile;
/// use marquee_difflens::filter::select_for_analysis;
///
/// let files = vec![
///     ChangedFile::new("src/lib.rs", "+pub fn x() {}"),
///     ChangedFile::new("Gemfile.lock", "+rake"),
/// ];
/// let selection = select_for_analysis(&files);
/// assert_eq!(selection.files.len(), 1);
/// assert_eq!(selection.excluded[0].filename, "Gemfile.lock");
/// assert!(!selection.fell_back);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection<'a> {
    /// Files to analyze, in their original order.
    pub files: Vec<&'a ChangedFile>,
    /// Dependency files left out of the analysis.
    pub excluded: Vec<&'a ChangedFile>,
    /// `true` when every file was a dependency file and all were kept.
    pub fell_back: bool,
}

impl Selection<'_> {
    /// Returns `true` if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Pick the files whose patches should reach the LLM.
///
/// Non-dependency files are selected when there are any; otherwise every
/// file is selected and [`Selection::fell_back`] is set.
///
/// # Examples
///
/// ```
/// use marquee_core::ChangedFile;
/// use marquee_difflens::filter::select_for_analysis;
///
/// let files = vec![ChangedFile::new("poetry.lock", "+requests")];
/// let selection = select_for_analysis(&files);
/// assert_eq!(selection.files.len(), 1);
/// assert!(selection.fell_back);
/// ```
pub fn select_for_analysis(files: &[ChangedFile]) -> Selection<'_> {
    let (excluded, kept): (Vec<&ChangedFile>, Vec<&ChangedFile>) = files
        .iter()
        .partition(|f| is_dependency_file(&f.filename));

    if !kept.is_empty() {
        return Selection {
            files: kept,
            excluded,
            fell_back: false,
        };
    }

    Selection {
        files: files.iter().collect(),
        excluded: Vec::new(),
        fell_back: !files.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_lockfile_is_a_dependency_file() {
        for name in DEPENDENCY_FILES {
            assert!(is_dependency_file(name), "expected {name} to match");
            let nested = format!("services/api/{name}");
            assert!(is_dependency_file(&nested), "expected {nested} to match");
        }
    }

    #[test]
    fn suffix_must_be_at_the_end() {
        assert!(!is_dependency_file("yarn.lock.bak"));
        assert!(!is_dependency_file("docs/package-lock.json.md"));
    }

    #[test]
    fn unlisted_lockfiles_are_source() {
        assert!(!is_dependency_file("Cargo.lock"));
        assert!(!is_dependency_file("go.sum"));
    }

    #[test]
    fn suffix_match_includes_prefixed_basenames() {
        assert!(is_dependency_file("dev-requirements.txt"));
    }

    #[test]
    fn source_files_win_over_lockfiles() {
        let files = vec![
            ChangedFile::new("src/test.js", "+ console.log(\"hello world\")"),
            ChangedFile::new("package-lock.json", "+ dep change"),
            ChangedFile::new("README.md", "+docs"),
        ];
        let selection = select_for_analysis(&files);
        let names: Vec<&str> = selection.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["src/test.js", "README.md"]);
        assert_eq!(selection.excluded.len(), 1);
        assert!(!selection.fell_back);
    }

    #[test]
    fn only_lockfiles_falls_back_to_everything() {
        let files = vec![
            ChangedFile::new("package-lock.json", "+ dep change"),
            ChangedFile::new("client/yarn.lock", "+ dep change"),
        ];
        let selection = select_for_analysis(&files);
        assert_eq!(selection.files.len(), 2);
        assert!(selection.excluded.is_empty());
        assert!(selection.fell_back);
    }

    #[test]
    fn empty_input_selects_nothing() {
        let selection = select_for_analysis(&[]);
        assert!(selection.is_empty());
        assert!(!selection.fell_back);
    }

    #[test]
    fn patchless_source_file_still_counts_as_source() {
        let files = vec![
            ChangedFile::without_patch("assets/logo.png"),
            ChangedFile::new("yarn.lock", "+dep"),
        ];
        let selection = select_for_analysis(&files);
        assert_eq!(selection.files.len(), 1);
        assert_eq!(selection.files[0].filename, "assets/logo.png");
    }
}
