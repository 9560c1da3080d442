//! Path filtering using .gitignore-style patterns
//!
//! Architecture: Service Layer - PathFilter decides which files count as HTML documents
//! - Include/exclude patterns are evaluated in order, last match wins
//! - Patterns match paths relative to the scan root, never the root's own location
//! - Only files with a configured extension are discovered in directory walks
//! - `.adaignore` files are honoured from the file's directory upwards

use crate::config::PathConfig;
use crate::domain::violations::{CheckerError, CheckerResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default ignore file name
pub const DEFAULT_IGNORE_FILE: &str = ".adaignore";

/// Selects HTML documents using extension and .gitignore-style rules
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: Vec<FilterPattern>,
    /// Lower-cased extensions without the leading dot
    extensions: Vec<String>,
    ignore_filename: Option<String>,
}

#[derive(Debug, Clone)]
struct FilterPattern {
    pattern: glob::Pattern,
    /// Pattern started with `!`
    is_include: bool,
    /// Pattern ended with `/`: matches files inside a matching directory
    directory_only: bool,
    /// Pattern contains an inner or leading `/`: matched against the whole relative path
    anchored: bool,
}

impl FilterPattern {
    fn parse(raw: &str) -> Result<Self, glob::PatternError> {
        let (is_include, original) = match raw.strip_prefix('!') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };
        let directory_only = original.ends_with('/');
        let without_trailing = original.trim_end_matches('/');
        let glob_source = without_trailing.trim_start_matches('/');

        Ok(Self {
            pattern: glob::Pattern::new(glob_source)?,
            is_include,
            directory_only,
            anchored: without_trailing.contains('/'),
        })
    }

    /// Match a path relative to the directory the pattern was declared for
    fn matches(&self, relative: &Path) -> bool {
        if self.directory_only {
            return relative.ancestors().skip(1).any(|dir| self.matches_entry(dir));
        }

        self.matches_entry(relative)
    }

    /// .gitignore conventions: slash-free patterns match the last component only
    fn matches_entry(&self, path: &Path) -> bool {
        if self.anchored {
            return !path.as_os_str().is_empty() && self.pattern.matches(&path.to_string_lossy());
        }

        path.file_name()
            .map(|name| self.pattern.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

impl PathFilter {
    /// Create a filter from patterns, accepted extensions and an optional ignore file name
    pub fn new(
        patterns: Vec<String>,
        extensions: Vec<String>,
        ignore_filename: Option<String>,
    ) -> CheckerResult<Self> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                FilterPattern::parse(raw).map_err(|e| {
                    CheckerError::config(format!("Invalid path pattern '{raw}': {e}"))
                })
            })
            .collect::<CheckerResult<Vec<_>>>()?;

        let extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();

        Ok(Self { patterns, extensions, ignore_filename: ignore_filename.filter(|n| !n.is_empty()) })
    }

    /// Filter for `.html`/`.htm` files with common build directories excluded
    pub fn with_defaults() -> CheckerResult<Self> {
        let paths = PathConfig::default();
        Self::new(paths.patterns, paths.extensions, paths.ignore_file)
    }

    /// Whether the path carries one of the accepted extensions
    pub fn is_html_file<P: AsRef<Path>>(&self, path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                self.extensions.iter().any(|accepted| *accepted == ext)
            })
            .unwrap_or(false)
    }

    /// Check a path against the configured patterns and any ignore files
    ///
    /// Patterns see `path` as given; pass a path relative to the scan root.
    pub fn should_analyze<P: AsRef<Path>>(&self, path: P) -> CheckerResult<bool> {
        let path = path.as_ref();
        self.should_analyze_relative(path, path)
    }

    fn should_analyze_relative(&self, path: &Path, relative: &Path) -> CheckerResult<bool> {
        let mut should_include = true;
        for pattern in &self.patterns {
            if pattern.matches(relative) {
                should_include = pattern.is_include;
            }
        }

        if !should_include {
            return Ok(false);
        }

        if self.ignore_filename.is_some() && self.is_ignored_by_files(path)? {
            return Ok(false);
        }

        Ok(true)
    }

    fn is_ignored_by_files(&self, path: &Path) -> CheckerResult<bool> {
        let Some(ignore_filename) = &self.ignore_filename else {
            return Ok(false);
        };

        let mut is_ignored = false;
        let mut current_dir = path.parent();

        while let Some(dir) = current_dir {
            let ignore_file = dir.join(ignore_filename);

            if ignore_file.is_file() {
                if let Ok(relative_path) = path.strip_prefix(dir) {
                    for pattern in load_ignore_file(&ignore_file)? {
                        if pattern.matches(relative_path) {
                            is_ignored = !pattern.is_include;
                        }
                    }
                }
            }

            current_dir = dir.parent();
        }

        Ok(is_ignored)
    }

    /// All HTML documents under `root` that pass the filter, in walk order
    pub fn find_files<P: AsRef<Path>>(&self, root: P) -> CheckerResult<Vec<PathBuf>> {
        let root = root.as_ref();
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_html_file(path) {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if self.should_analyze_relative(path, relative)? {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Append an exclude (or `!`-prefixed include) pattern
    pub fn add_pattern(&mut self, pattern: &str) -> CheckerResult<()> {
        let parsed = FilterPattern::parse(pattern)
            .map_err(|e| CheckerError::config(format!("Invalid path pattern '{pattern}': {e}")))?;
        self.patterns.push(parsed);
        Ok(())
    }
}

fn load_ignore_file(path: &Path) -> CheckerResult<Vec<FilterPattern>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CheckerError::config(format!("Failed to read ignore file '{}': {}", path.display(), e))
    })?;

    let mut patterns = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match FilterPattern::parse(line) {
            Ok(pattern) => patterns.push(pattern),
            Err(e) => {
                tracing::warn!("Invalid pattern '{}' in {}: {}", line, path.display(), e);
            }
        }
    }

    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filter(patterns: &[&str]) -> PathFilter {
        PathFilter::new(
            patterns.iter().map(|p| p.to_string()).collect(),
            vec!["html".to_string()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_basic_exclusion() {
        let filter = filter(&["dist/**", "*.min.html"]);

        assert!(filter.should_analyze(Path::new("site/index.html")).unwrap());
        assert!(!filter.should_analyze(Path::new("dist/index.html")).unwrap());
        assert!(!filter.should_analyze(Path::new("site/app.min.html")).unwrap());
    }

    #[test]
    fn test_include_override_last_match_wins() {
        let filter = filter(&["vendor/**", "!vendor/widgets/**"]);

        assert!(!filter.should_analyze(Path::new("vendor/lib/a.html")).unwrap());
        assert!(filter.should_analyze(Path::new("vendor/widgets/b.html")).unwrap());
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        let filter = PathFilter::new(vec![], vec![".HTM".to_string()], None).unwrap();

        assert!(filter.is_html_file("page.htm"));
        assert!(filter.is_html_file("PAGE.HTM"));
        assert!(!filter.is_html_file("page.html"));
        assert!(!filter.is_html_file("README"));
    }

    #[test]
    fn test_default_filter_excludes_build_dirs() {
        let filter = PathFilter::with_defaults().unwrap();

        assert!(!filter.should_analyze(Path::new("node_modules/pkg/index.html")).unwrap());
        assert!(!filter.should_analyze(Path::new("site/dist/index.html")).unwrap());
        assert!(filter.should_analyze(Path::new("site/index.html")).unwrap());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(PathFilter::new(vec!["[invalid".to_string()], vec![], None).is_err());
        assert!(filter(&[]).add_pattern("[oops").is_err());
    }

    #[test]
    fn test_find_files_honours_ignore_file() -> CheckerResult<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        fs::create_dir_all(root.join("pages"))?;
        fs::create_dir_all(root.join("drafts"))?;
        fs::create_dir_all(root.join("pages/archive"))?;
        fs::write(root.join(DEFAULT_IGNORE_FILE), "# unpublished\ndrafts/\narchive/\n")?;
        fs::write(root.join("index.html"), "<p>home</p>")?;
        fs::write(root.join("pages/about.htm"), "<p>about</p>")?;
        fs::write(root.join("pages/notes.txt"), "not html")?;
        fs::write(root.join("pages/archive/2019.html"), "<p>old</p>")?;
        fs::write(root.join("drafts/wip.html"), "<p>wip</p>")?;

        let filter = PathFilter::new(
            vec![],
            vec!["html".to_string(), "htm".to_string()],
            Some(DEFAULT_IGNORE_FILE.to_string()),
        )?;
        let files: Vec<_> = filter
            .find_files(root)?
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(files, vec![PathBuf::from("index.html"), PathBuf::from("pages/about.htm")]);
        Ok(())
    }

    #[test]
    fn test_directory_patterns_match_files_inside() {
        let filter = filter(&["drafts/", "/site/old/"]);

        assert!(!filter.should_analyze(Path::new("drafts/wip.html")).unwrap());
        assert!(!filter.should_analyze(Path::new("blog/drafts/a/b.html")).unwrap());
        assert!(!filter.should_analyze(Path::new("site/old/index.html")).unwrap());
        assert!(filter.should_analyze(Path::new("blog/old/index.html")).unwrap());
        assert!(filter.should_analyze(Path::new("drafts.html")).unwrap());
    }

    #[test]
    fn test_scan_root_inside_build_directory() -> CheckerResult<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("build").join("site");

        fs::create_dir_all(root.join("dist"))?;
        fs::write(root.join("index.html"), "<p>home</p>")?;
        fs::write(root.join("dist/bundle.html"), "<p>generated</p>")?;

        let files = PathFilter::with_defaults()?.find_files(&root)?;

        assert_eq!(files, vec![root.join("index.html")]);
        Ok(())
    }
}
