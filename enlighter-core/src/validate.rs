//! Content validation for `enlighter validate`.
//!
//! Two layers:
//! - [`check_markup`] parses one HTML file and returns the parser's errors.
//! - [`validate_tree`] walks the content root, runs the markup check on
//!   every HTML file and loads every project the way a sync would, collecting
//!   problems instead of stopping at the first one.

use std::fmt;
use std::path::{Path, PathBuf};

use scraper::{Html, Node};

use crate::content::{list_project_dirs, list_stage_files, load_sidecar, load_stage};
use crate::error::{io_err, ContentError};
use crate::settings::Layout;

/// A single problem found in the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Parse errors reported by the HTML5 parser, in document order.
///
/// Files carrying a `<!DOCTYPE>` are checked as whole documents; anything
/// else is checked as a body fragment, so stage snippets need no doctype.
/// Optional end tags (`<p>`, `<li>`, `<td>` ...) are valid and not reported.
pub fn check_markup(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let has_doctype = document
        .tree
        .root()
        .children()
        .any(|node| matches!(node.value(), Node::Doctype(_)));
    let parsed = if has_doctype {
        document
    } else {
        Html::parse_fragment(html)
    };

    let mut errors: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
    errors.dedup();
    errors
}

/// Validate the whole content tree under `root`.
///
/// Returns every issue found; an empty list means the tree would sync.
pub fn validate_tree(
    root: &Path,
    layout: &Layout,
    require_metadata: bool,
) -> Result<Vec<Issue>, ContentError> {
    let mut issues = Vec::new();

    let mut html_files = Vec::new();
    collect_files(root, &layout.stage_extension, &mut html_files)?;
    html_files.sort();
    for path in &html_files {
        let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        issues.extend(check_markup(&text).into_iter().map(|message| Issue {
            path: path.clone(),
            message: format!("invalid markup: {message}"),
        }));
    }

    for dir in list_project_dirs(root, layout)? {
        if let Err(err) = load_sidecar(&dir, layout) {
            issues.push(content_issue(&dir.path, err));
        }
        let (stages, skipped) = list_stage_files(&dir, layout)?;
        for path in skipped {
            issues.push(Issue {
                path,
                message: "file name does not match <order>_<id>_<title> pattern".to_string(),
            });
        }
        for stage in stages {
            let path = stage.path.clone();
            if let Err(err) = load_stage(stage, require_metadata) {
                issues.push(content_issue(&path, err));
            }
        }
    }

    Ok(issues)
}

fn content_issue(path: &Path, err: ContentError) -> Issue {
    Issue {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn collect_files(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<(), ContentError> {
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if file_type.is_dir() && !hidden && entry.file_name() != "node_modules" {
            collect_files(&path, extension, out)?;
        } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            out.push(path);
        }
    }
    Ok(())
}
