//! Local content tree discovery.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   project_<id>_<name>/
//!     project.json                  (sidecar — mandatory)
//!     README.md                     (optional, becomes `readme`)
//!     <order>_<id>_<title>.html     (stage files)
//!   templates/
//!     <name>.html
//! ```
//!
//! Results are sorted deterministically: projects by directory name, stages
//! by order number then ID, templates by name.

use std::path::{Path, PathBuf};

use scraper::{Html, Node};

use crate::error::{io_err, ContentError};
use crate::settings::Layout;
use crate::types::{
    ProjectContent, ProjectDir, ProjectMeta, StageContent, StageFile, StageMeta, StageName,
    TemplateFile,
};

const README: &str = "README.md";

// ---------------------------------------------------------------------------
// 1. Name parsing
// ---------------------------------------------------------------------------

/// Parse `<order>_<id>_<title>.<ext>`. Both numbers must be all digits, the
/// ID at least 1, and the title non-empty.
pub fn parse_stage_name(file_name: &str, extension: &str) -> Option<StageName> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    let mut parts = stem.splitn(3, '_');
    let order = parts.next()?;
    let id = parts.next()?;
    let title = parts.next()?;
    if !is_digits(order) || !is_digits(id) || title.is_empty() {
        return None;
    }
    let real_id: i64 = id.parse().ok()?;
    if real_id < 1 {
        return None;
    }
    Some(StageName {
        order_num: order.parse().ok()?,
        real_id,
        title: title.replace('_', " "),
    })
}

/// Parse `<prefix><id>_<name>` into the embedded ID and label.
pub fn parse_project_dir_name(dir_name: &str, prefix: &str) -> Option<(i64, String)> {
    let rest = dir_name.strip_prefix(prefix)?;
    let (id, name) = rest.split_once('_')?;
    if !is_digits(id) || name.is_empty() {
        return None;
    }
    Some((id.parse().ok()?, name.replace('_', " ")))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// 2. Metadata block
// ---------------------------------------------------------------------------

/// Find the first HTML comment whose body is a JSON object and parse it.
///
/// Returns the metadata and the text with that comment (and one trailing
/// newline) removed, or `Ok(None)` when no such comment exists. A comment that
/// looks like JSON but does not parse is an error. Comments inside `<script>`
/// or `<style>` are text, not comments, and are never read.
pub fn extract_metadata(
    text: &str,
    path: &Path,
) -> Result<Option<(StageMeta, String)>, ContentError> {
    // The parser folds CR and CRLF to LF; comment bodies are matched against
    // text with the same line endings.
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let fragment = Html::parse_fragment(&text);
    let comment = fragment.tree.root().descendants().find_map(|node| match node.value() {
        Node::Comment(comment) if comment.trim_start().starts_with('{') => {
            Some((**comment).to_owned())
        }
        _ => None,
    });
    let Some(comment) = comment else {
        return Ok(None);
    };

    let meta: StageMeta =
        serde_json::from_str(comment.trim()).map_err(|e| ContentError::InvalidMetadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let needle = format!("<!--{comment}-->");
    let Some(start) = text.find(&needle) else {
        return Err(ContentError::InvalidMetadata {
            path: path.to_path_buf(),
            message: "metadata comment is not closed with -->".to_string(),
        });
    };
    let mut end = start + needle.len();
    if text[end..].starts_with('\n') {
        end += 1;
    }
    let mut stripped = String::with_capacity(text.len());
    stripped.push_str(&text[..start]);
    stripped.push_str(&text[end..]);
    Ok(Some((meta, stripped)))
}

// ---------------------------------------------------------------------------
// 3. Directory listing
// ---------------------------------------------------------------------------

/// All project directories directly under `root`, sorted by name.
///
/// Directories whose names do not follow the project convention are ignored.
pub fn list_project_dirs(root: &Path, layout: &Layout) -> Result<Vec<ProjectDir>, ContentError> {
    let mut dirs: Vec<ProjectDir> = std::fs::read_dir(root)
        .map_err(|e| io_err(root, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            let (dir_id, label) = parse_project_dir_name(&name, &layout.project_prefix)?;
            Some(ProjectDir {
                name,
                path: e.path(),
                dir_id,
                label,
            })
        })
        .collect();
    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dirs)
}

/// Stage files in a project directory plus files with the stage extension
/// whose names did not parse.
pub fn list_stage_files(
    dir: &ProjectDir,
    layout: &Layout,
) -> Result<(Vec<StageFile>, Vec<PathBuf>), ContentError> {
    let mut stages = Vec::new();
    let mut skipped = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(&dir.path)
        .map_err(|e| io_err(&dir.path, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let suffix = format!(".{}", layout.stage_extension);
    for entry in entries {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(&suffix) {
            continue;
        }
        match parse_stage_name(&file_name, &layout.stage_extension) {
            Some(name) => stages.push(StageFile {
                name,
                path: entry.path(),
                rel_path: format!("{}/{}", dir.name, file_name),
            }),
            None => skipped.push(entry.path()),
        }
    }

    stages.sort_by_key(|s| (s.name.order_num, s.name.real_id));
    Ok((stages, skipped))
}

/// Template files under `<root>/<templates_dir>/`, sorted by name.
///
/// A missing templates directory yields an empty list.
pub fn list_templates(root: &Path, layout: &Layout) -> Result<Vec<TemplateFile>, ContentError> {
    let dir = root.join(&layout.templates_dir);
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let suffix = format!(".{}", layout.stage_extension);
    let mut templates: Vec<TemplateFile> = std::fs::read_dir(&dir)
        .map_err(|e| io_err(&dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| {
            let file_name = e.file_name().to_string_lossy().into_owned();
            let name = file_name.strip_suffix(&suffix)?;
            if name.is_empty() {
                return None;
            }
            Some(TemplateFile {
                name: name.to_string(),
                path: e.path(),
            })
        })
        .collect();
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}

// ---------------------------------------------------------------------------
// 4. Loading
// ---------------------------------------------------------------------------

/// Read and parse the project sidecar. Absence is an error, never a skip, and
/// so is an ID below 1.
///
/// When the sidecar carries no `readme`, a `README.md` next to it is used.
pub fn load_sidecar(dir: &ProjectDir, layout: &Layout) -> Result<ProjectMeta, ContentError> {
    let path = dir.path.join(&layout.sidecar);
    if !path.is_file() {
        return Err(ContentError::MissingSidecar {
            dir: dir.path.clone(),
            sidecar: layout.sidecar.clone(),
        });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let mut meta: ProjectMeta = serde_json::from_str(&contents)
        .map_err(|source| ContentError::InvalidSidecar { path: path.clone(), source })?;
    if meta.id < 1 {
        return Err(ContentError::InvalidProjectId { path, id: meta.id });
    }

    if meta.id != dir.dir_id {
        tracing::warn!(
            "{}: sidecar id {} differs from directory id {}; using sidecar id",
            dir.name,
            meta.id,
            dir.dir_id
        );
    }

    if meta.readme.is_none() {
        let readme = dir.path.join(README);
        if readme.is_file() {
            meta.readme = Some(std::fs::read_to_string(&readme).map_err(|e| io_err(&readme, e))?);
        }
    }
    Ok(meta)
}

/// Read a stage file and split off its metadata block.
///
/// With `require_metadata`, a missing block is [`ContentError::MissingMetadata`].
pub fn load_stage(file: StageFile, require_metadata: bool) -> Result<StageContent, ContentError> {
    let text = std::fs::read_to_string(&file.path).map_err(|e| io_err(&file.path, e))?;
    match extract_metadata(&text, &file.path)? {
        Some((meta, description)) => {
            if require_metadata && meta.title.as_deref().map_or(true, str::is_empty) {
                return Err(ContentError::InvalidMetadata {
                    path: file.path.clone(),
                    message: "missing \"title\"".to_string(),
                });
            }
            Ok(StageContent {
                file,
                meta: Some(meta),
                description,
            })
        }
        None if require_metadata => Err(ContentError::MissingMetadata { path: file.path }),
        None => Ok(StageContent {
            file,
            meta: None,
            description: text,
        }),
    }
}

/// Load one project directory: sidecar plus every parseable stage.
pub fn load_project(
    dir: ProjectDir,
    layout: &Layout,
    require_metadata: bool,
) -> Result<ProjectContent, ContentError> {
    let meta = load_sidecar(&dir, layout)?;
    let (files, skipped) = list_stage_files(&dir, layout)?;
    let stages = files
        .into_iter()
        .map(|file| load_stage(file, require_metadata))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ProjectContent {
        dir,
        meta,
        stages,
        skipped,
    })
}

/// Load every project under `root`.
///
/// The whole tree is read before anything is returned, so a content error
/// anywhere aborts before the caller issues a single remote write.
pub fn load_tree(
    root: &Path,
    layout: &Layout,
    require_metadata: bool,
) -> Result<Vec<ProjectContent>, ContentError> {
    list_project_dirs(root, layout)?
        .into_iter()
        .map(|dir| load_project(dir, layout, require_metadata))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout() -> Layout {
        Layout::default()
    }

    #[test]
    fn stage_name_parses_all_parts() {
        let name = parse_stage_name("1_256_set_up_backend.html", "html").unwrap();
        assert_eq!(name.order_num, 1);
        assert_eq!(name.real_id, 256);
        assert_eq!(name.title, "set up backend");
    }

    #[test]
    fn stage_name_rejects_bad_shapes() {
        assert!(parse_stage_name("intro.html", "html").is_none());
        assert!(parse_stage_name("1_x_intro.html", "html").is_none());
        assert!(parse_stage_name("1_37_.html", "html").is_none());
        assert!(parse_stage_name("1_37_intro.htm", "html").is_none());
        assert!(parse_stage_name("1_37_intro.md", "html").is_none());
        assert!(parse_stage_name("-1_37_intro.html", "html").is_none());
    }

    #[test]
    fn project_dir_name_parses() {
        assert_eq!(
            parse_project_dir_name("project_42_chat_bot", "project_"),
            Some((42, "chat bot".to_string()))
        );
        assert!(parse_project_dir_name("templates", "project_").is_none());
        assert!(parse_project_dir_name("project_x_chat", "project_").is_none());
    }

    #[test]
    fn metadata_is_extracted_and_stripped() {
        let text = "<!-- {\"title\": \"Intro\", \"next_button_title\": \"Continue\"} -->\n<h1>Hi</h1>\n";
        let (meta, body) = extract_metadata(text, Path::new("x.html")).unwrap().unwrap();
        assert_eq!(meta.title.as_deref(), Some("Intro"));
        assert_eq!(meta.next_button_title.as_deref(), Some("Continue"));
        assert_eq!(body, "<h1>Hi</h1>\n");
    }

    #[test]
    fn plain_comments_are_not_metadata() {
        let text = "<!-- just a note -->\n<p>x</p>";
        assert!(extract_metadata(text, Path::new("x.html")).unwrap().is_none());
    }

    #[test]
    fn metadata_after_plain_comment_is_found() {
        let text = "<!-- note -->\n<!--{\"title\":\"T\"}-->\n<p>x</p>";
        let (meta, body) = extract_metadata(text, Path::new("x.html")).unwrap().unwrap();
        assert_eq!(meta.title.as_deref(), Some("T"));
        assert_eq!(body, "<!-- note -->\n<p>x</p>");
    }

    #[test]
    fn metadata_with_crlf_is_stripped_with_its_newline() {
        let text = "<!--\r\n{\"title\": \"T\"}\r\n-->\r\n<p>x</p>\r\n";
        let (meta, body) = extract_metadata(text, Path::new("x.html")).unwrap().unwrap();
        assert_eq!(meta.title.as_deref(), Some("T"));
        assert_eq!(body, "<p>x</p>\n");
    }

    #[test]
    fn comment_inside_script_is_not_metadata() {
        let text = "<script>var s = '<!--{\"title\":\"no\"}-->';</script>\n<p>x</p>";
        assert!(extract_metadata(text, Path::new("x.html")).unwrap().is_none());
    }

    #[test]
    fn stage_name_rejects_non_positive_id() {
        assert!(parse_stage_name("1_0_intro.html", "html").is_none());
        assert!(parse_stage_name("1_000_intro.html", "html").is_none());
        assert_eq!(parse_stage_name("1_007_intro.html", "html").unwrap().real_id, 7);
    }

    #[test]
    fn sidecar_with_non_positive_id_aborts_load() {
        for id in [0, -3] {
            let root = TempDir::new().unwrap();
            let dir = root.path().join("project_1_demo");
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(
                dir.join("project.json"),
                format!(r#"{{"id": {id}, "title": "Demo"}}"#),
            )
            .unwrap();
            let err = load_tree(root.path(), &layout(), false).unwrap_err();
            assert!(
                matches!(err, ContentError::InvalidProjectId { id: got, .. } if got == id),
                "got: {err}"
            );
        }
    }

    #[test]
    fn broken_json_metadata_is_error() {
        let text = "<!-- {\"title\": } -->";
        let err = extract_metadata(text, Path::new("bad.html")).unwrap_err();
        assert!(matches!(err, ContentError::InvalidMetadata { .. }));
    }

    #[test]
    fn missing_sidecar_is_fatal() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("project_1_demo")).unwrap();
        let err = load_tree(root.path(), &layout(), true).unwrap_err();
        assert!(matches!(err, ContentError::MissingSidecar { .. }), "got: {err}");
    }

    #[test]
    fn load_tree_collects_stages_and_skips_bad_names() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("project_1_demo");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("project.json"), r#"{"id": 1, "title": "Demo"}"#).unwrap();
        std::fs::write(dir.join("README.md"), "# Demo\n").unwrap();
        std::fs::write(dir.join("2_11_second.html"), "<!--{\"title\":\"Second\"}-->\n<p/>").unwrap();
        std::fs::write(dir.join("1_10_first.html"), "<!--{\"title\":\"First\"}-->\n<p/>").unwrap();
        std::fs::write(dir.join("notes.html"), "<p>draft</p>").unwrap();
        std::fs::create_dir_all(root.path().join("templates")).unwrap();

        let tree = load_tree(root.path(), &layout(), true).unwrap();
        assert_eq!(tree.len(), 1);
        let project = &tree[0];
        assert_eq!(project.meta.readme.as_deref(), Some("# Demo\n"));
        let ids: Vec<i64> = project.stages.iter().map(|s| s.file.name.real_id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(project.stages[0].file.rel_path, "project_1_demo/1_10_first.html");
        assert_eq!(project.skipped.len(), 1);
    }

    #[test]
    fn missing_metadata_respects_strictness() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("project_1_demo");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("project.json"), r#"{"id": 1, "title": "Demo"}"#).unwrap();
        std::fs::write(dir.join("1_10_first_steps.html"), "<p>body</p>").unwrap();

        let err = load_tree(root.path(), &layout(), true).unwrap_err();
        assert!(matches!(err, ContentError::MissingMetadata { .. }));

        let tree = load_tree(root.path(), &layout(), false).unwrap();
        assert_eq!(tree[0].stages[0].title(), "first steps");
        assert_eq!(tree[0].stages[0].description, "<p>body</p>");
    }

    #[test]
    fn templates_are_listed_by_stem() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("templates");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("quiz.html"), "<div/>").unwrap();
        std::fs::write(dir.join("card.html"), "<div/>").unwrap();
        std::fs::write(dir.join("readme.txt"), "x").unwrap();

        let names: Vec<String> = list_templates(root.path(), &layout())
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["card", "quiz"]);
    }

    #[test]
    fn no_templates_dir_is_empty() {
        let root = TempDir::new().unwrap();
        assert!(list_templates(root.path(), &layout()).unwrap().is_empty());
    }
}
