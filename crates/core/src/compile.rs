//! Preview "compilation": inline a project's HTML, CSS and JavaScript into
//! one self-contained HTML document.
//!
//! No parsing, transpilation or dependency resolution happens here. Script
//! content is passed through verbatim and guarded by a runtime `try/catch`,
//! so malformed code only fails when the browser executes it.

use serde::Serialize;

use crate::error::CoreError;
use crate::file::ProjectFile;
use crate::file_types::FileType;
use crate::project::Project;
use crate::types::Timestamp;

/// Page style emitted ahead of the project's own CSS.
pub const BASELINE_STYLE: &str = "body { margin: 0; padding: 20px; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }";

const ERROR_BANNER_STYLE: &str =
    "color: red; padding: 20px; border: 1px solid red; margin: 20px; font-family: monospace;";

/// The artifact of a successful compile.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDocument {
    pub output: String,
    pub preview_url: String,
}

/// Result returned by the compile endpoint and recorded on the project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    pub compiled_at: Timestamp,
    pub compiled_by: String,
}

impl CompilationResult {
    /// Fold a compile outcome into a result. Compile failures become
    /// `success: false`; they are never propagated as errors.
    pub fn from_outcome(
        outcome: Result<CompiledDocument, CoreError>,
        compiled_by: &str,
        now: Timestamp,
    ) -> Self {
        match outcome {
            Ok(doc) => Self {
                success: true,
                output: Some(doc.output),
                error: None,
                preview_url: Some(doc.preview_url),
                compiled_at: now,
                compiled_by: compiled_by.to_string(),
            },
            Err(err) => Self {
                success: false,
                output: None,
                error: Some(match err {
                    CoreError::Compilation(msg) => msg,
                    other => other.to_string(),
                }),
                preview_url: None,
                compiled_at: now,
                compiled_by: compiled_by.to_string(),
            },
        }
    }
}

/// Preview location for a project.
pub fn preview_url(project_id: &str) -> String {
    format!("/api/projects/{project_id}/preview")
}

/// Compile a project's files in registry order.
///
/// The HTML entry point is the file named by `settings.entryFile` when it
/// exists, otherwise the first HTML file. CSS files and JavaScript/JSX files
/// are concatenated in the order given. Other file types are ignored.
pub fn compile_project(
    project: &Project,
    files: &[ProjectFile],
) -> Result<CompiledDocument, CoreError> {
    let html_files: Vec<&ProjectFile> = files
        .iter()
        .filter(|f| f.file_type == FileType::Html)
        .collect();

    let entry = html_files
        .iter()
        .find(|f| {
            f.file_name == project.settings.entry_file || f.file_path == project.settings.entry_file
        })
        .or_else(|| html_files.first())
        .ok_or_else(|| {
            CoreError::Compilation(
                "No HTML file found. Add an HTML file to the project before compiling.".into(),
            )
        })?;

    let css: Vec<&str> = files
        .iter()
        .filter(|f| f.file_type == FileType::Css)
        .map(|f| f.content.as_str())
        .collect();
    let js: Vec<&str> = files
        .iter()
        .filter(|f| f.file_type.is_script())
        .map(|f| f.content.as_str())
        .collect();

    Ok(CompiledDocument {
        output: render_document(&project.name, &entry.content, &css, &js),
        preview_url: preview_url(&project.project_id),
    })
}

/// Render the preview document. Pure and deterministic.
pub fn render_document(project_name: &str, html: &str, css: &[&str], js: &[&str]) -> String {
    let body = body_markup(html);
    let css = css.join("\n");
    let js = js.join("\n");

    let mut doc = String::with_capacity(body.len() + css.len() + js.len() + 1024);
    doc.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    doc.push_str("  <meta charset=\"UTF-8\">\n");
    doc.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    doc.push_str("  <title>");
    doc.push_str(&escape_html(project_name));
    doc.push_str("</title>\n  <style>\n");
    doc.push_str(BASELINE_STYLE);
    doc.push('\n');
    doc.push_str(&css);
    doc.push_str("\n  </style>\n</head>\n<body>\n");
    doc.push_str(body);
    doc.push_str("\n  <script>\n    try {\n");
    doc.push_str(&js);
    doc.push_str("\n    } catch (error) {\n");
    doc.push_str("      const banner = document.createElement('div');\n");
    doc.push_str("      banner.style.cssText = '");
    doc.push_str(ERROR_BANNER_STYLE);
    doc.push_str("';\n");
    doc.push_str("      banner.textContent = 'JavaScript Error: ' + error.message;\n");
    doc.push_str("      document.body.appendChild(banner);\n");
    doc.push_str("    }\n  </script>\n</body>\n</html>\n");
    doc
}

/// Inner markup of the `<body>` element, or the whole input when there is none.
fn body_markup(html: &str) -> &str {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let Some(open) = lower.find("<body") else {
        return html.trim();
    };
    let Some(open_end) = lower[open..].find('>').map(|i| open + i + 1) else {
        return html.trim();
    };
    let close = lower.rfind("</body>").filter(|&c| c >= open_end).unwrap_or(html.len());
    html[open_end..close].trim()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
