//! Per-file compilation: pick the generator from the file name, load the
//! serialized tree, render it and write the result.

use std::path::{Path, PathBuf};

use plclweb_codegen::{render, Diagnostic, DocumentKind, RenderOptions};
use plclweb_tree::{Document, TreeError};

const HTML_EXTENSIONS: &[&str] = &["plclhtml", "pclhtml"];
const CSS_EXTENSIONS: &[&str] = &["plclcss", "pclcss"];
const TREE_EXTENSION: &str = ".json";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("File {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("File {} is a directory", .0.display())]
    IsDirectory(PathBuf),

    #[error("Unknown extension for {}", .0.display())]
    UnknownExtension(PathBuf),

    #[error("Error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid document {}: {source}", path.display())]
    Tree { path: PathBuf, source: TreeError },
}

/// A source file accepted for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: DocumentKind,
    /// File name without the kind and `.json` extensions.
    pub stem: String,
}

/// The outcome of compiling one file.
#[derive(Debug)]
pub struct CompileReport {
    pub written: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Detect the generator for a file name such as `index.plclhtml.json`.
/// Extensions are matched case-insensitively.
pub fn detect_kind(path: &Path) -> Option<(DocumentKind, String)> {
    let file_name = path.file_name()?.to_str()?;
    let lower = file_name.to_ascii_lowercase();
    let without_tree = lower.strip_suffix(TREE_EXTENSION)?;
    let (stem, extension) = without_tree.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }

    let kind = if HTML_EXTENSIONS.contains(&extension) {
        DocumentKind::Html
    } else if CSS_EXTENSIONS.contains(&extension) {
        DocumentKind::Css
    } else {
        return None;
    };
    Some((kind, file_name[..stem.len()].to_string()))
}

/// Where the rendered output of `source` goes inside `output_dir`.
pub fn output_path(output_dir: &Path, source: &SourceFile) -> PathBuf {
    let extension = match source.kind {
        DocumentKind::Html => "html",
        DocumentKind::Css => "css",
    };
    output_dir.join(format!("{}.{extension}", source.stem))
}

/// Check that `path` is an existing file with a known extension.
pub fn validate(path: &Path) -> Result<SourceFile, CliError> {
    if !path.exists() {
        return Err(CliError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(CliError::IsDirectory(path.to_path_buf()));
    }
    let (kind, stem) =
        detect_kind(path).ok_or_else(|| CliError::UnknownExtension(path.to_path_buf()))?;
    Ok(SourceFile {
        path: path.to_path_buf(),
        kind,
        stem,
    })
}

/// Read and deserialize a tree. Unnamed documents are named after their file.
pub fn load(source: &SourceFile) -> Result<Document, CliError> {
    let text = std::fs::read_to_string(&source.path).map_err(|e| CliError::Read {
        path: source.path.clone(),
        source: e,
    })?;
    let mut doc = Document::from_json(&text).map_err(|e| CliError::Tree {
        path: source.path.clone(),
        source: e,
    })?;
    if doc.name.is_empty() {
        doc.name = source.path.display().to_string();
    }
    Ok(doc)
}

/// Render `source`, writing the result into `output_dir` when given.
pub fn compile_file(
    source: &SourceFile,
    output_dir: Option<&Path>,
    options: &RenderOptions,
) -> Result<CompileReport, CliError> {
    let doc = load(source)?;
    log::info!("compiling {}", source.path.display());
    let rendered = render(source.kind, &doc, options);

    let written = match output_dir {
        Some(dir) => {
            let path = output_path(dir, source);
            std::fs::write(&path, &rendered.output).map_err(|e| CliError::Write {
                path: path.clone(),
                source: e,
            })?;
            Some(path)
        }
        None => None,
    };

    Ok(CompileReport {
        written,
        diagnostics: rendered.diagnostics,
    })
}
