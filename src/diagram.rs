//! External Mermaid diagram rendering.
//!
//! Fenced blocks tagged `mermaid` can be compiled into images by the
//! `mmdc` CLI when it is installed. Tool availability is detected once
//! per export run; every call site branches on that flag, and any
//! process failure degrades to "unavailable" rather than an error.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

use crate::error::Result;

/// Renders Mermaid source to an image file in a per-export workdir.
pub struct MermaidRenderer {
    workdir: PathBuf,
    mmdc: Option<PathBuf>,
    prefer_svg: bool,
}

impl MermaidRenderer {
    /// Create a renderer, detecting `mmdc` on `PATH`.
    ///
    /// `prefer_svg` selects the vector-first pipeline; pass `false` to
    /// force PNG output from the diagram compiler itself.
    pub fn new(workdir: impl Into<PathBuf>, prefer_svg: bool) -> Result<Self> {
        let workdir = workdir.into();
        fs::create_dir_all(&workdir)?;
        let mmdc = find_tool("mmdc");
        if mmdc.is_none() {
            debug!("mmdc not found on PATH; mermaid blocks will fall back to text");
        }
        Ok(Self {
            workdir,
            mmdc,
            prefer_svg,
        })
    }

    /// Create a renderer with no diagram tool, regardless of PATH.
    ///
    /// Every `render` call returns `None`, exercising the text fallback.
    pub fn disabled(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            mmdc: None,
            prefer_svg: true,
        }
    }

    /// Whether the diagram compiler was found.
    pub fn available(&self) -> bool {
        self.mmdc.is_some()
    }

    /// Render Mermaid source to an image file.
    ///
    /// Returns the artifact path, or `None` when the tool is missing or
    /// the compilation failed. The artifact may be SVG when the
    /// vector-first pipeline found no SVG-to-PNG converter; callers that
    /// need a raster image must reject such paths.
    pub fn render(&self, code: &str, name_hint: &str) -> Option<PathBuf> {
        let mmdc = self.mmdc.as_ref()?;
        let base = sanitize_filename(name_hint);
        let ext = if self.prefer_svg { "svg" } else { "png" };
        let in_path = self.workdir.join(format!("{base}.mmd"));
        let out_path = self.workdir.join(format!("{base}.{ext}"));

        if let Err(err) = fs::write(&in_path, code) {
            warn!("failed to write mermaid input {}: {err}", in_path.display());
            return None;
        }

        if !run_quiet(
            Command::new(mmdc)
                .arg("-i")
                .arg(&in_path)
                .arg("-o")
                .arg(&out_path),
        ) {
            debug!("mmdc failed for {name_hint}");
            return None;
        }

        if out_path.extension().is_some_and(|e| e == "svg") {
            if let Some(png) = self.convert_svg(&out_path) {
                return Some(png);
            }
            // No converter available; hand the SVG back as-is.
        }
        Some(out_path)
    }

    /// Convert an SVG artifact to PNG with whichever converter exists.
    fn convert_svg(&self, svg: &Path) -> Option<PathBuf> {
        let png = svg.with_extension("png");
        if let Some(rsvg) = find_tool("rsvg-convert") {
            if run_quiet(Command::new(rsvg).arg("-o").arg(&png).arg(svg)) {
                return Some(png);
            }
        }
        if let Some(cairosvg) = find_tool("cairosvg") {
            if run_quiet(Command::new(cairosvg).arg(svg).arg("-o").arg(&png)) {
                return Some(png);
            }
        }
        debug!("no SVG-to-PNG converter found");
        None
    }
}

/// Run a command, swallowing output; true on zero exit.
fn run_quiet(cmd: &mut Command) -> bool {
    match cmd.output() {
        Ok(out) => out.status.success(),
        Err(err) => {
            debug!("failed to spawn {cmd:?}: {err}");
            false
        }
    }
}

/// Locate an executable on `PATH`.
fn find_tool(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    for dir in env::split_paths(&path) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        for ext in ["exe", "cmd", "bat"] {
            let candidate = dir.join(format!("{name}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Strip a name hint to alphanumerics and `. _ -` plus space.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("mermaid_3"), "mermaid_3");
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("fig 1.2-x"), "fig 1.2-x");
    }

    #[test]
    fn test_disabled_renderer() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = MermaidRenderer::disabled(tmp.path());
        assert!(!renderer.available());
        assert!(renderer.render("graph TD; a-->b", "d").is_none());
    }

    #[test]
    fn test_missing_tool_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        // Detection must not fail even if mmdc is absent.
        let renderer = MermaidRenderer::new(tmp.path().join("mermaid"), true).unwrap();
        let _ = renderer.available();
    }
}
