//! Preview controller: turns a completed buffer into a runnable bundle.
//!
//! DESIGN
//! ======
//! Preview is deliberately not attempted while streaming — partial source
//! cannot be reliably executed, so only a Complete buffer is ever handed to
//! the sandbox. That is policy, not a technical limitation, and it holds for
//! Failed sessions too: partial text from a failed turn is kept on screen as
//! text but never executed.
//!
//! Sandbox failure is contained here: it is recorded and logged, never
//! propagated. A bundle for a new turn replaces the previous one wholesale
//! so the sandbox cannot retain stale module state.

use std::fs;
use std::path::{Path, PathBuf};

use crate::session::SessionStatus;

pub const COMPONENT_FILE: &str = "/GeneratedComponent.tsx";
pub const ENTRY_FILE: &str = "/App.tsx";
pub const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const REACT_HOOKS_IMPORT: &str =
    r#"import { useState, useEffect, useRef, useMemo, useCallback } from "react";"#;

/// Host module that mounts the generated component full-screen.
const ENTRY_MODULE: &str = r#"import GeneratedComponent from "./GeneratedComponent";

export default function App() {
  return (
    <div className="min-h-screen bg-zinc-950 p-8">
      <GeneratedComponent />
    </div>
  );
}"#;

// =============================================================================
// BUNDLE
// =============================================================================

/// The minimal set of derived modules handed to the render sandbox, plus its
/// declared dependencies and external stylesheet resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewBundle {
    /// Named-file mapping: entry module first, component module second.
    pub files: Vec<(String, String)>,
    pub dependencies: Vec<(String, String)>,
    pub external_resources: Vec<String>,
}

/// Does the source already import the framework? A substring heuristic, not
/// a parse — cheap and matches what generated components actually contain.
#[must_use]
pub fn has_react_import(source: &str) -> bool {
    source.contains("import") && source.contains("react")
}

/// Prepend the hooks import when absent. Idempotent: never double-inserts.
#[must_use]
pub fn ensure_react_import(source: &str) -> String {
    if has_react_import(source) {
        source.to_string()
    } else {
        format!("{REACT_HOOKS_IMPORT}\n\n{source}")
    }
}

/// Derive a bundle deterministically from the accumulated source.
#[must_use]
pub fn build_bundle(source: &str) -> PreviewBundle {
    PreviewBundle {
        files: vec![
            (ENTRY_FILE.to_string(), ENTRY_MODULE.to_string()),
            (COMPONENT_FILE.to_string(), ensure_react_import(source)),
        ],
        dependencies: vec![
            ("react".to_string(), "^18.2.0".to_string()),
            ("react-dom".to_string(), "^18.2.0".to_string()),
        ],
        external_resources: vec![TAILWIND_CDN.to_string()],
    }
}

// =============================================================================
// SANDBOX BOUNDARY
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("sandbox io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sandbox rejected bundle: {0}")]
    Rejected(String),
}

/// Isolated execution/render surface. Implementations expose no data channel
/// back to the host beyond this load result.
pub trait RenderSandbox {
    /// Replace whatever the sandbox was running with this bundle.
    ///
    /// # Errors
    ///
    /// Fails when the bundle cannot be staged; the controller contains the
    /// failure.
    fn load(&mut self, bundle: &PreviewBundle) -> Result<(), SandboxError>;
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Preview lifecycle derived from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// No source yet.
    Empty,
    /// Session live (or failed with partial text): placeholder only.
    Pending,
    /// Bundle built and handed to the sandbox.
    Ready(PreviewBundle),
}

#[derive(Debug, Default)]
pub struct PreviewController {
    state: PreviewState,
    last_error: Option<SandboxError>,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self::Empty
    }
}

impl PreviewController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// The last contained sandbox failure, surfaced for presentation only.
    #[must_use]
    pub fn last_error(&self) -> Option<&SandboxError> {
        self.last_error.as_ref()
    }

    /// Entered immediately when the upstream session resets.
    pub fn reset(&mut self) {
        self.state = PreviewState::Empty;
        self.last_error = None;
    }

    /// Observe a buffer update and drive the sandbox when Ready is entered.
    pub fn observe(&mut self, text: &str, status: SessionStatus, sandbox: &mut dyn RenderSandbox) {
        if text.is_empty() {
            self.state = PreviewState::Empty;
            return;
        }
        match status {
            SessionStatus::Idle => self.state = PreviewState::Empty,
            SessionStatus::Streaming | SessionStatus::Failed => self.state = PreviewState::Pending,
            SessionStatus::Complete => {
                let bundle = build_bundle(text);
                if let Err(error) = sandbox.load(&bundle) {
                    tracing::warn!(error = %error, "sandbox failed to load bundle; failure contained");
                    self.last_error = Some(error);
                }
                self.state = PreviewState::Ready(bundle);
            }
        }
    }
}

// =============================================================================
// HTML SANDBOX
// =============================================================================

/// Stages the bundle as one self-contained HTML page on disk. The isolation
/// boundary is the browser page the file is opened in; nothing executes in
/// this process.
#[derive(Debug)]
pub struct HtmlSandbox {
    out_dir: PathBuf,
    page: Option<PathBuf>,
}

impl HtmlSandbox {
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into(), page: None }
    }

    /// Path of the last staged page, once a bundle has loaded.
    #[must_use]
    pub fn page_path(&self) -> Option<&Path> {
        self.page.as_deref()
    }
}

impl RenderSandbox for HtmlSandbox {
    fn load(&mut self, bundle: &PreviewBundle) -> Result<(), SandboxError> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("index.html");
        fs::write(&path, render_page(bundle))?;
        self.page = Some(path);
        Ok(())
    }
}

/// Render the bundle as a standalone page: CDN runtime + Babel, with the
/// modules inlined (imports stripped, default exports un-exported) since the
/// page has no module server to resolve them against.
#[must_use]
pub fn render_page(bundle: &PreviewBundle) -> String {
    let mut head = String::new();
    for resource in &bundle.external_resources {
        head.push_str(&format!("  <script src=\"{resource}\"></script>\n"));
    }
    for (name, version) in &bundle.dependencies {
        let pinned = version.trim_start_matches(['^', '~']);
        head.push_str(&format!(
            "  <script crossorigin src=\"https://unpkg.com/{name}@{pinned}/umd/{name}.development.js\"></script>\n"
        ));
    }
    head.push_str("  <script src=\"https://unpkg.com/@babel/standalone/babel.min.js\"></script>\n");

    let mut modules = String::from(
        "const { useState, useEffect, useRef, useMemo, useCallback } = React;\n",
    );
    // Component before entry so `App` can see `GeneratedComponent`.
    for (file, source) in bundle.files.iter().rev() {
        modules.push_str(&format!("\n// {file}\n"));
        modules.push_str(&inline_module(source));
        modules.push('\n');
    }
    modules.push_str("\nReactDOM.createRoot(document.getElementById(\"root\")).render(React.createElement(App));\n");

    format!(
        "<!doctype html>\n<html>\n<head>\n  <meta charset=\"utf-8\" />\n  <title>uiforge preview</title>\n{head}</head>\n<body class=\"bg-zinc-950\">\n  <div id=\"root\"></div>\n  <script type=\"text/babel\" data-presets=\"react,typescript\" data-filename=\"preview.tsx\">\n{modules}  </script>\n</body>\n</html>\n"
    )
}

fn inline_module(source: &str) -> String {
    source
        .lines()
        .filter(|line| !line.trim_start().starts_with("import "))
        .map(|line| line.replace("export default function", "function"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "preview_test.rs"]
mod tests;
