use colored::Colorize;
use hegel_binder::{Graph, ModuleId};
use hegel_common::{Diagnostic, SourceLocation};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

pub struct Reporter {
    color: bool,
    /// Paths under this directory are printed relative to it.
    root: PathBuf,
    /// Source text by diagnostic source; `None` when unreadable.
    sources: FxHashMap<String, Option<String>>,
}

impl Reporter {
    pub fn new(color: bool, root: impl Into<PathBuf>) -> Self {
        Reporter {
            color,
            root: root.into(),
            sources: FxHashMap::default(),
        }
    }

    /// Use `text` for code frames of `source` instead of reading the file.
    pub fn add_source(&mut self, source: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(source.into(), Some(text.into()));
    }

    pub fn render(&mut self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push_str("\n\n");
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    /// `path:line:column - error: message`, followed by a code frame when
    /// the source can be read. Columns are printed 1-based.
    pub fn format_diagnostic(&mut self, diagnostic: &Diagnostic) -> String {
        let mut output = if diagnostic.source.is_empty() {
            "<unknown>".to_string()
        } else {
            format!(
                "{}:{}:{}",
                self.display_path(&diagnostic.source),
                diagnostic.loc.start.line,
                diagnostic.loc.start.column + 1
            )
        };
        output.push_str(" - ");
        output.push_str(&self.format_category());
        output.push_str(": ");
        output.push_str(&diagnostic.message);

        if let Some(frame) = self.format_frame(&diagnostic.source, diagnostic.loc) {
            output.push_str(&frame);
        }
        output
    }

    /// The offending line with its number and the range underlined:
    ///
    /// ```text
    ///     2   const a: number = "s";
    ///                           ~~~
    /// ```
    fn format_frame(&mut self, source: &str, loc: SourceLocation) -> Option<String> {
        let color = self.color;
        let text = self.source_text(source)?;
        let line_text = text.lines().nth(loc.start.line.checked_sub(1)? as usize)?;

        let start = loc.start.column as usize;
        let end = if loc.end.line == loc.start.line {
            loc.end.column as usize
        } else {
            line_text.chars().count()
        };
        let mut underline = String::new();
        for (index, ch) in line_text.chars().enumerate() {
            if index >= end.max(start + 1) {
                break;
            }
            let mark = if index < start { ' ' } else { '~' };
            if ch == '\t' {
                underline.extend([mark; 4]);
            } else {
                underline.push(mark);
            }
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let underline = if color {
            underline.red().to_string()
        } else {
            underline
        };
        let number = format!("{:>5}", loc.start.line);
        let number = if color {
            number.dimmed().to_string()
        } else {
            number
        };
        Some(format!(
            "\n{number}   {}\n{}   {underline}",
            line_text.replace('\t', "    "),
            " ".repeat(5)
        ))
    }

    fn source_text(&mut self, source: &str) -> Option<&str> {
        if source.is_empty() {
            return None;
        }
        self.sources
            .entry(source.to_string())
            .or_insert_with(|| std::fs::read_to_string(source).ok())
            .as_deref()
    }

    fn display_path(&self, source: &str) -> String {
        let path = Path::new(source);
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn format_category(&self) -> String {
        let label = "error";
        if self.color {
            label.red().bold().to_string()
        } else {
            label.to_string()
        }
    }

    /// Top-level bindings of `module` with their types, one per line.
    pub fn format_types(&self, graph: &Graph, module: ModuleId) -> String {
        let info = graph.module(module);
        let header = self.display_path(&info.path);
        let mut out = if self.color {
            header.bold().to_string()
        } else {
            header
        };
        for (name, &variable) in &graph.scope(info.scope).body {
            out.push_str(&format!("\n  {name}: {}", graph.type_name(variable)));
        }
        out
    }

    pub fn format_summary(&self, errors: usize) -> String {
        let summary = match errors {
            0 => return self.paint_ok("No errors found."),
            1 => "Found 1 error.".to_string(),
            n => format!("Found {n} errors."),
        };
        if self.color {
            summary.red().bold().to_string()
        } else {
            summary
        }
    }

    fn paint_ok(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }
}
