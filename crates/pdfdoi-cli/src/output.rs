use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use pdfdoi_core::{CitationError, Identifier};

/// Placeholder printed when no identifier is found.
pub const NOT_FOUND: &str = "?";

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the tab-separated result line for one file.
pub fn print_result(
    w: &mut dyn Write,
    path: &Path,
    id: Option<&Identifier>,
    color: ColorMode,
) -> std::io::Result<()> {
    match id {
        Some(id) => writeln!(w, "{}\t{}", id, path.display()),
        None if color.enabled() => writeln!(w, "{}\t{}", NOT_FOUND.dimmed(), path.display()),
        None => writeln!(w, "{}\t{}", NOT_FOUND, path.display()),
    }
}

/// Print a fetched citation record, or a BibTeX comment explaining why
/// there is none.
pub fn print_citation(
    w: &mut dyn Write,
    record: &Result<String, CitationError>,
    color: ColorMode,
) -> std::io::Result<()> {
    match record {
        Ok(bibtex) => {
            writeln!(w, "{}", bibtex)?;
            writeln!(w)
        }
        Err(e) => {
            let line = format!("% citation unavailable: {}", e);
            if color.enabled() {
                writeln!(w, "{}", line.yellow())?;
            } else {
                writeln!(w, "{}", line)?;
            }
            writeln!(w)
        }
    }
}
