//! Text buffer and file output shared by every dialect.

use std::fmt::Write as FmtWrite;
use std::path::Path;

use anyhow::{Context, Result};

/// Indentation unit of generated code.
pub const INDENT: &str = "    ";

/// A generated source file under construction.
#[derive(Debug, Default)]
pub struct SourceFile {
    /// Raw contents. Dialects may write to it directly.
    pub buf: String,
    depth: usize,
}

impl SourceFile {
    /// Creates an empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one line at the current indentation.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        let _ = writeln!(self.buf, "{text}");
    }

    /// Writes an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Writes a `//` comment line.
    pub fn comment(&mut self, text: &str) {
        if text.is_empty() {
            self.line("//");
        } else {
            self.line(&format!("// {text}"));
        }
    }

    /// Writes a `///` doc comment line.
    pub fn doc_comment(&mut self, text: &str) {
        if text.is_empty() {
            self.line("///");
        } else {
            self.line(&format!("/// {text}"));
        }
    }

    /// Increases indentation.
    pub fn indent(&mut self) {
        self.depth += 1;
    }

    /// Decreases indentation.
    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Returns the contents, ending in exactly one newline.
    pub fn finish(mut self) -> String {
        while self.buf.ends_with("\n\n") {
            self.buf.pop();
        }
        if !self.buf.is_empty() && !self.buf.ends_with('\n') {
            self.buf.push('\n');
        }
        self.buf
    }
}

/// Writes `content` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or the file cannot be
/// written.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Turns a network name into the generated function's identifier:
/// `sort_` followed by the name with every non-identifier character
/// replaced by `_`.
pub fn function_ident(network: &str) -> String {
    let body: String = network
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("sort_{body}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_indentation() {
        let mut f = SourceFile::new();
        f.line("{");
        f.indent();
        f.comment("body");
        f.dedent();
        f.line("}");
        f.blank();
        f.blank();
        assert_eq!(f.finish(), "{\n    // body\n}\n");
    }

    #[test]
    fn function_ident_sanitizes() {
        assert_eq!(function_ident("bitonic1"), "sort_bitonic1");
        assert_eq!(function_ident("Odd-Even merge"), "sort_odd_even_merge");
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = std::env::temp_dir().join(format!("sortgen-emit-{}", std::process::id()));
        let path = dir.join("nested").join("out.rs");
        write_file(&path, "fn main() {}\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fn main() {}\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
