/* src/cli/transform/src/error.rs */

use std::fmt;

/// 1-based line and column of a source offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
  pub line: u32,
  pub column: u32,
}

impl Position {
  pub fn at(source: &str, offset: u32) -> Self {
    let offset = (offset as usize).min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    Self { line: u32::try_from(line).unwrap_or(u32::MAX), column: u32::try_from(column).unwrap_or(u32::MAX) }
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.line, self.column)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
  /// `export * from '...'` cannot be analyzed for server-only names.
  ExportAll { file: String, position: Position, source: String },
  Parse { file: String, diagnostics: Vec<String> },
}

impl TransformError {
  pub fn file(&self) -> &str {
    match self {
      Self::ExportAll { file, .. } | Self::Parse { file, .. } => file,
    }
  }
}

impl fmt::Display for TransformError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::ExportAll { file, position, source } => write!(
        f,
        "{file}:{position}: Using `export * from '{source}'` in a page is disallowed. \
         Please use `export {{ default }} from '{source}'` instead."
      ),
      Self::Parse { file, diagnostics } => {
        write!(f, "{file}: failed to parse")?;
        for diagnostic in diagnostics {
          write!(f, "\n  {diagnostic}")?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for TransformError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positions_are_one_based() {
    let src = "a\nbc\n  é x";
    assert_eq!(Position::at(src, 0), Position { line: 1, column: 1 });
    assert_eq!(Position::at(src, 3), Position { line: 2, column: 2 });
    let x = u32::try_from(src.find('x').unwrap()).unwrap();
    assert_eq!(Position::at(src, x), Position { line: 3, column: 5 });
  }
}
