//! Input resolution and source loading

use crate::error::{ExtractError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

/// A loaded C# source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path exactly as it was given
    pub path: PathBuf,
    pub text: String,
}

/// Pick the input path from the argument, falling back to one line read from `stdin`
pub fn resolve_input_path(arg: Option<&Path>, mut stdin: impl Read) -> Result<PathBuf> {
    let raw = match arg {
        Some(path) => path.to_string_lossy().trim().to_string(),
        None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            buf.trim().to_string()
        }
    };

    if raw.is_empty() {
        return Err(ExtractError::EmptyPath);
    }
    Ok(PathBuf::from(raw))
}

/// Read the file at `path`, decoding lossily and dropping a UTF-8 byte order mark
pub fn load(path: &Path) -> Result<SourceFile> {
    if !path.is_file() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ExtractError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();

    log::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());

    Ok(SourceFile {
        path: path.to_path_buf(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_wins_over_stdin() {
        let path = resolve_input_path(Some(Path::new("Order.cs")), "ignored".as_bytes()).unwrap();
        assert_eq!(path, PathBuf::from("Order.cs"));
    }

    #[test]
    fn stdin_path_is_trimmed() {
        let path = resolve_input_path(None, "  src/Order.cs \n".as_bytes()).unwrap();
        assert_eq!(path, PathBuf::from("src/Order.cs"));
    }

    #[test]
    fn blank_input_is_rejected() {
        let err = resolve_input_path(None, " \n".as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyPath));
        let err = resolve_input_path(Some(Path::new("  ")), "".as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyPath));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("Nope.cs")).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn strips_byte_order_mark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bom.cs");
        std::fs::write(&path, "\u{feff}class A {}").unwrap();
        let source = load(&path).unwrap();
        assert_eq!(source.text, "class A {}");
        assert_eq!(source.path, path);
    }
}
