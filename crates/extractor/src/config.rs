use crate::error::{ExtractError, Result};
use crate::normalize::NormalizeOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which declarations and members end up in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionProfile {
    /// Every class-like declaration and every method
    #[default]
    Full,
    /// Skips abstract non-static types and non-public methods
    PublicSurface,
}

impl ExtractionProfile {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::PublicSurface => "public-surface",
        }
    }

    /// Whether a type with the given modifiers produces a descriptor
    pub const fn includes_type(self, is_abstract: bool, is_static: bool) -> bool {
        match self {
            Self::Full => true,
            Self::PublicSurface => !is_abstract || is_static,
        }
    }

    /// Whether a method with the given visibility produces a descriptor
    pub const fn includes_method(self, is_public: bool) -> bool {
        match self {
            Self::Full => true,
            Self::PublicSurface => is_public,
        }
    }
}

impl fmt::Display for ExtractionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "public-surface" | "public_surface" | "public" => Ok(Self::PublicSurface),
            other => Err(format!(
                "unknown profile '{other}' (expected 'full' or 'public-surface')"
            )),
        }
    }
}

/// Extractor configuration, usually read from a TOML file and then overridden by CLI flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub profile: ExtractionProfile,
    /// Indentation unit of normalized source text
    pub indent: String,
    /// Line terminator of normalized source text
    pub newline: String,
    /// Pretty-print the JSON output
    pub pretty: bool,
    /// Let reference collection descend into generic arguments, array elements and nullable types
    pub follow_type_arguments: bool,
    /// Namespace reported for types declared outside any namespace
    pub namespace_sentinel: String,
    /// Exception type reported when a guard throws something other than `new T(...)`
    pub fallback_exception_type: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            profile: ExtractionProfile::Full,
            indent: "    ".to_string(),
            newline: "\n".to_string(),
            pretty: false,
            follow_type_arguments: true,
            namespace_sentinel: "Global".to_string(),
            fallback_exception_type: "Exception".to_string(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ExtractError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ExtractError::ConfigError(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        log::debug!("Loaded extractor config from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indent.chars().any(|c| !c.is_whitespace()) {
            return Err(ExtractError::ConfigError(
                "indent must contain only whitespace".to_string(),
            ));
        }
        if self.newline.is_empty() || self.newline.chars().any(|c| !c.is_whitespace()) {
            return Err(ExtractError::ConfigError(
                "newline must be a non-empty whitespace sequence".to_string(),
            ));
        }
        if self.namespace_sentinel.trim().is_empty() {
            return Err(ExtractError::ConfigError(
                "namespace_sentinel must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            indent: self.indent.clone(),
            newline: self.newline.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ExtractorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config = ExtractorConfig::from_toml_str(
            r#"
profile = "public-surface"
indent = "  "
follow_type_arguments = false
"#,
        )
        .unwrap();
        assert_eq!(config.profile, ExtractionProfile::PublicSurface);
        assert_eq!(config.indent, "  ");
        assert!(!config.follow_type_arguments);
        assert_eq!(config.newline, "\n");
        assert_eq!(config.namespace_sentinel, "Global");
    }

    #[test]
    fn rejects_bad_indent_and_newline() {
        let err = ExtractorConfig::from_toml_str(r#"indent = "xx""#).unwrap_err();
        assert!(err.is_input_error());
        assert!(ExtractorConfig::from_toml_str(r#"newline = """#).is_err());
    }

    #[test]
    fn rejects_unknown_profile() {
        assert!(ExtractorConfig::from_toml_str(r#"profile = "everything""#).is_err());
        assert!("everything".parse::<ExtractionProfile>().is_err());
        assert_eq!(
            "Public-Surface".parse::<ExtractionProfile>(),
            Ok(ExtractionProfile::PublicSurface)
        );
    }

    #[test]
    fn profile_filters() {
        assert!(ExtractionProfile::Full.includes_type(true, false));
        assert!(!ExtractionProfile::PublicSurface.includes_type(true, false));
        assert!(ExtractionProfile::PublicSurface.includes_type(true, true));
        assert!(!ExtractionProfile::PublicSurface.includes_method(false));
        assert!(ExtractionProfile::Full.includes_method(false));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractor.toml");
        std::fs::write(&path, "pretty = true\n").unwrap();
        assert!(ExtractorConfig::load(&path).unwrap().pretty);
        assert!(ExtractorConfig::load(&dir.path().join("absent.toml")).is_err());
    }
}
