use std::path::Path;

use serde::Deserialize;

use crate::error::DedupError;
use crate::layout::MAX_LAYER_MATCHES;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DedupConfig {
    pub name: String,
    /// Minimum number of per-layer matches (0..=8) required to merge a pair.
    pub merge_condition: u32,
    /// Candidate file, resolved relative to the config file.
    pub candidates: String,
    /// Candidate file format. Inferred from the extension when absent.
    #[serde(default)]
    pub format: Option<CandidateFormat>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateFormat {
    Csv,
    Json,
}

impl CandidateFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for CandidateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl DedupConfig {
    pub fn from_toml(input: &str) -> Result<Self, DedupError> {
        let config: DedupConfig =
            toml::from_str(input).map_err(|e| DedupError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DedupError> {
        if self.name.trim().is_empty() {
            return Err(DedupError::ConfigValidation("name must not be empty".into()));
        }

        if self.merge_condition > MAX_LAYER_MATCHES {
            return Err(DedupError::ConfigValidation(format!(
                "merge_condition must be between 0 and {MAX_LAYER_MATCHES}, got {}",
                self.merge_condition
            )));
        }

        if self.candidates.trim().is_empty() {
            return Err(DedupError::ConfigValidation(
                "candidates file must not be empty".into(),
            ));
        }

        self.candidate_format()?;

        if self.merge_condition == 0 {
            log::warn!("merge_condition = 0: every compared pair will merge");
        }

        Ok(())
    }

    /// Explicit `format`, else the candidate file's extension.
    pub fn candidate_format(&self) -> Result<CandidateFormat, DedupError> {
        if let Some(format) = self.format {
            return Ok(format);
        }
        CandidateFormat::from_path(Path::new(&self.candidates)).ok_or_else(|| {
            DedupError::ConfigValidation(format!(
                "cannot infer format of '{}' (use .csv/.json or set format)",
                self.candidates
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Barrel+disk merge"
merge_condition = 3
candidates = "epoch.csv"

[output]
json = "merged.json"
"#;

    #[test]
    fn parse_valid() {
        let config = DedupConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Barrel+disk merge");
        assert_eq!(config.merge_condition, 3);
        assert_eq!(config.candidate_format().unwrap(), CandidateFormat::Csv);
        assert_eq!(config.output.json.as_deref(), Some("merged.json"));
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let input = r#"
name = "n"
merge_condition = 2
candidates = "dump.txt"
format = "json"
"#;
        let config = DedupConfig::from_toml(input).unwrap();
        assert_eq!(config.candidate_format().unwrap(), CandidateFormat::Json);
        assert!(config.output.json.is_none());
    }

    #[test]
    fn zero_condition_is_allowed() {
        let input = r#"
name = "n"
merge_condition = 0
candidates = "a.json"
"#;
        assert_eq!(DedupConfig::from_toml(input).unwrap().merge_condition, 0);
    }

    #[test]
    fn reject_condition_above_max() {
        let input = r#"
name = "n"
merge_condition = 9
candidates = "a.csv"
"#;
        let err = DedupConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("between 0 and 8"));
    }

    #[test]
    fn reject_unknown_extension() {
        let input = r#"
name = "n"
merge_condition = 1
candidates = "a.bin"
"#;
        let err = DedupConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("cannot infer format"));
    }

    #[test]
    fn reject_invalid_format_value() {
        let input = r#"
name = "n"
merge_condition = 1
candidates = "a.csv"
format = "parquet"
"#;
        assert!(matches!(
            DedupConfig::from_toml(input),
            Err(DedupError::ConfigParse(_))
        ));
    }

    #[test]
    fn reject_negative_condition() {
        let input = r#"
name = "n"
merge_condition = -1
candidates = "a.csv"
"#;
        assert!(matches!(
            DedupConfig::from_toml(input),
            Err(DedupError::ConfigParse(_))
        ));
    }

    #[test]
    fn reject_empty_name() {
        let input = r#"
name = " "
merge_condition = 1
candidates = "a.csv"
"#;
        let err = DedupConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
