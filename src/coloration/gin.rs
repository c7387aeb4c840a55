//! Minimal reader for operative `.gin` configs written next to checkpoints.
//!
//! Only `Scope.param = value` bindings and `name = value` macros are kept.
//! Values spanning several lines inside brackets are joined. Imports,
//! includes and comments are skipped.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::AnalyzerError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GinConfig {
    bindings: BTreeMap<String, String>,
}

impl GinConfig {
    pub fn load(path: &Path) -> Result<Self, AnalyzerError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| AnalyzerError::file(path, source))?;
        Self::parse(&text).map_err(|err| match err {
            AnalyzerError::Configuration(message) => {
                AnalyzerError::configuration(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self, AnalyzerError> {
        let mut bindings = BTreeMap::new();
        let mut pending: Option<(String, String, usize)> = None;
        for (index, raw) in text.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if let Some((key, mut value, start)) = pending.take() {
                value.push(' ');
                value.push_str(line);
                if bracket_depth(&value) > 0 {
                    pending = Some((key, value, start));
                } else {
                    bindings.insert(key, value);
                }
                continue;
            }
            if line.is_empty() || line.starts_with("import ") || line.starts_with("include ") {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(AnalyzerError::configuration(format!(
                    "line {}: expected `name = value`",
                    index + 1
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(AnalyzerError::configuration(format!(
                    "line {}: binding has no name",
                    index + 1
                )));
            }
            let value = value.trim().to_string();
            if bracket_depth(&value) > 0 {
                pending = Some((key.to_string(), value, index + 1));
            } else {
                bindings.insert(key.to_string(), value);
            }
        }
        if let Some((key, _, start)) = pending {
            return Err(AnalyzerError::configuration(format!(
                "line {start}: unterminated value for `{key}`"
            )));
        }
        Ok(Self { bindings })
    }

    /// Raw value text, following `%macro` references.
    pub fn value(&self, key: &str) -> Option<&str> {
        let mut value = self.bindings.get(key)?.as_str();
        // Bounded so a macro cycle cannot loop forever.
        for _ in 0..self.bindings.len() {
            let Some(name) = value.strip_prefix('%') else {
                break;
            };
            value = self.bindings.get(name.trim())?.as_str();
        }
        Some(value)
    }

    /// Numeric value of `key`, or `None` when unbound.
    pub fn number(&self, key: &str) -> Result<Option<f64>, AnalyzerError> {
        let Some(value) = self.value(key) else {
            return Ok(None);
        };
        value
            .replace('_', "")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| {
                AnalyzerError::configuration(format!("`{key}` is not a number: {value}"))
            })
    }
}

fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (index, ch) in line.char_indices() {
        match (quote, ch) {
            (None, '#') => return &line[..index],
            (None, '\'' | '"') => quote = Some(ch),
            (Some(open), _) if open == ch => quote = None,
            _ => {}
        }
    }
    line
}

fn bracket_depth(value: &str) -> i32 {
    value.chars().fold(0, |depth, ch| match ch {
        '(' | '[' | '{' => depth + 1,
        ')' | ']' | '}' => depth - 1,
        _ => depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPERATIVE: &str = r#"
import ddsp
import ddsp.training

# Macros:
# ==============================================================================
batch_size = 16
n_samples = 64000

# Parameters for F0LoudnessPreprocessor:
# ==============================================================================
F0LoudnessPreprocessor.time_steps = 1000

# Parameters for Harmonic:
# ==============================================================================
Harmonic.n_samples = %n_samples
Harmonic.name = 'harmonic'  # trailing comment
Harmonic.sample_rate = 16000
Harmonic.scale_fn = @core.exp_sigmoid

ProcessorGroup.dag = [(@synths.Harmonic(),
    ['amps', 'harmonic_distribution', 'f0_hz']),
  (@effects.Reverb(), ['add', 'ir'])]
"#;

    #[test]
    fn reads_numbers_and_macros() {
        let config = GinConfig::parse(OPERATIVE).unwrap();
        assert_eq!(
            config.number("F0LoudnessPreprocessor.time_steps").unwrap(),
            Some(1000.0)
        );
        assert_eq!(config.number("Harmonic.n_samples").unwrap(), Some(64_000.0));
        assert_eq!(config.number("Harmonic.sample_rate").unwrap(), Some(16_000.0));
        assert_eq!(config.number("FilteredNoise.n_samples").unwrap(), None);
        assert_eq!(config.value("Harmonic.name"), Some("'harmonic'"));
    }

    #[test]
    fn joins_bracketed_values() {
        let config = GinConfig::parse(OPERATIVE).unwrap();
        let dag = config.value("ProcessorGroup.dag").unwrap();
        assert!(dag.starts_with('['));
        assert!(dag.ends_with(']'));
        assert!(dag.contains("Reverb"));
    }

    #[test]
    fn non_numeric_value_is_configuration_error() {
        let config = GinConfig::parse(OPERATIVE).unwrap();
        let err = config.number("Harmonic.scale_fn").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(GinConfig::parse("Harmonic.n_samples 64000\n").is_err());
        assert!(GinConfig::parse("x = [1,\n2,\n").is_err());
        assert!(GinConfig::parse("  = 3\n").is_err());
    }

    #[test]
    fn macro_cycles_terminate() {
        let config = GinConfig::parse("a = %b\nb = %a\n").unwrap();
        assert!(config.number("a").is_err());
    }
}
