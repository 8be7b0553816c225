//! TOML configuration for parsing, reconciliation and the vocabulary.
//!
//! Every section is optional; a missing section uses its defaults and a
//! missing `[vocabulary]` uses the built-in one.
//!
//! ```toml
//! [layout]
//! column_tolerance = 30.0
//! line_tolerance = 12.0
//!
//! [extract]
//! remap_ambiguous_hours = false
//!
//! [reconcile]
//! time_tolerance_minutes = 5
//! require_same_location = false
//! trainer_fuzzy = true
//!
//! [align]
//! time_window_minutes = 0
//!
//! [[vocabulary.classes]]
//! canonical = "Studio Barre 57"
//! aliases = ["barre 57", "b57"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::align::AlignOptions;
use crate::error::ScheduleError;
use crate::extract::ExtractConfig;
use crate::layout::LayoutConfig;
use crate::normalize::{Normalizer, Vocabulary};
use crate::pipeline::ParseOptions;
use crate::reconcile::ReconcileOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub layout: LayoutConfig,
    pub extract: ExtractConfig,
    pub reconcile: ReconcileOptions,
    pub align: AlignOptions,
    pub vocabulary: Option<Vocabulary>,
}

impl ScheduleConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(input: &str) -> Result<Self, ScheduleError> {
        let config: Self =
            toml::from_str(input).map_err(|e| ScheduleError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.layout.column_tolerance <= 0.0 || self.layout.line_tolerance <= 0.0 {
            return Err(ScheduleError::ConfigValidation(
                "layout tolerances must be positive".to_string(),
            ));
        }
        if let Some(vocabulary) = &self.vocabulary {
            vocabulary.validate()?;
        }
        Ok(())
    }

    /// The configured vocabulary, or the built-in one.
    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary.clone().unwrap_or_else(Vocabulary::builtin)
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(&self.vocabulary())
    }

    pub fn parse_options(&self, location: Option<String>) -> ParseOptions {
        ParseOptions {
            layout: self.layout.clone(),
            extract: self.extract.clone(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ScheduleConfig::from_toml("").unwrap();
        assert_eq!(config.layout.column_tolerance, 30.0);
        assert_eq!(config.reconcile.time_tolerance_minutes, 5);
        assert!(config.reconcile.trainer_fuzzy);
        assert_eq!(config.align.time_window_minutes, 0);
        assert!(config.vocabulary.is_none());
        assert!(!config.vocabulary().classes.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config = ScheduleConfig::from_toml(
            r#"
            [reconcile]
            time_tolerance_minutes = 10

            [extract]
            remap_ambiguous_hours = true
            "#,
        )
        .unwrap();
        assert_eq!(config.reconcile.time_tolerance_minutes, 10);
        assert!(config.reconcile.trainer_fuzzy);
        assert!(config.extract.remap_ambiguous_hours);
    }

    #[test]
    fn test_custom_vocabulary_replaces_builtin() {
        let config = ScheduleConfig::from_toml(
            r#"
            [[vocabulary.trainers]]
            canonical = "Anisha Shah"
            aliases = ["anisha"]
            "#,
        )
        .unwrap();
        let normalizer = config.normalizer();
        assert_eq!(normalizer.normalize_trainer("ANISHA"), "Anisha Shah");
        assert_eq!(normalizer.normalize_class("FT"), "FT");
    }

    #[test]
    fn test_parse_error() {
        let err = ScheduleConfig::from_toml("[reconcile\n").unwrap_err();
        assert!(matches!(err, ScheduleError::ConfigParse(_)));
    }

    #[test]
    fn test_validation_error() {
        let err = ScheduleConfig::from_toml(
            r#"
            [layout]
            line_tolerance = 0.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::ConfigValidation(_)));

        let err = ScheduleConfig::from_toml(
            r#"
            [vocabulary]
            fuzzy_threshold = 2.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::ConfigValidation(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classmatch.toml");
        std::fs::write(&path, "[align]\ntime_window_minutes = 15\n").unwrap();
        let config = ScheduleConfig::from_path(&path).unwrap();
        assert_eq!(config.align.time_window_minutes, 15);

        let missing = ScheduleConfig::from_path(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ScheduleError::Io(_)));
    }
}
