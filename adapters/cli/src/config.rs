//! Tuning files supplied with `--config`.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use dungeon_crawler_core::Tuning;

/// Reads a TOML tuning file, or the defaults when no path is given.
pub(crate) fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file {}", path.display()))?;
    parse_tuning(&text).with_context(|| format!("invalid tuning file {}", path.display()))
}

/// Parses a TOML document; keys it omits keep their defaults.
pub(crate) fn parse_tuning(text: &str) -> Result<Tuning> {
    toml::from_str(text).context("failed to parse tuning")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_uses_defaults() {
        let tuning = load_tuning(None).expect("defaults");

        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn partial_documents_override_only_given_keys() {
        let tuning = parse_tuning(
            r#"
            [player]
            speed = 7.5

            [abilities.lightning]
            damage = 90.0
            "#,
        )
        .expect("valid toml");

        assert!((tuning.player.speed - 7.5).abs() < f32::EPSILON);
        assert!((tuning.abilities.lightning.damage - 90.0).abs() < f32::EPSILON);
        assert_eq!(tuning.abilities.melee, Tuning::default().abilities.melee);
    }

    #[test]
    fn malformed_documents_are_reported() {
        let error = parse_tuning("[player\nspeed = ").expect_err("broken toml");

        assert!(error.to_string().contains("failed to parse tuning"));
    }

    #[test]
    fn unreadable_files_name_the_path() {
        let error = load_tuning(Some(Path::new("/nonexistent/tuning.toml")))
            .expect_err("missing file");

        assert!(error.to_string().contains("/nonexistent/tuning.toml"));
    }
}
