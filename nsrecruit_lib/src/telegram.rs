//! Telegram templates and their on-disk store.
//!
//! One YAML file per template, e.g. `telegrams/spring drive.yml`:
//!
//! ```yaml
//! name: spring drive
//! tgid: '12345678'
//! tgsecretkey: 0123456789ab
//! type: Recruitment
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RecruitError;
use crate::validation::validate_template_name;

/// Declared purpose of a telegram; decides the mandatory post-send cooldown.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramKind {
    #[serde(rename = "Recruitment")]
    Recruitment,
    #[serde(rename = "Non-Recruitment")]
    NonRecruitment,
}

impl fmt::Display for TelegramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recruitment => f.write_str("Recruitment"),
            Self::NonRecruitment => f.write_str("Non-Recruitment"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TelegramTemplate {
    pub name: String,
    pub tgid: String,
    #[serde(rename = "tgsecretkey")]
    pub secret_key: String,
    #[serde(rename = "type")]
    pub kind: TelegramKind,
}

impl fmt::Debug for TelegramTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTemplate")
            .field("name", &self.name)
            .field("tgid", &self.tgid)
            .field("secret_key", &"<redacted>")
            .field("kind", &self.kind)
            .finish()
    }
}

impl TelegramTemplate {
    pub fn new(name: &str, tgid: &str, secret_key: &str, kind: TelegramKind) -> Self {
        Self {
            name: name.trim().to_string(),
            tgid: tgid.trim().to_string(),
            secret_key: secret_key.trim().to_string(),
            kind,
        }
    }

    pub fn validate(&self) -> Result<(), RecruitError> {
        validate_template_name(&self.name)?;
        if self.tgid.is_empty() || !self.tgid.chars().all(|c| c.is_ascii_digit()) {
            return Err(RecruitError::InvalidInput(format!(
                "telegram id '{}' must be numeric",
                self.tgid
            )));
        }
        if self.secret_key.is_empty() {
            return Err(RecruitError::InvalidInput(
                "telegram secret key must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Directory of template files.
pub struct TelegramStore {
    dir: PathBuf,
}

impl TelegramStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, RecruitError> {
        let name = validate_template_name(name)?;
        Ok(self.dir.join(format!("{}.yml", name)))
    }

    /// All readable templates, sorted by name. Unreadable files are logged and skipped.
    pub fn list(&self) -> Result<Vec<TelegramTemplate>, RecruitError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut templates = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yml") {
                continue;
            }
            match read_template(&path) {
                Ok(template) => templates.push(template),
                Err(e) => tracing::warn!("Skipping template {}: {}", path.display(), e),
            }
        }
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    pub fn load(&self, name: &str) -> Result<TelegramTemplate, RecruitError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(RecruitError::Template(format!(
                "no telegram named '{}' in {}",
                name.trim(),
                self.dir.display()
            )));
        }
        read_template(&path)
    }

    /// Writes `template`. An existing file is only replaced when `overwrite` is set.
    pub fn save(&self, template: &TelegramTemplate, overwrite: bool) -> Result<PathBuf, RecruitError> {
        template.validate()?;
        let path = self.path_for(&template.name)?;
        if path.exists() && !overwrite {
            return Err(RecruitError::Template(format!(
                "telegram '{}' already exists",
                template.name
            )));
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_yml::to_string(template)?)?;
        tracing::info!("Telegram {} saved", template.name);
        Ok(path)
    }

    pub fn delete(&self, name: &str) -> Result<(), RecruitError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(RecruitError::Template(format!(
                "no telegram named '{}'",
                name.trim()
            )));
        }
        fs::remove_file(&path)?;
        tracing::info!("Telegram {} deleted", name.trim());
        Ok(())
    }
}

fn read_template(path: &Path) -> Result<TelegramTemplate, RecruitError> {
    let content = fs::read_to_string(path)?;
    let template: TelegramTemplate = serde_yml::from_str(&content)?;
    template.validate()?;
    Ok(template)
}
