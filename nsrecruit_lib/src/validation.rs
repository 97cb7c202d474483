//! Validation of operator-supplied input.

use crate::error::RecruitError;
use crate::nation::NationId;

/// Longest nation name the game allows.
pub const MAX_NATION_NAME_LENGTH: usize = 40;

/// Strip ASCII control characters and surrounding whitespace, then check
/// the name only uses characters the game accepts in nation names.
pub fn validate_nation_name(input: &str) -> Result<NationId, RecruitError> {
    let cleaned: String = input.chars().filter(|c| !c.is_ascii_control()).collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() {
        return Err(RecruitError::InvalidInput(
            "nation name must not be empty".into(),
        ));
    }
    if trimmed.chars().count() > MAX_NATION_NAME_LENGTH {
        return Err(RecruitError::InvalidInput(format!(
            "nation name exceeds {} characters",
            MAX_NATION_NAME_LENGTH
        )));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-')))
    {
        return Err(RecruitError::InvalidInput(format!(
            "nation name contains invalid character '{}'",
            bad
        )));
    }
    Ok(NationId::new(trimmed))
}

/// Template names become file names, so they are held to a narrow alphabet.
pub fn validate_template_name(input: &str) -> Result<String, RecruitError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RecruitError::InvalidInput(
            "template name must not be empty".into(),
        ));
    }
    if trimmed.starts_with('.')
        || trimmed
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.')))
    {
        return Err(RecruitError::InvalidInput(format!(
            "template name '{}' may only use letters, digits, spaces, '.', '_' and '-'",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert_eq!(validate_nation_name("Testlandia").unwrap().as_str(), "Testlandia");
        assert_eq!(
            validate_nation_name("  the_grand-duchy 2\n").unwrap().as_str(),
            "the_grand-duchy 2"
        );
    }

    #[test]
    fn rejects_empty_long_and_odd() {
        assert!(validate_nation_name("   ").is_err());
        assert!(validate_nation_name(&"a".repeat(41)).is_err());
        assert!(validate_nation_name("foo/bar").is_err());
        assert!(validate_nation_name("foo@@").is_err());
    }

    #[test]
    fn template_names() {
        assert_eq!(validate_template_name(" spring drive ").unwrap(), "spring drive");
        assert!(validate_template_name("../etc").is_err());
        assert!(validate_template_name(".hidden").is_err());
        assert!(validate_template_name("a/b").is_err());
        assert!(validate_template_name("").is_err());
    }
}
