//! Configuration checks.
//!
//! Two levels: [`check_complete`] is what the arbiter needs before it may act,
//! [`validate_config`] is the stricter check applied before a configuration is
//! stored.

use crate::error::ConfigError;
use crate::model::EmergencyConfig;

const MAX_NUMBER_DIGITS: usize = 15;

/// Returns the config if it is present, has a contact number and at least one
/// recipient.
pub fn check_complete(config: Option<&EmergencyConfig>) -> Result<&EmergencyConfig, ConfigError> {
    let config = config.ok_or(ConfigError::NotConfigured)?;
    if config.contact_number.trim().is_empty() {
        return Err(ConfigError::MissingContactNumber);
    }
    if config.recipient_emails.is_empty() {
        return Err(ConfigError::NoRecipients);
    }
    Ok(config)
}

/// Full validation for a configuration about to be persisted.
pub fn validate_config(config: &EmergencyConfig) -> Result<(), ConfigError> {
    check_complete(Some(config))?;
    validate_number(&config.contact_number)?;
    for email in &config.recipient_emails {
        validate_email(email)?;
    }
    Ok(())
}

/// Trim surrounding whitespace and drop blank recipient entries.
pub fn normalize(config: EmergencyConfig) -> EmergencyConfig {
    EmergencyConfig {
        contact_number: config.contact_number.trim().to_string(),
        recipient_emails: config
            .recipient_emails
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect(),
    }
}

fn validate_number(number: &str) -> Result<(), ConfigError> {
    let number = number.trim();
    let allowed = number
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'));
    let digits = number.chars().filter(|c| c.is_ascii_digit()).count();
    let plus_ok = !number.chars().skip(1).any(|c| c == '+');

    if !allowed || !plus_ok || digits == 0 || digits > MAX_NUMBER_DIGITS {
        return Err(ConfigError::InvalidContactNumber(number.to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ConfigError> {
    let ok = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidEmail(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(number: &str, emails: &[&str]) -> EmergencyConfig {
        EmergencyConfig::new(number, emails.iter().map(|e| e.to_string()).collect())
    }

    #[test]
    fn absent_config_is_not_configured() {
        assert_eq!(check_complete(None), Err(ConfigError::NotConfigured));
    }

    #[test]
    fn blank_number_is_incomplete() {
        let c = config("  ", &["a@b.c"]);
        assert_eq!(check_complete(Some(&c)), Err(ConfigError::MissingContactNumber));
    }

    #[test]
    fn empty_recipients_is_incomplete() {
        let c = config("5551234", &[]);
        assert_eq!(check_complete(Some(&c)), Err(ConfigError::NoRecipients));
    }

    #[test]
    fn accepts_plausible_config() {
        let c = config("+1 555-123-4567", &["mum@example.com", "dad@example.org"]);
        assert_eq!(validate_config(&c), Ok(()));
    }

    #[test]
    fn rejects_email_without_at() {
        let c = config("5551234", &["mum@example.com", "nobody"]);
        assert_eq!(validate_config(&c), Err(ConfigError::InvalidEmail("nobody".into())));
    }

    #[test]
    fn rejects_letters_in_number() {
        let c = config("call-me", &["a@b.c"]);
        assert!(matches!(validate_config(&c), Err(ConfigError::InvalidContactNumber(_))));
    }

    #[test]
    fn rejects_inner_plus() {
        let c = config("55+51234", &["a@b.c"]);
        assert!(matches!(validate_config(&c), Err(ConfigError::InvalidContactNumber(_))));
    }

    #[test]
    fn normalize_drops_blank_recipients() {
        let c = normalize(config(" 5551234 ", &["", " a@b.c ", "   "]));
        assert_eq!(c, config("5551234", &["a@b.c"]));
    }
}
