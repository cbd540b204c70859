use secrecy::SecretString;
use strum::Display;

/// Username/password pair used to drive the portal login form.
///
/// The password stays wrapped in [`SecretString`] so it never reaches
/// `Debug` output or logs; it is only exposed when typed into the form.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: SecretString,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// Deployment environment the portal login runs against.
///
/// Only [`Production`](Self::Production) runs the secondary-factor
/// challenge. Every other environment flag maps to
/// [`Bypass`](Self::Bypass), where the caller already holds a trusted path
/// and the challenge is skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Bypass,
}

impl Environment {
    /// The one flag value that enables the secondary factor.
    pub const PRODUCTION_FLAG: &'static str = "production";

    /// Interpret a free-form environment flag. Exact match only.
    pub fn from_flag(flag: &str) -> Self {
        if flag == Self::PRODUCTION_FLAG {
            Self::Production
        } else {
            Self::Bypass
        }
    }

    pub fn requires_secondary_factor(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl From<&str> for Environment {
    fn from(flag: &str) -> Self {
        Self::from_flag(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_production_flag_enables_secondary_factor() {
        assert_eq!(Environment::from_flag("production"), Environment::Production);
        assert_eq!(Environment::from_flag("Production"), Environment::Bypass);
        assert_eq!(Environment::from_flag("test"), Environment::Bypass);
        assert_eq!(Environment::from_flag(""), Environment::Bypass);
        assert!(Environment::Production.requires_secondary_factor());
        assert!(!Environment::Bypass.requires_secondary_factor());
    }

    #[test]
    fn credential_debug_redacts_password() {
        let cred = Credential::new("netops", SecretString::from("hunter2".to_string()));
        let rendered = format!("{cred:?}");
        assert!(rendered.contains("netops"));
        assert!(!rendered.contains("hunter2"));
    }
}
