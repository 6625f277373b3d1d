#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("admin password not configured")]
    NotConfigured,
    #[error("Invalid password")]
    InvalidPassword,
}

/// Shared-secret gate in front of the admin report listing.
///
/// The supplied password must equal the configured one exactly. There is no hashing,
/// lockout or session.
#[derive(Clone)]
pub struct AdminGate {
    secret: Option<String>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AdminGate {
    /// A blank or missing secret leaves the gate closed to everyone.
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.filter(|s| !s.trim().is_empty()).map(str::to_string),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Validates the provided password.
    ///
    /// Returns `Ok(())` if it matches, or an error if it does not or no secret is set.
    pub fn check(&self, provided: &str) -> Result<(), AuthError> {
        let Some(secret) = &self.secret else {
            return Err(AuthError::NotConfigured);
        };

        if provided == secret.as_str() {
            Ok(())
        } else {
            Err(AuthError::InvalidPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_password_passes() {
        let gate = AdminGate::new(Some("letmein"));
        assert_eq!(gate.check("letmein"), Ok(()));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let gate = AdminGate::new(Some("letmein"));
        assert_eq!(gate.check("LetMeIn"), Err(AuthError::InvalidPassword));
        assert_eq!(gate.check(""), Err(AuthError::InvalidPassword));
    }

    #[test]
    fn whitespace_is_significant() {
        let gate = AdminGate::new(Some("letmein"));
        assert_eq!(gate.check(" letmein\n"), Err(AuthError::InvalidPassword));
        assert_eq!(gate.check("letmein "), Err(AuthError::InvalidPassword));

        let padded = AdminGate::new(Some(" pass "));
        assert_eq!(padded.check("pass"), Err(AuthError::InvalidPassword));
        assert_eq!(padded.check(" pass "), Ok(()));
    }

    #[test]
    fn unconfigured_gate_rejects_everything() {
        for gate in [AdminGate::new(None), AdminGate::new(Some("   "))] {
            assert!(!gate.is_configured());
            assert_eq!(gate.check(""), Err(AuthError::NotConfigured));
            assert_eq!(gate.check("anything"), Err(AuthError::NotConfigured));
        }
    }

    #[test]
    fn debug_hides_secret() {
        let gate = AdminGate::new(Some("letmein"));
        let rendered = format!("{gate:?}");
        assert!(!rendered.contains("letmein"));
        assert!(rendered.contains("configured: true"));
    }
}
