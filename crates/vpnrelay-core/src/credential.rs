// ============================================
// File: crates/vpnrelay-core/src/credential.rs
// ============================================
//! # Session Credential
//!
//! ## Creation Reason
//! A tunnel session is authorised by a signed token that the connection
//! layer has already verified. The relay only needs the parsed claims:
//! who the user is, and the time window in which the token stays valid.
//!
//! ## Main Functionality
//! - `Claims`: registered claims of a parsed token
//! - `Credential`: immutable wrapper with a time-based validity check
//!
//! ## Validity Rules
//! Checked in this order, each claim optional:
//! 1. `exp`: now must not be after the expiry time
//! 2. `iat`: now must not be before the issue time
//! 3. `nbf`: now must not be before the not-before time
//!
//! ## ⚠️ Important Note for Next Developer
//! - Signature verification happens before a `Credential` exists
//! - Validity is derived from the clock, never cached
//!
//! ## Last Modified
//! v0.1.0 - Initial credential model

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::time::Timestamp;

// ============================================
// Claims
// ============================================

/// Registered claims carried by a session token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Audience; the relay uses it as the session's user name.
    #[serde(rename = "aud", default)]
    pub audience: String,

    /// Subject.
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Issuer.
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Expiry time.
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,

    /// Not-before time.
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<Timestamp>,

    /// Issue time.
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<Timestamp>,
}

impl Claims {
    /// Creates claims for an audience with no time bounds.
    #[must_use]
    pub fn new(audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            ..Self::default()
        }
    }

    /// Sets the expiry time.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the not-before time.
    #[must_use]
    pub const fn with_not_before(mut self, not_before: Timestamp) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// Sets the issue time.
    #[must_use]
    pub const fn with_issued_at(mut self, issued_at: Timestamp) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    /// Validates the time-based claims against `now`.
    ///
    /// # Errors
    /// - `CredentialExpired` if `now` is after `exp`
    /// - `CredentialIssuedInFuture` if `now` is before `iat`
    /// - `CredentialNotYetValid` if `now` is before `nbf`
    pub fn validate_at(&self, now: Timestamp) -> Result<()> {
        if let Some(exp) = self.expires_at {
            if now > exp {
                return Err(CoreError::CredentialExpired {
                    expires_at: exp.as_secs(),
                    now: now.as_secs(),
                });
            }
        }

        if let Some(iat) = self.issued_at {
            if now < iat {
                return Err(CoreError::CredentialIssuedInFuture {
                    issued_at: iat.as_secs(),
                    now: now.as_secs(),
                });
            }
        }

        if let Some(nbf) = self.not_before {
            if now < nbf {
                return Err(CoreError::CredentialNotYetValid {
                    not_before: nbf.as_secs(),
                    now: now.as_secs(),
                });
            }
        }

        Ok(())
    }
}

// ============================================
// Credential
// ============================================

/// A parsed, signature-checked session credential.
///
/// # Example
/// ```
/// use vpnrelay_core::credential::{Claims, Credential};
/// use vpnrelay_core::time::Timestamp;
///
/// let claims = Claims::new("alice").with_expires_at(Timestamp::now().add_secs(3600));
/// let credential = Credential::new(claims);
///
/// assert_eq!(credential.audience(), "alice");
/// assert!(credential.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    claims: Claims,
}

impl Credential {
    /// Wraps parsed claims.
    #[must_use]
    pub const fn new(claims: Claims) -> Self {
        Self { claims }
    }

    /// Returns the claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Returns the audience claim.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.claims.audience
    }

    /// Checks the credential against the current time.
    ///
    /// # Errors
    /// Returns the first failing time claim, see [`Claims::validate_at`].
    pub fn validate(&self) -> Result<()> {
        self.claims.validate_at(Timestamp::now())
    }

    /// Returns `true` if the credential is valid right now.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl From<Claims> for Credential {
    fn from(claims: Claims) -> Self {
        Self::new(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = Timestamp::from_secs(1_700_000_000);

    #[test]
    fn test_unbounded_claims_are_valid() {
        assert!(Claims::new("bob").validate_at(NOW).is_ok());
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = Claims::new("bob").with_expires_at(NOW);
        assert!(claims.validate_at(NOW).is_ok());

        let err = claims.validate_at(NOW.add_secs(1)).unwrap_err();
        assert!(matches!(err, CoreError::CredentialExpired { .. }));
    }

    #[test]
    fn test_not_before() {
        let claims = Claims::new("bob").with_not_before(NOW.add_secs(30));
        let err = claims.validate_at(NOW).unwrap_err();
        assert!(matches!(err, CoreError::CredentialNotYetValid { .. }));
        assert!(claims.validate_at(NOW.add_secs(30)).is_ok());
    }

    #[test]
    fn test_issued_in_future() {
        let claims = Claims::new("bob").with_issued_at(NOW.add_secs(5));
        let err = claims.validate_at(NOW).unwrap_err();
        assert!(matches!(err, CoreError::CredentialIssuedInFuture { .. }));
    }

    #[test]
    fn test_expiry_checked_first() {
        let claims = Claims::new("bob")
            .with_expires_at(NOW.add_secs(-10))
            .with_not_before(NOW.add_secs(10));
        let err = claims.validate_at(NOW).unwrap_err();
        assert!(matches!(err, CoreError::CredentialExpired { .. }));
    }

    #[test]
    fn test_credential_against_wall_clock() {
        let expired = Credential::new(
            Claims::new("carol").with_expires_at(Timestamp::now().add_secs(-60)),
        );
        assert!(!expired.is_valid());

        let fresh = Credential::from(
            Claims::new("carol").with_expires_at(Timestamp::now().add_secs(3600)),
        );
        assert!(fresh.is_valid());
        assert_eq!(fresh.audience(), "carol");
    }
}
