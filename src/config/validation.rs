//! Settings validation.
//!
//! # Responsibilities
//! - Check each enabled feature group has every field it needs
//! - Validate value ranges (ports, hashing cost)
//! - Supply defaults when no settings were given
//!
//! # Design Decisions
//! - Groups are checked independently, in a fixed order; the first failure is returned
//! - Validation is a pure function: Option<ServerSettings> → Result<ValidatedSettings, ValidationError>
//! - Only `ValidatedSettings` is accepted by the lifecycle controller

use std::ops::{Deref, RangeInclusive};
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::ServerSettings;

/// Accepted password-hashing cost factors.
pub const ENCRYPTION_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// The first unmet requirement found in a settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server_name is required")]
    MissingServerName,

    #[error("network.host_name, network.ip and network.port are required")]
    MissingBinding,

    #[error("network.port {0} is not a usable port")]
    InvalidPort(u16),

    #[error("tls.cert_file and tls.private_key_file are required when TLS is enabled")]
    MissingTlsMaterial,

    #[error("storage.{field} is required when storage is enabled")]
    IncompleteStorage { field: &'static str },

    #[error("storage.encryption_cost {0} is outside 4..=31")]
    EncryptionCostOutOfRange(u32),

    #[error("recovery.location is required when recovery is enabled")]
    MissingRecoveryLocation,

    #[error("admin.login and admin.password are required when admin tools are enabled")]
    MissingAdminCredentials,
}

/// Settings that passed validation. Read-only and cheap to share.
#[derive(Debug, Clone)]
pub struct ValidatedSettings(Arc<ServerSettings>);

impl Deref for ValidatedSettings {
    type Target = ServerSettings;

    fn deref(&self) -> &ServerSettings {
        &self.0
    }
}

/// Validate a settings snapshot, or produce the defaults when none is given.
pub fn validate(settings: Option<ServerSettings>) -> Result<ValidatedSettings, ValidationError> {
    let settings = match settings {
        Some(settings) => settings,
        None => {
            tracing::info!("No settings given, using defaults");
            ServerSettings::default()
        }
    };

    check_base(&settings)?;
    check_tls(&settings)?;
    check_storage(&settings)?;
    check_recovery(&settings)?;
    check_admin(&settings)?;

    Ok(ValidatedSettings(Arc::new(settings)))
}

fn check_base(settings: &ServerSettings) -> Result<(), ValidationError> {
    if settings.server_name.is_empty() {
        return Err(ValidationError::MissingServerName);
    }
    let network = &settings.network;
    if network.host_name.is_empty() || network.ip.is_empty() {
        return Err(ValidationError::MissingBinding);
    }
    if network.port <= 1 {
        return Err(ValidationError::InvalidPort(network.port));
    }
    Ok(())
}

fn check_tls(settings: &ServerSettings) -> Result<(), ValidationError> {
    let tls = &settings.tls;
    if tls.enabled && (tls.cert_file.is_empty() || tls.private_key_file.is_empty()) {
        return Err(ValidationError::MissingTlsMaterial);
    }
    Ok(())
}

fn check_storage(settings: &ServerSettings) -> Result<(), ValidationError> {
    let storage = &settings.storage;
    if !storage.enabled {
        return Ok(());
    }

    let required = [
        ("ip", storage.ip.is_empty()),
        ("port", storage.port == 0),
        ("protocol", storage.protocol.is_empty()),
        ("user", storage.user.is_empty()),
        ("password", storage.password.is_empty()),
        ("database", storage.database.is_empty()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, missing)| *missing) {
        return Err(ValidationError::IncompleteStorage { field: *field });
    }

    if !ENCRYPTION_COST_RANGE.contains(&storage.encryption_cost) {
        return Err(ValidationError::EncryptionCostOutOfRange(storage.encryption_cost));
    }
    Ok(())
}

fn check_recovery(settings: &ServerSettings) -> Result<(), ValidationError> {
    if settings.recovery.enabled && settings.recovery.location.is_empty() {
        return Err(ValidationError::MissingRecoveryLocation);
    }
    Ok(())
}

fn check_admin(settings: &ServerSettings) -> Result<(), ValidationError> {
    let admin = &settings.admin;
    if admin.enabled && (admin.login.is_empty() || admin.password.is_empty()) {
        return Err(ValidationError::MissingAdminCredentials);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_yields_defaults() {
        let validated = validate(None).unwrap();
        assert_eq!(validated.server_name, "!server!");
        assert_eq!(validated.network.port, 8080);
    }

    #[test]
    fn empty_server_name_is_rejected() {
        let mut settings = ServerSettings::default();
        settings.server_name.clear();
        assert_eq!(validate(Some(settings)).unwrap_err(), ValidationError::MissingServerName);
    }

    #[test]
    fn missing_binding_is_rejected() {
        let mut settings = ServerSettings::default();
        settings.network.ip.clear();
        assert_eq!(validate(Some(settings)).unwrap_err(), ValidationError::MissingBinding);
    }

    #[test]
    fn ports_at_or_below_one_are_rejected() {
        for port in [0, 1] {
            let mut settings = ServerSettings::default();
            settings.network.port = port;
            assert_eq!(validate(Some(settings)).unwrap_err(), ValidationError::InvalidPort(port));
        }

        let mut settings = ServerSettings::default();
        settings.network.port = 2;
        assert!(validate(Some(settings)).is_ok());
    }

    #[test]
    fn tls_requires_both_files() {
        let mut settings = ServerSettings::default();
        settings.tls.enabled = true;
        settings.tls.private_key_file = "key.pem".into();
        assert_eq!(validate(Some(settings.clone())).unwrap_err(), ValidationError::MissingTlsMaterial);

        settings.tls.cert_file = "cert.pem".into();
        assert!(validate(Some(settings)).is_ok());
    }

    #[test]
    fn storage_names_first_missing_field() {
        let mut settings = ServerSettings::default();
        settings.storage.enabled = true;
        settings.storage.user.clear();
        settings.storage.database.clear();
        assert_eq!(
            validate(Some(settings)).unwrap_err(),
            ValidationError::IncompleteStorage { field: "user" }
        );
    }

    #[test]
    fn storage_port_zero_is_rejected() {
        let mut settings = ServerSettings::default();
        settings.storage.enabled = true;
        settings.storage.port = 0;
        assert_eq!(
            validate(Some(settings)).unwrap_err(),
            ValidationError::IncompleteStorage { field: "port" }
        );
    }

    #[test]
    fn storage_cost_must_be_in_range() {
        let mut settings = ServerSettings::default();
        settings.storage.enabled = true;
        settings.storage.encryption_cost = 32;
        assert_eq!(
            validate(Some(settings)).unwrap_err(),
            ValidationError::EncryptionCostOutOfRange(32)
        );
    }

    #[test]
    fn disabled_groups_are_not_checked() {
        let mut settings = ServerSettings::default();
        settings.storage.user.clear();
        settings.recovery.location.clear();
        settings.admin.enabled = false;
        settings.admin.password.clear();
        assert!(validate(Some(settings)).is_ok());
    }

    #[test]
    fn recovery_requires_location() {
        let mut settings = ServerSettings::default();
        settings.recovery.enabled = true;
        settings.recovery.location.clear();
        assert_eq!(validate(Some(settings)).unwrap_err(), ValidationError::MissingRecoveryLocation);
    }

    #[test]
    fn admin_requires_credentials() {
        let mut settings = ServerSettings::default();
        settings.admin.login.clear();
        assert_eq!(validate(Some(settings)).unwrap_err(), ValidationError::MissingAdminCredentials);
    }

    #[test]
    fn groups_are_checked_in_order() {
        let mut settings = ServerSettings::default();
        settings.tls.enabled = true;
        settings.admin.password.clear();
        assert_eq!(validate(Some(settings)).unwrap_err(), ValidationError::MissingTlsMaterial);
    }
}
