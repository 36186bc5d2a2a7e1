//! Lint profile definitions and validation for the hkanno toolchain.

use hkanno_diagnostics::Severity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Profile schema major version this crate understands.
pub const SUPPORTED_SCHEMA_MAJOR: u32 = 1;

/// Errors that can occur when loading or validating a lint profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// JSON deserialization failed.
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

impl ProfileError {
    fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProfileError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A lint profile tuning how annotation lines are checked.
///
/// Profiles extend the built-in native instruction catalog, declare which
/// top-level keys an invincibility-frame payload may carry, and which event
/// hosts may issue payload instructions.
///
/// # Example
/// ```
/// let profile = hkanno_profile::Profile::from_json(
///     r#"{ "id": "my-mod", "schema_version": "1.0.0", "iframe_keys": ["Duration", "Source"] }"#,
/// ).unwrap();
/// assert!(profile.allows_iframe_key("Source"));
/// assert!(profile.accepts_host("pie"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Unique profile identifier (e.g., `"skyrim-default"`).
    pub id: String,
    /// Profile schema version for forward compatibility (e.g., `"1.0.0"`).
    pub schema_version: String,
    /// Top-level keys allowed in an invincibility-frame payload object.
    #[serde(default = "default_iframe_keys")]
    pub iframe_keys: Vec<String>,
    /// Event hosts that may carry payload instructions (matched case-insensitively).
    #[serde(default = "default_payload_hosts")]
    pub payload_hosts: Vec<String>,
    /// Native instructions in addition to the built-in catalog.
    #[serde(default)]
    pub custom_instructions: Vec<CustomInstruction>,
    /// Severity for empty parameter values (`||`). `None` disables the check.
    #[serde(default = "default_empty_parameters")]
    pub empty_parameters: Option<Severity>,
}

/// A native (`@`) instruction declared by a profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomInstruction {
    /// Instruction name as written after the `@` prefix.
    pub name: String,
    /// Parameter names, in order. The instruction's arity is their count.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Free-form description shown by tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_iframe_keys() -> Vec<String> {
    vec!["Duration".into()]
}

fn default_payload_hosts() -> Vec<String> {
    vec!["PIE".into()]
}

fn default_empty_parameters() -> Option<Severity> {
    Some(Severity::Warn)
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: "default".into(),
            schema_version: "1.0.0".into(),
            iframe_keys: default_iframe_keys(),
            payload_hosts: default_payload_hosts(),
            custom_instructions: Vec::new(),
            empty_parameters: default_empty_parameters(),
        }
    }
}

impl Profile {
    /// Parse and validate a profile from JSON.
    pub fn from_json(s: &str) -> Result<Self, ProfileError> {
        load_profile_from_str(s)
    }

    /// Whether `host` is an accepted payload-instruction host.
    pub fn accepts_host(&self, host: &str) -> bool {
        self.payload_hosts
            .iter()
            .any(|h| h.eq_ignore_ascii_case(host))
    }

    /// Whether `key` may appear at the top level of an iframe payload.
    pub fn allows_iframe_key(&self, key: &str) -> bool {
        self.iframe_keys.iter().any(|k| k == key)
    }

    /// Look up a profile-declared instruction by name, ignoring ASCII case.
    pub fn custom_instruction(&self, name: &str) -> Option<&CustomInstruction> {
        self.custom_instructions
            .iter()
            .find(|ci| ci.name.eq_ignore_ascii_case(name))
    }

    /// Check field sanity.
    ///
    /// - `id` must be non-empty
    /// - `schema_version` must be `MAJOR.MINOR.PATCH` with a supported major
    /// - `iframe_keys` entries must be non-empty
    /// - `payload_hosts` entries must be non-empty and contain no `.`
    /// - custom instruction names must be non-empty, contain no `|`, and be
    ///   unique ignoring ASCII case; parameter names must be non-empty
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.id.trim().is_empty() {
            return Err(ProfileError::field("id", "must not be empty"));
        }
        validate_schema_version(&self.schema_version)?;

        for (i, key) in self.iframe_keys.iter().enumerate() {
            if key.is_empty() {
                return Err(ProfileError::field(
                    format!("iframe_keys[{i}]"),
                    "must not be empty",
                ));
            }
        }

        for (i, host) in self.payload_hosts.iter().enumerate() {
            if host.trim().is_empty() {
                return Err(ProfileError::field(
                    format!("payload_hosts[{i}]"),
                    "must not be empty",
                ));
            }
            if host.contains('.') {
                return Err(ProfileError::field(
                    format!("payload_hosts[{i}]"),
                    format!("'{host}' must not contain '.'"),
                ));
            }
        }

        let mut seen: Vec<String> = Vec::new();
        for (i, ci) in self.custom_instructions.iter().enumerate() {
            let name = ci.name.trim();
            if name.is_empty() {
                return Err(ProfileError::field(
                    format!("custom_instructions[{i}].name"),
                    "must not be empty",
                ));
            }
            if name.contains('|') {
                return Err(ProfileError::field(
                    format!("custom_instructions[{i}].name"),
                    format!("'{name}' must not contain '|'"),
                ));
            }
            let folded = name.to_ascii_uppercase();
            if seen.contains(&folded) {
                return Err(ProfileError::field(
                    format!("custom_instructions[{i}].name"),
                    format!("duplicate instruction '{name}'"),
                ));
            }
            seen.push(folded);
            if let Some(j) = ci.parameters.iter().position(|p| p.trim().is_empty()) {
                return Err(ProfileError::field(
                    format!("custom_instructions[{i}].parameters[{j}]"),
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }
}

fn validate_schema_version(version: &str) -> Result<(), ProfileError> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.parse::<u32>().is_err()) {
        return Err(ProfileError::field(
            "schema_version",
            format!("'{version}' is not MAJOR.MINOR.PATCH"),
        ));
    }
    let major: u32 = parts[0].parse().unwrap_or_default();
    if major != SUPPORTED_SCHEMA_MAJOR {
        return Err(ProfileError::field(
            "schema_version",
            format!("major version {major} is not supported (expected {SUPPORTED_SCHEMA_MAJOR})"),
        ));
    }
    Ok(())
}

/// Load and validate a [`Profile`] from a JSON string.
///
/// The `id` and `schema_version` fields are required; every other field
/// falls back to its default when missing.
pub fn load_profile_from_str(s: &str) -> Result<Profile, ProfileError> {
    let profile: Profile = serde_json::from_str(s)?;
    profile.validate()?;
    Ok(profile)
}
