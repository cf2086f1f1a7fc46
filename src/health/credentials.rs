//! Credential lookup for active checks.

use std::collections::{BTreeMap, HashMap};

/// Source of credential values, keyed by variable name.
pub trait CredentialSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads credentials from the process environment at probe time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Fill every body field from `source`.
///
/// Returns the names of the missing variables if any value is absent or
/// blank; a partially filled body is never produced.
pub fn resolve_fields(
    fields: &BTreeMap<String, String>,
    source: &dyn CredentialSource,
) -> Result<BTreeMap<String, String>, Vec<String>> {
    let mut body = BTreeMap::new();
    let mut missing = Vec::new();

    for (field, variable) in fields {
        match source.get(variable) {
            Some(value) if !value.trim().is_empty() => {
                body.insert(field.clone(), value);
            }
            _ => missing.push(variable.clone()),
        }
    }

    if missing.is_empty() {
        Ok(body)
    } else {
        Err(missing)
    }
}
