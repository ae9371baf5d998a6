use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::navigation::{ADMIN_DASHBOARD_ROUTE, PARTICIPANT_DASHBOARD_ROUTE};

/// Candidate field names for each logical credential, in priority order.
/// The first present, non-empty value wins.
const ACCESS_TOKEN_FIELDS: &[&str] = &["access", "token", "accessToken", "access_token"];
const REFRESH_TOKEN_FIELDS: &[&str] = &["refresh", "refreshToken", "refresh_token"];
const ROLE_FIELDS: &[&str] = &["role", "user_role", "userRole"];
const SUBJECT_ID_FIELDS: &[&str] = &["unique_id", "uniqueId", "user_id", "userId", "id"];

/// Role strings that route to the admin dashboard
const ADMIN_ROLES: &[&str] = &["admin", "superadmin", "staff"];

/// The unit of session state: tokens plus who they were issued for.
///
/// A bundle is either fully populated (an authenticated session) or fully
/// cleared. Partial bundles can still be stored and restored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CredentialBundle {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub role: Option<String>,
    pub subject_id: Option<String>,
}

impl CredentialBundle {
    /// Normalize a backend login payload into a bundle.
    ///
    /// Payloads wrapped in a `{success, data}` envelope are unwrapped first;
    /// fields found on the inner object take priority over the outer one.
    pub fn from_login_payload(payload: &Value) -> Self {
        Self {
            access_token: pick_field(payload, ACCESS_TOKEN_FIELDS),
            refresh_token: pick_field(payload, REFRESH_TOKEN_FIELDS),
            role: pick_field(payload, ROLE_FIELDS),
            subject_id: pick_field(payload, SUBJECT_ID_FIELDS),
        }
    }

    /// Extract a fresh access token from a refresh response
    pub fn access_token_from(payload: &Value) -> Option<String> {
        pick_field(payload, ACCESS_TOKEN_FIELDS)
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none()
            && self.refresh_token.is_none()
            && self.role.is_none()
            && self.subject_id.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.access_token.is_some()
            && self.refresh_token.is_some()
            && self.role.is_some()
            && self.subject_id.is_some()
    }

    pub fn role_kind(&self) -> Option<Role> {
        self.role.as_deref().map(Role::parse)
    }
}

/// Authorization tier, used only to pick where to land after login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Role {
    Admin,
    Participant,
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if ADMIN_ROLES.iter().any(|r| r.eq_ignore_ascii_case(raw)) {
            Role::Admin
        } else {
            Role::Participant
        }
    }

    pub fn home_route(&self) -> &'static str {
        match self {
            Role::Admin => ADMIN_DASHBOARD_ROUTE,
            Role::Participant => PARTICIPANT_DASHBOARD_ROUTE,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Participant => write!(f, "Participant"),
        }
    }
}

fn pick_field(payload: &Value, candidates: &[&str]) -> Option<String> {
    if let Some(inner) = payload.get("data").filter(|d| d.is_object()) {
        if let Some(found) = pick_from_object(inner, candidates) {
            return Some(found);
        }
    }
    pick_from_object(payload, candidates)
}

fn pick_from_object(object: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|name| object.get(*name).and_then(scalar_to_string))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
