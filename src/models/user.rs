//! User profile and role handling

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::{self, value_to_text};
use crate::error::{AppError, AppResult};

/// Roles allowed to schedule, review and confirm maintenance
const AUTHORIZED_ROLES: [&str; 3] = ["admin", "biomedical", "biomedicalengineer"];

/// Lower-case the role and remove every whitespace character.
///
/// `" Biomedical Engineer "` and `"biomedicalengineer"` normalize to the same value.
pub fn normalize_role(role: Option<&str>) -> Option<String> {
    let normalized: String = role?
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    (!normalized.is_empty()).then_some(normalized)
}

/// Whether a role may act as a biomedical reviewer. Never panics; `None` is not authorized.
pub fn is_authorized_role(role: Option<&str>) -> bool {
    normalize_role(role)
        .map(|r| AUTHORIZED_ROLES.contains(&r.as_str()))
        .unwrap_or(false)
}

/// Role classes the console distinguishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Role {
    Admin,
    Biomedical,
    Manager,
    Technician,
    Other(String),
}

impl Role {
    pub fn parse(role: Option<&str>) -> Option<Role> {
        let normalized = normalize_role(role)?;
        Some(match normalized.as_str() {
            "admin" => Role::Admin,
            "biomedical" | "biomedicalengineer" => Role::Biomedical,
            "manager" => Role::Manager,
            "technician" => Role::Technician,
            _ => Role::Other(normalized),
        })
    }
}

/// `GET /users/me` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_number")]
    pub experience_years: Option<f64>,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub personnel_id: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub user_id: Option<String>,
}

impl Profile {
    pub fn role(&self) -> Option<Role> {
        Role::parse(self.role.as_deref())
    }

    /// Admin or biomedical engineer
    pub fn is_authorized(&self) -> bool {
        is_authorized_role(self.role.as_deref())
    }

    /// Authorized roles and managers may read the user list
    pub fn can_list_users(&self) -> bool {
        self.is_authorized() || self.role() == Some(Role::Manager)
    }

    pub fn is_technician(&self) -> bool {
        self.role() == Some(Role::Technician)
    }

    /// Identifier to stamp on completed work: `personnel_id`, else a generic id field
    pub fn technician_identity(&self) -> AppResult<String> {
        self.personnel_id
            .as_ref()
            .or(self.id.as_ref())
            .or(self.user_id.as_ref())
            .cloned()
            .ok_or_else(|| {
                AppError::Validation(
                    "Personnel ID not found in profile. Please contact admin.".to_string(),
                )
            })
    }

    pub fn display_id(&self) -> &str {
        self.personnel_id
            .as_deref()
            .or(self.id.as_deref())
            .or(self.user_id.as_deref())
            .unwrap_or("Not Found")
    }
}

/// Entry of the user list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl UserSummary {
    pub fn is_technician(&self) -> bool {
        Role::parse(self.role.as_deref()) == Some(Role::Technician)
    }
}

/// Users arrive as `[id, name, role, ...]` rows or as objects
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRecord {
    Positional(Vec<Value>),
    Named(NamedUser),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub personnel_id: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "ids::opt_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserRecord {
    pub fn into_summary(self) -> Option<UserSummary> {
        match self {
            UserRecord::Positional(row) => {
                let column = |idx: usize| row.get(idx).and_then(value_to_text);
                Some(UserSummary {
                    id: column(0)?,
                    name: column(1),
                    role: column(2),
                })
            }
            UserRecord::Named(user) => Some(UserSummary {
                id: user.personnel_id.or(user.username).or(user.id)?,
                name: user.name,
                role: user.role,
            }),
        }
    }
}

/// `GET /users` response body
#[derive(Debug, Deserialize)]
pub struct UserListResponse {
    #[serde(default)]
    pub users: Option<Vec<UserRecord>>,
}
