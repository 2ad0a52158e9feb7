// User entities

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::utils::deserialize_lenient_string;
use crate::value_objects::{Capabilities, Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub id: String,
    pub email: String,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub assigned_sites: Vec<String>,
    #[serde(default)]
    pub assigned_vehicles: Vec<String>,
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl UserProfile {
    pub fn role(&self) -> Role {
        self.role.as_deref().map(Role::from).unwrap_or(Role::Viewer)
    }

    pub fn email_domain(&self) -> Option<&str> {
        self.email
            .split_once('@')
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
    }
}

/// Who is asking and in which timezone. Passed explicitly into every
/// query and command.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user: Option<UserProfile>,
    pub role: Role,
    pub offset: FixedOffset,
}

impl UserContext {
    pub fn new(user: Option<UserProfile>, offset: FixedOffset) -> Self {
        let role = user.as_ref().map(UserProfile::role).unwrap_or(Role::Viewer);
        Self { user, role, offset }
    }

    pub fn anonymous(offset: FixedOffset) -> Self {
        Self::new(None, offset)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.email.as_str())
    }
}

/// Per email-domain data access rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub domain: String,
    #[serde(default)]
    pub show_all_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by_customer: Option<String>,
}

impl AccessPolicy {
    pub fn normalized(&self) -> Self {
        Self {
            domain: self.domain.trim().to_lowercase(),
            show_all_data: self.show_all_data,
            filter_by_customer: self
                .filter_by_customer
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserView {
    pub user: Option<UserProfile>,
    pub role: Role,
    pub capabilities: Capabilities,
    pub utc_offset_minutes: i32,
}

impl From<&UserContext> for CurrentUserView {
    fn from(ctx: &UserContext) -> Self {
        Self {
            user: ctx.user.clone(),
            role: ctx.role,
            capabilities: ctx.capabilities(),
            utc_offset_minutes: ctx.offset.local_minus_utc() / 60,
        }
    }
}
