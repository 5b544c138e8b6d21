use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, double_option, validate_name};
use crate::entity::role;
use crate::error::AppError;

pub const MAX_FULL_NAME_LEN: usize = 128;
pub const MAX_EMAIL_LEN: usize = 254;

/// Request body for creating a user account.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    /// Unique username (1-32 chars, alphanumeric, `.`, `-` and `_`).
    #[schema(example = "jdoe")]
    pub username: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(example = "jane.doe@example.com")]
    pub email: Option<String>,
    /// One of `admin`, `staff`, `employee`. Defaults to `employee`.
    #[schema(example = "staff")]
    pub role: Option<String>,
}

/// Partial update of a user account. Absent fields are left unchanged.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    /// Send `null` to clear.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    pub role: Option<String>,
    /// Deactivating a user who still holds assets is refused.
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    /// Case-insensitive substring match on username, full name and email.
    pub search: Option<String>,
    #[param(example = "staff")]
    pub role: Option<String>,
    pub is_active: Option<bool>,
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub email: Option<String>,
    #[schema(example = "staff")]
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            full_name: m.full_name,
            email: m.email,
            role: m.role,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, '.', '-' and '_'".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid_shape = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_shape || email.len() > MAX_EMAIL_LEN {
        return Err(AppError::Validation("Email address is invalid".into()));
    }
    Ok(())
}

pub fn validate_role(role_name: &str) -> Result<(), AppError> {
    if !role::ALL.contains(&role_name) {
        return Err(AppError::Validation(format!(
            "Role must be one of: {}",
            role::ALL.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_create_user(req: &CreateUserRequest) -> Result<(), AppError> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_name(&req.full_name, "Full name", MAX_FULL_NAME_LEN)?;
    if let Some(ref email) = req.email {
        validate_email(email)?;
    }
    if let Some(ref role_name) = req.role {
        validate_role(role_name)?;
    }
    Ok(())
}

pub fn validate_update_user(req: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(ref full_name) = req.full_name {
        validate_name(full_name, "Full name", MAX_FULL_NAME_LEN)?;
    }
    if let Some(Some(ref email)) = req.email {
        validate_email(email)?;
    }
    if let Some(ref role_name) = req.role {
        validate_role(role_name)?;
    }
    if let Some(ref password) = req.password {
        validate_password(password)?;
    }
    Ok(())
}
