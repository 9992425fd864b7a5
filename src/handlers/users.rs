//! # Users API Handlers
//!
//! Paginated listing (Admin only), update and soft delete of users.

use axum::{
    extract::{Multipart, Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ServiceError};
use crate::handlers::form::UserForm;
use crate::handlers::types::{ApiResponse, PaginatedResponse};
use crate::models::user::Model as UserModel;
use crate::pagination::PageRequest;
use crate::server::AppState;
use crate::services::{UserService, UserUpdate};

const USER_NOT_FOUND: &str = "User not found.";

/// Public view of a user; the password hash is never serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "User 1")]
    pub first_name: String,
    #[schema(example = "AdminUser 1")]
    pub last_name: String,
    #[schema(example = "mail1@Mail.com")]
    pub email: String,
    /// Public URL of the profile photo
    pub photo: Option<String>,
    pub role_id: i32,
    /// Creation timestamp (RFC 3339)
    #[schema(example = "2024-09-01T10:30:00+00:00")]
    pub created_at: String,
}

impl From<UserModel> for UserDto {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            photo: user.photo,
            role_id: user.role_id,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Page selection for `GET /users`. Non-numeric or non-positive values fall
/// back to the defaults.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UsersQuery {
    /// Page number, starting at 1
    #[param(example = "1")]
    pub page: Option<String>,
    /// Page size, 10 when omitted
    #[param(example = "10")]
    pub size_by_page: Option<String>,
}

/// Multipart fields accepted by `PATCH /users/{id}`
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UpdateUserForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Replacement profile photo
    #[schema(value_type = Option<String>, format = Binary)]
    pub photo: Option<Vec<u8>>,
}

fn user_service(state: &AppState) -> UserService<'_> {
    UserService::new(&state.db, &state.uri_builder, state.image_store.as_ref())
}

/// List users page by page
#[utoipa::path(
    get,
    path = "/users",
    security(("bearer_auth" = [])),
    params(UsersQuery),
    responses(
        (status = 200, description = "Requested page of users", body = PaginatedResponse<UserDto>),
        (status = 400, description = "Users could not be loaded", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Caller is not an Admin", body = ApiError)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<UsersQuery>,
) -> Result<Json<PaginatedResponse<UserDto>>, ApiError> {
    let request = PageRequest::from_query(query.page.as_deref(), query.size_by_page.as_deref());

    let listing = user_service(&state)
        .get_users(request)
        .await
        .map_err(|err| {
            ApiError::from_service(err, "Get data failed.", state.config.expose_error_details)
        })?;

    Ok(Json(PaginatedResponse::success(
        "Get data successfully.",
        listing.page.map(UserDto::from),
        listing.next_page_url,
        listing.previous_page_url,
    )))
}

/// Soft-delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted, data is true", body = ApiResponse<bool>),
        (status = 400, description = "Deletion failed, data is false", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "User not found, data is false", body = ApiError)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let Path(id) = id?;
    let service = user_service(&state);
    let expose = state.config.expose_error_details;

    let exists = service
        .user_exists(id)
        .await
        .map_err(|err| delete_failed(err, expose))?;
    if !exists {
        return Err(not_found(id));
    }

    service
        .delete_user(id)
        .await
        .map_err(|err| delete_failed(err, expose))?;

    Ok(Json(ApiResponse::success("Delete user successfully.", true)))
}

fn delete_failed(err: ServiceError, expose_details: bool) -> ApiError {
    let mut error = ApiError::from_service(err, "Delete user failed.", expose_details);
    error.data = Some(serde_json::Value::Bool(false));
    error
}

/// Update a user's names and photo
#[utoipa::path(
    patch,
    path = "/users/{id}",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User id")),
    request_body(content = UpdateUserForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated user", body = ApiResponse<UserDto>),
        (status = 400, description = "Update failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<i32>, PathRejection>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Path(id) = id?;
    let service = user_service(&state);
    let expose = state.config.expose_error_details;

    let exists = service
        .user_exists(id)
        .await
        .map_err(|err| ApiError::from_service(err, "Update user failed.", expose))?;
    if !exists {
        return Err(not_found(id));
    }

    let form = UserForm::read(multipart).await?;
    let changes = UserUpdate {
        first_name: form.text("firstName"),
        last_name: form.text("lastName"),
        photo: form.photo,
    };

    let user = service
        .update_user(id, changes)
        .await
        .map_err(|err| ApiError::from_service(err, "Update user failed.", expose))?;

    Ok(Json(ApiResponse::success(
        "User updated successfully.",
        UserDto::from(user),
    )))
}

fn not_found(id: i32) -> ApiError {
    ApiError::from_envelope(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        ApiResponse::failure(USER_NOT_FOUND, format!("User {id} not found")).with_data(false),
    )
}
