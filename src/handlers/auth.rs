//! # Auth API Handlers
//!
//! Registration, login and the current-user endpoint.

use axum::{
    extract::{Multipart, State, rejection::JsonRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::form::UserForm;
use crate::handlers::types::ApiResponse;
use crate::handlers::users::UserDto;
use crate::server::AppState;
use crate::services::{AuthService, AuthenticatedUser, RegisterUser};

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "mail1@Mail.com")]
    pub email: String,
    #[schema(example = "Admin123")]
    pub password: String,
}

/// Multipart fields accepted by `POST /auth/register`
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RegisterForm {
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "Gómez")]
    pub last_name: String,
    #[schema(example = "ana@example.org")]
    pub email: String,
    pub password: String,
    /// Optional profile photo
    #[schema(value_type = Option<String>, format = Binary)]
    pub photo: Option<Vec<u8>>,
}

/// User plus bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseDto {
    pub user: UserDto,
    /// Role name carried by the token
    #[schema(example = "Standard")]
    pub role: String,
    /// HS256 access token for the `Authorization: Bearer` header
    pub token: String,
}

impl From<AuthenticatedUser> for AuthResponseDto {
    fn from(auth: AuthenticatedUser) -> Self {
        Self {
            user: UserDto::from(auth.user),
            role: auth.role,
            token: auth.token,
        }
    }
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(
        &state.db,
        &state.config,
        state.image_store.as_ref(),
        state.mailer.as_ref(),
    )
}

/// Data of the signed-in user
#[utoipa::path(
    get,
    path = "/auth/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed-in user", body = ApiResponse<UserDto>),
        (status = 400, description = "User could not be loaded", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    match auth_service(&state).current_user(&user).await {
        Ok(model) => Ok(Json(ApiResponse::success(
            "Get data successfully.",
            UserDto::from(model),
        ))),
        Err(err) => {
            let mut error =
                ApiError::from_service(err, "Get data failed.", state.config.expose_error_details);
            error.status = axum::http::StatusCode::BAD_REQUEST;
            Err(error)
        }
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body(content = RegisterForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "User created, with access token", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Registration failed", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AuthResponseDto>>, ApiError> {
    let form = UserForm::read(multipart)
        .await
        .map_err(|err| ApiError { message: "Error Register.".into(), ..err })?;

    let request = RegisterUser {
        first_name: form.text_or_empty("firstName"),
        last_name: form.text_or_empty("lastName"),
        email: form.text_or_empty("email"),
        password: form.text_or_empty("password"),
        photo: form.photo,
    };

    let registered = auth_service(&state)
        .register(request)
        .await
        .map_err(|err| {
            ApiError::from_service(err, "Error Register.", state.config.expose_error_details)
        })?;

    Ok(Json(ApiResponse::success(
        "Register successfully.",
        AuthResponseDto::from(registered),
    )))
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User with access token", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Malformed request", body = ApiError),
        (status = 404, description = "Unknown email or wrong password", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthResponseDto>>, ApiError> {
    let Json(request) = payload?;

    let authenticated = auth_service(&state)
        .login(&request.email, &request.password)
        .await
        .map_err(|err| {
            ApiError::from_service(
                err,
                "User or password do not exist.",
                state.config.expose_error_details,
            )
        })?;

    Ok(Json(ApiResponse::success(
        "Login successfully.",
        AuthResponseDto::from(authenticated),
    )))
}
