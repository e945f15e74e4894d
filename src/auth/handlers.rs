use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginData, LoginRequest, PublicUser, RegisterRequest, LOGIN_RULES, REGISTER_RULES},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password_blocking, verify_against_dummy, verify_password_blocking},
    },
    error::{not_found, AppError, EMAIL_IN_USE},
    extract::Payload,
    response::ApiResponse,
    state::AppState,
    users::NewUser,
    validation::{escape, is_valid_email, validate},
};

pub const BAD_CREDENTIALS: &str = "Email or Password wrong.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register).fallback(not_found))
        .route("/auth/login", post(login).fallback(not_found))
        .route("/auth/me", get(me).fallback(not_found))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Payload(payload): Payload<RegisterRequest>,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let mut errors = validate(&payload, REGISTER_RULES);

    let name = escape(payload.name.trim());
    let email = escape(&payload.email.trim().to_lowercase());
    let password = escape(&payload.password);

    // Only worth a query once the address is well formed.
    if is_valid_email(payload.email.trim()) && state.users.email_exists(&email).await? {
        errors.push(EMAIL_IN_USE);
    }

    if !errors.is_empty() {
        warn!(errors = errors.len(), "registration rejected");
        return Err(AppError::Validation(errors));
    }

    let password_hash = hash_password_blocking(password).await?;
    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(ApiResponse::ok("Registration Success.", PublicUser::from(&user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Payload(payload): Payload<LoginRequest>,
) -> Result<ApiResponse<LoginData>, AppError> {
    let errors = validate(&payload, LOGIN_RULES);
    if !errors.is_empty() {
        warn!(errors = errors.len(), "login rejected");
        return Err(AppError::Validation(errors));
    }

    let email = escape(&payload.email.trim().to_lowercase());
    let password = escape(&payload.password);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        verify_against_dummy(password).await;
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::ok(
        "Login Success.",
        LoginData {
            user: PublicUser::from(&user),
            token,
        },
    ))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<PublicUser>, AppError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    Ok(ApiResponse::ok("Operation success", PublicUser::from(&user)))
}
