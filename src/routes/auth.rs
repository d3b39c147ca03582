use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::auth::Session;
use crate::models::PublicUser;
use crate::ApiError;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
struct RegisterInput {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    message: &'static str,
    token: String,
    user: PublicUser,
}

impl AuthResponse {
    fn new(message: &'static str, session: Session) -> Self {
        Self {
            message,
            token: session.token,
            user: session.user,
        }
    }
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    // ---
    info!("POST /api/auth/register username={}", input.username);

    let session = state
        .auth
        .register(&input.username, &input.email, &input.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("Usuário criado com sucesso", session)),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse>, ApiError> {
    // ---
    info!("POST /api/auth/login");

    let session = state.auth.login(&input.email, &input.password).await?;
    Ok(Json(AuthResponse::new("Login realizado com sucesso", session)))
}
