use std::{collections::HashMap, sync::Arc};

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::{
    auth::{
        SessionKeys,
        credentials::{CredentialsProvider, PasswordCredentialsProvider},
        expired_session_cookie, session_cookie,
    },
    axum_http::error_responses::AppError,
    usecases::authentication::{AuthenticateOutcome, AuthenticationUseCase},
};
use invoicing::infra::db::{
    postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres,
};

pub const AFTER_LOGIN_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";

pub struct AuthenticationState<T>
where
    T: CredentialsProvider + Send + Sync,
{
    pub usecase: AuthenticationUseCase<T>,
    pub secure_cookie: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginErrorResponse {
    pub message: String,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    session_keys: Arc<SessionKeys>,
    secure_cookie: bool,
) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let credentials_provider =
        PasswordCredentialsProvider::new(Arc::new(user_repository), session_keys);
    let state = AuthenticationState {
        usecase: AuthenticationUseCase::new(Arc::new(credentials_provider)),
        secure_cookie,
    };

    router(Arc::new(state))
}

pub fn router<T>(state: Arc<AuthenticationState<T>>) -> Router
where
    T: CredentialsProvider + Send + Sync + 'static,
{
    Router::new()
        .route(LOGIN_PATH, post(login::<T>))
        .route("/logout", post(logout))
        .with_state(state)
}

pub async fn login<T>(
    State(state): State<Arc<AuthenticationState<T>>>,
    jar: CookieJar,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError>
where
    T: CredentialsProvider + Send + Sync,
{
    let response = match state.usecase.authenticate(fields).await? {
        AuthenticateOutcome::SignedIn(session) => (
            jar.add(session_cookie(&session, state.secure_cookie)),
            Redirect::to(AFTER_LOGIN_PATH),
        )
            .into_response(),
        AuthenticateOutcome::Rejected(message) => (
            StatusCode::UNAUTHORIZED,
            Json(LoginErrorResponse { message }),
        )
            .into_response(),
    };

    Ok(response)
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(expired_session_cookie()), Redirect::to(LOGIN_PATH))
}
