use std::{collections::HashMap, sync::Arc};

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, put},
};
use tracing::info;

use crate::{
    auth::{AuthUser, SessionKeys, require_session},
    axum_http::error_responses::AppError,
    usecases::invoices::{InvoiceListing, InvoiceUseCase},
};
use invoicing::{
    domain::{
        repositories::invoices::InvoiceRepository, value_objects::invoices::InvoiceFormOutcome,
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad, repositories::invoices::InvoicePostgres,
        },
        view_cache::ViewCache,
    },
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    view_cache: Arc<ViewCache<InvoiceListing>>,
    session_keys: Arc<SessionKeys>,
) -> Router {
    let invoice_repository = InvoicePostgres::new(Arc::clone(&db_pool));
    let invoice_usecase = InvoiceUseCase::new(Arc::new(invoice_repository), view_cache);

    router(Arc::new(invoice_usecase), session_keys)
}

pub fn router<T>(
    invoice_usecase: Arc<InvoiceUseCase<T>>,
    session_keys: Arc<SessionKeys>,
) -> Router
where
    T: InvoiceRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/:id", put(update::<T>).delete(remove::<T>))
        .route_layer(middleware::from_fn_with_state(session_keys, require_session))
        .with_state(invoice_usecase)
}

pub async fn list<T>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<T>>>,
    _auth: AuthUser,
) -> Result<Json<Arc<InvoiceListing>>, AppError>
where
    T: InvoiceRepository + Send + Sync,
{
    let invoices = invoice_usecase.list_invoices().await?;
    Ok(Json(invoices))
}

pub async fn create<T>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<T>>>,
    auth: AuthUser,
    Form(fields): Form<HashMap<String, String>>,
) -> Response
where
    T: InvoiceRepository + Send + Sync,
{
    info!(user_id = %auth.user_id, "invoices router: create requested");
    outcome_response(invoice_usecase.create_invoice(&fields).await)
}

pub async fn update<T>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<T>>>,
    auth: AuthUser,
    Path(invoice_id): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response
where
    T: InvoiceRepository + Send + Sync,
{
    info!(user_id = %auth.user_id, %invoice_id, "invoices router: update requested");
    outcome_response(invoice_usecase.update_invoice(invoice_id, &fields).await)
}

pub async fn remove<T>(
    State(invoice_usecase): State<Arc<InvoiceUseCase<T>>>,
    auth: AuthUser,
    Path(invoice_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    T: InvoiceRepository + Send + Sync,
{
    info!(user_id = %auth.user_id, %invoice_id, "invoices router: delete requested");
    invoice_usecase.delete_invoice(invoice_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Success navigates back to the listing; failures hand the form state back for inline display.
pub fn outcome_response(outcome: InvoiceFormOutcome) -> Response {
    match outcome {
        InvoiceFormOutcome::Success { redirect_to } => Redirect::to(&redirect_to).into_response(),
        InvoiceFormOutcome::Failure(state) => {
            let status = if state.errors.is_some() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(state)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{
            Request,
            header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION},
        },
    };
    use chrono::NaiveDate;
    use invoicing::domain::{
        entities::{invoices::InvoiceEntity, users::UserEntity},
        repositories::invoices::MockInvoiceRepository,
        value_objects::invoices::{FieldErrors, FormState, InvoiceOperation},
    };
    use tower::ServiceExt;

    const SECRET: &str = "supersecretsessionsecretforunittesting123";

    fn session_keys() -> Arc<SessionKeys> {
        Arc::new(SessionKeys::new(SECRET, 3600))
    }

    fn session_token() -> String {
        let user = UserEntity {
            id: "410544b2-4001-4271-9855-fec4b6a6442a".to_string(),
            name: "User".to_string(),
            email: "user@nextmail.com".to_string(),
            password: String::new(),
        };
        session_keys().issue(&user).unwrap().token
    }

    fn sample_invoice(id: &str) -> InvoiceEntity {
        InvoiceEntity {
            id: id.to_string(),
            customer_id: "c1".to_string(),
            amount: 1000,
            status: "pending".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn app(invoice_repo: MockInvoiceRepository) -> Router {
        let usecase = InvoiceUseCase::new(Arc::new(invoice_repo), Arc::new(ViewCache::new()));
        router(Arc::new(usecase), session_keys())
    }

    fn listing_request() -> axum::http::request::Builder {
        Request::builder().method("GET").uri("/")
    }

    #[tokio::test]
    async fn listing_without_session_is_unauthorized() {
        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo.expect_list_invoices().never();

        let response = app(invoice_repo)
            .oneshot(listing_request().body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_with_forged_token_is_unauthorized() {
        let forged = SessionKeys::new("someothersecretthatisalsolongenough", 3600)
            .issue(&UserEntity {
                id: "u1".to_string(),
                name: "User".to_string(),
                email: "user@nextmail.com".to_string(),
                password: String::new(),
            })
            .unwrap()
            .token;
        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo.expect_list_invoices().never();

        let response = app(invoice_repo)
            .oneshot(
                listing_request()
                    .header(AUTHORIZATION, format!("Bearer {forged}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_with_bearer_session_returns_invoices() {
        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_list_invoices()
            .times(1)
            .returning(|| Box::pin(async { Ok(vec![sample_invoice("i1")]) }));

        let response = app(invoice_repo)
            .oneshot(
                listing_request()
                    .header(AUTHORIZATION, format!("Bearer {}", session_token()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let listing: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(listing[0]["id"], "i1");
        assert_eq!(listing[0]["amount"], 1000);
        assert_eq!(listing[0]["date"], "2024-01-15");
    }

    #[tokio::test]
    async fn create_with_session_cookie_redirects_to_listing() {
        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo
            .expect_create_invoice()
            .times(1)
            .returning(|invoice| Box::pin(async move { Ok(invoice.id) }));

        let response = app(invoice_repo)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(COOKIE, format!("session={}", session_token()))
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("customerId=c1&amount=10.50&status=paid"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/dashboard/invoices"
        );
    }

    #[tokio::test]
    async fn invalid_update_returns_field_errors() {
        let mut invoice_repo = MockInvoiceRepository::new();
        invoice_repo.expect_update_invoice().never();

        let response = app(invoice_repo)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/i1")
                    .header(AUTHORIZATION, format!("Bearer {}", session_token()))
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("customerId=c1&amount=0&status=paid"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let state: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(state["errors"]["amount"].is_array());
        assert_eq!(
            state["message"],
            "Missing Fields. Failed to Update Invoice."
        );
    }

    #[test]
    fn success_redirects_to_the_listing() {
        let response = outcome_response(InvoiceFormOutcome::Success {
            redirect_to: "/dashboard/invoices".to_string(),
        });

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/dashboard/invoices"
        );
    }

    #[test]
    fn validation_failure_is_unprocessable() {
        let response = outcome_response(InvoiceFormOutcome::Failure(FormState::invalid(
            InvoiceOperation::Create,
            FieldErrors::default(),
        )));

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_failure_is_internal_error() {
        let response = outcome_response(InvoiceFormOutcome::Failure(FormState::database_error(
            InvoiceOperation::Update,
        )));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
