//! HTTP handlers for the clients resource

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{Client, NewClient};
use crate::service::ClientStore;

/// Path the clients resource is mounted on
pub const CLIENTS_PATH: &str = "/clients/";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: ClientStore,
    pub request_timeout: Duration,
}

/// Request body for client registration
#[derive(Debug, Default, Deserialize)]
pub struct ClientSaveRequest {
    pub cpf: Option<String>,
    pub nome: Option<String>,
    pub idade: Option<i32>,
}

impl ClientSaveRequest {
    /// Convert to the domain value; every field is required
    pub fn into_model(self) -> Result<NewClient, StoreError> {
        let cpf = self.cpf.ok_or_else(|| StoreError::invalid("cpf is required"))?;
        let nome = self.nome.ok_or_else(|| StoreError::invalid("nome is required"))?;
        let idade = self.idade.ok_or_else(|| StoreError::invalid("idade is required"))?;
        Ok(NewClient::new(cpf, nome, idade))
    }
}

/// Client representation returned by lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: u64,
    pub cpf: String,
    pub nome: String,
    pub idade: i32,
}

impl From<&Client> for ClientResponse {
    fn from(client: &Client) -> Self {
        ClientResponse {
            id: client.id().value(),
            cpf: client.cpf().to_string(),
            nome: client.name().to_string(),
            idade: client.age(),
        }
    }
}

/// Query string of `GET /clients/`
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub cpf: Option<String>,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failure of a handler, rendered as status + JSON error body
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Rejected { status: StatusCode, message: String },
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(e @ StoreError::InvalidInput(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Store(e @ StoreError::StorageUnavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
            ApiError::Rejected { status, message } => (status, message),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Bound a store call by the configured timeout
async fn within<T, F>(timeout: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Store call timed out after {:?}", timeout);
            Err(StoreError::unavailable(format!("timed out after {:?}", timeout)))
        }
    }
}

/// `Location` of a client's lookup URL
pub fn lookup_location(cpf: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(cpf.as_bytes()).collect();
    format!("{}?cpf={}", CLIENTS_PATH, encoded)
}

/// `GET /clients/`: liveness without `cpf`, lookup with it
pub async fn get_clients(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Response, ApiError> {
    let cpf = match params.cpf {
        Some(cpf) => cpf,
        None => return Ok("ok".into_response()),
    };

    debug!("Looking up client with cpf {}", cpf);
    let found = within(state.request_timeout, state.store.find_by_cpf(&cpf)).await?;

    Ok(match found {
        Some(client) => (StatusCode::OK, Json(ClientResponse::from(&client))).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

/// `POST /clients/`: register a client
pub async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<ClientSaveRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let client = request.into_model()?;

    debug!("Registering client with cpf {}", client.cpf);
    let created = within(state.request_timeout, state.store.create(client)).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, lookup_location(created.cpf()))],
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_request_requires_every_field() {
        let full = ClientSaveRequest {
            cpf: Some("111".into()),
            nome: Some("A".into()),
            idade: Some(20),
        };
        assert_eq!(full.into_model().unwrap(), NewClient::new("111", "A", 20));

        let missing_cpf = ClientSaveRequest {
            nome: Some("A".into()),
            idade: Some(20),
            ..Default::default()
        };
        assert_eq!(
            missing_cpf.into_model().unwrap_err(),
            StoreError::invalid("cpf is required")
        );

        let missing_age = ClientSaveRequest {
            cpf: Some("111".into()),
            nome: Some("A".into()),
            idade: None,
        };
        assert!(missing_age.into_model().is_err());
    }

    #[test]
    fn test_lookup_location_encodes_cpf() {
        assert_eq!(lookup_location("12345678901"), "/clients/?cpf=12345678901");
        assert_eq!(lookup_location("123.456/78 9"), "/clients/?cpf=123.456%2F78+9");
    }

    #[tokio::test]
    async fn test_within_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, StoreError>(())
        };
        let err = within(Duration::from_millis(10), slow).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_error_status_mapping() {
        let response = ApiError::from(StoreError::invalid("cpf is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(StoreError::unavailable("down")).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
