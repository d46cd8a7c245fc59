use serde_json::Value;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{ApiResponse, CreatePersonRequest, PersonRecord, UpdatePersonRequest};

const PERSONAS_PATH: &str = "/api/personas";

/// CRUD over `/api/personas`.
pub struct PersonaService {
    client: Arc<ApiClient>,
}

impl PersonaService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<PersonRecord>, ApiError> {
        let response: ApiResponse<Vec<PersonRecord>> = self.client.get(PERSONAS_PATH).await?;
        if !response.success {
            return Err(ApiError::Rejected(response.failure_message()));
        }
        Ok(response.data.unwrap_or_default())
    }

    pub async fn get(&self, id: i64) -> Result<PersonRecord, ApiError> {
        let response: ApiResponse<PersonRecord> = self
            .client
            .get(&format!("{}/{}", PERSONAS_PATH, id))
            .await?;
        expect_data(response)
    }

    pub async fn create(&self, request: &CreatePersonRequest) -> Result<PersonRecord, ApiError> {
        let response: ApiResponse<PersonRecord> =
            self.client.post(PERSONAS_PATH, request).await?;
        let record = expect_data(response)?;
        tracing::info!("created persona {}", record.id);
        Ok(record)
    }

    /// Partial update; only the populated fields of `request` go on the wire.
    pub async fn update(
        &self,
        id: i64,
        request: &UpdatePersonRequest,
    ) -> Result<PersonRecord, ApiError> {
        let response: ApiResponse<PersonRecord> = self
            .client
            .put(&format!("{}/{}", PERSONAS_PATH, id), request)
            .await?;
        let record = expect_data(response)?;
        tracing::info!("updated persona {}", id);
        Ok(record)
    }

    pub async fn delete(&self, id: i64) -> Result<String, ApiError> {
        let response: ApiResponse<Value> = self
            .client
            .delete(&format!("{}/{}", PERSONAS_PATH, id))
            .await?;
        if !response.success {
            return Err(ApiError::Rejected(response.failure_message()));
        }
        tracing::info!("deleted persona {}", id);
        Ok(response.message)
    }
}

fn expect_data<T>(response: ApiResponse<T>) -> Result<T, ApiError> {
    match response.data {
        Some(data) if response.success => Ok(data),
        Some(_) => Err(ApiError::Rejected(response.failure_message())),
        None if !response.success => Err(ApiError::Rejected(response.failure_message())),
        None => Err(ApiError::Decode("response carried no data".to_string())),
    }
}
