use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{AuditFilters, AuditResponse, AuditStats, AuditStatsResponse};

const AUDITS_PATH: &str = "/api/audits";

pub const DEFAULT_MY_AUDITS_LIMIT: u32 = 50;

/// Read-only access to the audit trail.
pub struct AuditService {
    client: Arc<ApiClient>,
}

impl AuditService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &AuditFilters) -> Result<AuditResponse, ApiError> {
        let response: AuditResponse = self
            .client
            .get_with_query(AUDITS_PATH, &filters.to_query())
            .await?;
        if !response.success {
            return Err(ApiError::Rejected("Could not load audit entries".to_string()));
        }
        Ok(response)
    }

    pub async fn stats(&self) -> Result<AuditStats, ApiError> {
        let response: AuditStatsResponse = self
            .client
            .get(&format!("{}/stats", AUDITS_PATH))
            .await?;
        if !response.success {
            return Err(ApiError::Rejected("Could not load audit stats".to_string()));
        }
        Ok(response.data)
    }

    /// Entries created by the signed-in user.
    pub async fn my_audits(&self, page: u32, limit: u32) -> Result<AuditResponse, ApiError> {
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        let response: AuditResponse = self
            .client
            .get_with_query(&format!("{}/my-audits", AUDITS_PATH), &query)
            .await?;
        if !response.success {
            return Err(ApiError::Rejected("Could not load audit entries".to_string()));
        }
        Ok(response)
    }
}
