use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    #[serde(other)]
    Unknown,
}

impl AuditAction {
    pub fn icon(&self) -> &'static str {
        match self {
            AuditAction::Create => "✅",
            AuditAction::Update => "📝",
            AuditAction::Delete => "🗑️",
            AuditAction::Unknown => "❓",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AuditAction::Create => "green",
            AuditAction::Update => "blue",
            AuditAction::Delete => "red",
            AuditAction::Unknown => "gray",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Unknown => "UNKNOWN",
        }
    }

    /// Lenient parse used for stats buckets keyed by raw strings.
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "CREATE" => AuditAction::Create,
            "UPDATE" => AuditAction::Update,
            "DELETE" => AuditAction::Delete,
            _ => AuditAction::Unknown,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub actor_id: i64,
    #[serde(rename = "userName", default)]
    pub actor_name: String,
    #[serde(rename = "userEmail", default)]
    pub actor_email: String,
    pub action: AuditAction,
    #[serde(rename = "entityType")]
    pub entity_type: String,
    #[serde(rename = "entityId")]
    pub entity_id: i64,
    #[serde(rename = "entityData", default)]
    pub entity_data: Value,
    #[serde(rename = "previousData", default, skip_serializing_if = "Option::is_none")]
    pub previous_data: Option<Value>,
    pub timestamp: String,
    #[serde(rename = "ipAddress", default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(rename = "userAgent", default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditPagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<AuditEntry>,
    #[serde(default)]
    pub pagination: AuditPagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBucket {
    #[serde(rename = "_id")]
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    #[serde(default)]
    pub action_stats: Vec<StatBucket>,
    #[serde(default)]
    pub top_users: Vec<StatBucket>,
}

impl AuditStats {
    pub fn total_actions(&self) -> u64 {
        self.action_stats.iter().map(|bucket| bucket.count).sum()
    }

    pub fn count_for(&self, action: AuditAction) -> u64 {
        self.action_stats
            .iter()
            .filter(|bucket| AuditAction::from_raw(&bucket.key) == action)
            .map(|bucket| bucket.count)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStatsResponse {
    pub success: bool,
    #[serde(default)]
    pub data: AuditStats,
}

/// Query filters for `/api/audits`. Empty values are dropped before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilters {
    pub user_id: Option<i64>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub action: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AuditFilters {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        fn text(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        // Zero ids and pages are treated as unset, like empty strings.
        let candidates = [
            ("userId", self.user_id.filter(|v| *v != 0).map(|v| v.to_string())),
            ("entityType", text(&self.entity_type)),
            ("entityId", self.entity_id.filter(|v| *v != 0).map(|v| v.to_string())),
            ("action", text(&self.action)),
            ("startDate", text(&self.start_date)),
            ("endDate", text(&self.end_date)),
            ("page", self.page.filter(|v| *v != 0).map(|v| v.to_string())),
            ("limit", self.limit.filter(|v| *v != 0).map(|v| v.to_string())),
        ];

        candidates
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}
