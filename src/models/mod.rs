pub mod audit;
pub mod persona;
pub mod user;

pub use audit::{
    AuditAction, AuditEntry, AuditFilters, AuditPagination, AuditResponse, AuditStats,
    AuditStatsResponse, StatBucket,
};
pub use persona::{CreatePersonRequest, Gender, PersonForm, PersonRecord, UpdatePersonRequest};
pub use user::{ApiResponse, AuthData, AuthResponse, LoginRequest, Profile, RegisterRequest, Session};
