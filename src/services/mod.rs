pub mod audit_service;
pub mod auth_service;
pub mod persona_service;

pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use persona_service::PersonaService;
