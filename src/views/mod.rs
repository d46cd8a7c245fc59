pub mod audit_view;
pub mod charts;
pub mod persona_list;

pub use audit_view::{format_timestamp, AuditView};
pub use charts::{ChartBar, ChartSummary};
pub use persona_list::PersonList;
