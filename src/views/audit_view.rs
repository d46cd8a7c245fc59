use chrono::{DateTime, Local, TimeZone};

use crate::models::{AuditEntry, AuditFilters, AuditPagination, AuditResponse};

pub const DEFAULT_AUDIT_PAGE_SIZE: u32 = 10;

/// Pagination state of the audit screen. The backend does the paging; this
/// keeps track of where we are and what to ask for next.
#[derive(Debug, Clone)]
pub struct AuditView {
    entries: Vec<AuditEntry>,
    current_page: u32,
    total_pages: u32,
    total_items: u64,
    items_per_page: u32,
}

impl AuditView {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            entries: Vec::new(),
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn filters(&self) -> AuditFilters {
        AuditFilters::page(self.current_page, self.items_per_page)
    }

    pub fn apply(&mut self, response: AuditResponse) {
        let AuditPagination { total, pages, .. } = response.pagination;
        self.entries = response.data;
        self.total_pages = pages;
        self.total_items = total;
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Move to `page` if it is in range; the caller reloads on `true`.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page >= 1 && page <= self.total_pages {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    /// Page numbers to offer: current ±2, clamped to what exists.
    pub fn page_window(&self) -> Vec<u32> {
        let start = self.current_page.saturating_sub(2).max(1);
        let end = self.total_pages.min(self.current_page + 2);
        (start..=end).collect()
    }
}

impl Default for AuditView {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_PAGE_SIZE)
    }
}

/// Render a backend timestamp as `d/m/yyyy, H:MM:SS` in local time.
/// Unparseable input is returned as-is.
pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed
            .with_timezone(tz)
            .format("%-d/%-m/%Y, %-H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
