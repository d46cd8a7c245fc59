use crate::models::PersonRecord;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Client-side pagination over the full person list.
#[derive(Debug, Clone)]
pub struct PersonList {
    records: Vec<PersonRecord>,
    current_page: usize,
    page_size: usize,
}

impl PersonList {
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replace the backing list; always back to page 1.
    pub fn set_records(&mut self, records: Vec<PersonRecord>) {
        self.records = records;
        self.current_page = 1;
    }

    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn total_items(&self) -> usize {
        self.records.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.records.len().div_ceil(self.page_size)
    }

    pub fn page_items(&self) -> &[PersonRecord] {
        let start = (self.current_page - 1) * self.page_size;
        if start >= self.records.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.records.len());
        &self.records[start..end]
    }

    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page` when it exists.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }
}

impl Default for PersonList {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
