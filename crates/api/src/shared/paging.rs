const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

/// One based page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Result<Self, String> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if page == 0 {
            return Err("The page must be at least 1".into());
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(format!("The limit must be between 1 and {}", MAX_LIMIT));
        }
        Ok(Self { page, limit })
    }

    pub fn skip(&self) -> usize {
        (self.page - 1) * self.limit
    }
}
