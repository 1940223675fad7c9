//! Tunables consumed by the compilers.
//!
//! Compilers never read the global configuration themselves. Callers either
//! build a [`CompileOptions`] explicitly or take one [`CompileOptions::snapshot`]
//! at call entry, so concurrent runtime adjustments cannot change a
//! compilation halfway through.

use strata_config::{Config, DEFAULT_MAX_BATCH_ROWS, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Upper bound on rows per INSERT statement.
    pub max_batch_rows: usize,
    /// LIMIT substituted when an OFFSET is given without one.
    pub default_page_size: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_batch_rows: DEFAULT_MAX_BATCH_ROWS,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CompileOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_batch_rows: config.max_batch_rows(),
            default_page_size: config.default_page_size(),
        }
    }

    /// Reads the process-wide configuration once.
    pub fn snapshot() -> Self {
        Self::from_config(&strata_config::get_config())
    }

    pub fn with_max_batch_rows(mut self, rows: usize) -> Self {
        self.max_batch_rows = rows;
        self
    }

    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size;
        self
    }
}

/// LIMIT/OFFSET pair as requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            limit,
            offset,
        }
    }

    /// Applies the default page size rule: an offset past zero with no
    /// usable limit (absent or zero) gets `default_page_size` as its limit.
    pub fn resolve(self, default_page_size: u64) -> Self {
        let offset = self.offset.filter(|offset| *offset > 0);
        let limit = match (self.limit.filter(|limit| *limit > 0), offset) {
            (None, Some(_)) => Some(default_page_size),
            (limit, _) => limit,
        };
        Self {
            limit,
            offset,
        }
    }

    /// Renders ` LIMIT n[ OFFSET m]` after [`Pagination::resolve`].
    pub fn to_sql(self, default_page_size: u64) -> String {
        let resolved = self.resolve(default_page_size);
        let mut sql = String::new();

        if let Some(limit) = resolved.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = resolved.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_offset_without_limit_uses_default_page() {
        let page = Pagination::new(None, Some(40)).resolve(20);
        assert_eq!(page, Pagination::new(Some(20), Some(40)));

        let page = Pagination::new(Some(0), Some(40)).resolve(20);
        assert_eq!(page.limit, Some(20));
    }

    #[test]
    fn test_explicit_limit_kept() {
        let page = Pagination::new(Some(5), Some(10)).resolve(20);
        assert_eq!(page, Pagination::new(Some(5), Some(10)));
    }

    #[test]
    fn test_zero_offset_dropped() {
        let page = Pagination::new(None, Some(0)).resolve(20);
        assert_eq!(page, Pagination::default());
        assert_eq!(Pagination::new(Some(5), Some(0)).to_sql(20), " LIMIT 5");
    }

    #[test]
    fn test_pagination_sql() {
        assert_eq!(Pagination::default().to_sql(20), "");
        assert_eq!(Pagination::new(None, Some(3)).to_sql(7), " LIMIT 7 OFFSET 3");
    }

    #[test]
    #[serial]
    fn test_snapshot_reads_runtime_adjustment() {
        strata_config::set_max_batch_rows(3).unwrap();
        let snapshot = CompileOptions::snapshot();
        strata_config::set_max_batch_rows(DEFAULT_MAX_BATCH_ROWS).unwrap();

        assert_eq!(snapshot.max_batch_rows, 3);
        assert_eq!(CompileOptions::snapshot().max_batch_rows, DEFAULT_MAX_BATCH_ROWS);
    }
}
