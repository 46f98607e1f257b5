use crate::models::MovieRecord;

pub const PAGE_SIZE: usize = 10;

/// Ordered, read-only collection of every loaded movie.
///
/// There is no secondary index: lookups and searches scan in load order.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<MovieRecord>,
}

impl Catalog {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    /// First record with exactly this id. Duplicate ids resolve to the earliest one.
    pub fn find_by_id(&self, id: &str) -> Option<&MovieRecord> {
        self.records.iter().find(|movie| movie.id == id)
    }

    /// Case-insensitive title substring match, one page of `PAGE_SIZE` at a time.
    ///
    /// Pages are 1-based. Pages below 1 return the first page and pages past
    /// the end return an empty slice.
    pub fn search(&self, title: &str, page: i64) -> Vec<&MovieRecord> {
        let term = title.to_lowercase();
        let matches: Vec<&MovieRecord> = self
            .records
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&term))
            .collect();

        let (start, end) = page_bounds(page, matches.len());
        matches[start..end].to_vec()
    }
}

fn page_bounds(page: i64, len: usize) -> (usize, usize) {
    let start = page
        .saturating_sub(1)
        .saturating_mul(PAGE_SIZE as i64)
        .clamp(0, len as i64) as usize;
    let end = start.saturating_add(PAGE_SIZE).min(len);
    (start, end)
}
