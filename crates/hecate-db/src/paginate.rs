use hecate_core::{Page, PageNumber};

use crate::{Database, DbError, DbResult};

impl Database {
    /// Page `page` of `page_size` values of `table`, in key order
    ///
    /// Reads one value past the page to tell whether more rows remain, so
    /// the final page reports `next_page == page`.
    pub fn paginate_table_by_page<K, V>(
        table: &impl redb_bincode::ReadableTable<K, V>,
        page: PageNumber,
        page_size: u64,
    ) -> DbResult<Page<V>>
    where
        K: bincode::Decode + bincode::Encode,
        V: bincode::Decode + bincode::Encode,
    {
        let skip = page.checked_mul(page_size).ok_or(DbError::Overflow)?;
        let page_size = usize::try_from(page_size).map_err(|_| DbError::Overflow)?;

        let mut ret = vec![];
        let mut seen = 0u64;

        for record in table.range::<K>(..)? {
            let (_, v) = record?;

            if seen < skip {
                seen += 1;
                continue;
            }

            if page_size <= ret.len() {
                let next_page = page.checked_add(1).ok_or(DbError::Overflow)?;
                return Ok(Page::new(ret, next_page));
            }

            ret.push(v.value());
        }

        Ok(Page::last(ret, page))
    }
}
