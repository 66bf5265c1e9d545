use std::future::Future;

use hecate_core::{Page, PageNumber};

/// Drain a paginated source into one sequence, in page order
///
/// Starts at `start_page` and follows each page's `next_page` until a page
/// reports `next_page` equal to the page that was requested. That stalled
/// cursor is the only stop condition: empty pages that still advance are
/// followed.
///
/// Fail-fast: the first error from `fetch_page` is returned as is and
/// everything fetched so far is dropped.
///
/// Terminates only if `fetch_page` eventually reports a stalled cursor.
/// Keeping `next_page` moving forward and then stopping is the caller's
/// obligation and is not checked here.
pub async fn fetch_all<T, E, F, Fut>(
    mut fetch_page: F,
    start_page: PageNumber,
    page_size: u64,
) -> Result<Vec<T>, E>
where
    F: FnMut(PageNumber, u64) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut ret = vec![];
    let mut cur_page = start_page;

    loop {
        let page = fetch_page(cur_page, page_size).await?;
        let stalled = page.is_stalled(cur_page);
        let next_page = page.next_page;

        ret.extend(page.items);

        if stalled {
            return Ok(ret);
        }
        cur_page = next_page;
    }
}
