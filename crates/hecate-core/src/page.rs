pub type PageNumber = u64;

/// One page of a paginated source
///
/// `next_page` equal to the page that was requested means the source is
/// exhausted. It is the only end-of-data signal: an empty page with an
/// advancing `next_page` is not the end.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: PageNumber,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page: PageNumber) -> Self {
        Self { items, next_page }
    }

    /// A page that reports no forward progress past `requested`
    pub fn last(items: Vec<T>, requested: PageNumber) -> Self {
        Self {
            items,
            next_page: requested,
        }
    }

    pub fn is_stalled(&self, requested: PageNumber) -> bool {
        self.next_page == requested
    }
}
