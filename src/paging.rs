//! Paged selectable lists
//!
//! Every wizard menu is a flat list of entries plus a footer of fixed
//! operations ("None", "Back", ...). When everything fits into the page
//! capacity the list is a single page. Otherwise the entries are split into
//! fixed-size pages, each page repeating the footer and ending with a
//! `<- current/total ->` caption. The last page is padded with spacers so
//! the footer stays on the same rows on every page.
//!
//! Paging is presentation only: the actions carried by entries are the same
//! whatever page they land on.

use thiserror::Error;

/// Rows reserved below the footer on a paged menu: a spacer and the caption.
const PAGE_FOOTER_ROWS: usize = 2;

/// Menu layout errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PagingError {
    #[error("Page size {capacity} too low to display menu with {footer} footer rows")]
    CapacityTooSmall { capacity: usize, footer: usize },
}

/// One row of a menu.
///
/// Rows without an action are not selectable (spacers, captions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry<T> {
    pub label: String,
    pub action: Option<T>,
}

impl<T> MenuEntry<T> {
    pub fn action(label: impl Into<String>, action: T) -> Self {
        Self {
            label: label.into(),
            action: Some(action),
        }
    }

    pub fn caption(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: None,
        }
    }

    pub fn spacer() -> Self {
        Self::caption(String::new())
    }

    pub fn is_selectable(&self) -> bool {
        self.action.is_some()
    }
}

/// Direction of cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

/// A menu split into pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedList<T> {
    pages: Vec<Vec<MenuEntry<T>>>,
}

impl<T: Clone> PagedList<T> {
    /// Lay out `entries` followed by `footer` within `capacity` rows per page.
    pub fn paginate(
        entries: Vec<MenuEntry<T>>,
        footer: Vec<MenuEntry<T>>,
        capacity: usize,
    ) -> Result<Self, PagingError> {
        if entries.len() + footer.len() <= capacity {
            let mut page = entries;
            page.extend(footer);
            return Ok(Self { pages: vec![page] });
        }

        let per_page = capacity
            .checked_sub(footer.len() + PAGE_FOOTER_ROWS)
            .filter(|n| *n >= 1)
            .ok_or(PagingError::CapacityTooSmall {
                capacity,
                footer: footer.len(),
            })?;

        let page_count = entries.len().div_ceil(per_page);
        let mut padded = entries;
        padded.resize_with(page_count * per_page, MenuEntry::spacer);

        let pages = padded
            .chunks(per_page)
            .enumerate()
            .map(|(index, chunk)| {
                let mut page = chunk.to_vec();
                page.extend(footer.iter().cloned());
                page.push(MenuEntry::spacer());
                page.push(MenuEntry::caption(page_caption(index, page_count)));
                page
            })
            .collect();

        Ok(Self { pages })
    }
}

impl<T> PagedList<T> {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Rows of one page; empty for an out of range index.
    pub fn page(&self, index: usize) -> &[MenuEntry<T>] {
        self.pages.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entry(&self, page: usize, row: usize) -> Option<&MenuEntry<T>> {
        self.page(page).get(row)
    }

    /// First selectable row of a page.
    pub fn first_selectable(&self, page: usize) -> Option<usize> {
        self.page(page).iter().position(MenuEntry::is_selectable)
    }

    /// Next selectable row from `row` in `step` direction, wrapping around.
    ///
    /// Returns `row` itself when it is the only selectable row.
    pub fn next_selectable(&self, page: usize, row: usize, step: Step) -> Option<usize> {
        let rows = self.page(page);
        let len = rows.len();
        if len == 0 {
            return None;
        }
        (1..=len)
            .map(|offset| match step {
                Step::Down => (row + offset) % len,
                Step::Up => (row + len - offset % len) % len,
            })
            .find(|candidate| rows[*candidate].is_selectable())
    }
}

/// `<- 2/3 ->`, arrows only where a neighbouring page exists.
fn page_caption(index: usize, count: usize) -> String {
    let prefix = if index != 0 { "<-" } else { "  " };
    let suffix = if index + 1 != count { "->" } else { "  " };
    format!("{prefix} {}/{count} {suffix}", index + 1)
}
