use serde::{Deserialize, Serialize};

/// Category code reserved for images added without a category.
pub const UNCATEGORIZED_CODE: &str = "00";

/// Label shown for [`UNCATEGORIZED_CODE`] in listings.
pub const UNCATEGORIZED_LABEL: &str = "uncategorized";

/// Number of entries per listing page.
pub const PAGE_SIZE: usize = 20;

/// A catalog entry. `name` duplicates the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub name: String,
    /// `<category code><3-digit sequence>`, e.g. `01003`.
    pub id: String,
    /// Category code, e.g. `01`.
    pub category: String,
}

/// An image as shown in a cross-category listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedImage {
    pub image: Image,
    pub category_label: String,
}

/// One page of a sorted listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed.
    pub page: usize,
    pub total_pages: usize,
}

/// Result of `add_image`: the stored entry plus the category name it was filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedImage {
    pub image: Image,
    pub category_label: String,
    /// The entry that previously held this name, if any.
    pub replaced: Option<Image>,
}

/// A category name with its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub code: String,
}
