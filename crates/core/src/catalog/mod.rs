pub mod allocator;
pub mod schema;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::*;
use crate::error::{Error, Result};

/// In-memory image catalog as stored in the JSON document.
///
/// Both maps are ordered by name, so every "first match" scan below visits
/// entries in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub images: BTreeMap<String, Image>,
    /// category name → 2-digit code
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

impl Catalog {
    // ── Lookup ───────────────────────────────────────────────────────

    pub fn find_by_id(&self, id: &str) -> Option<&Image> {
        self.images.values().find(|image| image.id == id)
    }

    /// First image whose name contains `query`, ignoring case.
    pub fn find_by_name(&self, query: &str) -> Option<&Image> {
        if query.is_empty() {
            return None;
        }
        let needle = query.to_lowercase();
        self.images
            .values()
            .find(|image| image.name.to_lowercase().contains(&needle))
    }

    /// Exact ID match first, then case-insensitive name substring.
    pub fn resolve(&self, identifier: &str) -> Option<&Image> {
        self.find_by_id(identifier)
            .or_else(|| self.find_by_name(identifier))
    }

    /// Key of the image whose ID or name equals `identifier` exactly (ID wins).
    fn exact_key(&self, identifier: &str) -> Option<String> {
        self.images
            .iter()
            .find(|(_, image)| image.id == identifier)
            .or_else(|| self.images.iter().find(|(_, image)| image.name == identifier))
            .map(|(key, _)| key.clone())
    }

    // ── Categories ───────────────────────────────────────────────────

    /// Code for an exact category name.
    pub fn category_code(&self, name: &str) -> Option<&str> {
        self.categories.get(name).map(String::as_str)
    }

    /// Display name for a category code.
    pub fn category_label(&self, code: &str) -> String {
        if code == UNCATEGORIZED_CODE {
            return UNCATEGORIZED_LABEL.to_string();
        }
        self.categories
            .iter()
            .find(|(_, c)| c.as_str() == code)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string())
    }

    /// All categories ordered by code.
    pub fn list_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self
            .categories
            .iter()
            .map(|(name, code)| Category {
                name: name.clone(),
                code: code.clone(),
            })
            .collect();
        categories.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.name.cmp(&b.name)));
        categories
    }

    /// Code for `name`, registering a fresh code when the name is new.
    fn ensure_category(&mut self, name: &str) -> Result<String> {
        if let Some(code) = self.categories.get(name) {
            return Ok(code.clone());
        }
        let code = allocator::next_category_code(&self.categories)?;
        self.categories.insert(name.to_string(), code.clone());
        Ok(code)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Insert an image, assigning its category code and ID.
    ///
    /// An empty or absent `category` files the image under
    /// [`UNCATEGORIZED_CODE`]. An existing image with the same name is
    /// replaced. A blank `name` or `url` is rejected.
    pub fn add_image(&mut self, name: &str, url: &str, category: Option<&str>) -> Result<AddedImage> {
        if name.trim().is_empty() {
            return Err(Error::MissingArgument("name"));
        }
        if url.trim().is_empty() {
            return Err(Error::MissingArgument("url"));
        }
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let code = match category {
            Some(category) => self.ensure_category(category)?,
            None => UNCATEGORIZED_CODE.to_string(),
        };
        let id = allocator::next_image_id(&self.images, &code, Some(name))?;

        let image = Image {
            url: url.to_string(),
            name: name.to_string(),
            id,
            category: code,
        };
        let replaced = self.images.insert(name.to_string(), image.clone());
        let category_label = category
            .map(str::to_string)
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string());

        Ok(AddedImage {
            image,
            category_label,
            replaced,
        })
    }

    /// Remove the image whose ID or name equals `identifier`.
    pub fn delete_image(&mut self, identifier: &str) -> Option<Image> {
        let key = self.exact_key(identifier)?;
        self.images.remove(&key)
    }

    /// Move an image into `category`, giving it a fresh ID there.
    pub fn reclassify(&mut self, identifier: &str, category: &str) -> Result<Image> {
        let key = self
            .exact_key(identifier)
            .ok_or_else(|| Error::ImageNotFound(identifier.to_string()))?;

        let category = category.trim();
        let code = if category.is_empty() {
            UNCATEGORIZED_CODE.to_string()
        } else {
            self.ensure_category(category)?
        };
        let id = allocator::next_image_id(&self.images, &code, Some(key.as_str()))?;

        let image = self
            .images
            .get_mut(&key)
            .ok_or_else(|| Error::ImageNotFound(identifier.to_string()))?;
        image.category = code;
        image.id = id;
        Ok(image.clone())
    }

    // ── Listings ─────────────────────────────────────────────────────

    /// Images of one category (exact name), sorted by ID.
    pub fn list_category(&self, category: &str, page: usize) -> Result<Page<Image>> {
        let code = self
            .category_code(category)
            .ok_or_else(|| Error::CategoryNotFound(category.to_string()))?;

        let mut images: Vec<Image> = self
            .images
            .values()
            .filter(|image| image.category == code)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.id.cmp(&b.id));
        paginate(images, page)
    }

    /// Every image sorted by ID, each tagged with its category label.
    pub fn list_all(&self, page: usize) -> Result<Page<ListedImage>> {
        let mut images: Vec<&Image> = self.images.values().collect();
        images.sort_by(|a, b| a.id.cmp(&b.id));

        let page = paginate(images, page)?;
        Ok(Page {
            items: page
                .items
                .into_iter()
                .map(|image| ListedImage {
                    category_label: self.category_label(&image.category),
                    image: image.clone(),
                })
                .collect(),
            page: page.page,
            total_pages: page.total_pages,
        })
    }
}

/// Cut a sorted listing into [`PAGE_SIZE`] windows and return the 1-indexed `page`.
pub fn paginate<T>(items: Vec<T>, page: usize) -> Result<Page<T>> {
    let total_pages = items.len().div_ceil(PAGE_SIZE);
    if page < 1 || page > total_pages {
        return Err(Error::PageOutOfRange { page, total_pages });
    }

    let items = items
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    Ok(Page {
        items,
        page,
        total_pages,
    })
}
