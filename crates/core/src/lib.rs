pub mod catalog;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::info;

use catalog::{schema, Catalog};
use domain::*;
use error::{Error, Result};

pub use command::Command;
pub use config::Config;
pub use dispatch::{Dispatcher, Embed, Reply};

/// Default location of the catalog document.
pub const DEFAULT_CATALOG_PATH: &str = "./image.json";

/// Handle to a JSON-backed image catalog.
///
/// Every operation reloads the document, applies its change and writes it
/// back while holding the store's lock, so concurrent commands on the same
/// store never lose each other's updates.
pub struct ImageStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ImageStore {
    /// Bind a store to `path`. The file is created on the first mutation.
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the catalog document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives on disk; a panicking holder leaves nothing half-written in memory.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` over a fresh snapshot without saving.
    fn read<T>(&self, f: impl FnOnce(&Catalog) -> Result<T>) -> Result<T> {
        let _guard = self.guard();
        let catalog = schema::load(&self.path)?;
        f(&catalog)
    }

    /// Load, mutate and save as one critical section.
    ///
    /// Nothing is written when `f` fails or leaves the catalog unchanged.
    fn update<T>(&self, f: impl FnOnce(&mut Catalog) -> Result<T>) -> Result<T> {
        let _guard = self.guard();
        let mut catalog = schema::load(&self.path)?;
        let before = catalog.clone();
        let out = f(&mut catalog)?;
        if catalog != before {
            schema::save(&self.path, &catalog)?;
        }
        Ok(out)
    }

    /// Copy of the whole catalog.
    pub fn snapshot(&self) -> Result<Catalog> {
        self.read(|catalog| Ok(catalog.clone()))
    }

    /// Resolve an identifier: exact ID first, then name substring.
    pub fn lookup(&self, identifier: &str) -> Result<Image> {
        self.read(|catalog| {
            catalog
                .resolve(identifier)
                .cloned()
                .ok_or_else(|| Error::ImageNotFound(identifier.to_string()))
        })
    }

    /// Add (or replace, by name) an image, creating its category when new.
    pub fn add_image(&self, name: &str, url: &str, category: Option<&str>) -> Result<AddedImage> {
        let added = self.update(|catalog| catalog.add_image(name, url, category))?;
        info!(
            name = %added.image.name,
            id = %added.image.id,
            category = %added.category_label,
            replaced = added.replaced.is_some(),
            "image added"
        );
        Ok(added)
    }

    /// Remove an image by exact ID or name. Returns whether anything was removed.
    pub fn delete_image(&self, identifier: &str) -> Result<bool> {
        let removed = self.update(|catalog| Ok(catalog.delete_image(identifier)))?;
        if let Some(image) = &removed {
            info!(name = %image.name, id = %image.id, "image deleted");
        }
        Ok(removed.is_some())
    }

    /// Move an image (exact ID or name) into `category` under a fresh ID.
    pub fn reclassify(&self, identifier: &str, category: &str) -> Result<Image> {
        let image = self.update(|catalog| catalog.reclassify(identifier, category))?;
        info!(name = %image.name, id = %image.id, category, "image reclassified");
        Ok(image)
    }

    /// One page of a category's images, sorted by ID.
    pub fn list_category(&self, category: &str, page: usize) -> Result<Page<Image>> {
        self.read(|catalog| catalog.list_category(category, page))
    }

    /// One page of every image, sorted by ID and labelled with its category.
    pub fn list_all(&self, page: usize) -> Result<Page<ListedImage>> {
        self.read(|catalog| catalog.list_all(page))
    }

    /// All categories, ordered by code.
    pub fn categories(&self) -> Result<Vec<Category>> {
        self.read(|catalog| Ok(catalog.list_categories()))
    }
}
