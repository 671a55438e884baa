use std::fmt::Write;

use tracing::{debug, warn};

use crate::command::{self, Command};
use crate::domain::{Image, ListedImage, Page};
use crate::error::{Error, Result};
use crate::ImageStore;

/// Image attachment of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub image_url: String,
}

/// Platform-neutral response to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub embed: Option<Embed>,
    /// Visible only to the caller.
    pub ephemeral: bool,
}

impl Reply {
    fn private(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embed: None,
            ephemeral: true,
        }
    }

    fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embed: None,
            ephemeral: false,
        }
    }
}

/// Routes commands to an [`ImageStore`] and renders the replies.
pub struct Dispatcher {
    store: ImageStore,
}

impl Dispatcher {
    pub fn new(store: ImageStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Handle a raw chat message. `None` when the message is not a command.
    pub fn handle_message(&self, message: &str, prefix: &str, author: Option<&str>) -> Option<Reply> {
        match Command::parse_message(message, prefix) {
            Ok(Some(command)) => Some(self.handle(&command, author)),
            Ok(None) => None,
            Err(err) => Some(error_reply(&err, first_word(message, prefix))),
        }
    }

    /// Execute a command. Failures become private replies; nothing here panics or aborts.
    pub fn handle(&self, command: &Command, author: Option<&str>) -> Reply {
        debug!(verb = command.verb(), "dispatching command");
        match self.try_handle(command, author) {
            Ok(reply) => reply,
            Err(err) => {
                if is_internal(&err) {
                    warn!(verb = command.verb(), error = %err, "command failed");
                }
                error_reply(&err, Some(command.verb()))
            }
        }
    }

    /// Execute a command, surfacing failures to the caller instead of rendering them.
    pub fn try_handle(&self, command: &Command, author: Option<&str>) -> Result<Reply> {
        command.validate()?;
        match command {
            Command::Ping => Ok(Reply::public("Pong!")),
            Command::Lookup { identifier } => {
                let image = self.store.lookup(identifier)?;
                Ok(Reply {
                    content: String::new(),
                    embed: Some(Embed {
                        title: Some(format!("Image: {}", image.name)),
                        image_url: image.url,
                    }),
                    ephemeral: true,
                })
            }
            Command::Send { identifier } => {
                let image = self.store.lookup(identifier)?;
                Ok(Reply {
                    content: author.map(|a| format!("From {a}")).unwrap_or_default(),
                    embed: Some(Embed {
                        title: None,
                        image_url: image.url,
                    }),
                    ephemeral: false,
                })
            }
            Command::AddImage {
                name,
                url,
                category,
            } => {
                let added = self.store.add_image(name, url, category.as_deref())?;
                let mut content = format!(
                    "Added image {:?} to category {} with ID {} ({})",
                    added.image.name, added.category_label, added.image.id, added.image.url
                );
                if let Some(old) = &added.replaced {
                    let _ = write!(content, "; replaced the previous entry {}", old.id);
                }
                Ok(Reply::private(content))
            }
            Command::DeleteImage { identifier } => {
                if self.store.delete_image(identifier)? {
                    Ok(Reply::private(format!("Deleted {identifier:?}.")))
                } else {
                    Err(Error::ImageNotFound(identifier.clone()))
                }
            }
            Command::ListCategory { category, page } => {
                let listing = self.store.list_category(category, *page)?;
                Ok(Reply::private(render_category_page(category, &listing)))
            }
            Command::ListAll { page } => {
                let listing = self.store.list_all(*page)?;
                Ok(Reply::private(render_all_page(&listing)))
            }
            Command::Reclassify {
                identifier,
                category,
            } => {
                let image = self.store.reclassify(identifier, category)?;
                Ok(Reply::private(format!(
                    "Moved {:?} to {:?}; new ID is {}",
                    image.name, category, image.id
                )))
            }
            Command::Categories => {
                let categories = self.store.categories()?;
                if categories.is_empty() {
                    return Ok(Reply::private("No categories yet."));
                }
                let mut content = String::from("Categories:\n");
                for category in &categories {
                    let _ = writeln!(content, "{}  {}", category.code, category.name);
                }
                Ok(Reply::private(content.trim_end().to_string()))
            }
        }
    }
}

fn image_line(out: &mut String, image: &Image) {
    let _ = writeln!(out, "ID: {}   Name: {}", image.id, image.name);
}

/// Listing of one category: a header line, the entries, then the page footer.
pub fn render_category_page(category: &str, listing: &Page<Image>) -> String {
    let mut out = format!("{category}:\n");
    for image in &listing.items {
        image_line(&mut out, image);
    }
    let _ = write!(out, "\nPage {}/{}", listing.page, listing.total_pages);
    out
}

/// Cross-category listing with a header wherever the category code changes.
pub fn render_all_page(listing: &Page<ListedImage>) -> String {
    let mut out = String::new();
    let mut last_code: Option<&str> = None;
    for entry in &listing.items {
        if last_code != Some(entry.image.category.as_str()) {
            last_code = Some(entry.image.category.as_str());
            let _ = write!(out, "\n{}:\n", entry.category_label);
        }
        image_line(&mut out, &entry.image);
    }
    let _ = write!(out, "\nPage {}/{}", listing.page, listing.total_pages);
    out.trim_start().to_string()
}

fn is_internal(err: &Error) -> bool {
    matches!(err, Error::Io(_) | Error::Deserialize(_) | Error::Persist(_))
}

fn first_word<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    message
        .trim_start()
        .strip_prefix(prefix)?
        .split_whitespace()
        .next()
}

/// User-facing text for an error.
pub fn error_reply(err: &Error, verb: Option<&str>) -> Reply {
    let usage = verb
        .and_then(command::usage)
        .map(|u| format!(" Usage: {u}"))
        .unwrap_or_default();

    let content = match err {
        Error::ImageNotFound(identifier) => format!("Image {identifier:?} not found."),
        Error::CategoryNotFound(category) => format!("Category {category:?} not found."),
        Error::PageOutOfRange { total_pages, .. } => {
            format!("Page out of range. There are {total_pages} page(s) in total.")
        }
        Error::MissingArgument(name) => format!("Missing required argument `{name}`.{usage}"),
        Error::InvalidArgument { name, value } => {
            format!("Invalid value {value:?} for `{name}`.{usage}")
        }
        Error::UnknownCommand(verb) => format!("Unknown command `{verb}`."),
        Error::CategoryCodesExhausted | Error::ImageIdsExhausted(_) => err.to_string(),
        Error::Io(_) | Error::Deserialize(_) | Error::Persist(_) => {
            "The image catalog could not be read or saved. Please try again later.".to_string()
        }
    };
    Reply::private(content)
}
