use crate::error::{Error, Result};

/// A validated bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    /// Show an image privately to the caller.
    Lookup { identifier: String },
    /// Post an image publicly on the caller's behalf.
    Send { identifier: String },
    AddImage {
        name: String,
        url: String,
        category: Option<String>,
    },
    DeleteImage { identifier: String },
    ListCategory { category: String, page: usize },
    ListAll { page: usize },
    Reclassify { identifier: String, category: String },
    Categories,
}

impl Command {
    /// Parse a chat message. Returns `Ok(None)` for messages without `prefix`.
    pub fn parse_message(message: &str, prefix: &str) -> Result<Option<Self>> {
        let Some(body) = message.trim_start().strip_prefix(prefix) else {
            return Ok(None);
        };
        let mut tokens = tokenize(body).into_iter();
        let Some(verb) = tokens.next() else {
            return Ok(None);
        };
        Self::from_args(&verb, tokens.collect()).map(Some)
    }

    /// Build a command from its verb and positional arguments.
    pub fn from_args(verb: &str, args: Vec<String>) -> Result<Self> {
        let mut args = args.into_iter();
        match verb.to_ascii_lowercase().as_str() {
            "ping" => Ok(Command::Ping),
            "image" | "image-lookup" => Ok(Command::Lookup {
                identifier: rest(args, "identifier")?,
            }),
            "send" => Ok(Command::Send {
                identifier: rest(args, "identifier")?,
            }),
            "addimage" | "add-image" => {
                let name = required(args.next(), "name")?;
                let url = required(args.next(), "url")?;
                let category = rest(args, "category").ok();
                Ok(Command::AddImage {
                    name,
                    url,
                    category,
                })
            }
            "delimage" | "delete-image" => Ok(Command::DeleteImage {
                identifier: rest(args, "identifier")?,
            }),
            "list" | "list-category" => {
                let mut args: Vec<String> = args.collect();
                // A trailing number is the page unless it is the only argument
                let has_page =
                    args.len() > 1 && args.last().is_some_and(|a| a.parse::<usize>().is_ok());
                let page = if has_page { parse_page(args.pop())? } else { 1 };
                let category = rest(args.into_iter(), "category")?;
                Ok(Command::ListCategory { category, page })
            }
            "listall" | "list-all" => Ok(Command::ListAll {
                page: parse_page(args.next())?,
            }),
            "classify" | "reclassify" => {
                let identifier = required(args.next(), "identifier")?;
                let category = rest(args, "category")?;
                Ok(Command::Reclassify {
                    identifier,
                    category,
                })
            }
            "categories" => Ok(Command::Categories),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }

    /// Check that every required field holds a non-blank value.
    ///
    /// Commands built by hand (for example from CLI flags) skip [`Command::from_args`],
    /// so the dispatcher runs this before touching the store.
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::Ping | Command::ListAll { .. } | Command::Categories => Ok(()),
            Command::Lookup { identifier }
            | Command::Send { identifier }
            | Command::DeleteImage { identifier } => non_blank(identifier, "identifier"),
            Command::AddImage { name, url, .. } => {
                non_blank(name, "name")?;
                non_blank(url, "url")
            }
            Command::ListCategory { category, .. } => non_blank(category, "category"),
            Command::Reclassify {
                identifier,
                category,
            } => {
                non_blank(identifier, "identifier")?;
                non_blank(category, "category")
            }
        }
    }

    /// Canonical text verb.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Ping => "ping",
            Command::Lookup { .. } => "image",
            Command::Send { .. } => "send",
            Command::AddImage { .. } => "addimage",
            Command::DeleteImage { .. } => "delimage",
            Command::ListCategory { .. } => "list",
            Command::ListAll { .. } => "listall",
            Command::Reclassify { .. } => "classify",
            Command::Categories => "categories",
        }
    }
}

/// Usage line for a verb, without the prefix.
pub fn usage(verb: &str) -> Option<&'static str> {
    let line = match verb.to_ascii_lowercase().as_str() {
        "ping" => "ping",
        "image" | "image-lookup" => "image <name or ID>",
        "send" => "send <name or ID>",
        "addimage" | "add-image" => "addimage <name> <url> [category]",
        "delimage" | "delete-image" => "delimage <name or ID>",
        "list" | "list-category" => "list <category> [page]",
        "listall" | "list-all" => "listall [page]",
        "classify" | "reclassify" => "classify <name or ID> <category>",
        "categories" => "categories",
        _ => return None,
    };
    Some(line)
}

/// Split on whitespace; double quotes group words and are stripped.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || quoted {
        tokens.push(current);
    }
    tokens
}

fn required(arg: Option<String>, name: &'static str) -> Result<String> {
    let arg = arg.ok_or(Error::MissingArgument(name))?;
    non_blank(&arg, name)?;
    Ok(arg)
}

fn non_blank(value: &str, name: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::MissingArgument(name));
    }
    Ok(())
}

/// Remaining arguments joined by spaces, so unquoted multi-word values still work.
fn rest(args: impl Iterator<Item = String>, name: &'static str) -> Result<String> {
    let joined = args.collect::<Vec<_>>().join(" ");
    required(Some(joined.trim().to_string()), name)
}

fn parse_page(arg: Option<String>) -> Result<usize> {
    match arg {
        None => Ok(1),
        Some(raw) => raw.parse().map_err(|_| Error::InvalidArgument {
            name: "page",
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(message: &str) -> Result<Option<Command>> {
        Command::parse_message(message, "!")
    }

    #[test]
    fn test_unprefixed_message_ignored() {
        assert_eq!(parse("hello there").unwrap(), None);
        assert_eq!(parse("!").unwrap(), None);
        assert_eq!(parse("?image cat").unwrap(), None);
    }

    #[test]
    fn test_custom_prefix() {
        let cmd = Command::parse_message("pb!ping", "pb!").unwrap();
        assert_eq!(cmd, Some(Command::Ping));
    }

    #[test]
    fn test_parse_lookup_and_send() {
        assert_eq!(
            parse("!image 01002").unwrap(),
            Some(Command::Lookup {
                identifier: "01002".to_string()
            })
        );
        assert_eq!(
            parse("!send grumpy cat").unwrap(),
            Some(Command::Send {
                identifier: "grumpy cat".to_string()
            })
        );
    }

    #[test]
    fn test_parse_add_image() {
        assert_eq!(
            parse("!addimage tabby https://img.example/t.png").unwrap(),
            Some(Command::AddImage {
                name: "tabby".to_string(),
                url: "https://img.example/t.png".to_string(),
                category: None,
            })
        );
        assert_eq!(
            parse("!addimage \"grumpy cat\" https://img.example/g.png funny animals").unwrap(),
            Some(Command::AddImage {
                name: "grumpy cat".to_string(),
                url: "https://img.example/g.png".to_string(),
                category: Some("funny animals".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_add_image_missing_url() {
        let err = parse("!addimage tabby").unwrap_err();
        assert!(matches!(err, Error::MissingArgument("url")));
    }

    #[test]
    fn test_parse_missing_identifier() {
        let err = parse("!delimage").unwrap_err();
        assert!(matches!(err, Error::MissingArgument("identifier")));
    }

    #[test]
    fn test_parse_quoted_blank_argument() {
        let err = parse("!addimage \"  \" https://img.example/t.png").unwrap_err();
        assert!(matches!(err, Error::MissingArgument("name")));
    }

    #[test]
    fn test_validate_hand_built_commands() {
        let add = Command::AddImage {
            name: String::new(),
            url: String::new(),
            category: None,
        };
        assert!(matches!(add.validate(), Err(Error::MissingArgument("name"))));

        let add = Command::AddImage {
            name: "tabby".to_string(),
            url: " ".to_string(),
            category: None,
        };
        assert!(matches!(add.validate(), Err(Error::MissingArgument("url"))));

        let classify = Command::Reclassify {
            identifier: String::new(),
            category: "cats".to_string(),
        };
        assert!(matches!(classify.validate(), Err(Error::MissingArgument("identifier"))));

        let list = Command::ListCategory {
            category: String::new(),
            page: 1,
        };
        assert!(matches!(list.validate(), Err(Error::MissingArgument("category"))));

        assert!(Command::Ping.validate().is_ok());
        assert!(Command::AddImage {
            name: "tabby".to_string(),
            url: "https://img.example/t.png".to_string(),
            category: None,
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_parse_list_with_and_without_page() {
        assert_eq!(
            parse("!list cats").unwrap(),
            Some(Command::ListCategory {
                category: "cats".to_string(),
                page: 1
            })
        );
        assert_eq!(
            parse("!list funny animals 2").unwrap(),
            Some(Command::ListCategory {
                category: "funny animals".to_string(),
                page: 2
            })
        );
        // A lone numeric argument is the category name
        assert_eq!(
            parse("!list 2023").unwrap(),
            Some(Command::ListCategory {
                category: "2023".to_string(),
                page: 1
            })
        );
        assert!(matches!(
            parse("!list").unwrap_err(),
            Error::MissingArgument("category")
        ));
    }

    #[test]
    fn test_parse_list_all() {
        assert_eq!(parse("!listall").unwrap(), Some(Command::ListAll { page: 1 }));
        assert_eq!(parse("!LISTALL 3").unwrap(), Some(Command::ListAll { page: 3 }));
        let err = parse("!listall two").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "page", value } if value == "two"));
    }

    #[test]
    fn test_parse_classify() {
        assert_eq!(
            parse("!classify 00001 \"best of\"").unwrap(),
            Some(Command::Reclassify {
                identifier: "00001".to_string(),
                category: "best of".to_string(),
            })
        );
        assert!(matches!(
            parse("!classify 00001").unwrap_err(),
            Error::MissingArgument("category")
        ));
    }

    #[test]
    fn test_parse_unknown_verb() {
        let err = parse("!dance now").unwrap_err();
        assert!(matches!(err, Error::UnknownCommand(verb) if verb == "dance"));
    }

    #[test]
    fn test_hyphenated_aliases() {
        assert_eq!(
            parse("!delete-image x").unwrap(),
            Some(Command::DeleteImage {
                identifier: "x".to_string()
            })
        );
        assert_eq!(parse("!list-all").unwrap(), Some(Command::ListAll { page: 1 }));
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(tokenize("a  b"), vec!["a", "b"]);
        assert_eq!(tokenize("\"a b\" c"), vec!["a b", "c"]);
        assert_eq!(tokenize("x \"\" y"), vec!["x", "", "y"]);
        assert_eq!(tokenize("\"unterminated quote"), vec!["unterminated quote"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_verb_roundtrip() {
        for verb in [
            "ping", "image", "send", "addimage", "delimage", "list", "listall", "classify",
            "categories",
        ] {
            assert!(usage(verb).is_some(), "{verb} has no usage line");
        }
        assert_eq!(Command::ListAll { page: 1 }.verb(), "listall");
    }
}
