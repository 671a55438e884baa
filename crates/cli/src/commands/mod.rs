pub mod listen;

use anyhow::{bail, Result};
use pixshelf_core::dispatch::error_reply;
use pixshelf_core::{Command, Dispatcher, Reply};

/// Run one command; a failed command exits non-zero with its user-facing message.
pub fn run(dispatcher: &Dispatcher, command: &Command, author: Option<&str>) -> Result<()> {
    match dispatcher.try_handle(command, author) {
        Ok(reply) => {
            println!("{}", render(&reply));
            Ok(())
        }
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            bail!("{}", error_reply(&err, Some(command.verb())).content)
        }
    }
}

/// Terminal rendering of a reply: text, then the embed title and image URL.
pub fn render(reply: &Reply) -> String {
    let mut lines: Vec<&str> = Vec::new();
    if !reply.content.is_empty() {
        lines.push(&reply.content);
    }
    if let Some(embed) = &reply.embed {
        if let Some(title) = &embed.title {
            lines.push(title);
        }
        lines.push(&embed.image_url);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixshelf_core::Embed;

    #[test]
    fn test_render_text_only() {
        let reply = Reply {
            content: "Pong!".to_string(),
            embed: None,
            ephemeral: false,
        };
        assert_eq!(render(&reply), "Pong!");
    }

    #[test]
    fn test_render_embed() {
        let reply = Reply {
            content: "From @bob".to_string(),
            embed: Some(Embed {
                title: Some("Image: tabby".to_string()),
                image_url: "https://img.example/t.png".to_string(),
            }),
            ephemeral: true,
        };
        assert_eq!(
            render(&reply),
            "From @bob\nImage: tabby\nhttps://img.example/t.png"
        );
    }
}
