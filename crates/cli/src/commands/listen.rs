use std::io::{self, BufRead, Write};

use anyhow::Result;
use pixshelf_core::Dispatcher;
use tracing::info;

use super::render;

/// Serve text commands from stdin until EOF.
pub fn run(dispatcher: &Dispatcher, prefix: &str, author: Option<&str>) -> Result<()> {
    info!(
        prefix,
        catalog = %dispatcher.store().path().display(),
        "listening for text commands"
    );
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(dispatcher, prefix, author, stdin.lock(), &mut stdout.lock())
}

fn serve(
    dispatcher: &Dispatcher,
    prefix: &str,
    author: Option<&str>,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let mut handled = 0usize;
    for line in input.lines() {
        let line = line?;
        let Some(reply) = dispatcher.handle_message(&line, prefix, author) else {
            continue;
        };
        handled += 1;
        let marker = if reply.ephemeral { " (private)" } else { "" };
        writeln!(out, "> {}{marker}", line.trim())?;
        writeln!(out, "{}", render(&reply))?;
        writeln!(out)?;
        out.flush()?;
    }
    info!(handled, "input closed");
    Ok(())
}
