//! Terminal chat surface.
//!
//! Reads one line per turn, routes slash commands, and prints the assistant
//! reply. Generic over input and output so tests can drive it from memory.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::services::session::ChatSession;

pub const TITLE: &str = "AWS RDS Assistant";
pub const TAGLINE: &str = "Your specialized AI assistant for AWS RDS deployment and database management!";
pub const INPUT_HINT: &str = "Ask me about AWS RDS deployment or any general question! (/help for commands)";

pub const HELP: &str = "\
About
  This AI assistant specializes in AWS RDS deployment and database management.
  It also provides brief answers to general questions.

Instructions
  1. AWS RDS questions: get detailed help with deployment, setup, configuration
  2. General questions: brief answers unless you ask for more details
  3. Database help: MySQL, PostgreSQL, Aurora, and more
  4. Ask for specifics: \"Tell me more\" for detailed explanations

Commands
  /clear     clear chat history
  /history   show the conversation so far
  /help      show this text
  /quit      leave (also /exit or Ctrl-D)";

const PROMPT: &str = "you> ";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Blank,
    Say(&'a str),
    Clear,
    History,
    Help,
    Quit,
    Unknown(&'a str),
}

#[must_use]
pub fn parse_line(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Blank;
    }
    match trimmed {
        "/clear" => Input::Clear,
        "/history" => Input::History,
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        // A lone slash word is a mistyped command; anything longer is a
        // question that happens to start with a path.
        word if word.starts_with('/') && !word.contains(char::is_whitespace) => Input::Unknown(word),
        text => Input::Say(text),
    }
}

/// Print the startup banner.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_banner(out: &mut impl Write, model: &str) -> io::Result<()> {
    writeln!(out, "{TITLE}")?;
    writeln!(out, "{TAGLINE}")?;
    writeln!(out, "model: {model}")?;
    writeln!(out, "{INPUT_HINT}")?;
    writeln!(out)
}

/// Render the transcript as role-tagged lines.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_history(out: &mut impl Write, session: &ChatSession<'_>) -> io::Result<()> {
    let conversation = session.conversation();
    if conversation.is_empty() {
        return writeln!(out, "(no messages yet)");
    }
    for message in conversation.messages() {
        writeln!(out, "[{}] {}", message.role(), message.content())?;
    }
    Ok(())
}

/// Drive `session` until `/quit` or end of input.
///
/// # Errors
///
/// Returns I/O errors from reading `input` or writing `out`. Completion
/// failures never end the loop.
pub async fn run<R, W>(session: &mut ChatSession<'_>, mut input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!(session = %session.id(), "repl: session started");
    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            writeln!(out)?;
            break;
        }

        match parse_line(&line) {
            Input::Blank => {}
            Input::Say(text) => {
                writeln!(out, "Thinking...")?;
                out.flush()?;
                let reply = session.submit(text).await;
                writeln!(out, "assistant> {reply}")?;
                writeln!(out)?;
            }
            Input::Clear => {
                session.clear();
                writeln!(out, "Chat history cleared.")?;
            }
            Input::History => write_history(out, session)?,
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Quit => break,
            Input::Unknown(command) => writeln!(out, "Unknown command {command}. Type /help for the list.")?,
        }
    }
    info!(session = %session.id(), turns = session.conversation().len() / 2, "repl: session ended");
    Ok(())
}

#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;
