use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::commands::{HELP_TEXT, SlashCommand};
use super::transport::create_session;
use crate::config::AppConfig;
use crate::core::{ChatError, ChatSession, ResponseMode, Result, SubmitOutcome};
use crate::ui::suggestions::TITLE;
use crate::ui::{ReplyPrinter, render_message, render_suggestions, terminal_width};
use crate::ui::transcript::PROMPT;

pub async fn run_chat(config: &AppConfig) -> Result<()> {
    let mut session = create_session(config)?;
    let width = terminal_width();

    println!("{TITLE}\n");
    println!("{}", render_suggestions(width));
    println!("Type /help for commands.\n");

    chat_loop(&mut session, BufReader::new(tokio::io::stdin()), width).await?;

    tracing::info!(
        session = %session.id(),
        messages = session.conversation().len(),
        "Chat ended"
    );
    Ok(())
}

/// Reads lines from `input` until EOF, `/exit` or Ctrl-C at the prompt.
async fn chat_loop<R>(session: &mut ChatSession, input: R, width: u16) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let text = if input.starts_with('/') {
            match SlashCommand::parse(input) {
                SlashCommand::Help => {
                    println!("{HELP_TEXT}");
                    continue;
                }
                SlashCommand::Exit => break,
                SlashCommand::Stop => {
                    println!("Nothing to stop. Press Ctrl-C while a reply is arriving.");
                    continue;
                }
                SlashCommand::Suggest(text) => {
                    println!("{PROMPT}{text}");
                    text.to_string()
                }
                SlashCommand::Invalid(usage) => {
                    eprintln!("{usage}");
                    continue;
                }
                SlashCommand::Unknown(cmd) => {
                    eprintln!("Unknown command: {cmd}. Type /help for commands.");
                    continue;
                }
            }
        } else {
            line
        };

        run_round(session, &text, width, true).await?;
    }

    Ok(())
}

pub async fn run_ask(config: &AppConfig, question: &str) -> Result<()> {
    let mut session = create_session(config)?;
    match run_round(&mut session, question, terminal_width(), false).await? {
        SubmitOutcome::Failed(err) => Err(err.into()),
        SubmitOutcome::Completed | SubmitOutcome::Stopped => Ok(()),
    }
}

/// Submits `text` and prints the reply as it arrives. Ctrl-C stops the
/// reply instead of killing the process.
async fn run_round(
    session: &mut ChatSession,
    text: &str,
    width: u16,
    labelled: bool,
) -> Result<SubmitOutcome> {
    let stop = session.stop_handle();
    let streaming = session.mode() == ResponseMode::Streaming;
    let mut printer = ReplyPrinter::new();

    let result = {
        let mut stdout = io::stdout();
        let round = session.submit(text, |conversation| {
            if !streaming {
                return;
            }
            let fresh_reply = !printer.has_output();
            if let Some(delta) = printer.delta(conversation) {
                if fresh_reply && labelled {
                    let _ = write!(stdout, "bot: ");
                }
                let _ = write!(stdout, "{delta}");
                let _ = stdout.flush();
            }
        });
        tokio::pin!(round);

        loop {
            tokio::select! {
                result = &mut round => break result,
                signal = tokio::signal::ctrl_c() => {
                    if signal.is_ok() && stop.stop() {
                        tracing::debug!("Stop requested");
                    }
                }
            }
        }
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(ChatError::EmptyInput) if labelled => return Ok(SubmitOutcome::Completed),
        Err(err) => return Err(err),
    };

    if printer.has_output() {
        println!();
    }

    let conversation = session.conversation();
    match &outcome {
        SubmitOutcome::Completed if !streaming => {
            if let Some(reply) = conversation.last_reply() {
                if labelled {
                    println!("{}", render_message(reply, usize::from(width)));
                } else {
                    println!("{}", reply.content);
                }
            }
        }
        SubmitOutcome::Completed => {}
        SubmitOutcome::Stopped => eprintln!("(stopped)"),
        SubmitOutcome::Failed(_) if labelled => {
            if let Some(notice) = conversation.last() {
                eprintln!("{}", render_message(notice, usize::from(width)));
            }
        }
        SubmitOutcome::Failed(_) => {}
    }

    Ok(outcome)
}
