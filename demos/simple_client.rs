//! Simple IRC client example
//!
//! Connects to a server, joins a channel once registered, answers greetings
//! and prints everything the session reports.

use std::time::Duration;

use tokio::time::timeout;

use slirc_client::{transport, Command, Event, Session, SessionConfig};

const CHANNEL: &str = "#example";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = SessionConfig::new("irc.libera.chat").with_identity(
        "example_bot",
        "example",
        "Example Bot",
    );
    let mut session = Session::with_config(config)?;
    let mut events = session.subscribe();
    session.open()?;

    let (handle, task) = transport::connect(session, None);

    loop {
        let event = match timeout(Duration::from_secs(300), events.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(_) => {
                println!("No events in 5 minutes, keeping alive...");
                continue;
            }
        };
        println!("← {:?}", event);

        match event {
            Event::Connected => {
                println!("✓ Registration successful!");
                handle.send(Command::JOIN(CHANNEL.into(), None)).await?;
            }
            Event::Joined { target, .. } if target.eq_ignore_ascii_case(CHANNEL) => {
                handle
                    .send(Command::PRIVMSG(
                        target,
                        "Hello from slirc-client example!".into(),
                    ))
                    .await?;
            }
            Event::Message { target, text, .. } if text.contains("hello") => {
                handle
                    .send(Command::PRIVMSG(target, "Hello there! 👋".into()))
                    .await?;
            }
            Event::CtcpRequest { actor, text } if text == "VERSION" => {
                handle
                    .send(Command::ctcp_reply(actor, "VERSION slirc-client example"))
                    .await?;
            }
            Event::Disconnected { reason } => {
                println!("Connection closed: {}", reason.unwrap_or_default());
                break;
            }
            _ => {}
        }
    }

    if handle.is_running() {
        handle.send(Command::QUIT(Some("Goodbye!".into()))).await?;
        handle.close();
    }
    let session = transport::join(task).await?;
    println!("Session ended {:?}", session.state());
    Ok(())
}
