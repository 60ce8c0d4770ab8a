//! Fuzz target for the whole inbound path
//!
//! Splits the input into chunks and feeds them to a registered session,
//! exercising framing, decoding, dispatch and the target registry.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{MemoryConnection, Session, SessionConfig};

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };

    let config = SessionConfig::new("irc.fuzz").with_identity("me", "me", "Me");
    let Ok(mut session) = Session::with_config(config) else {
        return;
    };
    session.attach_connection(Box::new(MemoryConnection::new()));
    if session.open().is_err() || session.on_transport_connected().is_err() {
        return;
    }

    let chunk = usize::from(split).max(1);
    for piece in rest.chunks(chunk) {
        session.on_data(piece);
        session.drain_events().for_each(drop);
    }
    session.teardown();
});
