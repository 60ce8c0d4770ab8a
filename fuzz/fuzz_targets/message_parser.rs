//! Fuzz target for IRC message decoding
//!
//! Feeds arbitrary bytes to the decoder under both fixed and auto-detected
//! encodings and checks that it never panics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{Message, TextCodec};

fuzz_target!(|data: &[u8]| {
    if data.len() > 8191 {
        return;
    }

    let _ = Message::decode(data, &TextCodec::default());
    if let Ok(codec) = TextCodec::for_label("iso-8859-1") {
        if let Ok(msg) = Message::decode(data, &codec) {
            // Anything that decodes must serialize without panicking.
            let _ = msg.to_string();
        }
    }
});
