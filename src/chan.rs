//! Channel name detection.

/// Characters that introduce a channel name (RFC 2812 section 1.3).
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// An extension trait giving strings a function to check if they are a channel.
pub trait ChannelExt {
    /// Returns true if the specified name is a channel name.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        self.len() > 1 && self.starts_with(CHANNEL_PREFIXES)
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
