//! Events a session reports to its collaborators.
//!
//! Every session has one ordered stream of [`Event`]s. It is kept in an
//! [`EventBus`] queue for callers that drive the session by hand, and with the
//! `tokio` feature it can be fanned out to any number of subscribers instead.
//! The queue only fills while nobody is subscribed.

use std::collections::vec_deque::Drain;
use std::collections::VecDeque;

#[cfg(feature = "tokio")]
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use crate::target::TargetKind;

/// Something that happened on a session.
///
/// `target` fields hold the display name of the target concerned; `actor`
/// is the nick (or server name) the server attributed the change to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Event {
    /// `open()` succeeded; waiting for the transport.
    Connecting,
    /// The server sent its welcome reply.
    Connected,
    /// The connection is gone. `reason` is set when a transport error ended it.
    Disconnected {
        /// Transport error text, if any.
        reason: Option<String>,
    },
    /// A target was created.
    TargetAdded {
        /// Target name.
        target: String,
        /// Target kind.
        kind: TargetKind,
    },
    /// A target changed its display name or identity.
    TargetRenamed {
        /// Previous display name.
        old: String,
        /// New display name.
        new: String,
    },
    /// A target was removed.
    TargetRemoved {
        /// Target name.
        target: String,
    },
    /// Someone joined a channel.
    Joined {
        /// Channel.
        target: String,
        /// Joining nick.
        actor: String,
    },
    /// Someone left a channel.
    Parted {
        /// Channel.
        target: String,
        /// Leaving nick.
        actor: String,
        /// Part message, possibly empty.
        reason: String,
    },
    /// Someone who shared this target quit IRC.
    Quit {
        /// Target the nick was a member of.
        target: String,
        /// Quitting nick.
        actor: String,
        /// Quit message, possibly empty.
        reason: String,
    },
    /// Someone was kicked from a channel.
    Kicked {
        /// Channel.
        target: String,
        /// Nick that issued the kick.
        actor: String,
        /// Nick that was kicked.
        victim: String,
        /// Kick message, possibly empty.
        reason: String,
    },
    /// A member of this target changed nick.
    Renamed {
        /// Target the nick is a member of.
        target: String,
        /// Previous nick.
        old: String,
        /// New nick.
        new: String,
    },
    /// A mode change on a channel or user.
    ModeChanged {
        /// Target of the change.
        target: String,
        /// Who changed it.
        actor: String,
        /// Mode string, e.g. `+o`.
        mode: String,
        /// Mode arguments.
        args: Vec<String>,
    },
    /// The topic was set, reported or cleared (empty text).
    TopicChanged {
        /// Channel.
        target: String,
        /// Who set it.
        actor: String,
        /// New topic.
        topic: String,
    },
    /// Someone invited a nick to a channel.
    Invited {
        /// Inviting nick.
        actor: String,
        /// Invited nick.
        receiver: String,
        /// Channel.
        channel: String,
    },
    /// A chat message.
    Message {
        /// Conversation.
        target: String,
        /// Sender.
        actor: String,
        /// Text.
        text: String,
    },
    /// A notice.
    Notice {
        /// Conversation.
        target: String,
        /// Sender.
        actor: String,
        /// Text.
        text: String,
    },
    /// A CTCP `ACTION` (`/me`).
    CtcpAction {
        /// Conversation.
        target: String,
        /// Sender.
        actor: String,
        /// Action text.
        text: String,
    },
    /// A CTCP request addressed to us.
    CtcpRequest {
        /// Requesting nick.
        actor: String,
        /// Payload without delimiters.
        text: String,
    },
    /// A CTCP reply addressed to us.
    CtcpReply {
        /// Replying nick.
        actor: String,
        /// Payload without delimiters.
        text: String,
    },
    /// A names listing finished.
    NamesReceived {
        /// Channel.
        target: String,
        /// Members as listed, status prefixes included.
        names: Vec<String>,
    },
    /// The message of the day finished.
    MotdReceived {
        /// Lines joined with `\n`, each terminated.
        text: String,
    },
    /// A numeric reply without dedicated handling.
    Numeric {
        /// Server target.
        target: String,
        /// Origin of the reply.
        actor: String,
        /// Reply code.
        code: u32,
        /// Parameters.
        params: Vec<String>,
    },
    /// A command without dedicated handling.
    Unknown {
        /// Origin.
        actor: String,
        /// Command token.
        command: String,
        /// Parameters.
        params: Vec<String>,
    },
    /// A command the session sent on its own could not be delivered.
    WriteFailed {
        /// Command token, e.g. `PONG`.
        command: String,
        /// Why the write failed.
        reason: String,
    },
    /// An inbound line was dropped.
    LineRejected {
        /// Why it was dropped.
        reason: String,
    },
}

/// Ordered event queue with optional subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<Event>,
    #[cfg(feature = "tokio")]
    subscribers: Vec<UnboundedSender<Event>>,
}

impl EventBus {
    /// Empty bus without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the stream.
    ///
    /// Live subscribers receive it; without any it is queued for [`drain`].
    ///
    /// [`drain`]: EventBus::drain
    pub fn emit(&mut self, event: Event) {
        trace!(?event, "event");
        #[cfg(feature = "tokio")]
        {
            self.subscribers
                .retain(|tx| tx.send(event.clone()).is_ok());
            if !self.subscribers.is_empty() {
                return;
            }
        }
        self.queue.push_back(event);
    }

    /// Take all queued events, oldest first.
    pub fn drain(&mut self) -> Drain<'_, Event> {
        self.queue.drain(..)
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Receive every event emitted from now on.
    ///
    /// While any receiver is open, events bypass the queue. Dropping the
    /// receiver unsubscribes.
    #[cfg(feature = "tokio")]
    pub fn subscribe(&mut self) -> UnboundedReceiver<Event> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers.
    #[cfg(feature = "tokio")]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|tx| !tx.is_closed()).count()
    }
}
