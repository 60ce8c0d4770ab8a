//! Routing of decoded messages to registry updates and events.

use tracing::{debug, warn};

use super::{Session, SessionState};
use crate::command::Command;
use crate::ctcp::Ctcp;
use crate::event::Event;
use crate::message::Message;
use crate::response::Response;
use crate::target::{self, Target, TargetName, NAMES_MARKERS};

impl Session {
    fn resolve(&self, origin: &str, token: &str) -> TargetName {
        target::resolve(&self.nick, &self.config.host, origin, token)
    }

    fn ensure(&mut self, name: &TargetName) -> &mut Target {
        let kind = self.registry.kind_of(name);
        self.registry.ensure(name, kind, &mut self.events)
    }

    /// Ensure the target, apply `update`, and return its display name.
    fn update_target(&mut self, name: &TargetName, update: impl FnOnce(&mut Target)) -> String {
        let target = self.ensure(name);
        update(&mut *target);
        target.name().to_owned()
    }

    fn server_name(&self) -> String {
        match self.registry.server() {
            Some(server) => server.name().to_owned(),
            None => self.config.host.clone(),
        }
    }

    fn is_me(&self, nick: &str) -> bool {
        crate::casemap::irc_eq(nick, &self.nick)
    }

    /// Act on one decoded message.
    pub(crate) fn dispatch(&mut self, msg: Message) {
        if msg.command() == "PING" {
            let token = msg.arg(0).unwrap_or_default().to_owned();
            if let Err(e) = self.send(&Command::PONG(token)) {
                warn!("could not answer PING: {}", e);
                self.events.emit(Event::WriteFailed {
                    command: "PONG".to_owned(),
                    reason: e.to_string(),
                });
            }
            return;
        }

        match msg.numeric() {
            Some(code) => self.dispatch_numeric(code, msg),
            None => self.dispatch_command(msg),
        }
    }

    fn dispatch_numeric(&mut self, code: u32, msg: Message) {
        let actor = msg.source_nickname().to_owned();
        match u16::try_from(code).ok().and_then(Response::from_code) {
            Some(Response::RPL_WELCOME) => self.on_welcome(&msg),
            Some(Response::RPL_TOPIC) => {
                let name = self.resolve("", msg.arg_or_empty(1));
                let topic = msg.arg_or_empty(2).to_owned();
                let target = self.update_target(&name, |t| t.set_topic(Some(topic.clone())));
                self.events.emit(Event::TopicChanged {
                    target,
                    actor,
                    topic,
                });
            }
            Some(Response::RPL_NOTOPIC) => {
                let name = self.resolve("", msg.arg_or_empty(1));
                let target = self.update_target(&name, |t| t.set_topic(None));
                self.events.emit(Event::TopicChanged {
                    target,
                    actor,
                    topic: String::new(),
                });
            }
            Some(Response::RPL_NAMREPLY) => {
                // me [=|*|@] channel :names
                let mut rest = msg
                    .params()
                    .iter()
                    .skip(1)
                    .map(String::as_str)
                    .filter(|p| !NAMES_MARKERS.contains(p));
                let channel = rest.next().unwrap_or_default();
                let names = rest.next().unwrap_or_default();
                let name = self.resolve("", channel);
                if !self.ensure(&name).is_accumulating_names() {
                    self.registry.begin_names(name.as_str());
                }
                self.registry
                    .add_names(name.as_str(), names.split_whitespace());
            }
            Some(Response::RPL_ENDOFNAMES) => {
                let name = self.resolve("", msg.arg_or_empty(1));
                self.ensure(&name);
                self.registry.end_names(name.as_str(), &mut self.events);
            }
            Some(Response::RPL_MOTDSTART) => self.motd.clear(),
            Some(Response::RPL_MOTD) => {
                self.motd.push_str(msg.arg_or_empty(1));
                self.motd.push('\n');
            }
            Some(Response::RPL_ENDOFMOTD) => {
                let text = std::mem::take(&mut self.motd);
                self.events.emit(Event::MotdReceived { text });
            }
            _ => {
                let target = self.server_name();
                self.events.emit(Event::Numeric {
                    target,
                    actor,
                    code,
                    params: msg.params().to_vec(),
                });
            }
        }
    }

    fn on_welcome(&mut self, msg: &Message) {
        if let Some(nick) = msg.arg(0).filter(|n| !n.is_empty() && *n != "*") {
            if nick != self.nick {
                debug!("server registered us as {}", nick);
            }
            self.nick = nick.to_owned();
        }
        match self.state {
            SessionState::Connecting => {
                self.set_state(SessionState::Connected);
            }
            SessionState::Connected => {}
            state => {
                debug!("welcome while {:?}; ignoring", state);
                return;
            }
        }
        self.events.emit(Event::Connected);
    }

    fn dispatch_command(&mut self, msg: Message) {
        let origin = msg.source_nickname().to_owned();
        match msg.command() {
            "NICK" => self.on_nick(&origin, msg.arg_or_empty(0)),
            "QUIT" => {
                let reason = msg.arg_or_empty(0).to_owned();
                for target in self.registry.remove_member(&origin) {
                    self.events.emit(Event::Quit {
                        target,
                        actor: origin.clone(),
                        reason: reason.clone(),
                    });
                }
            }
            "JOIN" => {
                let name = self.resolve(&origin, msg.arg_or_empty(0));
                let target = self.update_target(&name, |t| t.add_name(&origin));
                self.events.emit(Event::Joined {
                    target,
                    actor: origin,
                });
            }
            "PART" => {
                let name = self.resolve(&origin, msg.arg_or_empty(0));
                if self.is_me(&origin) {
                    self.registry.remove(name.as_str(), &mut self.events);
                    return;
                }
                let target = self.update_target(&name, |t| {
                    t.remove_name(&origin);
                });
                self.events.emit(Event::Parted {
                    target,
                    actor: origin,
                    reason: msg.arg_or_empty(1).to_owned(),
                });
            }
            "KICK" => {
                let name = self.resolve(&origin, msg.arg_or_empty(0));
                let victim = msg.arg_or_empty(1).to_owned();
                let reason = msg.arg_or_empty(2).to_owned();
                let kicked_me = self.is_me(&victim);
                let target = if kicked_me {
                    self.registry
                        .get(name.as_str())
                        .map_or_else(|| name.to_string(), |t| t.name().to_owned())
                } else {
                    self.update_target(&name, |t| {
                        t.remove_name(&victim);
                    })
                };
                self.events.emit(Event::Kicked {
                    target,
                    actor: origin,
                    victim,
                    reason,
                });
                if kicked_me {
                    self.registry.remove(name.as_str(), &mut self.events);
                }
            }
            "MODE" => {
                let name = self.resolve(&origin, msg.arg_or_empty(0));
                let target = self.update_target(&name, |_| {});
                let args = msg.params().get(2..).unwrap_or_default().to_vec();
                self.events.emit(Event::ModeChanged {
                    target,
                    actor: origin,
                    mode: msg.arg_or_empty(1).to_owned(),
                    args,
                });
            }
            "TOPIC" => {
                let name = self.resolve(&origin, msg.arg_or_empty(0));
                let topic = msg.arg_or_empty(1).to_owned();
                let stored = Some(topic.clone()).filter(|t| !t.is_empty());
                let target = self.update_target(&name, |t| t.set_topic(stored));
                self.events.emit(Event::TopicChanged {
                    target,
                    actor: origin,
                    topic,
                });
            }
            "INVITE" => {
                self.events.emit(Event::Invited {
                    actor: origin,
                    receiver: msg.arg_or_empty(0).to_owned(),
                    channel: msg.arg_or_empty(1).to_owned(),
                });
            }
            "PRIVMSG" | "NOTICE" => self.on_chat(origin, &msg),
            _ => {
                self.events.emit(Event::Unknown {
                    actor: origin,
                    command: msg.command().to_owned(),
                    params: msg.params().to_vec(),
                });
            }
        }
    }

    fn on_nick(&mut self, old: &str, new: &str) {
        if new.is_empty() {
            warn!("NICK from {} without a new nick", old);
            return;
        }
        if self.is_me(old) {
            debug!("our nick is now {}", new);
            self.nick = new.to_owned();
        }
        for target in self.registry.rename_member(old, new) {
            self.events.emit(Event::Renamed {
                target,
                old: old.to_owned(),
                new: new.to_owned(),
            });
        }
        if self
            .registry
            .get(old)
            .is_some_and(|t| t.kind() == target::TargetKind::Private)
        {
            self.registry
                .rekey(old, TargetName::new(new), &mut self.events);
        }
    }

    fn on_chat(&mut self, origin: String, msg: &Message) {
        let notice = msg.command() == "NOTICE";
        let text = msg.arg_or_empty(1);

        if let Some(ctcp) = Ctcp::parse(text) {
            if let Some(action) = ctcp.action() {
                let name = self.resolve(&origin, msg.arg_or_empty(0));
                let target = self.update_target(&name, |_| {});
                self.events.emit(Event::CtcpAction {
                    target,
                    actor: origin,
                    text: action.to_owned(),
                });
            } else if notice {
                self.events.emit(Event::CtcpReply {
                    actor: origin,
                    text: ctcp.payload().to_owned(),
                });
            } else {
                self.events.emit(Event::CtcpRequest {
                    actor: origin,
                    text: ctcp.payload().to_owned(),
                });
            }
            return;
        }

        let name = self.resolve(&origin, msg.arg_or_empty(0));
        let target = self.update_target(&name, |_| {});
        let text = text.to_owned();
        self.events.emit(if notice {
            Event::Notice {
                target,
                actor: origin,
                text,
            }
        } else {
            Event::Message {
                target,
                actor: origin,
                text,
            }
        });
    }
}
