//! Integration tests driving a session over an in-memory connection.

use std::io;

use slirc_client::{
    Command, Event, MemoryConnection, Session, SessionConfig, SessionError, SessionState,
    TargetKind, WriteFailure,
};

fn config() -> SessionConfig {
    SessionConfig::new("irc.example.net").with_identity("me", "user", "Real Name")
}

fn attached(config: SessionConfig) -> (Session, MemoryConnection) {
    let mut session = Session::with_config(config).expect("valid config");
    let wire = MemoryConnection::new();
    session.attach_connection(Box::new(wire.clone()));
    (session, wire)
}

/// A session that has sent its handshake and been welcomed.
fn registered() -> (Session, MemoryConnection) {
    let (mut session, wire) = attached(config());
    session.open().expect("identity is complete");
    session.on_transport_connected().expect("handshake written");
    session.on_data(b":irc.example.net 001 me :Welcome to the network\r\n");
    session.drain_events().for_each(drop);
    wire.take_lines();
    (session, wire)
}

fn events(session: &mut Session) -> Vec<Event> {
    session.drain_events().collect()
}

#[test]
fn test_full_lifecycle() {
    let (mut session, wire) = attached(config());
    assert_eq!(session.state(), SessionState::Disconnected);

    session.open().unwrap();
    assert_eq!(session.state(), SessionState::Connecting);
    session.on_transport_connected().unwrap();
    assert_eq!(wire.take_lines(), ["NICK me", "USER user 0 * :Real Name"]);
    // The transport being up is not enough.
    assert_eq!(session.state(), SessionState::Connecting);

    session.on_data(b":irc.example.net 001 me :Welcome\r\n");
    assert_eq!(session.state(), SessionState::Connected);

    session.close().unwrap();
    assert_eq!(session.state(), SessionState::Disconnecting);
    assert!(wire.is_shut_down());

    session.on_transport_disconnected();
    assert_eq!(session.state(), SessionState::Disconnected);

    assert_eq!(
        events(&mut session),
        [
            Event::Connecting,
            Event::TargetAdded {
                target: "irc.example.net".into(),
                kind: TargetKind::Server
            },
            Event::Connected,
            Event::Disconnected { reason: None },
        ]
    );
}

#[test]
fn test_missing_identity_is_reported() {
    let mut session = Session::with_config(SessionConfig::new("irc.example.net")).unwrap();
    let err = session.open().unwrap_err();
    assert!(matches!(err, SessionError::MissingIdentity("nickname")));
    assert!(events(&mut session).is_empty());
}

#[test]
fn test_ping_echo_only() {
    let (mut session, wire) = registered();
    session.on_data(b"PING :x\r\n");
    assert_eq!(wire.take_lines(), ["PONG x"]);
    assert!(events(&mut session).is_empty());
}

#[test]
fn test_welcome_event_every_time() {
    let (mut session, _) = registered();
    session.on_data(b":irc.example.net 001 me :Welcome\r\n");
    session.on_data(b":irc.example.net 001 me :Welcome\r\n");
    assert_eq!(events(&mut session), [Event::Connected, Event::Connected]);
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn test_join_creates_one_target() {
    let (mut session, _) = registered();
    session.on_data(b":nick!user@host JOIN #foo\r\n");
    session.on_data(b":other!user@host JOIN #FOO\r\n");

    assert_eq!(
        events(&mut session),
        [
            Event::TargetAdded {
                target: "#foo".into(),
                kind: TargetKind::Channel
            },
            Event::Joined {
                target: "#foo".into(),
                actor: "nick".into()
            },
            Event::Joined {
                target: "#foo".into(),
                actor: "other".into()
            },
        ]
    );
    let target = session.target("#Foo").expect("joined channel");
    assert_eq!(target.key(), "#foo");
    assert!(target.has_name("nick") && target.has_name("OTHER"));
    assert_eq!(session.targets().count(), 2);
}

#[test]
fn test_self_part_removes_target_once() {
    let (mut session, _) = registered();
    session.on_data(b":me!user@host JOIN #foo\r\n");
    session.drain_events().for_each(drop);

    session.on_data(b":me!user@host PART #foo :bye\r\n");
    assert_eq!(
        events(&mut session),
        [Event::TargetRemoved {
            target: "#foo".into()
        }]
    );
    session.on_data(b":me!user@host PART #foo :bye\r\n");
    assert!(events(&mut session).is_empty());
    assert!(session.target("#foo").is_none());
}

#[test]
fn test_other_part_updates_members() {
    let (mut session, _) = registered();
    session.on_data(b":me!u@h JOIN #foo\r\n:bob!b@h JOIN #foo\r\n");
    session.drain_events().for_each(drop);
    session.on_data(b":bob!b@h PART #foo :later\r\n");
    assert_eq!(
        events(&mut session),
        [Event::Parted {
            target: "#foo".into(),
            actor: "bob".into(),
            reason: "later".into()
        }]
    );
    assert!(!session.target("#foo").unwrap().has_name("bob"));
}

#[test]
fn test_bad_lines_do_not_stop_the_stream() {
    let (mut session, _) = registered();
    session.set_encoding(Some("utf-8")).unwrap();
    session.on_data(b":x PRIV@MSG #c :a\r\n:bob!b@h PRIVMSG #c :caf\xff\r\n:bob!b@h PRIVMSG #c :ok\r\n");
    let evs = events(&mut session);
    assert!(matches!(evs[0], Event::LineRejected { .. }));
    assert!(matches!(evs[1], Event::LineRejected { .. }));
    assert_eq!(
        evs.last(),
        Some(&Event::Message {
            target: "#c".into(),
            actor: "bob".into(),
            text: "ok".into()
        })
    );
}

#[test]
fn test_auto_encoding_falls_back_per_line() {
    let mut config = config();
    config.encoding = None;
    let (mut session, _) = attached(config);
    session.set_encoding(None).unwrap();
    session.open().unwrap();
    session.on_transport_connected().unwrap();
    session.drain_events().for_each(drop);

    session.on_data(b":bob!b@h PRIVMSG #c :caf\xc3\xa9\r\n");
    let Some(Event::Message { text, .. }) = events(&mut session).pop() else {
        panic!("expected a message");
    };
    assert_eq!(text, "caf\u{e9}");
}

#[test]
fn test_fixed_latin1_encoding() {
    let mut config = config();
    config.encoding = Some("iso-8859-1".into());
    let (mut session, wire) = attached(config);
    session.open().unwrap();
    session.on_transport_connected().unwrap();
    wire.take_lines();
    session.drain_events().for_each(drop);

    session.on_data(b":bob!b@h PRIVMSG #c :caf\xe9\r\n");
    let Some(Event::Message { text, .. }) = events(&mut session).pop() else {
        panic!("expected a message");
    };
    assert_eq!(text, "caf\u{e9}");

    session
        .send(&Command::PRIVMSG("#c".into(), "d\u{e9}j\u{e0} vu".into()))
        .unwrap();
    assert_eq!(wire.sent_bytes(), b"PRIVMSG #c :d\xe9j\xe0 vu\r\n");

    let err = session
        .send(&Command::PRIVMSG("#c".into(), "\u{2603}".into()))
        .unwrap_err();
    assert!(matches!(err, WriteFailure::Unencodable(_)));
}

#[test]
fn test_identity_setters_locked_until_disconnected() {
    let (mut session, _) = registered();
    assert!(matches!(
        session.set_username("other"),
        Err(SessionError::IdentityLocked("username"))
    ));
    assert!(session.set_realname("Other").is_err());
    assert!(session.set_password(Some("pw".into())).is_err());

    session.on_transport_disconnected();
    session.set_username("other").unwrap();
    assert_eq!(session.username(), "other");
}

#[test]
fn test_nick_change_while_connected_goes_through_server() {
    let (mut session, wire) = registered();
    session.set_nickname("newme").unwrap();
    assert_eq!(wire.take_lines(), ["NICK newme"]);
    assert_eq!(session.nickname(), "me");

    session.on_data(b":me!user@host NICK :newme\r\n");
    assert_eq!(session.nickname(), "newme");

    session.on_data(b":bob!b@h PRIVMSG newme :hi\r\n");
    assert!(session.target("bob").is_some());
}

#[test]
fn test_failed_nick_change_keeps_identity() {
    let (mut session, wire) = registered();
    wire.fail_writes(io::ErrorKind::BrokenPipe);
    let err = session.set_nickname("newme").unwrap_err();
    assert!(matches!(err, SessionError::Write(_)));
    assert_eq!(session.config().nickname, "me");
    assert_eq!(session.nickname(), "me");
}

#[test]
fn test_transport_error_reported() {
    let (mut session, _) = registered();
    session.on_transport_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(
        events(&mut session),
        [Event::Disconnected {
            reason: Some("reset by peer".into())
        }]
    );
    assert!(!session.is_attached());
}

#[test]
fn test_write_failure_returned() {
    let (mut session, wire) = registered();
    wire.fail_writes(io::ErrorKind::BrokenPipe);
    let err = session.send(&Command::PING("x".into())).unwrap_err();
    assert!(matches!(err, WriteFailure::Io(_)));
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn test_reconnect_keeps_targets_and_rekeys_server() {
    let (mut session, _) = registered();
    session.on_data(b":me!u@h JOIN #keep\r\n");
    session.close().unwrap();
    session.on_transport_disconnected();
    session.set_host("irc2.example.net").unwrap();
    session.drain_events().for_each(drop);

    let wire = MemoryConnection::new();
    session.attach_connection(Box::new(wire.clone()));
    session.open().unwrap();
    session.on_transport_connected().unwrap();
    assert_eq!(
        events(&mut session),
        [
            Event::Connecting,
            Event::TargetRenamed {
                old: "irc.example.net".into(),
                new: "irc2.example.net".into()
            },
        ]
    );
    assert!(session.target("#keep").is_some());
    assert_eq!(session.server_target().unwrap().name(), "irc2.example.net");
}

#[test]
fn test_teardown_removes_everything() {
    let (mut session, _) = registered();
    session.on_data(b":me!u@h JOIN #a\r\n:bob!b@h PRIVMSG me :yo\r\n");
    session.drain_events().for_each(drop);
    session.teardown();
    let evs = events(&mut session);
    assert_eq!(evs[0], Event::Disconnected { reason: None });
    assert_eq!(
        &evs[1..],
        [
            Event::TargetRemoved { target: "#a".into() },
            Event::TargetRemoved { target: "bob".into() },
            Event::TargetRemoved {
                target: "irc.example.net".into()
            },
        ]
    );
    assert_eq!(session.targets().count(), 0);
}

#[test]
fn test_server_notices_before_registration() {
    let (mut session, _) = attached(config());
    session.open().unwrap();
    session.on_transport_connected().unwrap();
    session.drain_events().for_each(drop);
    session.on_data(b":irc.example.net NOTICE AUTH :*** Looking up your hostname\r\n");
    session.on_data(b":irc.example.net NOTICE * :*** Found your hostname\r\n");
    let evs = events(&mut session);
    assert_eq!(evs.len(), 2);
    assert!(evs.iter().all(|e| matches!(
        e,
        Event::Notice { target, .. } if target == "irc.example.net"
    )));
}

#[test]
fn test_close_before_transport_ready() {
    let (mut session, wire) = attached(config());
    session.open().unwrap();
    session.close().unwrap();
    session.on_transport_connected().unwrap();
    assert!(wire.take_lines().is_empty());
    session.on_transport_disconnected();
    assert_eq!(session.state(), SessionState::Disconnected);
}
