// test-only module included via protocol/mod.rs
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::core::control::{ControlMsgType, ControlPacket, CONTROL_MAGIC};
use crate::core::data::{DataPacket, DATA_MAGIC};
use crate::error::ProtocolError;
use crate::protocol::dispatcher::FrameKind;
use crate::protocol::session::{SessionEvent, SessionState};

#[test]
fn classify_recognizes_both_magics() {
    assert_eq!(FrameKind::classify(CONTROL_MAGIC), Some(FrameKind::Control));
    assert_eq!(FrameKind::classify(DATA_MAGIC), Some(FrameKind::Data));
    assert_eq!(FrameKind::classify(0xDEAD_BEEF), None);
}

#[test]
fn classify_from_encoded_frames() {
    let control = ControlPacket::new(ControlMsgType::LoginRequest).to_bytes();
    assert_eq!(
        FrameKind::from_prefix(&control[..4]).unwrap(),
        FrameKind::Control
    );

    let data = DataPacket::request(1).to_bytes();
    assert_eq!(FrameKind::from_prefix(&data[..4]).unwrap(), FrameKind::Data);
}

#[test]
fn unrecognized_prefix_reports_the_magic() {
    let garbage = [0xFFu8, 0x00, 0xFF, 0x00];
    match FrameKind::from_prefix(&garbage) {
        Err(ProtocolError::UnrecognizedFrame(magic)) => assert_eq!(magic, 0xFF00_FF00),
        other => panic!("Expected UnrecognizedFrame, got {other:?}"),
    }
}

#[test]
fn short_prefix_is_invalid_header() {
    assert!(matches!(
        FrameKind::from_prefix(&[0x50, 0x49]),
        Err(ProtocolError::InvalidHeader)
    ));
}

#[test]
fn cross_protocol_decode_fails_without_ambiguity() {
    // A data frame must not decode as a control frame even when it is long
    // enough; the magic check fires first.
    let mut padded = DataPacket::response(Default::default()).to_bytes().to_vec();
    padded.resize(600, 0);
    assert!(matches!(
        ControlPacket::from_bytes(&padded),
        Err(ProtocolError::MagicMismatch { .. })
    ));

    let control = ControlPacket::new(ControlMsgType::LoginRequest).to_bytes();
    assert!(matches!(
        DataPacket::from_bytes(&control),
        Err(ProtocolError::MagicMismatch { .. })
    ));
}

#[test]
fn happy_path_walks_the_full_lifecycle() {
    let state = SessionState::Connected
        .advance(SessionEvent::LoginSent)
        .advance(SessionEvent::LoginAccepted)
        .advance(SessionEvent::ExchangeCompleted)
        .advance(SessionEvent::ExchangeCompleted)
        .advance(SessionEvent::LogoutRequested);

    assert_eq!(state, SessionState::Disconnected);
    assert!(state.is_terminal());
}

#[test]
fn rejected_login_returns_to_connected() {
    let state = SessionState::Connected
        .advance(SessionEvent::LoginSent)
        .advance(SessionEvent::LoginRejected);

    assert_eq!(state, SessionState::Connected);

    // And a second attempt may proceed.
    let retried = state
        .advance(SessionEvent::LoginSent)
        .advance(SessionEvent::LoginAccepted);
    assert!(retried.is_authenticated());
}

#[test]
fn transport_events_disconnect_from_any_state() {
    for state in [
        SessionState::Connected,
        SessionState::Authenticating,
        SessionState::Authenticated,
    ] {
        assert_eq!(
            state.advance(SessionEvent::PeerClosed),
            SessionState::Disconnected
        );
        assert_eq!(
            state.advance(SessionEvent::TransportFailed),
            SessionState::Disconnected
        );
    }
}

#[test]
fn disconnected_is_terminal() {
    for event in [
        SessionEvent::LoginSent,
        SessionEvent::LoginAccepted,
        SessionEvent::ExchangeCompleted,
        SessionEvent::LogoutRequested,
    ] {
        assert_eq!(
            SessionState::Disconnected.advance(event),
            SessionState::Disconnected
        );
    }
}

#[test]
fn illegal_events_hold_position() {
    // An exchange cannot happen before authentication.
    assert_eq!(
        SessionState::Connected.advance(SessionEvent::ExchangeCompleted),
        SessionState::Connected
    );
    // A login verdict means nothing when no login is in flight.
    assert_eq!(
        SessionState::Authenticated.advance(SessionEvent::LoginAccepted),
        SessionState::Authenticated
    );
}
