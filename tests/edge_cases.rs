#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests: boundary conditions in the frame codec, field
//! truncation, frame classification, and transport deadlines.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use bstp_protocol::core::control::{
    ControlMsgType, ControlPacket, CONTROL_FRAME_LEN, CONTROL_MAGIC, PASSWORD_LEN, USER_ID_LEN,
};
use bstp_protocol::core::data::{
    DataMsgType, DataPacket, TaskResponse, DATA_MAGIC, REQUEST_PAYLOAD_LEN, RESPONSE_PAYLOAD_LEN,
    TASK_DESCRIPTION_LEN,
};
use bstp_protocol::core::{FormatStatus, HEADER_LEN};
use bstp_protocol::error::ProtocolError;
use bstp_protocol::protocol::FrameKind;
use bstp_protocol::transport::Channel;

// ============================================================================
// CONTROL FRAME CODEC
// ============================================================================

#[test]
fn control_frame_truncated_input_rejected() {
    let packet = ControlPacket::new(ControlMsgType::LoginRequest);
    let bytes = packet.to_bytes();

    for cut in [0, 1, HEADER_LEN, CONTROL_FRAME_LEN - 1] {
        let result = ControlPacket::from_bytes(&bytes[..cut]);
        match result {
            Err(ProtocolError::TruncatedFrame { expected, got }) => {
                assert_eq!(expected, CONTROL_FRAME_LEN);
                assert_eq!(got, cut);
            }
            other => panic!("cut at {cut}: unexpected result {other:?}"),
        }
    }
}

#[test]
fn control_frame_foreign_magic_rejected() {
    let packet = ControlPacket::new(ControlMsgType::LoginRequest);
    let mut bytes = packet.to_bytes().to_vec();
    bytes[0..4].copy_from_slice(&DATA_MAGIC.to_be_bytes());

    match ControlPacket::from_bytes(&bytes) {
        Err(ProtocolError::MagicMismatch { expected, found }) => {
            assert_eq!(expected, CONTROL_MAGIC);
            assert_eq!(found, DATA_MAGIC);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn oversized_credentials_truncate_with_room_for_nul() {
    let long_user = "u".repeat(USER_ID_LEN * 2);
    let long_password = "p".repeat(PASSWORD_LEN * 2);

    let mut packet = ControlPacket::new(ControlMsgType::LoginRequest);
    packet.set_credentials(&long_user, &long_password);

    assert_eq!(packet.user_id().len(), USER_ID_LEN - 1);
    assert_eq!(packet.password().len(), PASSWORD_LEN - 1);
    // Frame size is unaffected by content length.
    assert_eq!(packet.to_bytes().len(), CONTROL_FRAME_LEN);
}

#[test]
fn multibyte_credentials_truncate_on_char_boundary() {
    // 'é' is two bytes in UTF-8; 64 of them cannot fit in a 64-byte
    // field that also needs a terminator.
    let user = "é".repeat(USER_ID_LEN);
    let mut packet = ControlPacket::new(ControlMsgType::LoginRequest);
    packet.set_credentials(&user, "pw");

    assert!(packet.user_id().len() < USER_ID_LEN);
    assert!(packet.user_id().chars().all(|c| c == 'é'));

    let decoded = ControlPacket::from_bytes(&packet.to_bytes()).unwrap();
    assert_eq!(decoded.user_id(), packet.user_id());
}

#[test]
fn unknown_message_type_fails_format_validation() {
    let packet = ControlPacket::new(ControlMsgType::LoginRequest);
    let mut bytes = packet.to_bytes().to_vec();
    // Message type lives at header offset 6.
    bytes[6..8].copy_from_slice(&999u16.to_be_bytes());

    let decoded = ControlPacket::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.msg_type(), None);
    assert_eq!(decoded.valid_format(), FormatStatus::MsgTypeNotFound);
}

// ============================================================================
// DATA FRAME CODEC
// ============================================================================

#[test]
fn request_and_response_have_distinct_fixed_sizes() {
    let request = DataPacket::request(7);
    assert_eq!(request.to_bytes().len(), HEADER_LEN + REQUEST_PAYLOAD_LEN);

    let response = DataPacket::response(TaskResponse::new());
    assert_eq!(response.to_bytes().len(), HEADER_LEN + RESPONSE_PAYLOAD_LEN);
}

#[test]
fn data_frame_length_must_match_declared_type() {
    let request = DataPacket::request(7);
    let mut bytes = request.to_bytes().to_vec();
    // Claim the response length on a request-typed frame.
    bytes[8..12].copy_from_slice(&(RESPONSE_PAYLOAD_LEN as u32).to_be_bytes());

    match DataPacket::from_bytes(&bytes) {
        Err(ProtocolError::InvalidPayloadLength(len)) => {
            assert_eq!(len as usize, RESPONSE_PAYLOAD_LEN);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn data_frame_unknown_type_rejected() {
    let request = DataPacket::request(7);
    let mut bytes = request.to_bytes().to_vec();
    bytes[6..8].copy_from_slice(&42u16.to_be_bytes());

    match DataPacket::from_bytes(&bytes) {
        Err(ProtocolError::UnknownMessageType(42)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn description_longer_than_field_is_truncated() {
    let long = "d".repeat(TASK_DESCRIPTION_LEN + 500);
    let mut response = TaskResponse::new();
    response.set_description(&long);

    assert_eq!(response.description().len(), TASK_DESCRIPTION_LEN - 1);

    let packet = DataPacket::response(response);
    let decoded = DataPacket::from_bytes(&packet.to_bytes()).unwrap();
    assert_eq!(
        decoded.task_response().unwrap().description().len(),
        TASK_DESCRIPTION_LEN - 1
    );
}

#[test]
fn request_task_id_survives_roundtrip_at_extremes() {
    for id in [0u64, 1, u64::MAX] {
        let packet = DataPacket::request(id);
        let decoded = DataPacket::from_bytes(&packet.to_bytes()).unwrap();
        assert_eq!(decoded.task_id(), id);
        assert_eq!(decoded.msg_type(), Some(DataMsgType::ResourceRequest));
    }
}

// ============================================================================
// FRAME CLASSIFICATION
// ============================================================================

#[test]
fn classification_reads_only_the_magic() {
    let control = ControlPacket::new(ControlMsgType::LoginRequest).to_bytes();
    assert_eq!(
        FrameKind::from_prefix(&control[..4]).unwrap(),
        FrameKind::Control
    );

    let data = DataPacket::request(1).to_bytes();
    assert_eq!(FrameKind::from_prefix(&data[..4]).unwrap(), FrameKind::Data);
}

#[test]
fn classification_rejects_short_and_foreign_prefixes() {
    assert!(matches!(
        FrameKind::from_prefix(&[0x50, 0x49]),
        Err(ProtocolError::InvalidHeader)
    ));
    assert!(matches!(
        FrameKind::from_prefix(&[0xDE, 0xAD, 0xBE, 0xEF]),
        Err(ProtocolError::UnrecognizedFrame(0xDEAD_BEEF))
    ));
}

// ============================================================================
// TRANSPORT DEADLINES AND STREAM STATE
// ============================================================================

#[tokio::test]
async fn recv_times_out_on_silent_peer() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept and hold the socket open without writing.
    let hold = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(stream);
    });

    let mut channel = Channel::connect(
        &addr.to_string(),
        Duration::from_secs(1),
        Duration::from_millis(200),
    )
    .await
    .unwrap();

    match channel.recv_control().await {
        Err(ProtocolError::Timeout) => {}
        other => panic!("unexpected result: {other:?}"),
    }
    hold.abort();
}

#[tokio::test]
async fn recv_reports_closed_stream() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let mut channel = Channel::connect(
        &addr.to_string(),
        Duration::from_secs(1),
        Duration::from_secs(1),
    )
    .await
    .unwrap();

    match channel.recv_frame().await {
        Err(ProtocolError::ConnectionClosed) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn peek_does_not_consume_the_frame() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let packet = ControlPacket::new(ControlMsgType::LoginResponse);
        stream.write_all(&packet.to_bytes()).await.unwrap();
    });

    let mut channel = Channel::connect(
        &addr.to_string(),
        Duration::from_secs(1),
        Duration::from_secs(1),
    )
    .await
    .unwrap();

    // Classifying repeatedly leaves the stream intact.
    assert_eq!(channel.peek_kind().await.unwrap(), FrameKind::Control);
    assert_eq!(channel.peek_kind().await.unwrap(), FrameKind::Control);

    // The full frame is still readable afterwards.
    let packet = channel.recv_control().await.unwrap();
    assert_eq!(packet.msg_type(), Some(ControlMsgType::LoginResponse));
}

#[tokio::test]
async fn mismatched_receive_leaves_the_frame_for_the_right_codec() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream
            .write_all(&DataPacket::request(5).to_bytes())
            .await
            .unwrap();
    });

    let mut channel = Channel::connect(
        &addr.to_string(),
        Duration::from_secs(1),
        Duration::from_secs(1),
    )
    .await
    .unwrap();

    // Asking for a control frame fails, but consumes nothing.
    match channel.recv_control().await {
        Err(ProtocolError::UnexpectedFrame) => {}
        other => panic!("unexpected result: {other:?}"),
    }

    // The data codec can still read the frame whole.
    let packet = channel.recv_data().await.unwrap();
    assert_eq!(packet.task_id(), 5);
}

#[tokio::test]
async fn unrecognized_magic_surfaces_without_consuming() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(b"HTTP/1.1 200 OK\r\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut channel = Channel::connect(
        &addr.to_string(),
        Duration::from_secs(1),
        Duration::from_secs(1),
    )
    .await
    .unwrap();

    match channel.recv_frame().await {
        Err(ProtocolError::UnrecognizedFrame(magic)) => {
            assert_eq!(magic, u32::from_be_bytes(*b"HTTP"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
