//! TITP, the data channel.
//!
//! The Task Information Transfer Protocol carries resource request/response
//! messages. Unlike PIAP, frames are variable-sized: the header's
//! `payload_length` declares how many payload bytes follow, and the message
//! type selects one of two payload shapes, modeled as a tagged enum
//! ([`DataPayload`]) so reading the wrong variant is impossible.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::core::bounded::BoundedText;
use crate::core::header::{FrameHeader, HEADER_LEN};
use crate::core::status::{Difficulty, FormatStatus, ResourceStatus};
use crate::error::{ProtocolError, Result};
use crate::utils::time;

/// "TITP" in ASCII.
pub const DATA_MAGIC: u32 = 0x5449_5450;
/// Supported wire-format version.
pub const DATA_VERSION: u16 = 0x0100;
/// Maximum age of a timestamped data frame, in seconds.
pub const DATA_TTL_SECS: u32 = 30;

pub const TASK_NAME_LEN: usize = 64;
pub const TASK_DESCRIPTION_LEN: usize = 2048;

/// Request payload: just the task id.
pub const REQUEST_PAYLOAD_LEN: usize = 8;

/// Response metadata block: task id, name, difficulty, three alignment
/// bytes, then the two u16 status codes.
pub const RESPONSE_METADATA_LEN: usize = 8 + TASK_NAME_LEN + 1 + 3 + 2 + 2;

/// Response payload: metadata block plus the full description field. The
/// whole field is always sent, regardless of how much text it holds.
pub const RESPONSE_PAYLOAD_LEN: usize = RESPONSE_METADATA_LEN + TASK_DESCRIPTION_LEN;

/// Data-channel message discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum DataMsgType {
    /// Client asks for a task by id.
    ResourceRequest = 0x0001,
    /// Server ships the task, successfully or not; the payload's
    /// `resource_status` says which.
    ResourceSent = 0x0004,
}

impl DataMsgType {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0001 => Some(Self::ResourceRequest),
            0x0004 => Some(Self::ResourceSent),
            _ => None,
        }
    }
}

/// Server-side response payload: task metadata plus description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskResponse {
    task_id: u64,
    task_name: BoundedText<TASK_NAME_LEN>,
    difficulty: Difficulty,
    msg_status: u16,
    resource_status: u16,
    description: BoundedText<TASK_DESCRIPTION_LEN>,
}

impl TaskResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_task_id(&mut self, id: u64) {
        self.task_id = id;
    }

    /// Overlong names are truncated to the wire width and NUL-terminated.
    pub fn set_task_name(&mut self, name: &str) {
        self.task_name = BoundedText::new(name);
    }

    /// Overlong descriptions are truncated to the wire width and
    /// NUL-terminated; the overflow is discarded.
    pub fn set_description(&mut self, description: &str) {
        self.description = BoundedText::new(description);
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn set_format_status(&mut self, status: FormatStatus) {
        self.msg_status = status.code();
    }

    pub fn set_resource_status(&mut self, status: ResourceStatus) {
        self.resource_status = status.code();
    }

    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    pub fn task_name(&self) -> &str {
        self.task_name.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn format_status(&self) -> Option<FormatStatus> {
        FormatStatus::from_code(self.msg_status)
    }

    pub fn resource_status(&self) -> Option<ResourceStatus> {
        ResourceStatus::from_code(self.resource_status)
    }

    fn encode_into<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64(self.task_id);
        self.task_name.encode_into(buf);
        buf.put_u8(self.difficulty.code());
        buf.put_bytes(0, 3); // alignment padding
        buf.put_u16(self.msg_status);
        buf.put_u16(self.resource_status);
        self.description.encode_into(buf);
    }

    fn decode_from<B: Buf>(buf: &mut B) -> Self {
        let task_id = buf.get_u64();
        let task_name = BoundedText::decode_from(buf);
        let difficulty = Difficulty::from_code(buf.get_u8());
        buf.advance(3);
        let msg_status = buf.get_u16();
        let resource_status = buf.get_u16();
        let description = BoundedText::decode_from(buf);

        Self {
            task_id,
            task_name,
            difficulty,
            msg_status,
            resource_status,
            description,
        }
    }
}

/// The payload variant selected by the header's message type. Exactly one
/// shape exists per packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataPayload {
    Request { task_id: u64 },
    Response(TaskResponse),
}

/// A TITP frame: header plus one tagged payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    header: FrameHeader,
    payload: DataPayload,
}

impl DataPacket {
    /// Build a RESOURCE_REQUEST frame.
    pub fn request(task_id: u64) -> Self {
        Self {
            header: FrameHeader::new(
                DATA_MAGIC,
                DATA_VERSION,
                DataMsgType::ResourceRequest.code(),
                REQUEST_PAYLOAD_LEN as u32,
            ),
            payload: DataPayload::Request { task_id },
        }
    }

    /// Build a RESOURCE_SENT frame around a response payload.
    pub fn response(response: TaskResponse) -> Self {
        Self {
            header: FrameHeader::new(
                DATA_MAGIC,
                DATA_VERSION,
                DataMsgType::ResourceSent.code(),
                RESPONSE_PAYLOAD_LEN as u32,
            ),
            payload: DataPayload::Response(response),
        }
    }

    /// Stamp the header with an issue time, opting in to TTL enforcement.
    pub fn set_timestamp(&mut self, epoch_secs: u32) {
        self.header.timestamp = epoch_secs;
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn msg_type(&self) -> Option<DataMsgType> {
        DataMsgType::from_code(self.header.msg_type)
    }

    pub fn payload(&self) -> &DataPayload {
        &self.payload
    }

    /// The requested or shipped task id; meaningful in both variants.
    pub fn task_id(&self) -> u64 {
        match &self.payload {
            DataPayload::Request { task_id } => *task_id,
            DataPayload::Response(response) => response.task_id(),
        }
    }

    /// The response payload, if this frame carries one.
    pub fn task_response(&self) -> Option<&TaskResponse> {
        match &self.payload {
            DataPayload::Response(response) => Some(response),
            DataPayload::Request { .. } => None,
        }
    }

    /// Total encoded size: header plus the declared payload.
    pub fn wire_size(&self) -> usize {
        HEADER_LEN + self.header.payload_length as usize
    }

    /// Serialize the frame. A response always fills the entire description
    /// field, so its size does not depend on the text length.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.header.encode_into(&mut buf);
        match &self.payload {
            DataPayload::Request { task_id } => buf.put_u64(*task_id),
            DataPayload::Response(response) => response.encode_into(&mut buf),
        }

        debug_assert_eq!(buf.len(), self.wire_size());
        buf.freeze()
    }

    /// Deserialize a full data frame.
    ///
    /// The declared `payload_length` must match the exact shape the message
    /// type selects; anything else is rejected before the payload is read.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = FrameHeader::decode(bytes)?;
        if header.magic != DATA_MAGIC {
            return Err(ProtocolError::MagicMismatch {
                expected: DATA_MAGIC,
                found: header.magic,
            });
        }
        if header.version != DATA_VERSION {
            return Err(ProtocolError::UnsupportedVersion(header.version));
        }

        let msg_type = DataMsgType::from_code(header.msg_type)
            .ok_or(ProtocolError::UnknownMessageType(header.msg_type))?;

        let expected_payload = match msg_type {
            DataMsgType::ResourceRequest => REQUEST_PAYLOAD_LEN,
            DataMsgType::ResourceSent => RESPONSE_PAYLOAD_LEN,
        };
        if header.payload_length as usize != expected_payload {
            return Err(ProtocolError::InvalidPayloadLength(header.payload_length));
        }

        let total = HEADER_LEN + expected_payload;
        if bytes.len() < total {
            return Err(ProtocolError::TruncatedFrame {
                expected: total,
                got: bytes.len(),
            });
        }

        let mut cur = &bytes[HEADER_LEN..total];
        let payload = match msg_type {
            DataMsgType::ResourceRequest => DataPayload::Request {
                task_id: cur.get_u64(),
            },
            DataMsgType::ResourceSent => {
                DataPayload::Response(TaskResponse::decode_from(&mut cur))
            }
        };

        Ok(Self { header, payload })
    }

    /// Format validation against the wall clock. See [`Self::valid_format_at`].
    pub fn valid_format(&self) -> FormatStatus {
        self.valid_format_at(time::unix_now())
    }

    /// Pure format validation: magic, version, known message type, then TTL
    /// when the frame is timestamped. First violation wins.
    pub fn valid_format_at(&self, now: u32) -> FormatStatus {
        if self.header.magic != DATA_MAGIC {
            return FormatStatus::MagicMismatch;
        }
        if self.header.version != DATA_VERSION {
            return FormatStatus::BadVersion;
        }
        if self.msg_type().is_none() {
            return FormatStatus::MsgTypeNotFound;
        }
        if self.header.timestamp != 0
            && (now < self.header.timestamp || now > self.header.timestamp + DATA_TTL_SECS)
        {
            return FormatStatus::TimestampErr;
        }
        FormatStatus::FormatOk
    }

    /// Resource business check, meaningful only for RESOURCE_SENT frames.
    /// Calling it on a request yields [`ResourceStatus::ResourceNotFound`]
    /// rather than panicking.
    pub fn valid_resource(&self, exists: bool, valid: bool) -> ResourceStatus {
        if self.msg_type() != Some(DataMsgType::ResourceSent) {
            return ResourceStatus::ResourceNotFound;
        }
        if !exists {
            return ResourceStatus::ResourceNotFound;
        }
        if !valid {
            return ResourceStatus::ResourceInfoMismatch;
        }
        ResourceStatus::ResourceAck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> TaskResponse {
        let mut response = TaskResponse::new();
        response.set_task_id(1);
        response.set_task_name("CollectResources");
        response.set_description("Gather 10 wood and 5 stone from the forest");
        response.set_difficulty(Difficulty::Medium);
        response.set_format_status(FormatStatus::FormatOk);
        response.set_resource_status(ResourceStatus::ResourceAck);
        response
    }

    #[test]
    fn payload_layout_constants() {
        assert_eq!(RESPONSE_METADATA_LEN, 80);
        assert_eq!(RESPONSE_PAYLOAD_LEN, 2128);
    }

    #[test]
    fn request_roundtrip() {
        let packet = DataPacket::request(42);
        assert_eq!(packet.wire_size(), HEADER_LEN + REQUEST_PAYLOAD_LEN);

        let bytes = packet.to_bytes();
        assert_eq!(bytes.len(), packet.wire_size());

        let decoded = DataPacket::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded, packet);
        assert_eq!(decoded.task_id(), 42);
        assert!(decoded.task_response().is_none());
    }

    #[test]
    fn response_roundtrip() {
        let packet = DataPacket::response(sample_response());
        let bytes = packet.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + RESPONSE_PAYLOAD_LEN);

        let decoded = DataPacket::from_bytes(&bytes).expect("decode");
        let response = decoded.task_response().expect("response variant");
        assert_eq!(response.task_name(), "CollectResources");
        assert_eq!(response.difficulty(), Difficulty::Medium);
        assert_eq!(response.resource_status(), Some(ResourceStatus::ResourceAck));
    }

    #[test]
    fn response_size_is_independent_of_description_length() {
        let mut short = sample_response();
        short.set_description("x");
        let mut long = sample_response();
        long.set_description(&"y".repeat(5000));

        let short_frame = DataPacket::response(short);
        let long_frame = DataPacket::response(long);
        assert_eq!(short_frame.wire_size(), long_frame.wire_size());
        assert_eq!(short_frame.to_bytes().len(), long_frame.to_bytes().len());

        // Overlong description was truncated to capacity minus the NUL.
        let decoded = DataPacket::from_bytes(&long_frame.to_bytes()).expect("decode");
        let response = decoded.task_response().expect("response variant");
        assert_eq!(response.description().len(), TASK_DESCRIPTION_LEN - 1);
    }

    #[test]
    fn declared_length_must_match_variant() {
        let packet = DataPacket::request(7);
        let mut bytes = packet.to_bytes().to_vec();
        // Claim a response-sized payload on a request frame.
        bytes[8..12].copy_from_slice(&(RESPONSE_PAYLOAD_LEN as u32).to_be_bytes());

        assert!(matches!(
            DataPacket::from_bytes(&bytes),
            Err(ProtocolError::InvalidPayloadLength(_))
        ));
    }

    #[test]
    fn unknown_msg_type_is_rejected_by_codec() {
        let packet = DataPacket::request(7);
        let mut bytes = packet.to_bytes().to_vec();
        bytes[6..8].copy_from_slice(&0x00FFu16.to_be_bytes());

        assert!(matches!(
            DataPacket::from_bytes(&bytes),
            Err(ProtocolError::UnknownMessageType(0x00FF))
        ));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let packet = DataPacket::response(sample_response());
        let bytes = packet.to_bytes();

        assert!(matches!(
            DataPacket::from_bytes(&bytes[..bytes.len() - 1]),
            Err(ProtocolError::TruncatedFrame { .. })
        ));
    }

    #[test]
    fn format_check_honors_shorter_data_ttl() {
        let mut packet = DataPacket::request(1);
        let now = 1_700_000_000u32;

        packet.set_timestamp(now - DATA_TTL_SECS);
        assert_eq!(packet.valid_format_at(now), FormatStatus::FormatOk);

        packet.set_timestamp(now - DATA_TTL_SECS - 1);
        assert_eq!(packet.valid_format_at(now), FormatStatus::TimestampErr);
    }

    #[test]
    fn resource_check_gates_on_variant() {
        let request = DataPacket::request(1);
        assert_eq!(
            request.valid_resource(true, true),
            ResourceStatus::ResourceNotFound
        );

        let response = DataPacket::response(sample_response());
        assert_eq!(
            response.valid_resource(false, true),
            ResourceStatus::ResourceNotFound
        );
        assert_eq!(
            response.valid_resource(true, false),
            ResourceStatus::ResourceInfoMismatch
        );
        assert_eq!(
            response.valid_resource(true, true),
            ResourceStatus::ResourceAck
        );
    }
}
