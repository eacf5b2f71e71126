//! Conferencing API Response Model
//!
//! This module models every reply shape a conferencing backend produces and
//! how replies of the same shape combine when one client request was fanned
//! out to several backends.
//!
//! # Overview
//!
//! - [`ResponseKind`] - the closed set of API operations
//! - [`Response`] - one variant per operation, dispatched nominally
//! - [`Reply`] - a [`Response`] plus its transport headers
//! - [`envelope`] - the shared status header and its merge rule
//! - [`entities`] - meetings, recordings and their nested types
//! - [`responses`] - the per-operation reply types
//!
//! # Merge Semantics
//!
//! Merging is nominal: two replies only merge when they are the same
//! variant. Singular replies (tickets, details, acknowledgements) never
//! merge, list replies concatenate and boolean outcome replies require
//! equal flags.
//!
//! # Example
//!
//! ```rust
//! use bbbgate::shared::bbb::{Reply, ResponseKind};
//!
//! let body = b"<response><returncode>SUCCESS</returncode><meetings/></response>";
//! let mut a = Reply::decode(ResponseKind::GetMeetings, body).unwrap();
//! let b = Reply::decode(ResponseKind::GetMeetings, body).unwrap();
//! a.merge(b).unwrap();
//! ```

use std::fmt;
use std::str::FromStr;

use http::HeaderMap;

use crate::shared::error::{DecodeError, EncodeError, MergeError};

pub mod entities;
pub mod envelope;
pub mod responses;

pub use entities::{
    Attendee, Attendees, Breakout, BreakoutRooms, Format, Image, Images, Meeting, Meetings,
    Metadata, Playback, Preview, Recording, Recordings, TextTrack,
};
pub use envelope::{Envelope, ReturnCode};
pub use responses::{
    ConfigToken, CreateResponse, DefaultConfigXmlResponse, DeleteRecordingsResponse, Deleted,
    EndResponse, Ended, GetMeetingInfoResponse, GetMeetingsResponse,
    GetRecordingTextTracksResponse, GetRecordingsResponse, IsMeetingRunningResponse, JoinResponse,
    JoinTicket, JsonResponse, MeetingCreated, MeetingInfo, MeetingList, Payload,
    PublishRecordingsResponse, Published, PutRecordingTextTrackResponse, RecordingList,
    ResponseBody, RunningStatus, SetConfigXmlResponse, TextTrackList, TextTrackUploaded,
    UpdateRecordingsResponse, Updated, XmlResponse,
};

/// API operation a reply belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Create,
    Join,
    IsMeetingRunning,
    End,
    GetMeetingInfo,
    GetMeetings,
    GetRecordings,
    PublishRecordings,
    DeleteRecordings,
    UpdateRecordings,
    GetDefaultConfigXml,
    SetConfigXml,
    GetRecordingTextTracks,
    PutRecordingTextTrack,
}

impl ResponseKind {
    /// All operations
    pub const ALL: [ResponseKind; 14] = [
        Self::Create,
        Self::Join,
        Self::IsMeetingRunning,
        Self::End,
        Self::GetMeetingInfo,
        Self::GetMeetings,
        Self::GetRecordings,
        Self::PublishRecordings,
        Self::DeleteRecordings,
        Self::UpdateRecordings,
        Self::GetDefaultConfigXml,
        Self::SetConfigXml,
        Self::GetRecordingTextTracks,
        Self::PutRecordingTextTrack,
    ];

    /// API resource name, the last path segment of the request URL
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Join => "join",
            Self::IsMeetingRunning => "isMeetingRunning",
            Self::End => "end",
            Self::GetMeetingInfo => "getMeetingInfo",
            Self::GetMeetings => "getMeetings",
            Self::GetRecordings => "getRecordings",
            Self::PublishRecordings => "publishRecordings",
            Self::DeleteRecordings => "deleteRecordings",
            Self::UpdateRecordings => "updateRecordings",
            Self::GetDefaultConfigXml => "getDefaultConfigXML",
            Self::SetConfigXml => "setConfigXML",
            Self::GetRecordingTextTracks => "getRecordingTextTracks",
            Self::PutRecordingTextTrack => "putRecordingTextTrack",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

impl FromStr for ResponseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.resource() == s)
            .ok_or_else(|| format!("unknown API resource `{}`", s))
    }
}

/// A decoded reply, one variant per operation
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Create(CreateResponse),
    Join(JoinResponse),
    IsMeetingRunning(IsMeetingRunningResponse),
    End(EndResponse),
    GetMeetingInfo(GetMeetingInfoResponse),
    GetMeetings(GetMeetingsResponse),
    GetRecordings(GetRecordingsResponse),
    PublishRecordings(PublishRecordingsResponse),
    DeleteRecordings(DeleteRecordingsResponse),
    UpdateRecordings(UpdateRecordingsResponse),
    GetDefaultConfigXml(DefaultConfigXmlResponse),
    SetConfigXml(SetConfigXmlResponse),
    GetRecordingTextTracks(GetRecordingTextTracksResponse),
    PutRecordingTextTrack(PutRecordingTextTrackResponse),
}

/// Apply `$body` to the payload of any variant
macro_rules! dispatch {
    ($response:expr, $payload:ident => $body:expr) => {
        match $response {
            Response::Create($payload) => $body,
            Response::Join($payload) => $body,
            Response::IsMeetingRunning($payload) => $body,
            Response::End($payload) => $body,
            Response::GetMeetingInfo($payload) => $body,
            Response::GetMeetings($payload) => $body,
            Response::GetRecordings($payload) => $body,
            Response::PublishRecordings($payload) => $body,
            Response::DeleteRecordings($payload) => $body,
            Response::UpdateRecordings($payload) => $body,
            Response::GetDefaultConfigXml($payload) => $body,
            Response::SetConfigXml($payload) => $body,
            Response::GetRecordingTextTracks($payload) => $body,
            Response::PutRecordingTextTrack($payload) => $body,
        }
    };
}

impl Response {
    /// Operation of this reply
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Create(_) => ResponseKind::Create,
            Self::Join(_) => ResponseKind::Join,
            Self::IsMeetingRunning(_) => ResponseKind::IsMeetingRunning,
            Self::End(_) => ResponseKind::End,
            Self::GetMeetingInfo(_) => ResponseKind::GetMeetingInfo,
            Self::GetMeetings(_) => ResponseKind::GetMeetings,
            Self::GetRecordings(_) => ResponseKind::GetRecordings,
            Self::PublishRecordings(_) => ResponseKind::PublishRecordings,
            Self::DeleteRecordings(_) => ResponseKind::DeleteRecordings,
            Self::UpdateRecordings(_) => ResponseKind::UpdateRecordings,
            Self::GetDefaultConfigXml(_) => ResponseKind::GetDefaultConfigXml,
            Self::SetConfigXml(_) => ResponseKind::SetConfigXml,
            Self::GetRecordingTextTracks(_) => ResponseKind::GetRecordingTextTracks,
            Self::PutRecordingTextTrack(_) => ResponseKind::PutRecordingTextTrack,
        }
    }

    /// Decode the reply of operation `kind`
    pub fn decode(kind: ResponseKind, data: &[u8]) -> Result<Self, DecodeError> {
        Ok(match kind {
            ResponseKind::Create => Self::Create(Payload::decode(data)?),
            ResponseKind::Join => Self::Join(Payload::decode(data)?),
            ResponseKind::IsMeetingRunning => Self::IsMeetingRunning(Payload::decode(data)?),
            ResponseKind::End => Self::End(Payload::decode(data)?),
            ResponseKind::GetMeetingInfo => Self::GetMeetingInfo(Payload::decode(data)?),
            ResponseKind::GetMeetings => Self::GetMeetings(Payload::decode(data)?),
            ResponseKind::GetRecordings => Self::GetRecordings(Payload::decode(data)?),
            ResponseKind::PublishRecordings => Self::PublishRecordings(Payload::decode(data)?),
            ResponseKind::DeleteRecordings => Self::DeleteRecordings(Payload::decode(data)?),
            ResponseKind::UpdateRecordings => Self::UpdateRecordings(Payload::decode(data)?),
            ResponseKind::GetDefaultConfigXml => {
                Self::GetDefaultConfigXml(Payload::decode(data)?)
            }
            ResponseKind::SetConfigXml => Self::SetConfigXml(Payload::decode(data)?),
            ResponseKind::GetRecordingTextTracks => {
                Self::GetRecordingTextTracks(Payload::decode(data)?)
            }
            ResponseKind::PutRecordingTextTrack => {
                Self::PutRecordingTextTrack(Payload::decode(data)?)
            }
        })
    }

    /// Encode to the wire format of the operation
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        dispatch!(self, payload => payload.encode())
    }

    /// Merge a reply of the same variant into this one
    pub fn merge(&mut self, other: Response) -> Result<(), MergeError> {
        match (self, other) {
            (Self::Create(a), Self::Create(b)) => a.merge(b),
            (Self::Join(a), Self::Join(b)) => a.merge(b),
            (Self::IsMeetingRunning(a), Self::IsMeetingRunning(b)) => a.merge(b),
            (Self::End(a), Self::End(b)) => a.merge(b),
            (Self::GetMeetingInfo(a), Self::GetMeetingInfo(b)) => a.merge(b),
            (Self::GetMeetings(a), Self::GetMeetings(b)) => a.merge(b),
            (Self::GetRecordings(a), Self::GetRecordings(b)) => a.merge(b),
            (Self::PublishRecordings(a), Self::PublishRecordings(b)) => a.merge(b),
            (Self::DeleteRecordings(a), Self::DeleteRecordings(b)) => a.merge(b),
            (Self::UpdateRecordings(a), Self::UpdateRecordings(b)) => a.merge(b),
            (Self::GetDefaultConfigXml(a), Self::GetDefaultConfigXml(b)) => a.merge(b),
            (Self::SetConfigXml(a), Self::SetConfigXml(b)) => a.merge(b),
            (Self::GetRecordingTextTracks(a), Self::GetRecordingTextTracks(b)) => a.merge(b),
            (Self::PutRecordingTextTrack(a), Self::PutRecordingTextTrack(b)) => a.merge(b),
            (left, right) => Err(MergeError::cant_be_merged(left.kind(), right.kind())),
        }
    }

    /// Content type of the encoded reply
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::GetRecordingTextTracks(_) | Self::PutRecordingTextTrack(_) => "application/json",
            _ => "application/xml",
        }
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident => $payload:ty),* $(,)?) => {
        $(
            impl From<$payload> for Response {
                fn from(payload: $payload) -> Self {
                    Response::$variant(payload)
                }
            }

            impl From<$payload> for Reply {
                fn from(payload: $payload) -> Self {
                    Reply::new(payload)
                }
            }
        )*
    };
}

impl_from_payload! {
    Create => CreateResponse,
    Join => JoinResponse,
    IsMeetingRunning => IsMeetingRunningResponse,
    End => EndResponse,
    GetMeetingInfo => GetMeetingInfoResponse,
    GetMeetings => GetMeetingsResponse,
    GetRecordings => GetRecordingsResponse,
    PublishRecordings => PublishRecordingsResponse,
    DeleteRecordings => DeleteRecordingsResponse,
    UpdateRecordings => UpdateRecordingsResponse,
    GetDefaultConfigXml => DefaultConfigXmlResponse,
    SetConfigXml => SetConfigXmlResponse,
    GetRecordingTextTracks => GetRecordingTextTracksResponse,
    PutRecordingTextTrack => PutRecordingTextTrackResponse,
}

/// A reply together with the transport headers it arrived with
///
/// Headers are bookkeeping: they take no part in equality, and after a
/// successful merge the headers of the merged-in reply win.
#[derive(Debug, Clone)]
pub struct Reply {
    pub response: Response,
    header: HeaderMap,
}

impl Reply {
    /// Wrap a response without headers
    pub fn new(response: impl Into<Response>) -> Self {
        Self {
            response: response.into(),
            header: HeaderMap::new(),
        }
    }

    /// Decode the reply of operation `kind`
    pub fn decode(kind: ResponseKind, data: &[u8]) -> Result<Self, DecodeError> {
        Response::decode(kind, data).map(Self::new)
    }

    /// Encode the response
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.response.encode()
    }

    /// Operation of the response
    pub fn kind(&self) -> ResponseKind {
        self.response.kind()
    }

    /// Transport headers
    pub fn header(&self) -> &HeaderMap {
        &self.header
    }

    /// Replace the transport headers
    pub fn set_header(&mut self, header: HeaderMap) {
        self.header = header;
    }

    /// Builder style [`Reply::set_header`]
    pub fn with_header(mut self, header: HeaderMap) -> Self {
        self.header = header;
        self
    }

    /// Merge another reply into this one
    pub fn merge(&mut self, other: Reply) -> Result<(), MergeError> {
        self.response.merge(other.response)?;
        self.header = other.header;
        Ok(())
    }
}

impl PartialEq for Reply {
    fn eq(&self, other: &Self) -> bool {
        self.response == other.response
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::new(response)
    }
}
