//! Typed Replies
//!
//! One type per API operation. Structured replies are an [`Envelope`] plus
//! an operation specific body:
//!
//! - [`XmlResponse<T>`] for the XML document format (`<response>` root)
//! - [`JsonResponse<T>`] for the JSON format (`{"response": {...}}`)
//!
//! The body type decides the merge behaviour through [`ResponseBody`]:
//!
//! | Body | Merge |
//! |------|-------|
//! | [`MeetingCreated`], [`JoinTicket`], [`RunningStatus`], [`Ended`], [`MeetingInfo`], [`ConfigToken`], [`TextTrackUploaded`] | never |
//! | [`MeetingList`], [`RecordingList`], [`TextTrackList`] | envelope, then concatenate |
//! | [`Published`], [`Deleted`], [`Updated`] | envelope, then flags must be equal |
//!
//! The raw configuration document ([`DefaultConfigXmlResponse`]) has no
//! envelope at all and never merges.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::shared::bbb::entities::{Meeting, Meetings, Recordings, TextTrack};
use crate::shared::bbb::envelope::Envelope;
use crate::shared::bbb::ResponseKind;
use crate::shared::error::{DecodeError, EncodeError, MergeError};

/// Decode, encode and merge contract of a single reply shape
pub trait Payload: Sized {
    /// Operation this reply belongs to
    const KIND: ResponseKind;

    /// Decode the wire representation
    fn decode(data: &[u8]) -> Result<Self, DecodeError>;

    /// Encode to the wire representation
    fn encode(&self) -> Result<Vec<u8>, EncodeError>;

    /// Merge `other` into `self`.
    ///
    /// On error `self` must be discarded by the caller.
    fn merge(&mut self, other: Self) -> Result<(), MergeError>;
}

/// Operation specific part of a structured reply
pub trait ResponseBody: Serialize + DeserializeOwned + Clone + PartialEq {
    /// Operation this body belongs to
    const KIND: ResponseKind;

    /// Whether two replies of this shape can be merged at all
    const MERGEABLE: bool = false;

    /// Combine the body of another reply into this one.
    ///
    /// Only called for mergeable shapes, after the envelopes agreed.
    fn merge_body(&mut self, _other: Self) -> Result<(), MergeError> {
        Err(MergeError::cant_be_merged(Self::KIND, Self::KIND))
    }
}

/// A structured reply in the XML document format
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlResponse<T> {
    pub envelope: Envelope,
    pub body: T,
}

impl<T> XmlResponse<T> {
    /// Create a reply from envelope and body
    pub fn new(envelope: Envelope, body: T) -> Self {
        Self { envelope, body }
    }
}

#[derive(Serialize)]
struct XmlDocument<'a, T> {
    #[serde(flatten)]
    envelope: &'a Envelope,
    #[serde(flatten)]
    body: &'a T,
}

impl<T: ResponseBody> Payload for XmlResponse<T> {
    const KIND: ResponseKind = T::KIND;

    // The envelope and the body are read in two passes over the same
    // document; each pass ignores the elements of the other.
    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| DecodeError::syntax(T::KIND, e.to_string()))?;
        let envelope: Envelope = decode_xml(T::KIND, text)?;
        let body: T = decode_xml(T::KIND, text)?;
        Ok(Self { envelope, body })
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let document = XmlDocument {
            envelope: &self.envelope,
            body: &self.body,
        };
        quick_xml::se::to_string_with_root("response", &document)
            .map(String::into_bytes)
            .map_err(|e| EncodeError::xml(T::KIND, e.to_string()))
    }

    fn merge(&mut self, other: Self) -> Result<(), MergeError> {
        if !T::MERGEABLE {
            return Err(MergeError::cant_be_merged(T::KIND, T::KIND));
        }
        let envelope = self.envelope.merged(&other.envelope, T::KIND)?;
        self.body.merge_body(other.body)?;
        self.envelope = envelope;
        Ok(())
    }
}

fn decode_xml<T: DeserializeOwned>(kind: ResponseKind, text: &str) -> Result<T, DecodeError> {
    quick_xml::de::from_str(text).map_err(|e| match e {
        quick_xml::de::DeError::InvalidXml(_) | quick_xml::de::DeError::UnexpectedEof => {
            DecodeError::syntax(kind, e.to_string())
        }
        other => DecodeError::schema(kind, other.to_string()),
    })
}

/// A structured reply in the JSON format
///
/// On the wire the envelope and body fields share one object, wrapped in a
/// single `response` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(flatten)]
    pub body: T,
}

impl<T> JsonResponse<T> {
    /// Create a reply from envelope and body
    pub fn new(envelope: Envelope, body: T) -> Self {
        Self { envelope, body }
    }
}

#[derive(Serialize, Deserialize)]
struct JsonDocument<T> {
    response: T,
}

impl<T: ResponseBody> Payload for JsonResponse<T> {
    const KIND: ResponseKind = T::KIND;

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice::<JsonDocument<JsonResponse<T>>>(data)
            .map(|document| document.response)
            .map_err(|e| match e.classify() {
                serde_json::error::Category::Data => DecodeError::schema(T::KIND, e.to_string()),
                _ => DecodeError::syntax(T::KIND, e.to_string()),
            })
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(&JsonDocument { response: self })
            .map_err(|e| EncodeError::json(T::KIND, e.to_string()))
    }

    fn merge(&mut self, other: Self) -> Result<(), MergeError> {
        if !T::MERGEABLE {
            return Err(MergeError::cant_be_merged(T::KIND, T::KIND));
        }
        let envelope = self.envelope.merged(&other.envelope, T::KIND)?;
        self.body.merge_body(other.body)?;
        self.envelope = envelope;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Singular bodies
// ---------------------------------------------------------------------------

/// Body of `create`: the created meeting's fields inline in `<response>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingCreated {
    pub meeting: Meeting,
}

impl ResponseBody for MeetingCreated {
    const KIND: ResponseKind = ResponseKind::Create;
}

/// Body of `join` when redirect is disabled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinTicket {
    pub meeting_id: String,
    pub user_id: String,
    pub auth_token: String,
    pub session_token: String,
    pub url: String,
}

impl ResponseBody for JoinTicket {
    const KIND: ResponseKind = ResponseKind::Join;
}

/// Body of `isMeetingRunning`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningStatus {
    pub running: bool,
}

impl ResponseBody for RunningStatus {
    const KIND: ResponseKind = ResponseKind::IsMeetingRunning;
}

/// Body of `end`; the envelope carries everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ended {}

impl ResponseBody for Ended {
    const KIND: ResponseKind = ResponseKind::End;
}

/// Body of `getMeetingInfo`: the meeting's fields inline in `<response>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingInfo {
    pub meeting: Meeting,
}

impl ResponseBody for MeetingInfo {
    const KIND: ResponseKind = ResponseKind::GetMeetingInfo;
}

/// Body of `setConfigXML`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigToken {
    pub token: String,
}

impl ResponseBody for ConfigToken {
    const KIND: ResponseKind = ResponseKind::SetConfigXml;
}

/// Body of `putRecordingTextTrack`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTrackUploaded {
    #[serde(rename = "recordId", skip_serializing_if = "String::is_empty")]
    pub record_id: String,
}

impl ResponseBody for TextTrackUploaded {
    const KIND: ResponseKind = ResponseKind::PutRecordingTextTrack;
}

// ---------------------------------------------------------------------------
// Collection bodies
// ---------------------------------------------------------------------------

/// Body of `getMeetings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingList {
    pub meetings: Meetings,
}

impl ResponseBody for MeetingList {
    const KIND: ResponseKind = ResponseKind::GetMeetings;
    const MERGEABLE: bool = true;

    fn merge_body(&mut self, other: Self) -> Result<(), MergeError> {
        self.meetings.items.extend(other.meetings.items);
        Ok(())
    }
}

/// Body of `getRecordings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingList {
    pub recordings: Recordings,
}

impl ResponseBody for RecordingList {
    const KIND: ResponseKind = ResponseKind::GetRecordings;
    const MERGEABLE: bool = true;

    fn merge_body(&mut self, other: Self) -> Result<(), MergeError> {
        self.recordings.items.extend(other.recordings.items);
        Ok(())
    }
}

/// Body of `getRecordingTextTracks`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTrackList {
    pub tracks: Vec<TextTrack>,
}

impl ResponseBody for TextTrackList {
    const KIND: ResponseKind = ResponseKind::GetRecordingTextTracks;
    const MERGEABLE: bool = true;

    fn merge_body(&mut self, other: Self) -> Result<(), MergeError> {
        self.tracks.extend(other.tracks);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Boolean outcome bodies
// ---------------------------------------------------------------------------

fn merge_outcome(
    kind: ResponseKind,
    field: &'static str,
    left: bool,
    right: bool,
) -> Result<(), MergeError> {
    if left != right {
        return Err(MergeError::conflict(kind, field, left.to_string(), right.to_string()));
    }
    Ok(())
}

/// Body of `publishRecordings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Published {
    pub published: bool,
}

impl ResponseBody for Published {
    const KIND: ResponseKind = ResponseKind::PublishRecordings;
    const MERGEABLE: bool = true;

    fn merge_body(&mut self, other: Self) -> Result<(), MergeError> {
        merge_outcome(Self::KIND, "published", self.published, other.published)
    }
}

/// Body of `deleteRecordings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deleted {
    pub deleted: bool,
}

impl ResponseBody for Deleted {
    const KIND: ResponseKind = ResponseKind::DeleteRecordings;
    const MERGEABLE: bool = true;

    fn merge_body(&mut self, other: Self) -> Result<(), MergeError> {
        merge_outcome(Self::KIND, "deleted", self.deleted, other.deleted)
    }
}

/// Body of `updateRecordings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Updated {
    pub updated: bool,
}

impl ResponseBody for Updated {
    const KIND: ResponseKind = ResponseKind::UpdateRecordings;
    const MERGEABLE: bool = true;

    fn merge_body(&mut self, other: Self) -> Result<(), MergeError> {
        merge_outcome(Self::KIND, "updated", self.updated, other.updated)
    }
}

// ---------------------------------------------------------------------------
// Opaque blob
// ---------------------------------------------------------------------------

/// Raw `getDefaultConfigXML` document, passed through uninterpreted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultConfigXmlResponse {
    pub config: Bytes,
}

impl Payload for DefaultConfigXmlResponse {
    const KIND: ResponseKind = ResponseKind::GetDefaultConfigXml;

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            config: Bytes::copy_from_slice(data),
        })
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.config.is_empty() {
            return Err(EncodeError::empty(Self::KIND));
        }
        Ok(self.config.to_vec())
    }

    fn merge(&mut self, _other: Self) -> Result<(), MergeError> {
        Err(MergeError::cant_be_merged(Self::KIND, Self::KIND))
    }
}

pub type CreateResponse = XmlResponse<MeetingCreated>;
pub type JoinResponse = XmlResponse<JoinTicket>;
pub type IsMeetingRunningResponse = XmlResponse<RunningStatus>;
pub type EndResponse = XmlResponse<Ended>;
pub type GetMeetingInfoResponse = XmlResponse<MeetingInfo>;
pub type GetMeetingsResponse = XmlResponse<MeetingList>;
pub type GetRecordingsResponse = XmlResponse<RecordingList>;
pub type PublishRecordingsResponse = XmlResponse<Published>;
pub type DeleteRecordingsResponse = XmlResponse<Deleted>;
pub type UpdateRecordingsResponse = XmlResponse<Updated>;
pub type SetConfigXmlResponse = XmlResponse<ConfigToken>;
pub type GetRecordingTextTracksResponse = JsonResponse<TextTrackList>;
pub type PutRecordingTextTrackResponse = JsonResponse<TextTrackUploaded>;
