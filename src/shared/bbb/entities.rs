//! Conferencing Entities
//!
//! Decode targets for the payloads carried inside replies: meetings with
//! their attendees and breakout rooms, recordings with their playback
//! formats, and recording text tracks.
//!
//! These values are built once from backend bytes and never mutated by the
//! gateway. They have no merge semantics of their own; list replies merge by
//! concatenating them.
//!
//! Nested XML lists (`<attendees><attendee/>...</attendees>`) are modelled
//! with small wrapper types whose `items` hold the elements in document
//! order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Free form `<metadata>` key/value pairs
///
/// Each child element of `<metadata>` is one entry, the element name being
/// the key.
pub type Metadata = BTreeMap<String, String>;

/// Breakout information of a breakout room meeting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakout {
    #[serde(rename = "parentMeetingID")]
    pub parent_meeting_id: String,
    pub sequence: i32,
    #[serde(rename = "freeJoin")]
    pub free_join: bool,
}

/// Attendee of a meeting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attendee {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub role: String,
    #[serde(rename = "isPresenter")]
    pub is_presenter: bool,
    #[serde(rename = "isListeningOnly")]
    pub is_listening_only: bool,
    #[serde(rename = "hasJoinedVoice")]
    pub has_joined_voice: bool,
    #[serde(rename = "hasVideo")]
    pub has_video: bool,
    #[serde(rename = "clientType")]
    pub client_type: String,
}

/// `<attendees>` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendees {
    #[serde(rename = "attendee", default)]
    pub items: Vec<Attendee>,
}

/// `<breakoutRooms>` list of breakout meeting ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakoutRooms {
    #[serde(rename = "breakout", default)]
    pub items: Vec<String>,
}

/// Meeting information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meeting {
    #[serde(rename = "meetingName")]
    pub meeting_name: String,
    #[serde(rename = "meetingID")]
    pub meeting_id: String,
    #[serde(rename = "internalMeetingID")]
    pub internal_meeting_id: String,
    /// Unix timestamp in milliseconds
    #[serde(rename = "createTime")]
    pub create_time: i64,
    #[serde(rename = "createDate")]
    pub create_date: String,
    #[serde(rename = "voiceBridge")]
    pub voice_bridge: String,
    #[serde(rename = "dialNumber")]
    pub dial_number: String,
    #[serde(rename = "attendeePW")]
    pub attendee_pw: String,
    #[serde(rename = "moderatorPW")]
    pub moderator_pw: String,
    pub running: bool,
    pub duration: i32,
    pub recording: bool,
    #[serde(rename = "hasBeenForciblyEnded")]
    pub has_been_forcibly_ended: bool,
    #[serde(rename = "startTime")]
    pub start_time: i64,
    #[serde(rename = "endTime")]
    pub end_time: i64,
    #[serde(rename = "participantCount")]
    pub participant_count: u32,
    #[serde(rename = "listenerCount")]
    pub listener_count: u32,
    #[serde(rename = "voiceParticipantCount")]
    pub voice_participant_count: u32,
    #[serde(rename = "videoCount")]
    pub video_count: u32,
    #[serde(rename = "maxUsers")]
    pub max_users: u32,
    #[serde(rename = "moderatorCount")]
    pub moderator_count: u32,
    #[serde(rename = "isBreakout")]
    pub is_breakout: bool,
    pub metadata: Metadata,
    pub attendees: Attendees,
    #[serde(rename = "breakoutRooms")]
    pub breakout_rooms: BreakoutRooms,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakout: Option<Breakout>,
}

impl fmt::Display for Meeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Meeting id: {}, pc: {}, mc: {}, running: {}]",
            self.meeting_id, self.participant_count, self.moderator_count, self.running
        )
    }
}

/// `<meetings>` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meetings {
    #[serde(rename = "meeting", default)]
    pub items: Vec<Meeting>,
}

/// Preview image of a playback format
///
/// The image URL is the element's text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    #[serde(rename = "@alt")]
    pub alt: String,
    #[serde(rename = "@height")]
    pub height: u32,
    #[serde(rename = "@width")]
    pub width: u32,
    #[serde(rename = "$text")]
    pub url: String,
}

/// `<images>` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Images {
    #[serde(rename = "image", default)]
    pub items: Vec<Image>,
}

/// Preview of a playback format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    #[serde(default)]
    pub images: Images,
}

/// Playable media of a recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    #[serde(rename = "type")]
    pub format_type: String,
    pub url: String,
    /// Processing time in milliseconds
    #[serde(rename = "processingTime")]
    pub processing_time: i64,
    /// Length in minutes
    pub length: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
}

/// `<playback>` list of formats
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playback {
    #[serde(rename = "format", default)]
    pub items: Vec<Format>,
}

/// A recorded session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recording {
    #[serde(rename = "recordID")]
    pub record_id: String,
    #[serde(rename = "meetingID")]
    pub meeting_id: String,
    #[serde(rename = "internalMeetingID")]
    pub internal_meeting_id: String,
    pub name: String,
    #[serde(rename = "isBreakout")]
    pub is_breakout: bool,
    pub published: bool,
    pub state: String,
    #[serde(rename = "startTime")]
    pub start_time: i64,
    #[serde(rename = "endTime")]
    pub end_time: i64,
    pub participants: u32,
    pub metadata: Metadata,
    pub playback: Playback,
}

/// `<recordings>` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recordings {
    #[serde(rename = "recording", default)]
    pub items: Vec<Recording>,
}

/// Text track (subtitles, captions) of a recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTrack {
    pub href: String,
    pub kind: String,
    pub label: String,
    pub source: String,
}
