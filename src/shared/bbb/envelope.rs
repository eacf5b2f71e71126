//! Response Envelope
//!
//! Every structured reply of the conferencing API starts with the same
//! header: a return code and an optional human/machine readable message.
//! This module models that header and its merge rule.
//!
//! # Merge Rule
//!
//! - The return codes of both sides must be equal.
//! - `message` and `messageKey` are "singular" facts: a non-empty value
//!   beats an empty one, two different non-empty values are a conflict.
//!
//! The rule only looks at the data, never at which side came first, so
//! merging replies in a different completion order yields the same result.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::bbb::ResponseKind;
use crate::shared::error::MergeError;

/// Return code of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnCode {
    /// `SUCCESS`
    #[default]
    Success,
    /// `FAILED`
    Failed,
}

impl ReturnCode {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    /// Parse the wire representation
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Serialized as a plain string so both XML text content and JSON
// strings decode the same way.
impl Serialize for ReturnCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReturnCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        ReturnCode::parse(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown returncode `{}`", value))
        })
    }
}

/// Status header shared by all structured replies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Outcome of the call
    pub returncode: ReturnCode,
    /// Human readable message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Machine readable message key (e.g. `noMeetings`)
    #[serde(rename = "messageKey", default, skip_serializing_if = "String::is_empty")]
    pub message_key: String,
}

impl Envelope {
    /// A `SUCCESS` envelope without messages
    pub fn success() -> Self {
        Self::default()
    }

    /// A `FAILED` envelope with a message key and message
    pub fn failed(message_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            returncode: ReturnCode::Failed,
            message: message.into(),
            message_key: message_key.into(),
        }
    }

    /// Set the message key
    pub fn with_message_key(mut self, message_key: impl Into<String>) -> Self {
        self.message_key = message_key.into();
        self
    }

    /// Set the human readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Compute the merge of two envelopes without touching either.
    ///
    /// `kind` only labels the conflict.
    pub fn merged(&self, other: &Envelope, kind: ResponseKind) -> Result<Envelope, MergeError> {
        if self.returncode != other.returncode {
            return Err(MergeError::conflict(
                kind,
                "returncode",
                self.returncode.as_str(),
                other.returncode.as_str(),
            ));
        }
        Ok(Envelope {
            returncode: self.returncode,
            message: merge_singular(kind, "message", &self.message, &other.message)?,
            message_key: merge_singular(kind, "messageKey", &self.message_key, &other.message_key)?,
        })
    }
}

fn merge_singular(
    kind: ResponseKind,
    field: &'static str,
    left: &str,
    right: &str,
) -> Result<String, MergeError> {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => Ok(right.to_string()),
        (false, true) => Ok(left.to_string()),
        (false, false) if left == right => Ok(left.to_string()),
        (false, false) => Err(MergeError::conflict(kind, field, left, right)),
    }
}
