//! Property-based tests for reply merging

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use bbbgate::shared::bbb::{
    Envelope, GetMeetingsResponse, GetRecordingsResponse, JoinResponse, Meeting, MeetingList,
    Meetings, Recording, RecordingList, Recordings, Reply, Response,
};
use bbbgate::shared::{merge_replies, AggregateError, SourcedReply};

fn meetings_reply(ids: &[String]) -> Reply {
    let items = ids
        .iter()
        .map(|id| Meeting {
            meeting_id: id.clone(),
            ..Meeting::default()
        })
        .collect();
    GetMeetingsResponse::new(
        Envelope::success(),
        MeetingList {
            meetings: Meetings { items },
        },
    )
    .into()
}

fn meeting_ids(reply: &Reply) -> Vec<String> {
    match &reply.response {
        Response::GetMeetings(res) => res.body.meetings.items.iter().map(|m| m.meeting_id.clone()).collect(),
        other => panic!("Expected GetMeetings, got {:?}", other.kind()),
    }
}

fn backend_meetings() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-z0-9]{1,8}", 0..5), 1..6)
}

proptest! {
    #[test]
    fn test_merged_collection_is_concatenation(per_backend in backend_meetings()) {
        let replies = per_backend
            .iter()
            .enumerate()
            .map(|(i, ids)| SourcedReply::new(format!("bbb{}", i), meetings_reply(ids)))
            .collect();

        let merged = merge_replies(replies).unwrap();

        let expected: Vec<String> = per_backend.concat();
        prop_assert_eq!(meeting_ids(&merged), expected);
    }

    #[test]
    fn test_merge_with_empty_collection_is_identity(ids in prop::collection::vec("[a-z]{1,6}", 0..8)) {
        let mut reply = meetings_reply(&ids);
        reply.merge(meetings_reply(&[])).unwrap();
        prop_assert_eq!(reply, meetings_reply(&ids));
    }

    #[test]
    fn test_failed_merge_leaves_receiver_unchanged(
        ids in prop::collection::vec("[a-z]{1,6}", 0..5),
        record_ids in prop::collection::vec("[a-z]{1,6}", 0..5),
    ) {
        let mut reply = meetings_reply(&ids);
        let recordings: Reply = GetRecordingsResponse::new(
            Envelope::success(),
            RecordingList {
                recordings: Recordings {
                    items: record_ids
                        .iter()
                        .map(|id| Recording { record_id: id.clone(), ..Recording::default() })
                        .collect(),
                },
            },
        )
        .into();

        prop_assert!(reply.merge(recordings).is_err());
        prop_assert_eq!(reply, meetings_reply(&ids));
    }

    #[test]
    fn test_singular_replies_abort_at_second(count in 2usize..6) {
        let replies = (0..count)
            .map(|i| SourcedReply::new(format!("bbb{}", i), JoinResponse::default()))
            .collect();

        match merge_replies(replies) {
            Err(AggregateError::Merge { step, merged, offending, .. }) => {
                prop_assert_eq!(step, 1);
                prop_assert_eq!(merged, vec!["bbb0".to_string()]);
                prop_assert_eq!(offending, "bbb1".to_string());
            }
            other => prop_assert!(false, "Expected merge failure, got {:?}", other),
        }
    }
}

#[test]
fn test_merged_reply_keeps_last_header() {
    let mut first = meetings_reply(&["a".to_string()]);
    first.set_header(http_header("bbb1"));
    let second = meetings_reply(&["b".to_string()]).with_header(http_header("bbb2"));

    let merged = merge_replies(vec![
        SourcedReply::new("bbb1", first),
        SourcedReply::new("bbb2", second),
    ])
    .unwrap();

    assert_eq!(merged.header().get("x-backend").unwrap(), "bbb2");
    assert_eq!(meeting_ids(&merged), vec!["a".to_string(), "b".to_string()]);
}

fn http_header(value: &'static str) -> http::HeaderMap {
    let mut header = http::HeaderMap::new();
    header.insert("x-backend", http::HeaderValue::from_static(value));
    header
}
