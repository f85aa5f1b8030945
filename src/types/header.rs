use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{self, Field, FieldKind, XmlFields};

/// Envelope shared by every inbound and outbound message
///
/// `MsgType` is not stored here: it is carried by the message enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Recipient (the Official Account's original ID on inbound messages)
    pub to_user_name: String,
    /// Sender (the user's OpenID on inbound messages)
    pub from_user_name: String,
    /// Creation time at UTC+8
    pub create_time: DateTime<FixedOffset>,
}

impl MessageHeader {
    /// Envelope for a reply: sender and recipient swapped, stamped with now
    pub fn reply_to(request: &MessageHeader) -> Self {
        Self {
            to_user_name: request.from_user_name.clone(),
            from_user_name: request.to_user_name.clone(),
            create_time: entity::now(),
        }
    }

    /// `CreateTime` as Unix seconds
    pub fn unix_time(&self) -> i64 {
        entity::to_unix_time(&self.create_time)
    }
}

impl Default for MessageHeader {
    fn default() -> Self {
        Self {
            to_user_name: String::new(),
            from_user_name: String::new(),
            create_time: DateTime::<Utc>::default().with_timezone(&entity::local_offset()),
        }
    }
}

impl XmlFields for MessageHeader {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "ToUserName",
            required: true,
            kind: FieldKind::Text {
                get: |h| h.to_user_name.as_str(),
                set: |h, v| h.to_user_name = v,
            },
        },
        Field {
            name: "FromUserName",
            required: true,
            kind: FieldKind::Text {
                get: |h| h.from_user_name.as_str(),
                set: |h, v| h.from_user_name = v,
            },
        },
        Field {
            name: "CreateTime",
            required: true,
            kind: FieldKind::Timestamp {
                get: |h| h.create_time,
                set: |h, v| h.create_time = v,
            },
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_to_swaps_users() {
        let request = MessageHeader {
            to_user_name: "gh_a96a4a619366".to_string(),
            from_user_name: "olPjZjsXuQPJoV0HlruZkNzKc91E".to_string(),
            create_time: entity::from_unix_time(1357986928).unwrap(),
        };
        let reply = MessageHeader::reply_to(&request);
        assert_eq!(reply.to_user_name, "olPjZjsXuQPJoV0HlruZkNzKc91E");
        assert_eq!(reply.from_user_name, "gh_a96a4a619366");
        assert!(reply.unix_time() > request.unix_time());
    }

    #[test]
    fn test_default_create_time_is_epoch() {
        assert_eq!(MessageHeader::default().unix_time(), 0);
    }
}
