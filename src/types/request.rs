//! Inbound (user → Official Account) messages
//!
//! [`RequestMessage`] is the request factory: it reads the `MsgType`
//! discriminator and fills the matching variant from the document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{self, Field, FieldKind, MessageEntity, XmlFields};
use crate::error::WechatError;
use crate::xml::{XmlElement, ROOT};

use super::MessageHeader;

/// `MsgType` values of inbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMsgType {
    Text,
    Image,
    Voice,
    Video,
    #[serde(rename = "shortvideo")]
    ShortVideo,
    Location,
    Link,
    Event,
}

impl RequestMsgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMsgType::Text => "text",
            RequestMsgType::Image => "image",
            RequestMsgType::Voice => "voice",
            RequestMsgType::Video => "video",
            RequestMsgType::ShortVideo => "shortvideo",
            RequestMsgType::Location => "location",
            RequestMsgType::Link => "link",
            RequestMsgType::Event => "event",
        }
    }

    /// Read the discriminator from a document root
    pub fn from_xml(root: &XmlElement) -> Result<Self, WechatError> {
        root.child_text("MsgType")
            .ok_or_else(|| WechatError::MissingField("MsgType".to_string()))?
            .parse()
    }
}

impl FromStr for RequestMsgType {
    type Err = WechatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(RequestMsgType::Text),
            "image" => Ok(RequestMsgType::Image),
            "voice" => Ok(RequestMsgType::Voice),
            "video" => Ok(RequestMsgType::Video),
            "shortvideo" => Ok(RequestMsgType::ShortVideo),
            "location" => Ok(RequestMsgType::Location),
            "link" => Ok(RequestMsgType::Link),
            "event" => Ok(RequestMsgType::Event),
            _ => Err(WechatError::UnsupportedMessageType(s.to_string())),
        }
    }
}

impl fmt::Display for RequestMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRequest {
    pub header: MessageHeader,
    pub content: String,
    pub msg_id: i64,
}

impl XmlFields for TextRequest {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "Content",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.content.as_str(),
                set: |m, v| m.content = v,
            },
        },
        Field {
            name: "MsgId",
            required: true,
            kind: FieldKind::Integer {
                get: |m| m.msg_id,
                set: |m, v| m.msg_id = v,
            },
        },
    ];
}

/// Image message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub header: MessageHeader,
    pub pic_url: String,
    /// Not sent by older platform versions
    pub media_id: String,
    pub msg_id: i64,
}

impl XmlFields for ImageRequest {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "PicUrl",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.pic_url.as_str(),
                set: |m, v| m.pic_url = v,
            },
        },
        Field {
            name: "MediaId",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.media_id.as_str(),
                set: |m, v| m.media_id = v,
            },
        },
        Field {
            name: "MsgId",
            required: true,
            kind: FieldKind::Integer {
                get: |m| m.msg_id,
                set: |m, v| m.msg_id = v,
            },
        },
    ];
}

/// Voice message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRequest {
    pub header: MessageHeader,
    pub media_id: String,
    /// Codec, e.g. `amr` or `speex`
    pub format: String,
    /// Speech recognition result, only when enabled for the account
    pub recognition: String,
    pub msg_id: i64,
}

impl XmlFields for VoiceRequest {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "MediaId",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.media_id.as_str(),
                set: |m, v| m.media_id = v,
            },
        },
        Field {
            name: "Format",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.format.as_str(),
                set: |m, v| m.format = v,
            },
        },
        Field {
            name: "Recognition",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.recognition.as_str(),
                set: |m, v| m.recognition = v,
            },
        },
        Field {
            name: "MsgId",
            required: true,
            kind: FieldKind::Integer {
                get: |m| m.msg_id,
                set: |m, v| m.msg_id = v,
            },
        },
    ];
}

/// Video or short video message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRequest {
    pub header: MessageHeader,
    pub media_id: String,
    pub thumb_media_id: String,
    pub msg_id: i64,
}

impl XmlFields for VideoRequest {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "MediaId",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.media_id.as_str(),
                set: |m, v| m.media_id = v,
            },
        },
        Field {
            name: "ThumbMediaId",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.thumb_media_id.as_str(),
                set: |m, v| m.thumb_media_id = v,
            },
        },
        Field {
            name: "MsgId",
            required: true,
            kind: FieldKind::Integer {
                get: |m| m.msg_id,
                set: |m, v| m.msg_id = v,
            },
        },
    ];
}

/// Location message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRequest {
    pub header: MessageHeader,
    /// Latitude
    pub location_x: f64,
    /// Longitude
    pub location_y: f64,
    /// Map zoom level
    pub scale: i64,
    pub label: String,
    pub msg_id: i64,
}

impl XmlFields for LocationRequest {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "Location_X",
            required: true,
            kind: FieldKind::Float {
                get: |m| m.location_x,
                set: |m, v| m.location_x = v,
            },
        },
        Field {
            name: "Location_Y",
            required: true,
            kind: FieldKind::Float {
                get: |m| m.location_y,
                set: |m, v| m.location_y = v,
            },
        },
        Field {
            name: "Scale",
            required: true,
            kind: FieldKind::Integer {
                get: |m| m.scale,
                set: |m, v| m.scale = v,
            },
        },
        Field {
            name: "Label",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.label.as_str(),
                set: |m, v| m.label = v,
            },
        },
        Field {
            name: "MsgId",
            required: true,
            kind: FieldKind::Integer {
                get: |m| m.msg_id,
                set: |m, v| m.msg_id = v,
            },
        },
    ];
}

/// Link message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequest {
    pub header: MessageHeader,
    pub title: String,
    pub description: String,
    pub url: String,
    pub msg_id: i64,
}

impl XmlFields for LinkRequest {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "Title",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.title.as_str(),
                set: |m, v| m.title = v,
            },
        },
        Field {
            name: "Description",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.description.as_str(),
                set: |m, v| m.description = v,
            },
        },
        Field {
            name: "Url",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.url.as_str(),
                set: |m, v| m.url = v,
            },
        },
        Field {
            name: "MsgId",
            required: true,
            kind: FieldKind::Integer {
                get: |m| m.msg_id,
                set: |m, v| m.msg_id = v,
            },
        },
    ];
}

/// Known values of the `Event` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Subscribe,
    Unsubscribe,
    /// QR code scanned by an existing follower
    Scan,
    /// Periodic location report
    Location,
    /// Menu click
    Click,
    /// Menu link opened
    View,
}

impl FromStr for EventType {
    type Err = WechatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subscribe" => Ok(EventType::Subscribe),
            "unsubscribe" => Ok(EventType::Unsubscribe),
            "scan" => Ok(EventType::Scan),
            "location" => Ok(EventType::Location),
            "click" => Ok(EventType::Click),
            "view" => Ok(EventType::View),
            _ => Err(WechatError::UnsupportedMessageType(format!("event/{}", s))),
        }
    }
}

/// Event push
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub header: MessageHeader,
    /// Raw event name as sent, see [`EventRequest::event_type`]
    pub event: String,
    pub event_key: String,
    /// QR code ticket for `subscribe`/`SCAN` via parametric QR codes
    pub ticket: String,
    pub latitude: f64,
    pub longitude: f64,
    pub precision: f64,
}

impl EventRequest {
    /// Parsed event name; `None` for events this crate has no name for
    pub fn event_type(&self) -> Option<EventType> {
        self.event.parse().ok()
    }
}

impl XmlFields for EventRequest {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "Event",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.event.as_str(),
                set: |m, v| m.event = v,
            },
        },
        Field {
            name: "EventKey",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.event_key.as_str(),
                set: |m, v| m.event_key = v,
            },
        },
        Field {
            name: "Ticket",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.ticket.as_str(),
                set: |m, v| m.ticket = v,
            },
        },
        Field {
            name: "Latitude",
            required: false,
            kind: FieldKind::Float {
                get: |m| m.latitude,
                set: |m, v| m.latitude = v,
            },
        },
        Field {
            name: "Longitude",
            required: false,
            kind: FieldKind::Float {
                get: |m| m.longitude,
                set: |m, v| m.longitude = v,
            },
        },
        Field {
            name: "Precision",
            required: false,
            kind: FieldKind::Float {
                get: |m| m.precision,
                set: |m, v| m.precision = v,
            },
        },
    ];
}

macro_rules! impl_message_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MessageEntity for $ty {
                fn header(&self) -> &MessageHeader {
                    &self.header
                }

                fn header_mut(&mut self) -> &mut MessageHeader {
                    &mut self.header
                }
            }
        )*
    };
}

impl_message_entity!(
    TextRequest,
    ImageRequest,
    VoiceRequest,
    VideoRequest,
    LocationRequest,
    LinkRequest,
    EventRequest,
);

/// An inbound message, one variant per `MsgType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestMessage {
    Text(TextRequest),
    Image(ImageRequest),
    Voice(VoiceRequest),
    Video(VideoRequest),
    ShortVideo(VideoRequest),
    Location(LocationRequest),
    Link(LinkRequest),
    Event(EventRequest),
}

impl RequestMessage {
    /// Parse a callback body into the matching request variant
    pub fn parse(xml: &str) -> Result<Self, WechatError> {
        let root = XmlElement::parse(xml)?;
        Self::from_xml(&root)
    }

    /// Dispatch on `MsgType` and fill the matching variant
    ///
    /// Construction is all-or-nothing: any missing required element or
    /// unconvertible value fails the whole message.
    pub fn from_xml(root: &XmlElement) -> Result<Self, WechatError> {
        if root.name() != ROOT {
            return Err(WechatError::Xml(format!(
                "expected <{}> root, got <{}>",
                ROOT,
                root.name()
            )));
        }

        let message = match RequestMsgType::from_xml(root)? {
            RequestMsgType::Text => RequestMessage::Text(entity::read_message(root)?),
            RequestMsgType::Image => RequestMessage::Image(entity::read_message(root)?),
            RequestMsgType::Voice => RequestMessage::Voice(entity::read_message(root)?),
            RequestMsgType::Video => RequestMessage::Video(entity::read_message(root)?),
            RequestMsgType::ShortVideo => RequestMessage::ShortVideo(entity::read_message(root)?),
            RequestMsgType::Location => RequestMessage::Location(entity::read_message(root)?),
            RequestMsgType::Link => RequestMessage::Link(entity::read_message(root)?),
            RequestMsgType::Event => RequestMessage::Event(entity::read_message(root)?),
        };
        Ok(message)
    }

    pub fn msg_type(&self) -> RequestMsgType {
        match self {
            RequestMessage::Text(_) => RequestMsgType::Text,
            RequestMessage::Image(_) => RequestMsgType::Image,
            RequestMessage::Voice(_) => RequestMsgType::Voice,
            RequestMessage::Video(_) => RequestMsgType::Video,
            RequestMessage::ShortVideo(_) => RequestMsgType::ShortVideo,
            RequestMessage::Location(_) => RequestMsgType::Location,
            RequestMessage::Link(_) => RequestMsgType::Link,
            RequestMessage::Event(_) => RequestMsgType::Event,
        }
    }

    pub fn header(&self) -> &MessageHeader {
        match self {
            RequestMessage::Text(m) => &m.header,
            RequestMessage::Image(m) => &m.header,
            RequestMessage::Voice(m) => &m.header,
            RequestMessage::Video(m) | RequestMessage::ShortVideo(m) => &m.header,
            RequestMessage::Location(m) => &m.header,
            RequestMessage::Link(m) => &m.header,
            RequestMessage::Event(m) => &m.header,
        }
    }

    /// `MsgId`, absent for events
    pub fn msg_id(&self) -> Option<i64> {
        match self {
            RequestMessage::Text(m) => Some(m.msg_id),
            RequestMessage::Image(m) => Some(m.msg_id),
            RequestMessage::Voice(m) => Some(m.msg_id),
            RequestMessage::Video(m) | RequestMessage::ShortVideo(m) => Some(m.msg_id),
            RequestMessage::Location(m) => Some(m.msg_id),
            RequestMessage::Link(m) => Some(m.msg_id),
            RequestMessage::Event(_) => None,
        }
    }

    /// Convert back to a `<xml>` document
    pub fn to_xml(&self) -> Result<XmlElement, WechatError> {
        let msg_type = self.msg_type().as_str();
        match self {
            RequestMessage::Text(m) => entity::write_message(m, msg_type),
            RequestMessage::Image(m) => entity::write_message(m, msg_type),
            RequestMessage::Voice(m) => entity::write_message(m, msg_type),
            RequestMessage::Video(m) | RequestMessage::ShortVideo(m) => {
                entity::write_message(m, msg_type)
            }
            RequestMessage::Location(m) => entity::write_message(m, msg_type),
            RequestMessage::Link(m) => entity::write_message(m, msg_type),
            RequestMessage::Event(m) => entity::write_message(m, msg_type),
        }
    }

    pub fn to_xml_string(&self) -> Result<String, WechatError> {
        self.to_xml()?.to_xml_string()
    }

    /// JSON view of the message, e.g. for forwarding to other services
    pub fn to_json(&self) -> Result<String, WechatError> {
        Ok(serde_json::to_string(self)?)
    }
}
