//! Passive replies (Official Account → user)
//!
//! [`ResponseMessage::from_request`] is the response factory: it builds an
//! empty reply of the requested type addressed back to the sender.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::{self, Field, FieldKind, MessageEntity, XmlFields};
use crate::error::WechatError;
use crate::xml::{XmlElement, ROOT};

use super::{MessageHeader, RequestMessage};

/// Platform limit on the number of articles in a news reply
pub const MAX_ARTICLES: usize = 10;

/// `MsgType` values of replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMsgType {
    Text,
    Image,
    Voice,
    Video,
    Music,
    News,
    TransferCustomerService,
}

impl ResponseMsgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMsgType::Text => "text",
            ResponseMsgType::Image => "image",
            ResponseMsgType::Voice => "voice",
            ResponseMsgType::Video => "video",
            ResponseMsgType::Music => "music",
            ResponseMsgType::News => "news",
            ResponseMsgType::TransferCustomerService => "transfer_customer_service",
        }
    }
}

impl FromStr for ResponseMsgType {
    type Err = WechatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ResponseMsgType::Text),
            "image" => Ok(ResponseMsgType::Image),
            "voice" => Ok(ResponseMsgType::Voice),
            "video" => Ok(ResponseMsgType::Video),
            "music" => Ok(ResponseMsgType::Music),
            "news" => Ok(ResponseMsgType::News),
            "transfer_customer_service" => Ok(ResponseMsgType::TransferCustomerService),
            _ => Err(WechatError::UnsupportedMessageType(s.to_string())),
        }
    }
}

impl fmt::Display for ResponseMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResponse {
    pub header: MessageHeader,
    pub content: String,
}

impl TextResponse {
    pub fn reply_to(request: &MessageHeader) -> Self {
        Self {
            header: MessageHeader::reply_to(request),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

impl XmlFields for TextResponse {
    const FIELDS: &'static [Field<Self>] = &[Field {
        name: "Content",
        required: true,
        kind: FieldKind::Text {
            get: |m| m.content.as_str(),
            set: |m, v| m.content = v,
        },
    }];
}

/// Reference to previously uploaded media
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub media_id: String,
}

impl XmlFields for Media {
    const FIELDS: &'static [Field<Self>] = &[Field {
        name: "MediaId",
        required: true,
        kind: FieldKind::Text {
            get: |m| m.media_id.as_str(),
            set: |m, v| m.media_id = v,
        },
    }];
}

/// Image reply, `<Image><MediaId/></Image>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub header: MessageHeader,
    pub image: Media,
}

impl ImageResponse {
    pub fn reply_to(request: &MessageHeader) -> Self {
        Self {
            header: MessageHeader::reply_to(request),
            ..Self::default()
        }
    }
}

impl XmlFields for ImageResponse {
    const FIELDS: &'static [Field<Self>] = &[Field {
        name: "Image",
        required: true,
        kind: FieldKind::Element {
            read: |m, node| entity::fill_fields(&mut m.image, node),
            write: |m| entity::to_element("Image", &m.image),
        },
    }];
}

/// Voice reply, `<Voice><MediaId/></Voice>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceResponse {
    pub header: MessageHeader,
    pub voice: Media,
}

impl VoiceResponse {
    pub fn reply_to(request: &MessageHeader) -> Self {
        Self {
            header: MessageHeader::reply_to(request),
            ..Self::default()
        }
    }
}

impl XmlFields for VoiceResponse {
    const FIELDS: &'static [Field<Self>] = &[Field {
        name: "Voice",
        required: true,
        kind: FieldKind::Element {
            read: |m, node| entity::fill_fields(&mut m.voice, node),
            write: |m| entity::to_element("Voice", &m.voice),
        },
    }];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub media_id: String,
    pub title: String,
    pub description: String,
}

impl XmlFields for Video {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "MediaId",
            required: true,
            kind: FieldKind::Text {
                get: |v| v.media_id.as_str(),
                set: |v, s| v.media_id = s,
            },
        },
        Field {
            name: "Title",
            required: false,
            kind: FieldKind::Text {
                get: |v| v.title.as_str(),
                set: |v, s| v.title = s,
            },
        },
        Field {
            name: "Description",
            required: false,
            kind: FieldKind::Text {
                get: |v| v.description.as_str(),
                set: |v, s| v.description = s,
            },
        },
    ];
}

/// Video reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResponse {
    pub header: MessageHeader,
    pub video: Video,
}

impl VideoResponse {
    pub fn reply_to(request: &MessageHeader) -> Self {
        Self {
            header: MessageHeader::reply_to(request),
            ..Self::default()
        }
    }
}

impl XmlFields for VideoResponse {
    const FIELDS: &'static [Field<Self>] = &[Field {
        name: "Video",
        required: true,
        kind: FieldKind::Element {
            read: |m, node| entity::fill_fields(&mut m.video, node),
            write: |m| entity::to_element("Video", &m.video),
        },
    }];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Music {
    pub title: String,
    pub description: String,
    pub music_url: String,
    /// High quality link, preferred on Wi-Fi
    pub hq_music_url: String,
    pub thumb_media_id: String,
}

impl XmlFields for Music {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "Title",
            required: false,
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
            name: "MusicUrl",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.music_url.as_str(),
                set: |m, v| m.music_url = v,
            },
        },
        Field {
            name: "HQMusicUrl",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.hq_music_url.as_str(),
                set: |m, v| m.hq_music_url = v,
            },
        },
        Field {
            name: "ThumbMediaId",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.thumb_media_id.as_str(),
                set: |m, v| m.thumb_media_id = v,
            },
        },
    ];
}

/// Music reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicResponse {
    pub header: MessageHeader,
    pub music: Music,
}

impl MusicResponse {
    pub fn reply_to(request: &MessageHeader) -> Self {
        Self {
            header: MessageHeader::reply_to(request),
            ..Self::default()
        }
    }
}

impl XmlFields for MusicResponse {
    const FIELDS: &'static [Field<Self>] = &[Field {
        name: "Music",
        required: true,
        kind: FieldKind::Element {
            read: |m, node| entity::fill_fields(&mut m.music, node),
            write: |m| entity::to_element("Music", &m.music),
        },
    }];
}

/// One card of a news reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub pic_url: String,
    pub url: String,
}

impl XmlFields for Article {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "Title",
            required: false,
            kind: FieldKind::Text {
                get: |a| a.title.as_str(),
                set: |a, v| a.title = v,
            },
        },
        Field {
            name: "Description",
            required: false,
            kind: FieldKind::Text {
                get: |a| a.description.as_str(),
                set: |a, v| a.description = v,
            },
        },
        Field {
            name: "PicUrl",
            required: false,
            kind: FieldKind::Text {
                get: |a| a.pic_url.as_str(),
                set: |a, v| a.pic_url = v,
            },
        },
        Field {
            name: "Url",
            required: false,
            kind: FieldKind::Text {
                get: |a| a.url.as_str(),
                set: |a, v| a.url = v,
            },
        },
    ];
}

/// News (article list) reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsResponse {
    pub header: MessageHeader,
    #[serde(deserialize_with = "deserialize_articles")]
    articles: Vec<Article>,
}

impl NewsResponse {
    pub fn reply_to(request: &MessageHeader) -> Self {
        Self {
            header: MessageHeader::reply_to(request),
            ..Self::default()
        }
    }

    /// Append an article, rejecting more than [`MAX_ARTICLES`]
    pub fn push_article(&mut self, article: Article) -> Result<(), WechatError> {
        check_article_count(self.articles.len() + 1)?;
        self.articles.push(article);
        Ok(())
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }
}

impl XmlFields for NewsResponse {
    const FIELDS: &'static [Field<Self>] = &[
        // derived from Articles, never read back
        Field {
            name: "ArticleCount",
            required: false,
            kind: FieldKind::Element {
                read: |_, _| Ok(()),
                write: |m| {
                    Ok(XmlElement::text_node(
                        "ArticleCount",
                        m.articles.len().to_string(),
                    ))
                },
            },
        },
        Field {
            name: "Articles",
            required: true,
            kind: FieldKind::Element {
                read: |m, node| {
                    m.articles = read_articles(node)?;
                    Ok(())
                },
                write: |m| write_articles(&m.articles),
            },
        },
    ];
}

fn check_article_count(count: usize) -> Result<(), WechatError> {
    if count > MAX_ARTICLES {
        return Err(WechatError::TooManyArticles {
            count,
            max: MAX_ARTICLES,
        });
    }
    Ok(())
}

fn deserialize_articles<'de, D>(deserializer: D) -> Result<Vec<Article>, D::Error>
where
    D: Deserializer<'de>,
{
    let articles = Vec::<Article>::deserialize(deserializer)?;
    check_article_count(articles.len()).map_err(serde::de::Error::custom)?;
    Ok(articles)
}

fn read_articles(node: &XmlElement) -> Result<Vec<Article>, WechatError> {
    let articles = node
        .children_named("item")
        .map(entity::from_element::<Article>)
        .collect::<Result<Vec<_>, _>>()?;
    check_article_count(articles.len())?;
    Ok(articles)
}

fn write_articles(articles: &[Article]) -> Result<XmlElement, WechatError> {
    check_article_count(articles.len())?;
    let mut node = XmlElement::new("Articles");
    for article in articles {
        node.push(entity::to_element("item", article)?);
    }
    Ok(node)
}

/// Hands the conversation over to the customer service system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCustomerServiceResponse {
    pub header: MessageHeader,
}

impl TransferCustomerServiceResponse {
    pub fn reply_to(request: &MessageHeader) -> Self {
        Self {
            header: MessageHeader::reply_to(request),
        }
    }
}

impl XmlFields for TransferCustomerServiceResponse {
    const FIELDS: &'static [Field<Self>] = &[];
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
    TextResponse,
    ImageResponse,
    VoiceResponse,
    VideoResponse,
    MusicResponse,
    NewsResponse,
    TransferCustomerServiceResponse,
);

/// A passive reply, one variant per `MsgType`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseMessage {
    Text(TextResponse),
    Image(ImageResponse),
    Voice(VoiceResponse),
    Video(VideoResponse),
    Music(MusicResponse),
    News(NewsResponse),
    TransferCustomerService(TransferCustomerServiceResponse),
}

impl ResponseMessage {
    /// Empty reply of `msg_type` addressed back to the sender of `request`
    ///
    /// `ToUserName`/`FromUserName` are swapped and `CreateTime` is now.
    pub fn from_request(request: &RequestMessage, msg_type: ResponseMsgType) -> Self {
        let header = request.header();
        match msg_type {
            ResponseMsgType::Text => ResponseMessage::Text(TextResponse::reply_to(header)),
            ResponseMsgType::Image => ResponseMessage::Image(ImageResponse::reply_to(header)),
            ResponseMsgType::Voice => ResponseMessage::Voice(VoiceResponse::reply_to(header)),
            ResponseMsgType::Video => ResponseMessage::Video(VideoResponse::reply_to(header)),
            ResponseMsgType::Music => ResponseMessage::Music(MusicResponse::reply_to(header)),
            ResponseMsgType::News => ResponseMessage::News(NewsResponse::reply_to(header)),
            ResponseMsgType::TransferCustomerService => ResponseMessage::TransferCustomerService(
                TransferCustomerServiceResponse::reply_to(header),
            ),
        }
    }

    /// Parse a reply document, e.g. one produced by [`ResponseMessage::to_xml_string`]
    pub fn parse(xml: &str) -> Result<Self, WechatError> {
        let root = XmlElement::parse(xml)?;
        Self::from_xml(&root)
    }

    pub fn from_xml(root: &XmlElement) -> Result<Self, WechatError> {
        if root.name() != ROOT {
            return Err(WechatError::Xml(format!(
                "expected <{}> root, got <{}>",
                ROOT,
                root.name()
            )));
        }

        let msg_type: ResponseMsgType = root
            .child_text("MsgType")
            .ok_or_else(|| WechatError::MissingField("MsgType".to_string()))?
            .parse()?;

        let message = match msg_type {
            ResponseMsgType::Text => ResponseMessage::Text(entity::read_message(root)?),
            ResponseMsgType::Image => ResponseMessage::Image(entity::read_message(root)?),
            ResponseMsgType::Voice => ResponseMessage::Voice(entity::read_message(root)?),
            ResponseMsgType::Video => ResponseMessage::Video(entity::read_message(root)?),
            ResponseMsgType::Music => ResponseMessage::Music(entity::read_message(root)?),
            ResponseMsgType::News => ResponseMessage::News(entity::read_message(root)?),
            ResponseMsgType::TransferCustomerService => {
                ResponseMessage::TransferCustomerService(entity::read_message(root)?)
            }
        };
        Ok(message)
    }

    pub fn msg_type(&self) -> ResponseMsgType {
        match self {
            ResponseMessage::Text(_) => ResponseMsgType::Text,
            ResponseMessage::Image(_) => ResponseMsgType::Image,
            ResponseMessage::Voice(_) => ResponseMsgType::Voice,
            ResponseMessage::Video(_) => ResponseMsgType::Video,
            ResponseMessage::Music(_) => ResponseMsgType::Music,
            ResponseMessage::News(_) => ResponseMsgType::News,
            ResponseMessage::TransferCustomerService(_) => ResponseMsgType::TransferCustomerService,
        }
    }

    pub fn header(&self) -> &MessageHeader {
        match self {
            ResponseMessage::Text(m) => &m.header,
            ResponseMessage::Image(m) => &m.header,
            ResponseMessage::Voice(m) => &m.header,
            ResponseMessage::Video(m) => &m.header,
            ResponseMessage::Music(m) => &m.header,
            ResponseMessage::News(m) => &m.header,
            ResponseMessage::TransferCustomerService(m) => &m.header,
        }
    }

    /// Convert to the `<xml>` reply document
    pub fn to_xml(&self) -> Result<XmlElement, WechatError> {
        let msg_type = self.msg_type().as_str();
        match self {
            ResponseMessage::Text(m) => entity::write_message(m, msg_type),
            ResponseMessage::Image(m) => entity::write_message(m, msg_type),
            ResponseMessage::Voice(m) => entity::write_message(m, msg_type),
            ResponseMessage::Video(m) => entity::write_message(m, msg_type),
            ResponseMessage::Music(m) => entity::write_message(m, msg_type),
            ResponseMessage::News(m) => entity::write_message(m, msg_type),
            ResponseMessage::TransferCustomerService(m) => entity::write_message(m, msg_type),
        }
    }

    pub fn to_xml_string(&self) -> Result<String, WechatError> {
        self.to_xml()?.to_xml_string()
    }
}

impl From<TextResponse> for ResponseMessage {
    fn from(m: TextResponse) -> Self {
        ResponseMessage::Text(m)
    }
}

impl From<ImageResponse> for ResponseMessage {
    fn from(m: ImageResponse) -> Self {
        ResponseMessage::Image(m)
    }
}

impl From<VoiceResponse> for ResponseMessage {
    fn from(m: VoiceResponse) -> Self {
        ResponseMessage::Voice(m)
    }
}

impl From<VideoResponse> for ResponseMessage {
    fn from(m: VideoResponse) -> Self {
        ResponseMessage::Video(m)
    }
}

impl From<MusicResponse> for ResponseMessage {
    fn from(m: MusicResponse) -> Self {
        ResponseMessage::Music(m)
    }
}

impl From<NewsResponse> for ResponseMessage {
    fn from(m: NewsResponse) -> Self {
        ResponseMessage::News(m)
    }
}

impl From<TransferCustomerServiceResponse> for ResponseMessage {
    fn from(m: TransferCustomerServiceResponse) -> Self {
        ResponseMessage::TransferCustomerService(m)
    }
}
