//! Application callbacks for inbound messages
//!
//! Implement [`MessageHandler`] and override the callbacks you care about.
//! Every callback falls back to [`MessageHandler::default_response`], which
//! returns `None` (no passive reply) unless overridden.
//!
//! ```rust,ignore
//! use wechat_oa_message::handler::MessageHandler;
//! use wechat_oa_message::types::{ResponseMessage, TextRequest, TextResponse};
//!
//! struct Echo;
//!
//! impl MessageHandler for Echo {
//!     fn on_text(&self, message: &TextRequest) -> Option<ResponseMessage> {
//!         let reply = TextResponse::reply_to(&message.header).with_content(&message.content);
//!         Some(reply.into())
//!     }
//! }
//! ```

use crate::types::{
    EventRequest, ImageRequest, LinkRequest, LocationRequest, MessageHeader, RequestMessage,
    ResponseMessage, TextRequest, VideoRequest, VoiceRequest,
};

pub trait MessageHandler {
    /// Reply used by every callback that is not overridden
    fn default_response(&self, _request: &MessageHeader) -> Option<ResponseMessage> {
        None
    }

    fn on_text(&self, message: &TextRequest) -> Option<ResponseMessage> {
        self.default_response(&message.header)
    }

    fn on_image(&self, message: &ImageRequest) -> Option<ResponseMessage> {
        self.default_response(&message.header)
    }

    fn on_voice(&self, message: &VoiceRequest) -> Option<ResponseMessage> {
        self.default_response(&message.header)
    }

    fn on_video(&self, message: &VideoRequest) -> Option<ResponseMessage> {
        self.default_response(&message.header)
    }

    fn on_short_video(&self, message: &VideoRequest) -> Option<ResponseMessage> {
        self.default_response(&message.header)
    }

    fn on_location(&self, message: &LocationRequest) -> Option<ResponseMessage> {
        self.default_response(&message.header)
    }

    fn on_link(&self, message: &LinkRequest) -> Option<ResponseMessage> {
        self.default_response(&message.header)
    }

    fn on_event(&self, message: &EventRequest) -> Option<ResponseMessage> {
        self.default_response(&message.header)
    }

    /// Route a request to its callback
    fn dispatch(&self, request: &RequestMessage) -> Option<ResponseMessage> {
        match request {
            RequestMessage::Text(m) => self.on_text(m),
            RequestMessage::Image(m) => self.on_image(m),
            RequestMessage::Voice(m) => self.on_voice(m),
            RequestMessage::Video(m) => self.on_video(m),
            RequestMessage::ShortVideo(m) => self.on_short_video(m),
            RequestMessage::Location(m) => self.on_location(m),
            RequestMessage::Link(m) => self.on_link(m),
            RequestMessage::Event(m) => self.on_event(m),
        }
    }
}
