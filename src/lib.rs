//! WeChat Official Account message SDK for Rust
//!
//! Maps the XML callbacks of the WeChat Official Account platform into typed
//! request messages, and typed passive replies back into XML.
//!
//! ## Message Coverage
//!
//! | Direction | `MsgType` |
//! |-----------|-----------|
//! | Request | text, image, voice, video, shortvideo, location, link, event |
//! | Response | text, image, voice, video, music, news, transfer_customer_service |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wechat_oa_message::types::{RequestMessage, ResponseMessage, ResponseMsgType};
//!
//! let request = RequestMessage::parse(&body)?;
//!
//! let mut reply = ResponseMessage::from_request(&request, ResponseMsgType::Text);
//! if let ResponseMessage::Text(text) = &mut reply {
//!     text.content = "Hello!".to_string();
//! }
//! let xml = reply.to_xml_string()?;
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Request and response entities, identifiers
//! - [`entity`] - Field tables and the entity <-> XML mapping
//! - [`xml`] - Minimal XML element tree
//! - [`handler`] - Application callbacks per request type
//! - [`processor`] - Signature check, safe mode and dispatch in one place
//! - [`crypto`] - Callback signatures and message encryption
//! - [`error`] - Error types
//!
//! ## Error Handling
//!
//! The SDK uses the [`WechatError`] enum for error handling:
//!
//! ```rust,ignore
//! use wechat_oa_message::WechatError;
//!
//! match RequestMessage::parse(&body) {
//!     Ok(request) => { /* handle request */ }
//!     Err(WechatError::UnsupportedMessageType(t)) => {
//!         eprintln!("Ignoring message of type {}", t);
//!     }
//!     Err(e) => {
//!         eprintln!("Bad callback: {}", e);
//!     }
//! }
//! ```

pub mod crypto;
pub mod entity;
pub mod error;
pub mod handler;
pub mod processor;
pub mod types;
pub mod xml;

pub use error::WechatError;
pub use handler::MessageHandler;
pub use processor::{CallbackQuery, MessageProcessor, MessageProcessorBuilder};
pub use types::{RequestMessage, ResponseMessage};
