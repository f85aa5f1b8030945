//! Callback processing pipeline
//!
//! [`MessageProcessor`] ties the pieces together for one Official Account:
//! signature check, optional safe-mode decryption, request parsing, handler
//! dispatch, reply serialization and optional encryption. It works on
//! in-memory bodies; reading the HTTP request and writing the response is
//! left to the caller.
//!
//! ```rust,ignore
//! use wechat_oa_message::processor::{CallbackQuery, MessageProcessor};
//! use wechat_oa_message::types::Token;
//!
//! let processor = MessageProcessor::builder()
//!     .token(Token::new("weixin")?)
//!     .build()?;
//!
//! // GET: URL verification
//! let echostr = processor.verify_url(&query)?;
//!
//! // POST: message callback
//! let reply = processor.process(&handler, &query, &body)?;
//! let http_body = reply.unwrap_or_else(|| "success".to_string());
//! ```

mod builder;

use log::{debug, warn};
use serde::Deserialize;

pub use builder::MessageProcessorBuilder;

use crate::crypto::{self, EncryptedReply, EncryptedRequest, MessageCrypt};
use crate::entity;
use crate::error::WechatError;
use crate::handler::MessageHandler;
use crate::types::{RequestMessage, ResponseMessage, Token};

/// Query parameters WeChat appends to the callback URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub signature: String,
    pub timestamp: String,
    pub nonce: String,
    /// Present on URL verification only
    #[serde(default)]
    pub echostr: Option<String>,
    /// `aes` in safe mode, `raw` or absent otherwise
    #[serde(default)]
    pub encrypt_type: Option<String>,
    #[serde(default)]
    pub msg_signature: Option<String>,
}

impl CallbackQuery {
    pub fn is_encrypted(&self) -> bool {
        self.encrypt_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("aes"))
    }
}

/// Processes callbacks for one Official Account
#[derive(Debug, Clone)]
pub struct MessageProcessor {
    token: Token,
    crypt: Option<MessageCrypt>,
}

impl MessageProcessor {
    pub fn builder() -> MessageProcessorBuilder {
        MessageProcessorBuilder::default()
    }

    /// Whether an EncodingAESKey is configured
    pub fn is_safe_mode(&self) -> bool {
        self.crypt.is_some()
    }

    /// Answer the URL verification request; returns the `echostr` to echo back
    pub fn verify_url(&self, query: &CallbackQuery) -> Result<String, WechatError> {
        self.verify_signature(query)?;
        query
            .echostr
            .clone()
            .ok_or_else(|| WechatError::MissingField("echostr".to_string()))
    }

    /// Verify, decrypt if needed and parse a callback body
    pub fn parse_request(
        &self,
        query: &CallbackQuery,
        body: &str,
    ) -> Result<RequestMessage, WechatError> {
        self.verify_signature(query)?;

        if !query.is_encrypted() {
            return RequestMessage::parse(body);
        }

        let crypt = self.require_crypt()?;
        let envelope = EncryptedRequest::parse(body)?;
        let msg_signature = query
            .msg_signature
            .as_deref()
            .ok_or_else(|| WechatError::MissingField("msg_signature".to_string()))?;

        if !crypto::check_msg_signature(
            self.token.as_str(),
            &query.timestamp,
            &query.nonce,
            &envelope.encrypt,
            msg_signature,
        ) {
            warn!("[WechatOa] msg_signature mismatch for {}", envelope.to_user_name);
            return Err(WechatError::Signature("msg_signature mismatch".to_string()));
        }

        let plain = crypt.decrypt(&envelope.encrypt)?;
        RequestMessage::parse(&plain)
    }

    /// Serialize a reply, encrypting it when the request came in safe mode
    pub fn render_reply(
        &self,
        query: &CallbackQuery,
        response: &ResponseMessage,
    ) -> Result<String, WechatError> {
        let xml = response.to_xml_string()?;
        if !query.is_encrypted() {
            return Ok(xml);
        }

        let crypt = self.require_crypt()?;
        let encrypt = crypt.encrypt(&xml)?;
        let timestamp = query
            .timestamp
            .trim()
            .parse::<i64>()
            .unwrap_or_else(|_| entity::to_unix_time(&entity::now()));
        let timestamp_text = timestamp.to_string();
        let msg_signature =
            crypto::msg_signature(self.token.as_str(), &timestamp_text, &query.nonce, &encrypt);

        EncryptedReply {
            encrypt,
            msg_signature,
            timestamp,
            nonce: query.nonce.clone(),
        }
        .to_xml_string()
    }

    /// Run the whole pipeline; `None` means the handler chose not to reply
    pub fn process<H>(
        &self,
        handler: &H,
        query: &CallbackQuery,
        body: &str,
    ) -> Result<Option<String>, WechatError>
    where
        H: MessageHandler + ?Sized,
    {
        let request = self.parse_request(query, body)?;
        debug!(
            "[WechatOa] <<< {} from {} (msg_id={:?})",
            request.msg_type(),
            request.header().from_user_name,
            request.msg_id()
        );

        let Some(response) = handler.dispatch(&request) else {
            debug!("[WechatOa] no reply for {}", request.msg_type());
            return Ok(None);
        };

        debug!(
            "[WechatOa] >>> {} to {}",
            response.msg_type(),
            response.header().to_user_name
        );
        self.render_reply(query, &response).map(Some)
    }

    fn verify_signature(&self, query: &CallbackQuery) -> Result<(), WechatError> {
        if crypto::check_signature(
            self.token.as_str(),
            &query.timestamp,
            &query.nonce,
            &query.signature,
        ) {
            Ok(())
        } else {
            warn!("[WechatOa] signature mismatch (timestamp={})", query.timestamp);
            Err(WechatError::Signature("signature mismatch".to_string()))
        }
    }

    fn require_crypt(&self) -> Result<&MessageCrypt, WechatError> {
        self.crypt.as_ref().ok_or_else(|| {
            WechatError::Config(
                "encrypted callback received but no encoding_aes_key is configured".to_string(),
            )
        })
    }
}
