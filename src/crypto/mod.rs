//! Callback security for WeChat Official Account messages
//!
//! Provides the SHA-1 callback signatures and the AES-256-CBC "safe mode"
//! message envelope.
//!
//! ## Security
//!
//! The Token and EncodingAESKey are secrets shared with the WeChat platform
//! and should never be logged or exposed to clients.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wechat_oa_message::crypto::{self, MessageCrypt};
//! use wechat_oa_message::types::{AppId, EncodingAesKey};
//!
//! let key = EncodingAesKey::new("abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG")?;
//! let crypt = MessageCrypt::new(&key, &AppId::new("wxb11529c136998cb6")?)?;
//!
//! assert!(crypto::check_signature(token, timestamp, nonce, signature));
//! let plain_xml = crypt.decrypt(&encrypted)?;
//! ```

pub mod envelope;
pub mod msg_crypt;
pub mod signature;

pub use envelope::{EncryptedReply, EncryptedRequest};
pub use msg_crypt::MessageCrypt;
pub use signature::{check_msg_signature, check_signature, msg_signature, signature};
