use crate::crypto::MessageCrypt;
use crate::error::WechatError;
use crate::types::{AppId, EncodingAesKey, Token};

use super::MessageProcessor;

#[must_use]
#[derive(Debug, Default)]
pub struct MessageProcessorBuilder {
    token: Option<Token>,
    appid: Option<AppId>,
    encoding_aes_key: Option<EncodingAesKey>,
}

impl MessageProcessorBuilder {
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn appid(mut self, appid: AppId) -> Self {
        self.appid = Some(appid);
        self
    }

    /// Enables safe mode; requires [`appid`](Self::appid) as well
    pub fn encoding_aes_key(mut self, key: EncodingAesKey) -> Self {
        self.encoding_aes_key = Some(key);
        self
    }

    pub fn build(self) -> Result<MessageProcessor, WechatError> {
        let token = self
            .token
            .ok_or_else(|| WechatError::Config("token is required".to_string()))?;

        let crypt = match (self.encoding_aes_key, self.appid) {
            (Some(key), Some(appid)) => Some(MessageCrypt::new(&key, &appid)?),
            (Some(_), None) => {
                return Err(WechatError::Config(
                    "appid is required when encoding_aes_key is set".to_string(),
                ))
            }
            (None, _) => None,
        };

        Ok(MessageProcessor { token, crypt })
    }
}
