//! AES-256-CBC encryption for safe-mode callback bodies
//!
//! Plaintext layout: `random(16) || msg_len(4, big endian) || msg || appid`,
//! PKCS#7-padded to 32-byte blocks. Key is the base64-decoded EncodingAESKey,
//! IV is its first 16 bytes. Ciphertext travels base64 encoded.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use cbc::cipher::block_padding::NoPadding;
use cbc::{Decryptor, Encryptor};
use rand::RngCore;

use crate::error::WechatError;
use crate::types::{AppId, EncodingAesKey};

type Aes256CbcEncryptor = Encryptor<Aes256>;
type Aes256CbcDecryptor = Decryptor<Aes256>;

/// WeChat pads to 32 bytes, not the AES block size
const PAD_BLOCK_SIZE: usize = 32;
const RANDOM_LEN: usize = 16;
const LEN_PREFIX: usize = 4;

/// The 43-char key drops the `=` and its last symbol carries non-zero spare bits
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encrypts and decrypts message bodies for one Official Account
#[derive(Clone)]
pub struct MessageCrypt {
    key: [u8; 32],
    appid: String,
}

impl std::fmt::Debug for MessageCrypt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCrypt")
            .field("appid", &self.appid)
            .finish_non_exhaustive()
    }
}

impl MessageCrypt {
    pub fn new(encoding_aes_key: &EncodingAesKey, appid: &AppId) -> Result<Self, WechatError> {
        let decoded = KEY_ENGINE
            .decode(encoding_aes_key.as_str())
            .map_err(|e| WechatError::Crypto(format!("Invalid EncodingAESKey: {}", e)))?;

        let key: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
            WechatError::Crypto(format!(
                "Invalid key length: expected 32, got {}",
                decoded.len()
            ))
        })?;

        Ok(Self {
            key,
            appid: appid.as_str().to_string(),
        })
    }

    pub fn appid(&self) -> &str {
        &self.appid
    }

    /// Encrypt a reply body with a fresh random prefix
    pub fn encrypt(&self, plaintext: &str) -> Result<String, WechatError> {
        let mut random = [0u8; RANDOM_LEN];
        rand::rng().fill_bytes(&mut random);
        self.encrypt_with_random(plaintext, &random)
    }

    /// Encrypt with a caller-supplied 16-byte prefix
    pub fn encrypt_with_random(
        &self,
        plaintext: &str,
        random: &[u8; RANDOM_LEN],
    ) -> Result<String, WechatError> {
        let msg = plaintext.as_bytes();
        let msg_len = u32::try_from(msg.len())
            .map_err(|_| WechatError::Crypto(format!("Message too long: {} bytes", msg.len())))?;

        let mut buffer =
            Vec::with_capacity(RANDOM_LEN + LEN_PREFIX + msg.len() + self.appid.len() + PAD_BLOCK_SIZE);
        buffer.extend_from_slice(random);
        buffer.extend_from_slice(&msg_len.to_be_bytes());
        buffer.extend_from_slice(msg);
        buffer.extend_from_slice(self.appid.as_bytes());

        let pad = PAD_BLOCK_SIZE - buffer.len() % PAD_BLOCK_SIZE;
        buffer.resize(buffer.len() + pad, pad as u8);

        let encryptor = Aes256CbcEncryptor::new_from_slices(&self.key, &self.key[..16])
            .map_err(|e| WechatError::Crypto(format!("Failed to create cipher: {}", e)))?;
        let len = buffer.len();
        let encrypted = encryptor
            .encrypt_padded_mut::<NoPadding>(&mut buffer, len)
            .map_err(|e| WechatError::Crypto(format!("Encryption failed: {:?}", e)))?;

        Ok(BASE64.encode(encrypted))
    }

    /// Decrypt a request body and check that it was issued for this AppID
    pub fn decrypt(&self, encrypted: &str) -> Result<String, WechatError> {
        let mut buffer = BASE64
            .decode(encrypted.trim())
            .map_err(|e| WechatError::Crypto(format!("Invalid encrypted data: {}", e)))?;

        if buffer.is_empty() || buffer.len() % PAD_BLOCK_SIZE != 0 {
            return Err(WechatError::Crypto(format!(
                "Invalid ciphertext length: {}",
                buffer.len()
            )));
        }

        let decryptor = Aes256CbcDecryptor::new_from_slices(&self.key, &self.key[..16])
            .map_err(|e| WechatError::Crypto(format!("Failed to create cipher: {}", e)))?;
        let decrypted = decryptor
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|e| WechatError::Crypto(format!("Decryption failed: {:?}", e)))?;

        let pad = decrypted.last().copied().unwrap_or_default() as usize;
        if pad == 0 || pad > PAD_BLOCK_SIZE || pad > decrypted.len() {
            return Err(WechatError::Crypto(format!("Invalid padding: {}", pad)));
        }
        let content = &decrypted[..decrypted.len() - pad];

        if content.len() < RANDOM_LEN + LEN_PREFIX {
            return Err(WechatError::Crypto(format!(
                "Decrypted data too short: {} bytes",
                content.len()
            )));
        }

        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&content[RANDOM_LEN..RANDOM_LEN + LEN_PREFIX]);
        let msg_len = u32::from_be_bytes(len_bytes) as usize;

        let body = &content[RANDOM_LEN + LEN_PREFIX..];
        if msg_len > body.len() {
            return Err(WechatError::Crypto(format!(
                "Invalid message length: declared {}, available {}",
                msg_len,
                body.len()
            )));
        }

        let (msg, appid) = body.split_at(msg_len);
        if appid != self.appid.as_bytes() {
            return Err(WechatError::Signature(format!(
                "AppID mismatch: expected {}, got {}",
                self.appid,
                String::from_utf8_lossy(appid)
            )));
        }

        String::from_utf8(msg.to_vec())
            .map_err(|e| WechatError::Crypto(format!("Invalid UTF-8: {}", e)))
    }
}
