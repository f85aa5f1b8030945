use wechat_oa_message::crypto::{self, EncryptedReply, MessageCrypt};
use wechat_oa_message::types::{AppId, EncodingAesKey, RequestMessage, RequestMsgType};
use wechat_oa_message::WechatError;

const KEY: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG";
const APPID: &str = "wxb11529c136998cb6";
const TOKEN: &str = "pamtest";
const TIMESTAMP: &str = "1409304348";
const NONCE: &str = "xxxxxx";

const PLAIN_XML: &str = "<xml><ToUserName><![CDATA[gh_a96a4a619366]]></ToUserName><FromUserName><![CDATA[olPjZjsXuQPJoV0HlruZkNzKc91E]]></FromUserName><CreateTime>1357986928</CreateTime><MsgType><![CDATA[text]]></MsgType><Content><![CDATA[TNT2]]></Content><MsgId>5832509444155992350</MsgId></xml>";

/// `PLAIN_XML` encrypted with random prefix `0123456789abcdef`
const ENCRYPTED: &str = "Q3stYC6hdFzMh9T8HCvyDFYqp+WRA4JhXTSMyMJMcetdiNVcMrNQ+2F56y/mfUu3rCTiaFqO2q+HtsI3FUoRmObouKvN96kkEfjkM8Jdp5P+5Lf3G6uJXLMiOB4zkNQWOojD3ioJR7FxIdvWhPgP1Z7nYrXrvA2NfwLuEpDFEYN4cvOnS1qZ/BLOZuX6zqlu/fGhQJp26Dcn5zMO1PP5eh9AvG1f3NqNM8hGCRGiPRUp057gB2w1FNBMFGMfYxB8s8hcehTcsllPdw9xM1iVyiHGQYkVUKj6rnQiOdWXLya88Gl11TPQ9WUBrHOpEnDOTpckp2UKyFjx7Xb22cbO0N1Uj2kMN9OlJV9RN6aGnd9HwMtbjRrJzpAw6tz68dz1Kz+yrpFPYyKk1SnBdbGxH7dmhFs7jD5QXgkUF3q9wjY=";
const ENCRYPTED_MSG_SIGNATURE: &str = "5b93c752dd232a14a338baa1741bbad4b40705f3";

fn crypt() -> MessageCrypt {
    MessageCrypt::new(
        &EncodingAesKey::new(KEY).unwrap(),
        &AppId::new(APPID).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_encrypt_matches_known_ciphertext() {
    let encrypted = crypt()
        .encrypt_with_random(PLAIN_XML, b"0123456789abcdef")
        .unwrap();
    assert_eq!(encrypted, ENCRYPTED);
}

#[test]
fn test_decrypt_known_ciphertext() {
    let plain = crypt().decrypt(ENCRYPTED).unwrap();
    assert_eq!(plain, PLAIN_XML);

    let message = RequestMessage::parse(&plain).unwrap();
    assert_eq!(message.msg_type(), RequestMsgType::Text);
}

#[test]
fn test_msg_signature_known_value() {
    assert_eq!(
        crypto::msg_signature(TOKEN, TIMESTAMP, NONCE, ENCRYPTED),
        ENCRYPTED_MSG_SIGNATURE
    );
    assert!(crypto::check_msg_signature(
        TOKEN,
        TIMESTAMP,
        NONCE,
        ENCRYPTED,
        ENCRYPTED_MSG_SIGNATURE
    ));
}

#[test]
fn test_decrypt_tampered_ciphertext() {
    // corrupt the last cipher block; it garbles the padding and the AppID
    let mut bytes = ENCRYPTED.as_bytes().to_vec();
    let idx = bytes.len() - 6;
    bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    assert!(crypt().decrypt(&tampered).is_err());
}

#[test]
fn test_decrypt_with_wrong_appid() {
    let other = MessageCrypt::new(
        &EncodingAesKey::new(KEY).unwrap(),
        &AppId::new("wx0123456789abcdef").unwrap(),
    )
    .unwrap();
    let err = other.decrypt(ENCRYPTED).unwrap_err();
    assert!(format!("{}", err).contains("AppID mismatch"));
    assert!(matches!(err, WechatError::Signature(_)));
}

#[test]
fn test_encrypted_reply_envelope() {
    let crypt = crypt();
    let encrypt = crypt.encrypt("<xml><Content>ok</Content></xml>").unwrap();
    let reply = EncryptedReply {
        msg_signature: crypto::msg_signature(TOKEN, TIMESTAMP, NONCE, &encrypt),
        encrypt,
        timestamp: TIMESTAMP.parse().unwrap(),
        nonce: NONCE.to_string(),
    };

    let parsed = EncryptedReply::parse(&reply.to_xml_string().unwrap()).unwrap();
    assert!(crypto::check_msg_signature(
        TOKEN,
        &parsed.timestamp.to_string(),
        &parsed.nonce,
        &parsed.encrypt,
        &parsed.msg_signature
    ));
    assert_eq!(
        crypt.decrypt(&parsed.encrypt).unwrap(),
        "<xml><Content>ok</Content></xml>"
    );
}
