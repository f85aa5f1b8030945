//! Safe-mode XML envelopes

use serde::{Deserialize, Serialize};

use crate::entity::{self, Field, FieldKind, XmlFields};
use crate::error::WechatError;
use crate::xml::{XmlElement, ROOT};

/// Inbound body in safe mode: `<xml><ToUserName/><Encrypt/></xml>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRequest {
    pub to_user_name: String,
    pub encrypt: String,
}

impl EncryptedRequest {
    pub fn parse(xml: &str) -> Result<Self, WechatError> {
        entity::from_element(&XmlElement::parse(xml)?)
    }
}

impl XmlFields for EncryptedRequest {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "ToUserName",
            required: false,
            kind: FieldKind::Text {
                get: |m| m.to_user_name.as_str(),
                set: |m, v| m.to_user_name = v,
            },
        },
        Field {
            name: "Encrypt",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.encrypt.as_str(),
                set: |m, v| m.encrypt = v,
            },
        },
    ];
}

/// Outbound body in safe mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedReply {
    pub encrypt: String,
    pub msg_signature: String,
    pub timestamp: i64,
    pub nonce: String,
}

impl EncryptedReply {
    pub fn parse(xml: &str) -> Result<Self, WechatError> {
        entity::from_element(&XmlElement::parse(xml)?)
    }

    pub fn to_xml_string(&self) -> Result<String, WechatError> {
        entity::to_element(ROOT, self)?.to_xml_string()
    }
}

impl XmlFields for EncryptedReply {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "Encrypt",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.encrypt.as_str(),
                set: |m, v| m.encrypt = v,
            },
        },
        Field {
            name: "MsgSignature",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.msg_signature.as_str(),
                set: |m, v| m.msg_signature = v,
            },
        },
        Field {
            name: "TimeStamp",
            required: true,
            kind: FieldKind::Integer {
                get: |m| m.timestamp,
                set: |m, v| m.timestamp = v,
            },
        },
        Field {
            name: "Nonce",
            required: true,
            kind: FieldKind::Text {
                get: |m| m.nonce.as_str(),
                set: |m, v| m.nonce = v,
            },
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encrypted_request() {
        let xml = "<xml><ToUserName><![CDATA[gh_a96a4a619366]]></ToUserName><Encrypt><![CDATA[abc+/=]]></Encrypt></xml>";
        let request = EncryptedRequest::parse(xml).unwrap();
        assert_eq!(request.to_user_name, "gh_a96a4a619366");
        assert_eq!(request.encrypt, "abc+/=");
    }

    #[test]
    fn test_parse_encrypted_request_requires_encrypt() {
        let err = EncryptedRequest::parse("<xml><ToUserName>a</ToUserName></xml>").unwrap_err();
        assert!(matches!(err, WechatError::MissingField(ref f) if f == "Encrypt"));
    }

    #[test]
    fn test_reply_layout() {
        let reply = EncryptedReply {
            encrypt: "cipher".to_string(),
            msg_signature: "sig".to_string(),
            timestamp: 1409304348,
            nonce: "xxxxxx".to_string(),
        };
        assert_eq!(
            reply.to_xml_string().unwrap(),
            "<xml><Encrypt><![CDATA[cipher]]></Encrypt><MsgSignature><![CDATA[sig]]></MsgSignature>\
             <TimeStamp>1409304348</TimeStamp><Nonce><![CDATA[xxxxxx]]></Nonce></xml>"
        );
        assert_eq!(EncryptedReply::parse(&reply.to_xml_string().unwrap()).unwrap(), reply);
    }
}
