//! Entity <-> XML mapping
//!
//! Every entity declares an ordered field table ([`XmlFields::FIELDS`]). The
//! same table drives both directions:
//!
//! - **fill**: each field is looked up as a direct child element with the exact
//!   (case-sensitive) name and its text is converted to the field's type;
//! - **convert**: each field is written as a child element, in table order.
//!
//! Text is written as CDATA; numbers and timestamps as plain decimal text.
//! Timestamps travel as Unix seconds and are held as calendar time in the
//! fixed +08:00 offset the platform uses.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::error::WechatError;
use crate::types::MessageHeader;
use crate::xml::{XmlElement, ROOT};

/// Offset applied to Unix timestamps (China Standard Time, UTC+8)
pub const TIME_ZONE_OFFSET_SECS: i32 = 8 * 60 * 60;

/// One entry of an entity's field table
pub struct Field<T: 'static> {
    /// XML element name, matched exactly
    pub name: &'static str,
    /// Whether fill fails with [`WechatError::MissingField`] when absent
    pub required: bool,
    pub kind: FieldKind<T>,
}

/// Semantic type of a field together with its accessors
pub enum FieldKind<T: 'static> {
    Text {
        get: fn(&T) -> &str,
        set: fn(&mut T, String),
    },
    Integer {
        get: fn(&T) -> i64,
        set: fn(&mut T, i64),
    },
    Float {
        get: fn(&T) -> f64,
        set: fn(&mut T, f64),
    },
    /// Unix seconds on the wire
    Timestamp {
        get: fn(&T) -> DateTime<FixedOffset>,
        set: fn(&mut T, DateTime<FixedOffset>),
    },
    /// Wrapper element with its own children (`Music`, `Articles`)
    Element {
        read: fn(&mut T, &XmlElement) -> Result<(), WechatError>,
        write: fn(&T) -> Result<XmlElement, WechatError>,
    },
}

/// Entities with a declarative, ordered XML field table
pub trait XmlFields: Sized + 'static {
    const FIELDS: &'static [Field<Self>];
}

/// Entities that carry the shared message envelope
pub trait MessageEntity: XmlFields + Default {
    fn header(&self) -> &MessageHeader;
    fn header_mut(&mut self) -> &mut MessageHeader;
}

/// The fixed offset used for message timestamps
pub fn local_offset() -> FixedOffset {
    FixedOffset::east_opt(TIME_ZONE_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Convert Unix seconds to calendar time at UTC+8
///
/// The wall-clock value equals `1970-01-01T00:00:00 + (secs + 8h)`.
pub fn from_unix_time(secs: i64) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&local_offset()))
}

/// Inverse of [`from_unix_time`]
pub fn to_unix_time(time: &DateTime<FixedOffset>) -> i64 {
    time.timestamp()
}

/// Current time at UTC+8, truncated to whole seconds
pub fn now() -> DateTime<FixedOffset> {
    let secs = Utc::now().timestamp();
    from_unix_time(secs).unwrap_or_else(|| Utc::now().with_timezone(&local_offset()))
}

/// Populate `entity` from the direct children of `node`
///
/// On error the entity may be partially filled; use [`from_element`] or
/// [`read_message`] to get all-or-nothing construction.
pub fn fill_fields<T: XmlFields>(entity: &mut T, node: &XmlElement) -> Result<(), WechatError> {
    for field in T::FIELDS {
        let Some(child) = node.child(field.name) else {
            if field.required {
                return Err(WechatError::MissingField(field.name.to_string()));
            }
            continue;
        };

        let text = child.text();
        if !matches!(field.kind, FieldKind::Text { .. } | FieldKind::Element { .. })
            && text.trim().is_empty()
        {
            if field.required {
                return Err(format_error(field.name, text));
            }
            continue;
        }

        match field.kind {
            FieldKind::Text { set, .. } => set(entity, text.to_string()),
            FieldKind::Integer { set, .. } => {
                let value = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format_error(field.name, text))?;
                set(entity, value);
            }
            FieldKind::Float { set, .. } => {
                let value = text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format_error(field.name, text))?;
                set(entity, value);
            }
            FieldKind::Timestamp { set, .. } => {
                let value = text
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(from_unix_time)
                    .ok_or_else(|| format_error(field.name, text))?;
                set(entity, value);
            }
            FieldKind::Element { read, .. } => read(entity, child)?,
        }
    }
    Ok(())
}

/// Append one child per field of `entity` to `node`, in table order
pub fn write_fields<T: XmlFields>(entity: &T, node: &mut XmlElement) -> Result<(), WechatError> {
    for field in T::FIELDS {
        let child = match field.kind {
            FieldKind::Text { get, .. } => XmlElement::cdata_node(field.name, get(entity)),
            FieldKind::Integer { get, .. } => {
                XmlElement::text_node(field.name, get(entity).to_string())
            }
            FieldKind::Float { get, .. } => {
                XmlElement::text_node(field.name, get(entity).to_string())
            }
            FieldKind::Timestamp { get, .. } => {
                XmlElement::text_node(field.name, to_unix_time(&get(entity)).to_string())
            }
            FieldKind::Element { write, .. } => write(entity)?,
        };
        node.push(child);
    }
    Ok(())
}

/// Build a fresh entity from the children of `node`
pub fn from_element<T: XmlFields + Default>(node: &XmlElement) -> Result<T, WechatError> {
    let mut entity = T::default();
    fill_fields(&mut entity, node)?;
    Ok(entity)
}

/// Wrap the fields of `entity` in an element called `name`
pub fn to_element<T: XmlFields>(name: &str, entity: &T) -> Result<XmlElement, WechatError> {
    let mut node = XmlElement::new(name);
    write_fields(entity, &mut node)?;
    Ok(node)
}

/// Read the envelope and the body fields of a message from the `<xml>` root
pub fn read_message<M: MessageEntity>(root: &XmlElement) -> Result<M, WechatError> {
    let mut message = M::default();
    fill_fields(message.header_mut(), root)?;
    fill_fields(&mut message, root)?;
    Ok(message)
}

/// Write a message as `<xml>`: envelope, `MsgType`, then body fields
pub fn write_message<M: MessageEntity>(
    message: &M,
    msg_type: &str,
) -> Result<XmlElement, WechatError> {
    let mut root = XmlElement::new(ROOT);
    write_fields(message.header(), &mut root)?;
    root.push(XmlElement::cdata_node("MsgType", msg_type));
    write_fields(message, &mut root)?;
    Ok(root)
}

fn format_error(field: &str, value: &str) -> WechatError {
    WechatError::Format {
        field: field.to_string(),
        value: value.to_string(),
    }
}
