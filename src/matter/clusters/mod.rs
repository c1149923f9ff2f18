//! Cluster metadata and the attribute encoding contract.
//!
//! Every cluster exposed by a bridged endpoint is described as data: a
//! [`ClusterDescriptor`] holding a table of [`AttributeSpec`]s. The dispatch
//! path looks attributes up in that table to learn their fixed wire width
//! before touching device state, so the attribute contract of each device
//! type can be audited by reading its table.

use crate::error::AttributeStatus;

pub mod bridged_device_basic_info;
pub mod descriptor;
pub mod occupancy_sensing;
pub mod on_off;
pub mod relative_humidity;
pub mod temperature_measurement;

pub type ClusterId = u32;
pub type AttributeId = u32;
pub type EndpointId = u16;

/// Global FeatureMap attribute, present on every cluster.
pub const FEATURE_MAP_ATTRIBUTE_ID: AttributeId = 0xFFFC;

/// Global ClusterRevision attribute, present on every cluster.
pub const CLUSTER_REVISION_ATTRIBUTE_ID: AttributeId = 0xFFFD;

/// Maximum length of a label such as NodeLabel or ProductName, in bytes.
pub const LABEL_MAX_LEN: usize = 32;

/// Fixed-capacity UTF-8 label.
pub type Label = heapless::String<LABEL_MAX_LEN>;

/// Build a [`Label`], truncating on a character boundary if `value` is too long.
pub fn label(value: &str) -> Label {
    let mut out = Label::new();
    for ch in value.chars() {
        if out.push(ch).is_err() {
            log::debug!("Label '{}' truncated to '{}'", value, out);
            break;
        }
    }
    out
}

/// Storage type of an attribute; fixes its encoded width.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttributeType {
    Boolean,
    Bitmap8,
    Enum8,
    Int16s,
    Int16u,
    Bitmap32,
    /// One length byte followed by up to [`LABEL_MAX_LEN`] bytes, zero padded.
    CharString,
}

impl AttributeType {
    /// Encoded width in bytes. Buffers must match this exactly.
    pub const fn width(self) -> usize {
        match self {
            Self::Boolean | Self::Bitmap8 | Self::Enum8 => 1,
            Self::Int16s | Self::Int16u => 2,
            Self::Bitmap32 => 4,
            Self::CharString => 1 + LABEL_MAX_LEN,
        }
    }
}

/// One row of a cluster's attribute table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttributeSpec {
    pub id: AttributeId,
    pub kind: AttributeType,
    pub writable: bool,
}

impl AttributeSpec {
    pub const fn read_only(id: AttributeId, kind: AttributeType) -> Self {
        Self {
            id,
            kind,
            writable: false,
        }
    }

    pub const fn writable(id: AttributeId, kind: AttributeType) -> Self {
        Self {
            id,
            kind,
            writable: true,
        }
    }

    pub const fn width(&self) -> usize {
        self.kind.width()
    }

    /// Reject any buffer whose length is not exactly this attribute's width.
    pub fn check_len(&self, actual: usize) -> Result<(), AttributeStatus> {
        if actual == self.width() {
            Ok(())
        } else {
            Err(AttributeStatus::InvalidLength {
                attribute: self.id,
                expected: self.width(),
                actual,
            })
        }
    }
}

/// A cluster as it appears in an endpoint descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClusterDescriptor {
    pub id: ClusterId,
    pub attributes: &'static [AttributeSpec],
}

impl ClusterDescriptor {
    pub fn attribute(&self, id: AttributeId) -> Result<&'static AttributeSpec, AttributeStatus> {
        self.attributes
            .iter()
            .find(|spec| spec.id == id)
            .ok_or(AttributeStatus::UnsupportedAttribute {
                cluster: self.id,
                attribute: id,
            })
    }
}

/// A typed attribute value on its way to or from the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValue {
    Bool(bool),
    U8(u8),
    I16(i16),
    U16(u16),
    U32(u32),
    Str(Label),
}

impl AttributeValue {
    /// Copy the native-endian bytes of this value into `buf`.
    ///
    /// `buf` must be exactly `spec.width()` long; nothing is written otherwise.
    pub fn encode(&self, spec: &AttributeSpec, buf: &mut [u8]) -> Result<usize, AttributeStatus> {
        spec.check_len(buf.len())?;

        match (spec.kind, self) {
            (AttributeType::Boolean, Self::Bool(v)) => buf[0] = u8::from(*v),
            (AttributeType::Bitmap8 | AttributeType::Enum8, Self::U8(v)) => buf[0] = *v,
            (AttributeType::Int16s, Self::I16(v)) => buf.copy_from_slice(&v.to_ne_bytes()),
            (AttributeType::Int16u, Self::U16(v)) => buf.copy_from_slice(&v.to_ne_bytes()),
            (AttributeType::Bitmap32, Self::U32(v)) => buf.copy_from_slice(&v.to_ne_bytes()),
            (AttributeType::CharString, Self::Str(s)) => {
                let bytes = s.as_bytes();
                buf.fill(0);
                // LABEL_MAX_LEN fits in the length byte
                buf[0] = bytes.len() as u8;
                buf[1..=bytes.len()].copy_from_slice(bytes);
            }
            (kind, value) => {
                log::error!(
                    "Attribute 0x{:04X} declared as {:?} but produced {:?}",
                    spec.id,
                    kind,
                    value
                );
                return Err(AttributeStatus::Failure);
            }
        }

        Ok(spec.width())
    }

    /// Decode a value written by the stack.
    ///
    /// `data` must be exactly `spec.width()` long.
    pub fn decode(spec: &AttributeSpec, data: &[u8]) -> Result<Self, AttributeStatus> {
        spec.check_len(data.len())?;

        let value = match spec.kind {
            AttributeType::Boolean => Self::Bool(data[0] != 0),
            AttributeType::Bitmap8 | AttributeType::Enum8 => Self::U8(data[0]),
            AttributeType::Int16s => Self::I16(i16::from_ne_bytes([data[0], data[1]])),
            AttributeType::Int16u => Self::U16(u16::from_ne_bytes([data[0], data[1]])),
            AttributeType::Bitmap32 => {
                Self::U32(u32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
            }
            AttributeType::CharString => {
                let len = usize::from(data[0]).min(LABEL_MAX_LEN);
                let text = std::str::from_utf8(&data[1..=len])
                    .map_err(|_| AttributeStatus::Failure)?;
                Self::Str(label(text))
            }
        };

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEASURED: AttributeSpec = AttributeSpec::read_only(0x0000, AttributeType::Int16s);
    const FEATURES: AttributeSpec =
        AttributeSpec::read_only(FEATURE_MAP_ATTRIBUTE_ID, AttributeType::Bitmap32);
    const NAME: AttributeSpec = AttributeSpec::read_only(0x0005, AttributeType::CharString);

    #[test]
    fn test_encode_native_bytes() {
        let mut buf = [0u8; 2];
        let written = AttributeValue::I16(-1234).encode(&MEASURED, &mut buf).unwrap();
        assert_eq!(written, 2);
        assert_eq!(buf, (-1234i16).to_ne_bytes());
    }

    #[test]
    fn test_encode_rejects_short_and_long_buffers() {
        let mut short = [0xAAu8; 2];
        assert_eq!(
            AttributeValue::U32(1).encode(&FEATURES, &mut short),
            Err(AttributeStatus::InvalidLength {
                attribute: FEATURE_MAP_ATTRIBUTE_ID,
                expected: 4,
                actual: 2,
            })
        );
        // Never partially filled
        assert_eq!(short, [0xAA, 0xAA]);

        let mut long = [0u8; 8];
        assert!(AttributeValue::U32(1).encode(&FEATURES, &mut long).is_err());
    }

    #[test]
    fn test_encode_type_mismatch_fails() {
        let mut buf = [0u8; 2];
        assert_eq!(
            AttributeValue::U16(5).encode(&MEASURED, &mut buf),
            Err(AttributeStatus::Failure)
        );
    }

    #[test]
    fn test_char_string_is_length_prefixed() {
        let mut buf = [0xFFu8; 33];
        AttributeValue::Str(label("Kitchen"))
            .encode(&NAME, &mut buf)
            .unwrap();
        assert_eq!(buf[0], 7);
        assert_eq!(&buf[1..8], b"Kitchen");
        assert!(buf[8..].iter().all(|b| *b == 0));

        let decoded = AttributeValue::decode(&NAME, &buf).unwrap();
        assert_eq!(decoded, AttributeValue::Str(label("Kitchen")));
    }

    #[test]
    fn test_label_truncates_on_char_boundary() {
        let long = "é".repeat(20);
        let truncated = label(&long);
        assert_eq!(truncated.len(), 32);
        assert_eq!(truncated.chars().count(), 16);
    }

    #[test]
    fn test_descriptor_lookup() {
        const TABLE: &[AttributeSpec] = &[MEASURED, FEATURES];
        let cluster = ClusterDescriptor {
            id: 0x0402,
            attributes: TABLE,
        };
        assert_eq!(cluster.attribute(0x0000).unwrap().width(), 2);
        assert_eq!(
            cluster.attribute(0x0042),
            Err(AttributeStatus::UnsupportedAttribute {
                cluster: 0x0402,
                attribute: 0x0042,
            })
        );
    }
}
