use crate::{Result, TransportError};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timestamp(pub OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self
            .0
            .format(&time::format_description::well_known::Rfc3339)
        {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}", self.0.unix_timestamp()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}

/// Element type of a streamed buffer, spelled the numpy array-interface way
/// (`|S64`, `<U32`, `<f8`, ...) or by numpy type name (`float64`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dtype {
    /// Fixed-width byte string, NUL padded.
    Bytes(usize),
    /// Fixed-width UTF-32 string of `chars` code points.
    Utf32 { chars: usize, order: ByteOrder },
    F32(ByteOrder),
    F64(ByteOrder),
    I32(ByteOrder),
    I64(ByteOrder),
    U8,
}

impl Dtype {
    /// Size in bytes of one element. Fails when a UTF-32 width does not fit
    /// in `usize` bytes.
    pub fn itemsize(&self) -> Result<usize> {
        match *self {
            Dtype::Bytes(n) => Ok(n),
            Dtype::Utf32 { chars, .. } => chars
                .checked_mul(4)
                .ok_or_else(|| TransportError::UnsupportedDtype(format!("U{chars}"))),
            Dtype::F32(_) | Dtype::I32(_) => Ok(4),
            Dtype::F64(_) | Dtype::I64(_) => Ok(8),
            Dtype::U8 => Ok(1),
        }
    }
}

impl FromStr for Dtype {
    type Err = TransportError;

    fn from_str(tag: &str) -> Result<Self> {
        let t = tag.trim();
        let unsupported = || TransportError::UnsupportedDtype(tag.to_string());

        let native = ByteOrder::native();
        match t {
            "float32" => return Ok(Dtype::F32(native)),
            "float64" => return Ok(Dtype::F64(native)),
            "int32" => return Ok(Dtype::I32(native)),
            "int64" => return Ok(Dtype::I64(native)),
            "uint8" => return Ok(Dtype::U8),
            _ => {}
        }

        let (order, body) = match t.as_bytes().first() {
            Some(b'<') => (ByteOrder::Little, &t[1..]),
            Some(b'>') => (ByteOrder::Big, &t[1..]),
            Some(b'|') | Some(b'=') => (native, &t[1..]),
            _ => (native, t),
        };
        let mut chars = body.chars();
        let kind = chars.next().ok_or_else(unsupported)?;
        let width: usize = chars.as_str().parse().map_err(|_| unsupported())?;

        match (kind, width) {
            ('S' | 'a', n) if n > 0 => Ok(Dtype::Bytes(n)),
            ('U', n) if n > 0 && n.checked_mul(4).is_some() => {
                Ok(Dtype::Utf32 { chars: n, order })
            }
            ('f', 4) => Ok(Dtype::F32(order)),
            ('f', 8) => Ok(Dtype::F64(order)),
            ('i', 4) => Ok(Dtype::I32(order)),
            ('i', 8) => Ok(Dtype::I64(order)),
            ('u', 1) => Ok(Dtype::U8),
            _ => Err(unsupported()),
        }
    }
}

/// First part of every data-channel message. Producers send it as a pickled
/// dict (`{'dtype': '|S64', 'shape': (n,)}`); a JSON object with the same keys
/// is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub dtype: String,
    pub shape: Vec<usize>,
    /// Set by the backend when the part arrives.
    #[serde(skip)]
    pub received_at: Option<Timestamp>,
}

impl StreamMetadata {
    pub fn new(dtype: impl Into<String>, shape: Vec<usize>) -> Self {
        Self {
            dtype: dtype.into(),
            shape,
            received_at: None,
        }
    }

    /// Decode one metadata part, pickle first and JSON as the fallback.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        match serde_pickle::from_slice(raw, serde_pickle::DeOptions::new()) {
            Ok(md) => Ok(md),
            Err(pickle_err) => serde_json::from_slice(raw).map_err(|json_err| {
                TransportError::Metadata(format!("pickle: {pickle_err}; json: {json_err}"))
            }),
        }
    }

    pub fn to_pickle(&self) -> Vec<u8> {
        serde_pickle::to_vec(self, serde_pickle::SerOptions::new()).unwrap_or_default()
    }

    pub fn dtype(&self) -> Result<Dtype> {
        self.dtype.parse()
    }

    /// `(row_count, column_count)`; a one-dimensional shape has one column.
    pub fn dims(&self) -> Result<(usize, usize)> {
        match self.shape.as_slice() {
            [rows] => Ok((*rows, 1)),
            [rows, cols] => Ok((*rows, *cols)),
            other => Err(TransportError::InvalidShape(format!("{other:?}"))),
        }
    }
}

pub const SEND_PROFILES_TWISS: &str = "send_profiles_twiss";

/// Request sent on the control channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub cmd: String,
}

impl Command {
    pub fn send_profiles_twiss() -> Self {
        Self {
            cmd: SEND_PROFILES_TWISS.to_string(),
        }
    }

    /// Pickled `{'cmd': ...}` dict, as the model side unpickles requests.
    pub fn to_pickle(&self) -> Vec<u8> {
        serde_pickle::to_vec(self, serde_pickle::SerOptions::new()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_array_interface_tags() {
        assert_eq!("|S64".parse::<Dtype>().unwrap(), Dtype::Bytes(64));
        assert_eq!("S8".parse::<Dtype>().unwrap(), Dtype::Bytes(8));
        assert_eq!(
            "<U16".parse::<Dtype>().unwrap(),
            Dtype::Utf32 {
                chars: 16,
                order: ByteOrder::Little
            }
        );
        assert_eq!(">f8".parse::<Dtype>().unwrap(), Dtype::F64(ByteOrder::Big));
        assert_eq!("<i4".parse::<Dtype>().unwrap(), Dtype::I32(ByteOrder::Little));
        assert_eq!("|u1".parse::<Dtype>().unwrap(), Dtype::U8);
    }

    #[test]
    fn test_dtype_type_names() {
        assert_eq!(
            "float64".parse::<Dtype>().unwrap(),
            Dtype::F64(ByteOrder::native())
        );
        assert_eq!("uint8".parse::<Dtype>().unwrap().itemsize().unwrap(), 1);
    }

    #[test]
    fn test_dtype_rejects_unknown() {
        for tag in ["", "<c16", "S0", "f2", "object", "<f"] {
            assert!(
                matches!(
                    tag.parse::<Dtype>(),
                    Err(TransportError::UnsupportedDtype(_))
                ),
                "{tag} should be rejected"
            );
        }
    }

    #[test]
    fn test_itemsize() {
        assert_eq!(Dtype::Bytes(100).itemsize().unwrap(), 100);
        assert_eq!(
            Dtype::Utf32 {
                chars: 10,
                order: ByteOrder::Little
            }
            .itemsize()
            .unwrap(),
            40
        );
        assert_eq!(Dtype::F32(ByteOrder::Little).itemsize().unwrap(), 4);
        assert_eq!(Dtype::I64(ByteOrder::Big).itemsize().unwrap(), 8);
    }

    #[test]
    fn test_itemsize_overflow() {
        let huge = Dtype::Utf32 {
            chars: usize::MAX / 2,
            order: ByteOrder::Little,
        };
        assert!(matches!(
            huge.itemsize(),
            Err(TransportError::UnsupportedDtype(_))
        ));
        let tag = format!("<U{}", usize::MAX / 2);
        assert!(matches!(
            tag.parse::<Dtype>(),
            Err(TransportError::UnsupportedDtype(_))
        ));
    }

    // pickle.dumps({'dtype': '|S64', 'shape': (7,)}, protocol=2)
    const PY_METADATA_P2: &[u8] = b"\x80\x02}q\x00(X\x05\x00\x00\x00dtypeq\x01X\x04\x00\x00\x00|S64q\x02X\x05\x00\x00\x00shapeq\x03K\x07\x85q\x04u.";
    // Same dict, protocol=4.
    const PY_METADATA_P4: &[u8] = b"\x80\x04\x95 \x00\x00\x00\x00\x00\x00\x00}\x94(\x8c\x05dtype\x94\x8c\x04|S64\x94\x8c\x05shape\x94K\x07\x85\x94u.";

    #[test]
    fn test_metadata_python_pickle() {
        for raw in [PY_METADATA_P2, PY_METADATA_P4] {
            let md = StreamMetadata::decode(raw).unwrap();
            assert_eq!(md.dtype, "|S64");
            assert_eq!(md.shape, vec![7]);
            assert_eq!(md.dims().unwrap(), (7, 1));
            assert!(md.received_at.is_none());
        }
    }

    #[test]
    fn test_metadata_pickle_and_json() {
        let one_dim = StreamMetadata::new("<f8", vec![5]);
        assert_eq!(one_dim.dims().unwrap(), (5, 1));
        let back = StreamMetadata::decode(&one_dim.to_pickle()).unwrap();
        assert_eq!(back, one_dim);

        let md = StreamMetadata::decode(br#"{"dtype": "|S80", "shape": [12, 1]}"#).unwrap();
        assert_eq!(md.dtype, "|S80");
        assert_eq!(md.dims().unwrap(), (12, 1));
    }

    #[test]
    fn test_metadata_rejects_bad_input() {
        assert!(matches!(
            StreamMetadata::decode(b"not json"),
            Err(TransportError::Metadata(_))
        ));
        let md = StreamMetadata::new("<f8", vec![2, 3, 4]);
        assert!(matches!(md.dims(), Err(TransportError::InvalidShape(_))));
        let md = StreamMetadata::new("<f8", vec![]);
        assert!(md.dims().is_err());
    }

    #[test]
    fn test_command_pickle() {
        let raw = Command::send_profiles_twiss().to_pickle();
        assert_eq!(raw.first(), Some(&0x80));
        let back: Command = serde_pickle::from_slice(&raw, serde_pickle::DeOptions::new()).unwrap();
        assert_eq!(back, Command::send_profiles_twiss());

        // pickle.dumps({'cmd': 'send_profiles_twiss'}, protocol=3)
        let from_python: &[u8] = b"\x80\x03}q\x00X\x03\x00\x00\x00cmdq\x01X\x13\x00\x00\x00send_profiles_twissq\x02s.";
        let back: Command =
            serde_pickle::from_slice(from_python, serde_pickle::DeOptions::new()).unwrap();
        assert_eq!(back.cmd, SEND_PROFILES_TWISS);
    }
}
