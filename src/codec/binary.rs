//! Plain binary document format.
//!
//! A `.bin` document has this layout:
//!
//! ```text
//! [CFGB: 4 bytes][version: 1 byte][value]
//! ```
//!
//! `value` is a tag byte followed by its payload:
//!
//! | tag    | kind   | payload                                     |
//! |--------|--------|---------------------------------------------|
//! | `0x00` | null   | -                                           |
//! | `0x01` | false  | -                                           |
//! | `0x02` | true   | -                                           |
//! | `0x03` | i64    | 8 bytes LE                                  |
//! | `0x04` | u64    | 8 bytes LE                                  |
//! | `0x05` | f64    | 8 bytes LE (IEEE 754)                       |
//! | `0x06` | string | u32 LE length, UTF-8 bytes                  |
//! | `0x07` | array  | u32 LE count, values                        |
//! | `0x08` | object | u32 LE count, (u32 LE key length, key, value)* |
//!
//! Object keys keep their document order.  Nothing here is encrypted;
//! the encrypted format seals these exact bytes.

use serde_json::{Map, Number, Value};

use crate::errors::{ConfigurateError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every plain binary document.
const MAGIC: &[u8; 4] = b"CFGB";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Nesting limit when decoding, so hostile input cannot exhaust the stack.
const MAX_DEPTH: usize = 128;

const TAG_NULL: u8 = 0x00;
const TAG_FALSE: u8 = 0x01;
const TAG_TRUE: u8 = 0x02;
const TAG_I64: u8 = 0x03;
const TAG_U64: u8 = 0x04;
const TAG_F64: u8 = 0x05;
const TAG_STRING: u8 = 0x06;
const TAG_ARRAY: u8 = 0x07;
const TAG_OBJECT: u8 = 0x08;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a document into the plain binary format.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    write_value(&mut buf, value, 0)?;
    Ok(buf)
}

/// Same nesting limit as `Reader::read_value`, so every encoded document
/// can be decoded again.
fn write_value(buf: &mut Vec<u8>, value: &Value, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(invalid(format!("nesting deeper than {MAX_DEPTH}")));
    }
    match value {
        Value::Null => buf.push(TAG_NULL),
        Value::Bool(false) => buf.push(TAG_FALSE),
        Value::Bool(true) => buf.push(TAG_TRUE),
        Value::Number(n) => write_number(buf, n)?,
        Value::String(s) => {
            buf.push(TAG_STRING);
            write_str(buf, s)?;
        }
        Value::Array(items) => {
            buf.push(TAG_ARRAY);
            write_len(buf, items.len())?;
            for item in items {
                write_value(buf, item, depth + 1)?;
            }
        }
        Value::Object(map) => {
            buf.push(TAG_OBJECT);
            write_len(buf, map.len())?;
            for (key, item) in map {
                write_str(buf, key)?;
                write_value(buf, item, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn write_number(buf: &mut Vec<u8>, n: &Number) -> Result<()> {
    if let Some(i) = n.as_i64() {
        buf.push(TAG_I64);
        buf.extend_from_slice(&i.to_le_bytes());
    } else if let Some(u) = n.as_u64() {
        buf.push(TAG_U64);
        buf.extend_from_slice(&u.to_le_bytes());
    } else if let Some(f) = n.as_f64() {
        buf.push(TAG_F64);
        buf.extend_from_slice(&f.to_le_bytes());
    } else {
        return Err(ConfigurateError::SerializationError(format!(
            "number {n} has no binary representation"
        )));
    }
    Ok(())
}

fn write_str(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    write_len(buf, s.len())?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_len(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| {
        ConfigurateError::SerializationError(format!("length {len} exceeds u32::MAX"))
    })?;
    buf.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a plain binary document.
///
/// Input that does not start with the binary magic (for instance an
/// encrypted document read without its key) is `DecryptionFailed`;
/// damage after a valid prefix is `SerializationError`.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    if bytes.len() < MAGIC.len() + 1 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(ConfigurateError::DecryptionFailed);
    }

    let version = bytes[MAGIC.len()];
    if version != CURRENT_VERSION {
        return Err(invalid(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let mut reader = Reader {
        data: &bytes[MAGIC.len() + 1..],
    };
    let value = reader.read_value(0)?;
    if !reader.data.is_empty() {
        return Err(invalid(format!(
            "{} trailing bytes after document",
            reader.data.len()
        )));
    }
    Ok(value)
}

struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.data.len() < n {
            return Err(invalid("unexpected end of document".into()));
        }
        let (head, rest) = self.data.split_at(n);
        self.data = rest;
        Ok(head)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        bytes
            .try_into()
            .map_err(|_| invalid("unexpected end of document".into()))
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = u32::from_le_bytes(self.take_array()?);
        usize::try_from(len).map_err(|_| invalid(format!("length {len} exceeds address space")))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| invalid("string is not valid UTF-8".into()))
    }

    fn read_value(&mut self, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(invalid(format!("nesting deeper than {MAX_DEPTH}")));
        }

        let [tag] = self.take_array::<1>()?;
        let value = match tag {
            TAG_NULL => Value::Null,
            TAG_FALSE => Value::Bool(false),
            TAG_TRUE => Value::Bool(true),
            TAG_I64 => Value::from(i64::from_le_bytes(self.take_array()?)),
            TAG_U64 => Value::from(u64::from_le_bytes(self.take_array()?)),
            TAG_F64 => {
                let f = f64::from_le_bytes(self.take_array()?);
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| invalid("non-finite float".into()))?
            }
            TAG_STRING => Value::String(self.read_string()?),
            TAG_ARRAY => {
                let count = self.read_len()?;
                // Every element takes at least one byte.
                let mut items = Vec::with_capacity(count.min(self.data.len()));
                for _ in 0..count {
                    items.push(self.read_value(depth + 1)?);
                }
                Value::Array(items)
            }
            TAG_OBJECT => {
                let count = self.read_len()?;
                let mut map = Map::new();
                for _ in 0..count {
                    let key = self.read_string()?;
                    let item = self.read_value(depth + 1)?;
                    map.insert(key, item);
                }
                Value::Object(map)
            }
            other => return Err(invalid(format!("unknown tag 0x{other:02x}"))),
        };
        Ok(value)
    }
}

fn invalid(msg: String) -> ConfigurateError {
    ConfigurateError::SerializationError(format!("invalid binary document: {msg}"))
}
