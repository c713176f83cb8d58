//! Decoded records: ordered field names mapped to typed values.

use core::fmt;

/// The value of a single decoded field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// `U*1`, `U*2`, `U*4`, and bit-encoded bytes.
    Unsigned(u64),
    /// `I*2`
    Signed(i64),
    /// `R*4`
    Float(f32),
    /// `C*1`
    Char(u8),
    /// `C*n`, either a trailing span or one sub-field of a text bundle.
    Text(String),
    /// `kxU*1`
    Array(Vec<u8>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{:?}", char::from(*c)),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Array(v) => write!(f, "{v:?}"),
        }
    }
}

/// A record decoded from its payload.
///
/// Field order follows the record layout and fixes the column order of the
/// exported table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedRecord {
    fields: Vec<(&'static str, FieldValue)>,
}

impl DecodedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field after those already present.
    pub fn push(&mut self, name: &'static str, value: FieldValue) {
        self.fields.push((name, value));
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}
