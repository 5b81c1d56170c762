//! Value cells for decoded leaves.
//!
//! A [`Variant`] holds exactly one decoded builtin value. Fixed-width scalars
//! are stored inline; strings own their bytes. Two access modes exist:
//!
//! - [`Variant::extract`] requires the stored tag to match the requested type
//!   and returns the stored value unchanged.
//! - [`Variant::convert`] casts any numeric cell to the requested numeric
//!   type. `f64` additionally accepts `time` and `duration` cells and returns
//!   seconds.

use crate::builtin::ScalarTag;
use crate::error::{Result, TypesError};

/// Absolute timestamp: seconds and nanoseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Time {
    pub sec: u32,
    pub nsec: u32,
}

impl Time {
    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Seconds with the nanosecond part folded in.
    pub fn to_sec(&self) -> f64 {
        self.sec as f64 + self.nsec as f64 / 1e9
    }
}

/// Signed time span: seconds and nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Duration {
    pub sec: i32,
    pub nsec: i32,
}

impl Duration {
    pub fn new(sec: i32, nsec: i32) -> Self {
        Self { sec, nsec }
    }

    /// Seconds with the nanosecond part folded in.
    pub fn to_sec(&self) -> f64 {
        self.sec as f64 + self.nsec as f64 / 1e9
    }
}

/// A single decoded builtin value.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Bool(bool),
    Byte(u8),
    Char(i8),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    Time(Time),
    Duration(Duration),
    /// Raw string bytes as found on the wire; not necessarily UTF-8.
    String(Vec<u8>),
}

impl Variant {
    /// String cell holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Variant::String(bytes.to_vec())
    }

    /// Tag of the value currently held.
    pub fn tag(&self) -> ScalarTag {
        match self {
            Variant::Bool(_) => ScalarTag::Bool,
            Variant::Byte(_) => ScalarTag::Byte,
            Variant::Char(_) => ScalarTag::Char,
            Variant::Int8(_) => ScalarTag::Int8,
            Variant::Uint8(_) => ScalarTag::Uint8,
            Variant::Int16(_) => ScalarTag::Int16,
            Variant::Uint16(_) => ScalarTag::Uint16,
            Variant::Int32(_) => ScalarTag::Int32,
            Variant::Uint32(_) => ScalarTag::Uint32,
            Variant::Int64(_) => ScalarTag::Int64,
            Variant::Uint64(_) => ScalarTag::Uint64,
            Variant::Float32(_) => ScalarTag::Float32,
            Variant::Float64(_) => ScalarTag::Float64,
            Variant::Time(_) => ScalarTag::Time,
            Variant::Duration(_) => ScalarTag::Duration,
            Variant::String(_) => ScalarTag::String,
        }
    }

    /// Replace the held value. A previously held string buffer is dropped.
    pub fn assign<T: Into<Variant>>(&mut self, value: T) {
        *self = value.into();
    }

    /// Return the stored value if its tag matches `T` exactly.
    pub fn extract<T: ExtractValue>(&self) -> Result<T> {
        T::extract_from(self).ok_or(TypesError::TypeMismatch {
            requested: T::TYPE_NAME,
            actual: self.tag(),
        })
    }

    /// Cast the stored value to `T`. See the module docs for the allowed pairs.
    pub fn convert<T: ConvertValue>(&self) -> Result<T> {
        T::convert_from(self)
    }

    /// Raw bytes of a string cell.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Variant::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Variant::String(_))
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Bool(v) => write!(f, "{v}"),
            Variant::Byte(v) | Variant::Uint8(v) => write!(f, "{v}"),
            Variant::Char(v) | Variant::Int8(v) => write!(f, "{v}"),
            Variant::Int16(v) => write!(f, "{v}"),
            Variant::Uint16(v) => write!(f, "{v}"),
            Variant::Int32(v) => write!(f, "{v}"),
            Variant::Uint32(v) => write!(f, "{v}"),
            Variant::Int64(v) => write!(f, "{v}"),
            Variant::Uint64(v) => write!(f, "{v}"),
            Variant::Float32(v) => write!(f, "{v}"),
            Variant::Float64(v) => write!(f, "{v}"),
            Variant::Time(t) => write!(f, "{}.{:09}", t.sec, t.nsec),
            Variant::Duration(d) => write!(f, "{}", d.to_sec()),
            Variant::String(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

macro_rules! impl_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Variant {
                fn from(value: $t) -> Self {
                    Variant::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    i64 => Int64,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    Time => Time,
    Duration => Duration,
    Vec<u8> => String,
);

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.as_bytes().to_vec())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value.into_bytes())
    }
}

/// Types that [`Variant::extract`] can return.
pub trait ExtractValue: Sized {
    /// Name used in type-mismatch errors.
    const TYPE_NAME: &'static str;

    fn extract_from(value: &Variant) -> Option<Self>;
}

macro_rules! impl_extract {
    ($($t:ty => $name:literal : $($variant:ident)|+),* $(,)?) => {
        $(
            impl ExtractValue for $t {
                const TYPE_NAME: &'static str = $name;

                fn extract_from(value: &Variant) -> Option<Self> {
                    match value {
                        $(Variant::$variant(v) => Some(*v),)+
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_extract!(
    bool => "bool": Bool,
    i8 => "int8": Int8 | Char,
    u8 => "uint8": Uint8 | Byte,
    i16 => "int16": Int16,
    u16 => "uint16": Uint16,
    i32 => "int32": Int32,
    u32 => "uint32": Uint32,
    i64 => "int64": Int64,
    u64 => "uint64": Uint64,
    f32 => "float32": Float32,
    f64 => "float64": Float64,
    Time => "time": Time,
    Duration => "duration": Duration,
);

impl ExtractValue for Vec<u8> {
    const TYPE_NAME: &'static str = "string";

    fn extract_from(value: &Variant) -> Option<Self> {
        value.as_bytes().map(<[u8]>::to_vec)
    }
}

impl ExtractValue for String {
    const TYPE_NAME: &'static str = "string";

    fn extract_from(value: &Variant) -> Option<Self> {
        value
            .as_bytes()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Types that [`Variant::convert`] can produce.
pub trait ConvertValue: Sized {
    /// Name used in conversion errors.
    const TYPE_NAME: &'static str;

    fn convert_from(value: &Variant) -> Result<Self>;
}

fn conversion_error(requested: &'static str, value: &Variant) -> TypesError {
    let reason = match value {
        Variant::String(_) => "strings are not converted to numbers implicitly",
        Variant::Time(_) | Variant::Duration(_) => {
            "time and duration only convert to float64 (seconds)"
        }
        _ => "incompatible cell type",
    };
    TypesError::Conversion {
        requested,
        actual: value.tag(),
        reason,
    }
}

macro_rules! impl_convert_numeric {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl ConvertValue for $t {
                const TYPE_NAME: &'static str = $name;

                fn convert_from(value: &Variant) -> Result<Self> {
                    Ok(match *value {
                        Variant::Bool(v) => v as u8 as $t,
                        Variant::Byte(v) | Variant::Uint8(v) => v as $t,
                        Variant::Char(v) | Variant::Int8(v) => v as $t,
                        Variant::Int16(v) => v as $t,
                        Variant::Uint16(v) => v as $t,
                        Variant::Int32(v) => v as $t,
                        Variant::Uint32(v) => v as $t,
                        Variant::Int64(v) => v as $t,
                        Variant::Uint64(v) => v as $t,
                        Variant::Float32(v) => v as $t,
                        Variant::Float64(v) => v as $t,
                        Variant::Time(_) | Variant::Duration(_) | Variant::String(_) => {
                            return Err(conversion_error(<Self as ConvertValue>::TYPE_NAME, value))
                        }
                    })
                }
            }
        )*
    };
}

impl_convert_numeric!(
    i8 => "int8",
    u8 => "uint8",
    i16 => "int16",
    u16 => "uint16",
    i32 => "int32",
    u32 => "uint32",
    i64 => "int64",
    u64 => "uint64",
    f32 => "float32",
);

impl ConvertValue for f64 {
    const TYPE_NAME: &'static str = "float64";

    fn convert_from(value: &Variant) -> Result<Self> {
        Ok(match *value {
            Variant::Bool(v) => v as u8 as f64,
            Variant::Byte(v) | Variant::Uint8(v) => v as f64,
            Variant::Char(v) | Variant::Int8(v) => v as f64,
            Variant::Int16(v) => v as f64,
            Variant::Uint16(v) => v as f64,
            Variant::Int32(v) => v as f64,
            Variant::Uint32(v) => v as f64,
            Variant::Int64(v) => v as f64,
            Variant::Uint64(v) => v as f64,
            Variant::Float32(v) => v as f64,
            Variant::Float64(v) => v,
            Variant::Time(t) => t.to_sec(),
            Variant::Duration(d) => d.to_sec(),
            Variant::String(_) => {
                return Err(conversion_error(<Self as ConvertValue>::TYPE_NAME, value))
            }
        })
    }
}

macro_rules! impl_convert_exact {
    ($($t:ty),* $(,)?) => {
        $(
            impl ConvertValue for $t {
                const TYPE_NAME: &'static str = <$t as ExtractValue>::TYPE_NAME;

                fn convert_from(value: &Variant) -> Result<Self> {
                    <$t as ExtractValue>::extract_from(value)
                        .ok_or_else(|| conversion_error(<Self as ConvertValue>::TYPE_NAME, value))
                }
            }
        )*
    };
}

impl_convert_exact!(Time, Duration, String, Vec<u8>);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_exact_tag() {
        let v = Variant::from(42i32);
        assert_eq!(v.tag(), ScalarTag::Int32);
        assert_eq!(v.extract::<i32>().expect("int32 cell"), 42);

        let err = v.extract::<i64>().expect_err("int64 from int32 cell");
        assert_eq!(
            err,
            TypesError::TypeMismatch {
                requested: "int64",
                actual: ScalarTag::Int32,
            }
        );
    }

    #[test]
    fn test_extract_bit_exact_float() {
        let v = Variant::from(f64::from_bits(0x7ff8_0000_0000_0001));
        let out = v.extract::<f64>().expect("float64 cell");
        assert_eq!(out.to_bits(), 0x7ff8_0000_0000_0001);
    }

    #[test]
    fn test_extract_aliases() {
        assert_eq!(Variant::Byte(200).extract::<u8>().expect("byte"), 200);
        assert_eq!(Variant::Char(-3).extract::<i8>().expect("char"), -3);
        assert!(Variant::Byte(1).extract::<i8>().is_err());
    }

    #[test]
    fn test_extract_string() {
        let v = Variant::from("hello");
        assert_eq!(v.extract::<String>().expect("string cell"), "hello");
        assert_eq!(v.extract::<Vec<u8>>().expect("string cell"), b"hello");
        assert!(v.extract::<f64>().is_err());
    }

    #[test]
    fn test_assign_replaces_string_with_scalar() {
        let mut v = Variant::from("a rather long string value");
        v.assign(7u16);
        assert_eq!(v, Variant::Uint16(7));
        v.assign("again");
        assert_eq!(v.as_bytes(), Some(&b"again"[..]));
    }

    #[test]
    fn test_convert_time_to_seconds() {
        let v = Variant::from(Time::new(2, 500_000_000));
        assert_eq!(v.convert::<f64>().expect("time to f64"), 2.5);
        assert!(v.convert::<f32>().is_err());
        assert!(v.convert::<i64>().is_err());
        assert_eq!(v.convert::<Time>().expect("time"), Time::new(2, 500_000_000));
    }

    #[test]
    fn test_convert_negative_duration() {
        let v = Variant::from(Duration::new(-1, -500_000_000));
        assert_eq!(v.convert::<f64>().expect("duration to f64"), -1.5);
        assert!(v.convert::<Time>().is_err());
    }

    #[test]
    fn test_convert_string_fails() {
        let v = Variant::from("12");
        let err = v.convert::<i32>().expect_err("string to int");
        assert!(matches!(
            err,
            TypesError::Conversion {
                actual: ScalarTag::String,
                ..
            }
        ));
        assert!(v.convert::<f64>().is_err());
        assert_eq!(v.convert::<String>().expect("string"), "12");
    }

    #[test]
    fn test_conversion_error_names_destination() {
        let stamp = Variant::from(Time::new(1, 0));
        for (err, expected) in [
            (stamp.convert::<i32>().expect_err("time to int32"), "int32"),
            (Variant::from("x").convert::<f64>().expect_err("string to f64"), "float64"),
            (stamp.convert::<Duration>().expect_err("time to duration"), "duration"),
        ] {
            match err {
                TypesError::Conversion { requested, .. } => assert_eq!(requested, expected),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_convert_narrowing_and_widening() {
        assert_eq!(Variant::Uint8(255).convert::<i64>().expect("widen"), 255);
        assert_eq!(Variant::Int32(300).convert::<u8>().expect("narrow"), 44);
        assert_eq!(Variant::Float64(3.75).convert::<i32>().expect("truncate"), 3);
        assert_eq!(Variant::Bool(true).convert::<f32>().expect("bool"), 1.0);
        assert_eq!(Variant::Int8(-1).convert::<u16>().expect("sign"), u16::MAX);
    }

    #[test]
    fn test_display() {
        assert_eq!(Variant::from(Time::new(3, 5)).to_string(), "3.000000005");
        assert_eq!(Variant::from("abc").to_string(), "abc");
        assert_eq!(Variant::Int16(-4).to_string(), "-4");
    }

    proptest! {
        #[test]
        fn prop_convert_int32_matches_cast(v in any::<i32>()) {
            let cell = Variant::from(v);
            prop_assert_eq!(cell.convert::<f64>().unwrap(), v as f64);
            prop_assert_eq!(cell.convert::<i64>().unwrap(), v as i64);
            prop_assert_eq!(cell.convert::<u16>().unwrap(), v as u16);
        }

        #[test]
        fn prop_extract_round_trips_u64(v in any::<u64>()) {
            prop_assert_eq!(Variant::from(v).extract::<u64>().unwrap(), v);
        }
    }
}
