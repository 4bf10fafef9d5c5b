//! Tolerant decoding for closed enumerations.
//!
//! Classification data that feeds the SBOM (component types, dependency
//! scopes, result codes) is produced by tools versioned independently of this
//! crate. A value added upstream must not break decoding of the whole
//! document, so enums declared with [`tolerant_enum!`](crate::tolerant_enum)
//! decode unknown tokens to a deterministic fallback member instead of
//! failing.
//!
//! Decoding rules, in order:
//!
//! 1. case-insensitive match on a member's declared name;
//! 2. exact match on a member's numeric value (integer tokens, or strings that
//!    parse as integers);
//! 3. the fallback member: a member named `Unknown`, else the member valued
//!    `-1`, else the member valued `0`, else the first declared member.
//!
//! `null` and empty strings decode to the fallback for plain fields and to
//! `None` for fields using the [`nullable`] helper. Collections of tolerant
//! enums (`Vec`, `HashSet`, `BTreeSet`, ...) decode element-wise with no extra
//! annotation; [`collection`] covers any other `FromIterator` type.
//!
//! ```
//! use sbom_manifest::tolerant_enum;
//!
//! tolerant_enum! {
//!     /// Build flavor reported by a scanner.
//!     pub enum Flavor {
//!         Unknown = -1 => "Unknown",
//!         Debug = 0 => "Debug",
//!         Release = 1 => "Release",
//!     }
//! }
//!
//! let flavor: Flavor = serde_json::from_str("\"Profile\"").unwrap();
//! assert_eq!(flavor, Flavor::Unknown);
//! assert_eq!(serde_json::to_string(&Flavor::Release).unwrap(), "\"Release\"");
//! ```

mod tolerant;

pub use tolerant::{
    collection, compute_fallback, decode_int, decode_str, decode_token, deserialize_tolerant,
    nullable, RawToken, TolerantEnum,
};

#[doc(hidden)]
pub use serde as __serde;

/// Declare a closed enumeration with tolerant serde support.
///
/// Each member carries its numeric value and the name used on the wire:
/// `Variant = value => "WireName"`. Encoding always emits the wire name.
#[macro_export]
macro_rules! tolerant_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:expr => $token:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::codec::TolerantEnum for $name {
            const MEMBERS: &'static [Self] = &[$(Self::$variant),+];

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }

            fn value(&self) -> i64 {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            fn fallback() -> Self {
                static FALLBACK: ::std::sync::OnceLock<$name> = ::std::sync::OnceLock::new();
                *FALLBACK.get_or_init($crate::codec::compute_fallback::<$name>)
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                <Self as $crate::codec::TolerantEnum>::fallback()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::codec::TolerantEnum::name(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::std::convert::Infallible;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Ok($crate::codec::decode_str(s))
            }
        }

        impl $crate::codec::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::codec::__serde::Serializer,
            {
                serializer.serialize_str($crate::codec::TolerantEnum::name(self))
            }
        }

        impl<'de> $crate::codec::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::codec::__serde::Deserializer<'de>,
            {
                $crate::codec::deserialize_tolerant(deserializer)
            }
        }
    };
}
