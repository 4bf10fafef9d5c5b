//! Token model and decode functions behind [`tolerant_enum!`](crate::tolerant_enum).

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// A closed enumeration that decodes unknown tokens to a fallback member.
///
/// Implemented by [`tolerant_enum!`](crate::tolerant_enum); implementing it by
/// hand is possible but the macro also caches the fallback per type.
pub trait TolerantEnum: Copy + Sized + 'static {
    /// Every member, in declaration order.
    const MEMBERS: &'static [Self];

    /// The member's declared name, as written on the wire.
    fn name(&self) -> &'static str;

    /// The member's underlying numeric value.
    fn value(&self) -> i64;

    /// The member substituted for unrecognized tokens.
    fn fallback() -> Self;

    /// Look up a member by case-insensitive name.
    fn from_name(name: &str) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .copied()
    }

    /// Look up a member by numeric value.
    fn from_value(value: i64) -> Option<Self> {
        Self::MEMBERS.iter().find(|m| m.value() == value).copied()
    }
}

/// Select the fallback member by priority: `Unknown` by name, then `-1`,
/// then `0`, then the first declared member.
pub fn compute_fallback<E: TolerantEnum>() -> E {
    let members = E::MEMBERS;
    members
        .iter()
        .find(|m| m.name().eq_ignore_ascii_case("Unknown"))
        .or_else(|| members.iter().find(|m| m.value() == -1))
        .or_else(|| members.iter().find(|m| m.value() == 0))
        .or_else(|| members.first())
        .copied()
        .expect("tolerant enums declare at least one member")
}

/// A raw enum token as it appeared in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawToken {
    /// JSON `null` or an absent optional value
    Null,
    /// Any string token
    Str(String),
    /// An integer token that fits in `i64`
    Int(i64),
    /// Booleans, floats, arrays, objects and out-of-range integers
    Other,
}

impl RawToken {
    /// True for `null` and for strings that are empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Str(s) => s.trim().is_empty(),
            Self::Int(_) | Self::Other => false,
        }
    }
}

impl<'de> Deserialize<'de> for RawToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawTokenVisitor)
    }
}

struct RawTokenVisitor;

impl<'de> Visitor<'de> for RawTokenVisitor {
    type Value = RawToken;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an enum name, an enum value or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawToken, E> {
        Ok(RawToken::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<RawToken, E> {
        Ok(RawToken::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<RawToken, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawToken::deserialize(deserializer)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawToken, E> {
        Ok(RawToken::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawToken, E> {
        Ok(RawToken::Str(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawToken, E> {
        Ok(RawToken::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawToken, E> {
        Ok(i64::try_from(v).map_or(RawToken::Other, RawToken::Int))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<RawToken, E> {
        Ok(RawToken::Other)
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<RawToken, E> {
        Ok(RawToken::Other)
    }

    fn visit_bytes<E: de::Error>(self, _v: &[u8]) -> Result<RawToken, E> {
        Ok(RawToken::Other)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<RawToken, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawToken::Other)
    }

    fn visit_map<A>(self, mut map: A) -> Result<RawToken, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(RawToken::Other)
    }
}

/// Decode a string token. Never fails.
pub fn decode_str<E: TolerantEnum>(token: &str) -> E {
    let token = token.trim();
    if token.is_empty() {
        return E::fallback();
    }
    if let Some(member) = E::from_name(token) {
        return member;
    }
    token
        .parse::<i64>()
        .ok()
        .and_then(E::from_value)
        .unwrap_or_else(E::fallback)
}

/// Decode an integer token. Never fails.
pub fn decode_int<E: TolerantEnum>(value: i64) -> E {
    E::from_value(value).unwrap_or_else(E::fallback)
}

/// Decode any raw token. Never fails.
pub fn decode_token<E: TolerantEnum>(token: &RawToken) -> E {
    match token {
        RawToken::Str(s) => decode_str(s),
        RawToken::Int(v) => decode_int(*v),
        RawToken::Null | RawToken::Other => E::fallback(),
    }
}

/// `Deserialize` body shared by every tolerant enum.
///
/// Only syntactically broken input can fail here; unknown tokens cannot.
pub fn deserialize_tolerant<'de, D, E>(deserializer: D) -> Result<E, D::Error>
where
    D: Deserializer<'de>,
    E: TolerantEnum,
{
    let token = RawToken::deserialize(deserializer)?;
    Ok(decode_token(&token))
}

/// Serde helpers for `Option<E>` fields: `null` and `""` decode to `None`.
///
/// Use with `#[serde(default, with = "sbom_manifest::codec::nullable")]`.
pub mod nullable {
    use super::{decode_token, RawToken, TolerantEnum};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D, E>(deserializer: D) -> Result<Option<E>, D::Error>
    where
        D: Deserializer<'de>,
        E: TolerantEnum,
    {
        let token = Option::<RawToken>::deserialize(deserializer)?;
        Ok(match token {
            Some(token) if !token.is_blank() => Some(decode_token(&token)),
            _ => None,
        })
    }

    pub fn serialize<S, E>(value: &Option<E>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        E: TolerantEnum,
    {
        match value {
            Some(member) => serializer.serialize_str(member.name()),
            None => serializer.serialize_none(),
        }
    }
}

/// Serde helpers for arbitrary collections of tolerant enums.
///
/// Any `C: FromIterator<E>` can be filled, so custom collection types that
/// only expose iteration work the same as `Vec`. A `null` collection decodes
/// to an empty one.
pub mod collection {
    use super::{decode_token, RawToken, TolerantEnum};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D, E, C>(deserializer: D) -> Result<C, D::Error>
    where
        D: Deserializer<'de>,
        E: TolerantEnum,
        C: FromIterator<E>,
    {
        let tokens = Option::<Vec<RawToken>>::deserialize(deserializer)?;
        Ok(tokens
            .unwrap_or_default()
            .iter()
            .map(decode_token::<E>)
            .collect())
    }

    pub fn serialize<S, E, C>(values: &C, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        E: TolerantEnum,
        for<'a> &'a C: IntoIterator<Item = &'a E>,
    {
        serializer.collect_seq(values.into_iter().map(TolerantEnum::name))
    }
}
