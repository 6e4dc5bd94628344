//! Serde deserializer reading typed records out of a [`Node`].
//!
//! Blocks map to structs/maps keyed by child key, sets to sequences, and scalars
//! are parsed on demand (`yes`/`no` for bools, decimal text for numbers).

use std::collections::btree_set;
use std::fmt;
use std::slice;

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, forward_to_deserialize_any};

use crate::node::{Node, Value};

pub struct Deserializer<'de> {
    input: &'de Node,
}

impl<'de> Deserializer<'de> {
    pub fn from_node(input: &'de Node) -> Self {
        Deserializer { input }
    }
}

/// Deserializes the value of `node` (not its key) into `T`.
pub fn from_node<'a, T>(node: &'a Node) -> Result<T, Error>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_node(node);
    T::deserialize(&mut deserializer)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error(String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Error {}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error(msg.to_string())
    }
}

/// Deserializer for one scalar token, parsed according to the requested type.
struct ScalarDeserializer<'de>(&'de str);

macro_rules! parse_scalar {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                let parsed: $ty = self
                    .0
                    .parse()
                    .map_err(|_| Error(format!("Not a {}: {}", stringify!($ty), self.0)))?;
                visitor.$visit(parsed)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ScalarDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.0)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            "yes" => visitor.visit_bool(true),
            "no" => visitor.visit_bool(false),
            other => Err(Error(format!("Invalid bool: {}", other))),
        }
    }

    parse_scalar! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_enum(self.0.into_deserializer())
    }

    forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Scalar(s) => visitor.visit_borrowed_str(s),
            Value::Set(items) => visitor.visit_seq(SetItems { iter: items.iter() }),
            Value::Children(children) => visitor.visit_map(Entries::new(children)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Scalar(s) => ScalarDeserializer(s).deserialize_bool(visitor),
            _ => Err(Error(format!("Not a bool: {}", self.input.key))),
        }
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Scalar(s) => ScalarDeserializer(s).deserialize_i32(visitor),
            _ => Err(Error(format!("Not an i32: {}", self.input.key))),
        }
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Scalar(s) => ScalarDeserializer(s).deserialize_i64(visitor),
            _ => Err(Error(format!("Not an i64: {}", self.input.key))),
        }
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Scalar(s) => ScalarDeserializer(s).deserialize_u32(visitor),
            _ => Err(Error(format!("Not a u32: {}", self.input.key))),
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Scalar(s) => ScalarDeserializer(s).deserialize_f32(visitor),
            _ => Err(Error(format!("Not an f32: {}", self.input.key))),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Scalar(s) => visitor.visit_borrowed_str(s),
            _ => Err(Error(format!("Not a string: {}", self.input.key))),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Set(items) => visitor.visit_seq(SetItems { iter: items.iter() }),
            Value::Children(children) => visitor.visit_seq(ChildNodes { iter: children.iter() }),
            Value::Scalar(_) => Err(Error(format!("Not a list: {}", self.input.key))),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.value {
            Value::Children(children) => visitor.visit_map(Entries::new(children)),
            _ => Err(Error(format!("Not a block: {}", self.input.key))),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // Absent keys are handled by the map access; reaching here means present.
        visitor.visit_some(self)
    }

    forward_to_deserialize_any! {
        i8 i16 u8 u16 u64 f64 char bytes byte_buf unit unit_struct newtype_struct tuple
        tuple_struct enum identifier ignored_any
    }
}

/// Items of a `key = { a b c }` set.
struct SetItems<'de> {
    iter: btree_set::Iter<'de, String>,
}

impl<'de> SeqAccess<'de> for SetItems<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(item) => seed.deserialize(ScalarDeserializer(item)).map(Some),
            None => Ok(None),
        }
    }
}

/// Child nodes read as a list, ignoring their keys.
struct ChildNodes<'de> {
    iter: slice::Iter<'de, Node>,
}

impl<'de> SeqAccess<'de> for ChildNodes<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(node) => {
                let mut de = Deserializer::from_node(node);
                seed.deserialize(&mut de).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Child nodes read as `key -> value` entries.
struct Entries<'de> {
    iter: slice::Iter<'de, Node>,
    value: Option<&'de Node>,
}

impl<'de> Entries<'de> {
    fn new(children: &'de [Node]) -> Self {
        Entries {
            iter: children.iter(),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for Entries<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(node) => {
                self.value = Some(node);
                seed.deserialize(BorrowedStrDeserializer::<Error>::new(&node.key))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let node = self.value.take().ok_or(Error(
            "MapAccess::next_value called before next_key".to_string(),
        ))?;
        let mut de = Deserializer::from_node(node);
        seed.deserialize(&mut de)
    }
}
