use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
};
use std::{fmt, marker::PhantomData};

///
/// FieldList
///
/// Insertion-ordered `(name, item)` pairs carried over the wire as a map.
/// Key uniqueness is checked by the owning type on conversion.
///

#[derive(Clone, Debug)]
pub struct FieldList<T>(pub Vec<(String, T)>);

impl<T> Default for FieldList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: Serialize> Serialize for FieldList<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|(name, item)| (name, item)))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldList<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldListVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for FieldListVisitor<T> {
            type Value = FieldList<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map keyed by field name")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, T>()? {
                    out.push(entry);
                }

                Ok(FieldList(out))
            }
        }

        deserializer.deserialize_map(FieldListVisitor(PhantomData))
    }
}
