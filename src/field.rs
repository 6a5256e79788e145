//! Optional response fields that remember whether they were sent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An optional field of an API record.
///
/// Unlike `Option<T>`, a `Field<T>` tells apart a key the server left out
/// ([`Field::Absent`]) from a key the server sent as `null` ([`Field::Null`]).
///
/// Record structs mark these fields `#[serde(default)]` so a missing key decodes to
/// `Absent`.
///
/// # Examples
///
/// ```
/// use callwhiz::Field;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Record {
///     #[serde(default)]
///     accent: Field<String>,
/// }
///
/// let missing: Record = serde_json::from_str("{}").unwrap();
/// let null: Record = serde_json::from_str(r#"{"accent": null}"#).unwrap();
/// let set: Record = serde_json::from_str(r#"{"accent": "British"}"#).unwrap();
///
/// assert!(missing.accent.is_absent());
/// assert!(null.accent.is_null());
/// assert_eq!(set.accent.as_option(), Some(&"British".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// The key was not present in the payload.
    #[default]
    Absent,
    /// The key was present with a `null` value.
    Null,
    /// The key was present with a value.
    Present(T),
}

impl<T> Field<T> {
    /// Returns `true` if the key was missing.
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// Returns `true` if the key was sent as `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Returns `true` if the key carried a value.
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// Borrows the value, collapsing `Absent` and `Null` to `None`.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }

    /// Takes the value, collapsing `Absent` and `Null` to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent | Field::Null => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Field::Present(value),
            None => Field::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key exists; missing keys go through `Default`.
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

impl<T> Serialize for Field<T>
where
    T: Serialize,
{
    /// Serializes `Present` as the value and both `Absent` and `Null` as `null`.
    /// Pair with `skip_serializing_if = "Field::is_absent"` to omit absent keys.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Present(value) => serializer.serialize_some(value),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}
