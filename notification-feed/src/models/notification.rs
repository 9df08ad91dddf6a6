use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Key under which the store identifier is exposed.
pub const ID_FIELD: &str = "id";

/// A schema-less notification record: whatever fields the store holds, plus
/// the store-assigned identifier.
///
/// The identifier always wins. An `id` key inside the stored fields is
/// discarded when the record is built, so serialization emits exactly one
/// `id`, first, followed by the remaining fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    id: String,
    fields: Map<String, Value>,
}

impl Notification {
    pub fn new(id: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        fields.remove(ID_FIELD);
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl Serialize for Notification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
