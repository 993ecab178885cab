//! Content collections consumed by module views.
//!
//! These are fetched independently of the layout document; a layout only
//! stores references (`blockId`, `formId`) and display options.

use crate::RenderResult;
use pagesmith_editor::{BlockDescriptor, FormDescriptor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentCollections {
    pub events: Vec<Event>,
    pub tickets: Vec<Ticket>,
    pub speakers: Vec<Speaker>,
    pub forms: Vec<FormDescriptor>,
    pub blocks: Vec<BlockDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    pub starts_at: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ticket {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub sold_out: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Speaker {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub photo: Option<String>,
}

impl ContentCollections {
    pub fn from_json(source: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn block(&self, id: &str) -> Option<&BlockDescriptor> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn form(&self, id: &str) -> Option<&FormDescriptor> {
        self.forms.iter().find(|f| f.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.tickets.is_empty()
            && self.speakers.is_empty()
            && self.forms.is_empty()
            && self.blocks.is_empty()
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_collections() {
        let content = ContentCollections::from_json(
            r#"{
                "speakers": [{ "id": 3, "name": "Ada", "company": "Analytical" }],
                "blocks": [{ "id": 9, "name": "Promo", "content": "<b>Hi</b>", "content_type": "html", "status": "published" }]
            }"#,
        )
        .unwrap();

        assert_eq!(content.speakers[0].id, "3");
        assert!(content.events.is_empty());
        assert_eq!(content.block("9").unwrap().name, "Promo");
        assert!(content.form("1").is_none());
    }

    #[test]
    fn test_malformed_collections() {
        assert!(ContentCollections::from_json("[]").is_err());
    }
}
