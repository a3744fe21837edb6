//! Catalog data model and the lenient wire decoder.

use crate::error::DecodeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One catalog creature, decoded from a detail payload.
///
/// Values are never mutated after construction; a richer payload replaces the
/// whole entity instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    id: u32,
    name: String,
    image_url: Option<String>,
    /// Type tags in wire order; the first one is the primary type.
    types: Vec<String>,
    stats: BTreeMap<String, u32>,
    /// Index URL this entity was fetched from, when it came from a list fetch.
    detail_url: Option<String>,
}

/// One `{ name, url }` pair of the index payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListIndexEntry {
    pub name: String,
    pub url: String,
}

/// The paginated index payload.
#[derive(Debug, Deserialize)]
struct IndexPage {
    results: Vec<ListIndexEntry>,
}

impl Entity {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        image_url: Option<String>,
        types: Vec<String>,
        stats: BTreeMap<String, u32>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image_url,
            types,
            stats,
            detail_url: None,
        }
    }

    /// Returns the same entity tagged with the URL it was fetched from.
    pub fn with_detail_url(self, url: impl Into<String>) -> Self {
        Self {
            detail_url: Some(url.into()),
            ..self
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn stats(&self) -> &BTreeMap<String, u32> {
        &self.stats
    }

    pub fn detail_url(&self) -> Option<&str> {
        self.detail_url.as_deref()
    }

    /// The first type tag, or `"unknown"` for an untyped entity.
    pub fn primary_type(&self) -> &str {
        self.types.first().map(String::as_str).unwrap_or("unknown")
    }

    /// Looks up a stat by name. Unknown names yield zero.
    pub fn stat(&self, name: &str) -> u32 {
        self.stats.get(name).copied().unwrap_or(0)
    }

    pub fn hp(&self) -> u32 {
        self.stat("hp")
    }

    pub fn attack(&self) -> u32 {
        self.stat("attack")
    }

    pub fn defense(&self) -> u32 {
        self.stat("defense")
    }

    pub fn speed(&self) -> u32 {
        self.stat("speed")
    }

    /// Name with the first letter of every word upper-cased (`mr-mime` -> `Mr-Mime`).
    pub fn display_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut at_word_start = true;
        for c in self.name.chars() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = !c.is_alphanumeric();
        }
        out
    }
}

impl<'de> Deserialize<'de> for Entity {
    /// Decodes the snake_case detail payload, flattening `sprites`, `types`
    /// and `stats` into the domain model. Optional parts default instead of
    /// failing: a missing sprite becomes `None`, a missing `base_stat` is zero.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct NamedRef {
            name: String,
        }

        #[derive(Deserialize, Default)]
        struct Sprites {
            #[serde(default)]
            front_default: Option<String>,
        }

        #[derive(Deserialize)]
        struct TypeSlot {
            #[serde(rename = "type")]
            kind: NamedRef,
        }

        #[derive(Deserialize)]
        struct StatSlot {
            #[serde(default)]
            base_stat: u32,
            stat: NamedRef,
        }

        #[derive(Deserialize)]
        struct Proxy {
            id: u32,
            name: String,
            #[serde(default)]
            sprites: Option<Sprites>,
            #[serde(default)]
            types: Vec<TypeSlot>,
            #[serde(default)]
            stats: Vec<StatSlot>,
        }

        let proxy = Proxy::deserialize(deserializer)?;

        let image_url = proxy
            .sprites
            .unwrap_or_default()
            .front_default
            .filter(|url| !url.is_empty());
        let types = proxy.types.into_iter().map(|slot| slot.kind.name).collect();

        // Duplicate stat names keep the first occurrence
        let mut stats = BTreeMap::new();
        for slot in proxy.stats {
            stats.entry(slot.stat.name).or_insert(slot.base_stat);
        }

        Ok(Entity::new(proxy.id, proxy.name, image_url, types, stats))
    }
}

/// Decodes a detail payload into an [`Entity`].
pub fn decode_entity(bytes: &[u8]) -> Result<Entity, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes an index payload into its `{ name, url }` entries.
pub fn decode_index(bytes: &[u8]) -> Result<Vec<ListIndexEntry>, DecodeError> {
    let page: IndexPage = serde_json::from_slice(bytes)?;
    Ok(page.results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bulbasaur() -> serde_json::Value {
        json!({
            "id": 1,
            "name": "bulbasaur",
            "sprites": {
                "front_default": "https://img.test/1.png",
                "back_default": null
            },
            "types": [
                {"slot": 1, "type": {"name": "grass", "url": "https://api.test/type/12/"}},
                {"slot": 2, "type": {"name": "poison", "url": "https://api.test/type/4/"}}
            ],
            "stats": [
                {"base_stat": 45, "effort": 0, "stat": {"name": "hp"}},
                {"base_stat": 49, "effort": 0, "stat": {"name": "attack"}},
                {"base_stat": 49, "effort": 0, "stat": {"name": "defense"}},
                {"base_stat": 45, "effort": 0, "stat": {"name": "speed"}}
            ],
            "height": 7
        })
    }

    #[test]
    fn test_decode_full_detail_payload() {
        let bytes = serde_json::to_vec(&bulbasaur()).unwrap();
        let entity = decode_entity(&bytes).unwrap();

        assert_eq!(entity.id(), 1);
        assert_eq!(entity.name(), "bulbasaur");
        assert_eq!(entity.image_url(), Some("https://img.test/1.png"));
        assert_eq!(entity.types(), &["grass".to_string(), "poison".to_string()]);
        assert_eq!(entity.primary_type(), "grass");
        assert_eq!(entity.hp(), 45);
        assert_eq!(entity.attack(), 49);
        assert_eq!(entity.defense(), 49);
        assert_eq!(entity.speed(), 45);
        assert_eq!(entity.detail_url(), None);
    }

    #[test]
    fn test_missing_sprite_is_absent_not_an_error() {
        let mut payload = bulbasaur();
        payload["sprites"] = json!({"back_default": null});
        let entity = decode_entity(&serde_json::to_vec(&payload).unwrap()).unwrap();
        assert_eq!(entity.image_url(), None);

        payload.as_object_mut().unwrap().remove("sprites");
        let entity = decode_entity(&serde_json::to_vec(&payload).unwrap()).unwrap();
        assert_eq!(entity.image_url(), None);

        payload["sprites"] = json!({"front_default": null});
        let entity = decode_entity(&serde_json::to_vec(&payload).unwrap()).unwrap();
        assert_eq!(entity.image_url(), None);
    }

    #[test]
    fn test_missing_speed_stat_reads_as_zero() {
        let payload = json!({
            "id": 7,
            "name": "squirtle",
            "types": [{"type": {"name": "water"}}],
            "stats": [{"base_stat": 44, "stat": {"name": "hp"}}]
        });
        let entity = decode_entity(&serde_json::to_vec(&payload).unwrap()).unwrap();
        assert_eq!(entity.speed(), 0);
        assert_eq!(entity.stat("speed"), 0);
        assert_eq!(entity.stat("no-such-stat"), 0);
        assert_eq!(entity.hp(), 44);
    }

    #[test]
    fn test_missing_base_stat_defaults_to_zero() {
        let payload = json!({
            "id": 25,
            "name": "pikachu",
            "stats": [{"stat": {"name": "attack"}}]
        });
        let entity = decode_entity(&serde_json::to_vec(&payload).unwrap()).unwrap();
        assert_eq!(entity.stats().get("attack"), Some(&0));
        assert_eq!(entity.primary_type(), "unknown");
    }

    #[test]
    fn test_missing_id_is_a_shape_error() {
        let payload = json!({"name": "missingno"});
        let err = decode_entity(&serde_json::to_vec(&payload).unwrap()).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedShape(_)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = decode_entity(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_decode_index_payload() {
        let payload = json!({
            "count": 1302,
            "next": "https://api.test/pokemon?offset=2&limit=2",
            "results": [
                {"name": "bulbasaur", "url": "https://api.test/pokemon/1/"},
                {"name": "ivysaur", "url": "https://api.test/pokemon/2/"}
            ]
        });
        let entries = decode_index(&serde_json::to_vec(&payload).unwrap()).unwrap();
        assert_eq!(
            entries,
            vec![
                ListIndexEntry {
                    name: "bulbasaur".to_string(),
                    url: "https://api.test/pokemon/1/".to_string(),
                },
                ListIndexEntry {
                    name: "ivysaur".to_string(),
                    url: "https://api.test/pokemon/2/".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_index_without_results_is_a_shape_error() {
        let err = decode_index(br#"{"count": 0}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedShape(_)));
    }

    #[test]
    fn test_display_name_capitalizes_each_word() {
        let entity = Entity::new(122, "mr-mime", None, vec![], BTreeMap::new());
        assert_eq!(entity.display_name(), "Mr-Mime");
    }

    #[test]
    fn test_with_detail_url_keeps_identity() {
        let entity = Entity::new(1, "bulbasaur", None, vec![], BTreeMap::new())
            .with_detail_url("https://api.test/pokemon/1/");
        assert_eq!(entity.id(), 1);
        assert_eq!(entity.detail_url(), Some("https://api.test/pokemon/1/"));
    }
}
