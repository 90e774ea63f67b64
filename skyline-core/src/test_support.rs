//! Test-only, in-memory `EntitySource` used by unit and behaviour tests.

use std::cell::Cell;

use thiserror::Error;

use crate::{Entity, EntitySource, PointEntity, Tags, WayEntity};

/// Scripted failure produced by [`MemorySource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MemorySourceError(pub String);

#[derive(Debug, Clone)]
enum Item {
    Entity(Entity),
    Fail(String),
}

/// Restartable entity source replaying a fixed script on every `open`.
///
/// Decode failures can be injected at any position, and the source can be
/// told to refuse opening altogether.
#[derive(Debug, Default)]
pub struct MemorySource {
    items: Vec<Item>,
    open_failure: Option<String>,
    opens: Cell<usize>,
}

impl MemorySource {
    /// Create a source replaying `entities` in order.
    pub fn with_entities<I>(entities: I) -> Self
    where
        I: IntoIterator<Item = Entity>,
    {
        Self {
            items: entities.into_iter().map(Item::Entity).collect(),
            ..Self::default()
        }
    }

    /// Append an entity to the script.
    #[must_use]
    pub fn then(mut self, entity: Entity) -> Self {
        self.items.push(Item::Entity(entity));
        self
    }

    /// Append a decode failure to the script.
    #[must_use]
    pub fn then_fail(mut self, message: &str) -> Self {
        self.items.push(Item::Fail(message.to_owned()));
        self
    }

    /// Make every call to `open` fail with `message`.
    #[must_use]
    pub fn failing_open(mut self, message: &str) -> Self {
        self.open_failure = Some(message.to_owned());
        self
    }

    /// Number of traversals started so far.
    pub fn opens(&self) -> usize {
        self.opens.get()
    }
}

impl EntitySource for MemorySource {
    type Error = MemorySourceError;
    type Entities = std::vec::IntoIter<Result<Entity, MemorySourceError>>;

    fn open(&self) -> Result<Self::Entities, Self::Error> {
        self.opens.set(self.opens.get() + 1);
        if let Some(message) = &self.open_failure {
            return Err(MemorySourceError(message.clone()));
        }
        let replay: Vec<_> = self
            .items
            .iter()
            .map(|item| match item {
                Item::Entity(entity) => Ok(entity.clone()),
                Item::Fail(message) => Err(MemorySourceError(message.clone())),
            })
            .collect();
        Ok(replay.into_iter())
    }
}

/// Build a tag map from string pairs.
pub fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

/// Build a point entity.
pub fn point(id: i64, lat: f64, lon: f64, pairs: &[(&str, &str)]) -> Entity {
    Entity::Point(PointEntity::new(id, lat, lon, tags(pairs)))
}

/// Build a way entity.
pub fn way(id: i64, node_refs: &[i64], pairs: &[(&str, &str)]) -> Entity {
    Entity::Way(WayEntity {
        id,
        node_refs: node_refs.to_vec(),
        tags: tags(pairs),
    })
}
