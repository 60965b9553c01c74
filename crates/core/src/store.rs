//! In-memory snapshots of the three input tables.

use std::collections::{BTreeSet, HashMap};

use crate::domain::interaction::{CareLogEntry, Interaction, UserId};
use crate::domain::item::{Item, ItemId};
use crate::errors::DomainError;

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<Item>,
    positions: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Result<Self, DomainError> {
        let mut positions = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if positions.insert(item.id, position).is_some() {
                return Err(DomainError::DuplicateItem(item.id));
            }
        }

        Ok(Self { items, positions })
    }

    pub fn find(&self, item_id: ItemId) -> Option<&Item> {
        self.position(item_id).map(|position| &self.items[position])
    }

    /// Row of `item_id` in catalog order.
    pub fn position(&self, item_id: ItemId) -> Option<usize> {
        self.positions.get(&item_id).copied()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|item| item.id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct InteractionLog {
    interactions: Vec<Interaction>,
    by_user: HashMap<UserId, Vec<usize>>,
}

impl InteractionLog {
    pub fn new(interactions: Vec<Interaction>) -> Self {
        let mut by_user: HashMap<UserId, Vec<usize>> = HashMap::new();
        for (row, interaction) in interactions.iter().enumerate() {
            by_user.entry(interaction.user_id).or_default().push(row);
        }

        Self { interactions, by_user }
    }

    /// All rows in load order.
    pub fn all(&self) -> &[Interaction] {
        &self.interactions
    }

    /// The user's rows in load order; empty for unknown users.
    pub fn for_user(&self, user_id: UserId) -> impl Iterator<Item = &Interaction> + '_ {
        self.by_user
            .get(&user_id)
            .into_iter()
            .flat_map(move |rows| rows.iter().map(move |row| &self.interactions[*row]))
    }

    /// Rows the user rated at or above `threshold`.
    pub fn owned_by(&self, user_id: UserId, threshold: f64) -> Vec<&Interaction> {
        self.for_user(user_id)
            .filter(|interaction| interaction.rating_or_zero() >= threshold)
            .collect()
    }

    /// Every item the user touched, whatever the event type.
    pub fn interacted_items(&self, user_id: UserId) -> BTreeSet<ItemId> {
        self.for_user(user_id).map(|interaction| interaction.item_id).collect()
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.by_user.contains_key(&user_id)
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CareLog {
    entries: Vec<CareLogEntry>,
}

impl CareLog {
    pub fn new(entries: Vec<CareLogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CareLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{event, rated, scenario_items};
    use super::{Catalog, InteractionLog};
    use crate::domain::interaction::{EventType, UserId};
    use crate::domain::item::ItemId;
    use crate::errors::DomainError;

    #[test]
    fn catalog_rejects_duplicate_ids() {
        let mut items = scenario_items();
        items.push(items[0].clone());

        assert_eq!(Catalog::new(items).err(), Some(DomainError::DuplicateItem(ItemId(1))));
    }

    #[test]
    fn catalog_maps_sparse_ids_to_positions() {
        let mut items = scenario_items();
        items[0].id = ItemId(900);
        let catalog = Catalog::new(items).expect("catalog");

        assert_eq!(catalog.position(ItemId(900)), Some(0));
        assert_eq!(catalog.position(ItemId(1)), None);
        assert_eq!(catalog.find(ItemId(3)).map(|item| item.item_type.as_str()), Some("casual"));
    }

    #[test]
    fn interaction_log_groups_rows_by_user_in_load_order() {
        let log = InteractionLog::new(vec![
            rated(1, 7, 2, 4.0, 0),
            event(2, 8, 1, EventType::View, 1),
            event(3, 7, 3, EventType::Wishlist, 2),
        ]);

        let rows = log.for_user(UserId(7)).map(|interaction| interaction.id).collect::<Vec<_>>();
        assert_eq!(rows, vec![1, 3]);
        let touched = log.interacted_items(UserId(7)).into_iter().collect::<Vec<_>>();
        assert_eq!(touched, vec![ItemId(2), ItemId(3)]);
        assert_eq!(log.for_user(UserId(99)).count(), 0);
        assert_eq!(log.user_count(), 2);
    }

    #[test]
    fn owned_by_filters_on_rating_threshold() {
        let log = InteractionLog::new(vec![
            rated(1, 7, 1, 4.0, 0),
            rated(2, 7, 2, 3.9, 0),
            event(3, 7, 3, EventType::Purchase, 0),
        ]);

        let owned = log.owned_by(UserId(7), 4.0);
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].item_id, ItemId(1));
    }
}
