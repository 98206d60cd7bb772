//! Loot selection for the dropped container.

use rand::Rng;
use rand::seq::index;

use crate::profile::LootPolicy;

/// One selected item and the quantity to place in the container.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootItem {
    pub item_id: String,
    pub quantity: u32,
}

/// Rolls the container contents for one event.
///
/// Selects up to `max_items` distinct entries uniformly without replacement,
/// then rolls each quantity uniformly within the entry's range. A disabled
/// policy or an empty candidate list selects nothing, leaving the
/// container's default loot untouched.
pub fn select_loot(policy: &LootPolicy, rng: &mut impl Rng) -> Vec<LootItem> {
    if !policy.enabled || policy.items.is_empty() || policy.max_items == 0 {
        return Vec::new();
    }

    let count = policy.max_items.min(policy.items.len());
    index::sample(rng, policy.items.len(), count)
        .into_iter()
        .map(|i| {
            let entry = &policy.items[i];
            LootItem {
                item_id: entry.item_id.clone(),
                quantity: rng.gen_range(entry.min_amount..=entry.max_amount),
            }
        })
        .collect()
}
