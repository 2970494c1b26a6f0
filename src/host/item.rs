//! Item identifiers and the item registry seam.

use std::collections::HashMap;
use std::fmt;

/// Namespace used when an identifier has no `namespace:` prefix.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A namespaced identifier such as `minecraft:stick`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    namespace: String,
    path: String,
}

impl ResourceLocation {
    /// Build an identifier from its parts, rejecting invalid characters.
    pub fn new(namespace: &str, path: &str) -> Option<Self> {
        if Self::is_valid_namespace(namespace) && Self::is_valid_path(path) {
            Some(Self {
                namespace: namespace.to_string(),
                path: path.to_string(),
            })
        } else {
            None
        }
    }

    /// Parse `namespace:path`, or a bare `path` in the default namespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }

    pub fn is_valid_namespace(s: &str) -> bool {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_-.".contains(c))
    }

    pub fn is_valid_path(s: &str) -> bool {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_-./".contains(c))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// A registered item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    id: ResourceLocation,
}

impl Item {
    pub fn new(id: ResourceLocation) -> Self {
        Self { id }
    }

    /// The "no item" sentinel.
    pub fn air() -> Self {
        Self {
            id: ResourceLocation {
                namespace: DEFAULT_NAMESPACE.to_string(),
                path: "air".to_string(),
            },
        }
    }

    pub fn is_air(&self) -> bool {
        *self == Self::air()
    }

    pub fn id(&self) -> &ResourceLocation {
        &self.id
    }
}

/// A stack of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub item: Item,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: Item, count: u32) -> Self {
        Self { item, count }
    }
}

/// One cell of a crafting grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Ingredient {
    #[default]
    Empty,
    Of(Item),
}

impl Ingredient {
    pub fn is_empty(&self) -> bool {
        matches!(self, Ingredient::Empty)
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            Ingredient::Empty => None,
            Ingredient::Of(item) => Some(item),
        }
    }
}

/// Lookup from identifier to registered item.
///
/// Implementations may return `None` or the air sentinel for unknown ids;
/// callers treat both as unresolved.
pub trait ItemRegistry {
    fn resolve(&self, id: &ResourceLocation) -> Option<Item>;
}

/// In-memory item registry.
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    items: HashMap<ResourceLocation, Item>,
}

impl ItemTable {
    pub fn new() -> Self {
        let mut table = Self::default();
        let air = Item::air();
        table.items.insert(air.id().clone(), air);
        table
    }

    /// A table pre-filled with a handful of vanilla items.
    pub fn vanilla() -> Self {
        let mut table = Self::new();
        for id in [
            "stick",
            "stone",
            "cobblestone",
            "torch",
            "coal",
            "diamond",
            "iron_ingot",
            "oak_planks",
            "crafting_table",
            "diamond_pickaxe",
        ] {
            table.register(id);
        }
        table
    }

    /// Register an item; returns `None` if the id is malformed.
    pub fn register(&mut self, id: &str) -> Option<Item> {
        let location = ResourceLocation::parse(id)?;
        let item = Item::new(location.clone());
        self.items.insert(location, item.clone());
        Some(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemRegistry for ItemTable {
    fn resolve(&self, id: &ResourceLocation) -> Option<Item> {
        self.items.get(id).cloned()
    }
}
