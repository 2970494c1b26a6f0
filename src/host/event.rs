//! Host gameplay events forwarded to scripts.

use std::cell::Cell;

use crate::script::bridge::{HostObject, HostValue};

use super::item::ResourceLocation;

pub const BLOCK_BREAK: &str = "block_break";
pub const PLAYER_JOIN: &str = "player_join";

/// A player broke a block. Scripts may cancel it.
#[derive(Debug)]
pub struct BlockBreakEvent {
    pub player: String,
    pub block: ResourceLocation,
    pub pos: (i32, i32, i32),
    canceled: Cell<bool>,
}

impl BlockBreakEvent {
    pub fn new(player: &str, block: ResourceLocation, pos: (i32, i32, i32)) -> Self {
        Self {
            player: player.to_string(),
            block,
            pos,
            canceled: Cell::new(false),
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.get()
    }
}

impl HostObject for BlockBreakEvent {
    fn type_name(&self) -> &'static str {
        "BlockBreakEvent"
    }

    fn field(&self, name: &str) -> Option<HostValue> {
        match name {
            "player" => Some(HostValue::from(self.player.as_str())),
            "block" => Some(HostValue::from(self.block.to_string())),
            "x" => Some(HostValue::from(self.pos.0)),
            "y" => Some(HostValue::from(self.pos.1)),
            "z" => Some(HostValue::from(self.pos.2)),
            "canceled" => Some(HostValue::from(self.canceled.get())),
            _ => None,
        }
    }

    fn has_method(&self, name: &str) -> bool {
        name == "cancel"
    }

    fn call_method(&self, name: &str, _args: Vec<HostValue>) -> Result<HostValue, String> {
        match name {
            "cancel" => {
                self.canceled.set(true);
                Ok(HostValue::Nil)
            }
            _ => Err(format!("BlockBreakEvent has no method '{name}'")),
        }
    }
}

/// A player logged in.
#[derive(Debug, Clone)]
pub struct PlayerJoinEvent {
    pub player: String,
    pub first_join: bool,
}

impl PlayerJoinEvent {
    pub fn new(player: &str, first_join: bool) -> Self {
        Self {
            player: player.to_string(),
            first_join,
        }
    }
}

impl HostObject for PlayerJoinEvent {
    fn type_name(&self) -> &'static str {
        "PlayerJoinEvent"
    }

    fn field(&self, name: &str) -> Option<HostValue> {
        match name {
            "player" => Some(HostValue::from(self.player.as_str())),
            "first_join" => Some(HostValue::from(self.first_join)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_break_fields() {
        let event = BlockBreakEvent::new(
            "Steve",
            ResourceLocation::parse("minecraft:stone").unwrap(),
            (1, 64, -3),
        );
        assert_eq!(event.field("player"), Some(HostValue::from("Steve")));
        assert_eq!(event.field("block"), Some(HostValue::from("minecraft:stone")));
        assert_eq!(event.field("z"), Some(HostValue::Integer(-3)));
        assert_eq!(event.field("nothing"), None);
    }

    #[test]
    fn test_block_break_cancel() {
        let event = BlockBreakEvent::new(
            "Steve",
            ResourceLocation::parse("minecraft:stone").unwrap(),
            (0, 0, 0),
        );
        assert!(!event.is_canceled());
        event.call_method("cancel", vec![]).unwrap();
        assert!(event.is_canceled());
        assert_eq!(event.field("canceled"), Some(HostValue::Bool(true)));
    }
}
