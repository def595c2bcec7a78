//! Per-frame input intents supplied by the input provider.

use dungeon_crawler_core::{Direction, Purchase};
use glam::Vec2;

/// Movement keys held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MovementKeys {
    /// Moves toward smaller y.
    pub up: bool,
    /// Moves toward larger y.
    pub down: bool,
    /// Moves toward smaller x.
    pub left: bool,
    /// Moves toward larger x.
    pub right: bool,
}

impl MovementKeys {
    /// Sums the held keys into a movement vector. Opposite keys cancel out.
    #[must_use]
    pub fn intent(&self) -> Vec2 {
        let axis = |negative: bool, positive: bool| {
            f32::from(u8::from(positive)) - f32::from(u8::from(negative))
        };
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Discrete action pressed during a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Swing the melee hitbox.
    Melee,
    /// Fire a bolt.
    Ranged,
    /// Cast a fireball.
    Fireball,
    /// Teleport along the aim.
    Teleport,
    /// Teleport and strike nearby enemies.
    TeleportAttack,
    /// Start aiming a lightning strike.
    LightningStart,
    /// Step the lightning reticle.
    LightningMove(Direction),
    /// Confirm the lightning strike.
    Confirm,
    /// Open or close the inventory.
    InventoryToggle,
    /// Switch fullscreen; handled by the window collaborator.
    FullscreenToggle,
    /// Spend ability points from the inventory.
    Purchase(Purchase),
}

/// Everything the player asked for during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputIntents {
    /// Held movement keys.
    pub movement: MovementKeys,
    /// Actions pressed this frame, in press order.
    pub actions: Vec<InputAction>,
}

impl InputIntents {
    /// Frame input holding only the provided movement keys.
    #[must_use]
    pub fn moving(movement: MovementKeys) -> Self {
        Self {
            movement,
            actions: Vec::new(),
        }
    }

    /// Appends an action pressed after the existing ones.
    #[must_use]
    pub fn with_action(mut self, action: InputAction) -> Self {
        self.actions.push(action);
        self
    }
}
