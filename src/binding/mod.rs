//! Key and button bindings
//!
//! A binding pairs a trigger (key code or pointer button) and an exact
//! modifier set with the action to run. The shell registers its own bindings
//! once at construction; grabs and UI clients add short-lived or dynamic ones.

use bitflags::bitflags;
use log::debug;
use serde::Serialize;
use std::fmt;

use crate::compositor::{PointerButton, SeatId};

bitflags! {
    /// Keyboard modifier mask. The empty set means "no modifier".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const CTRL = 1 << 0;
        const ALT = 1 << 1;
        const SUPER = 1 << 2;
        const SHIFT = 1 << 3;
    }
}

impl Modifiers {
    /// Parse a "Super+Ctrl" style chord. Unknown names yield `None`.
    pub fn parse(chord: &str) -> Option<Self> {
        let mut modifiers = Modifiers::empty();
        for part in chord.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" => Modifiers::ALT,
                "super" | "logo" | "mod4" => Modifiers::SUPER,
                "shift" => Modifiers::SHIFT,
                _ => return None,
            };
        }
        Some(modifiers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BindingId(pub u32);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Key(u32),
    Button(PointerButton),
}

/// What a binding does when triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAction {
    /// Activate the surface under the pointer, raising it unless disabled
    FocusUnderPointer,
    /// Raise the pointer focus to the top of its layer, or lower it if it
    /// already is
    ToggleRaise,
    /// Start an interactive move of the pointer focus
    MoveFocused,
    /// Start a kill grab
    Kill,
    /// End whatever grab the given seat is running
    AbortGrab(SeatId),
    /// Forward to the UI client that registered the binding
    Notify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub id: BindingId,
    pub trigger: Trigger,
    pub modifiers: Modifiers,
    pub action: BindingAction,
}

#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
    next_id: u32,
}

impl BindingTable {
    pub fn add(
        &mut self,
        trigger: Trigger,
        modifiers: Modifiers,
        action: BindingAction,
    ) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;
        debug!(
            "Registered {} {:?} {:?} -> {:?}",
            id, trigger, modifiers, action
        );
        self.bindings.push(Binding {
            id,
            trigger,
            modifiers,
            action,
        });
        id
    }

    pub fn remove(&mut self, id: BindingId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.id != id);
        before != self.bindings.len()
    }

    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings whose trigger and modifier set match exactly, in
    /// registration order.
    pub fn matching(&self, trigger: Trigger, modifiers: Modifiers) -> Vec<(BindingId, BindingAction)> {
        self.bindings
            .iter()
            .filter(|b| b.trigger == trigger && b.modifiers == modifiers)
            .map(|b| (b.id, b.action))
            .collect()
    }
}

#[cfg(test)]
mod tests;
