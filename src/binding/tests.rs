use super::*;
use crate::compositor::seat::codes::KEY_ESC;

#[test]
fn test_modifier_chord_parsing() {
    assert_eq!(Modifiers::parse(""), Some(Modifiers::empty()));
    assert_eq!(
        Modifiers::parse("Super+Ctrl"),
        Some(Modifiers::SUPER | Modifiers::CTRL)
    );
    assert_eq!(Modifiers::parse(" shift + alt "), Some(Modifiers::SHIFT | Modifiers::ALT));
    assert_eq!(Modifiers::parse("Super+Hyper"), None);
}

#[test]
fn test_matching_requires_exact_modifiers() {
    let mut table = BindingTable::default();
    let kill = table.add(
        Trigger::Key(KEY_ESC),
        Modifiers::SUPER | Modifiers::CTRL,
        BindingAction::Kill,
    );

    assert!(table
        .matching(Trigger::Key(KEY_ESC), Modifiers::empty())
        .is_empty());
    assert!(table
        .matching(Trigger::Key(KEY_ESC), Modifiers::SUPER)
        .is_empty());
    assert_eq!(
        table.matching(Trigger::Key(KEY_ESC), Modifiers::SUPER | Modifiers::CTRL),
        vec![(kill, BindingAction::Kill)]
    );
}

#[test]
fn test_same_trigger_different_modifiers_are_distinct() {
    let mut table = BindingTable::default();
    let focus = table.add(
        Trigger::Button(PointerButton::Left),
        Modifiers::empty(),
        BindingAction::FocusUnderPointer,
    );
    let mv = table.add(
        Trigger::Button(PointerButton::Left),
        Modifiers::SUPER,
        BindingAction::MoveFocused,
    );

    assert_eq!(
        table.matching(Trigger::Button(PointerButton::Left), Modifiers::empty()),
        vec![(focus, BindingAction::FocusUnderPointer)]
    );
    assert_eq!(
        table.matching(Trigger::Button(PointerButton::Left), Modifiers::SUPER),
        vec![(mv, BindingAction::MoveFocused)]
    );
}

#[test]
fn test_remove_binding() {
    let mut table = BindingTable::default();
    let abort = table.add(
        Trigger::Key(KEY_ESC),
        Modifiers::empty(),
        BindingAction::AbortGrab(SeatId(0)),
    );
    assert_eq!(table.len(), 1);
    assert!(table.remove(abort));
    assert!(!table.remove(abort));
    assert!(table.is_empty());
    assert!(table.get(abort).is_none());
}
