//! Role slot management.
//!
//! Maps live connections to the two playable roles. Connections without
//! an entry are observers.

use std::collections::HashMap;
use tictactoe_core::Role;
use uuid::Uuid;

/// Identifier of a single WebSocket connection
pub type ConnectionId = Uuid;

/// Connection to role bindings, at most one per role.
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    slots: HashMap<ConnectionId, Role>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Both roles are taken
    pub fn is_full(&self) -> bool {
        self.slots.len() >= Role::ALL.len()
    }

    /// Give a new connection a role, first come first served.
    ///
    /// Returns `None` when both roles are held; the connection stays an
    /// observer and is never promoted later. A role freed by `release`
    /// goes to the next new connection only.
    pub fn assign(&mut self, connection: ConnectionId) -> Option<Role> {
        if let Some(&role) = self.slots.get(&connection) {
            return Some(role);
        }
        if self.is_full() {
            return None;
        }

        let role = Role::ALL
            .into_iter()
            .find(|role| !self.slots.values().any(|held| held == role))?;
        self.slots.insert(connection, role);
        Some(role)
    }

    pub fn role_of(&self, connection: ConnectionId) -> Option<Role> {
        self.slots.get(&connection).copied()
    }

    /// Free the connection's role, if it has one. Returns the freed role.
    pub fn release(&mut self, connection: ConnectionId) -> Option<Role> {
        self.slots.remove(&connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_in_arrival_order() {
        let mut slots = SlotTable::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let third = Uuid::new_v4();

        assert_eq!(slots.assign(first), Some(Role::First));
        assert_eq!(slots.assign(second), Some(Role::Second));
        assert!(slots.is_full());

        // Third connection is an observer
        assert_eq!(slots.assign(third), None);
        assert_eq!(slots.role_of(third), None);
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_assign_is_stable_for_known_connection() {
        let mut slots = SlotTable::new();
        let first = Uuid::new_v4();

        assert_eq!(slots.assign(first), Some(Role::First));
        assert_eq!(slots.assign(first), Some(Role::First));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut slots = SlotTable::new();
        let first = Uuid::new_v4();
        slots.assign(first);

        assert_eq!(slots.release(first), Some(Role::First));
        assert_eq!(slots.release(first), None);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_freed_slot_not_given_to_existing_observer() {
        let mut slots = SlotTable::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let observer = Uuid::new_v4();

        slots.assign(first);
        slots.assign(second);
        slots.assign(observer);

        slots.release(second);
        assert_eq!(slots.role_of(observer), None);

        // The next new connection takes it
        let newcomer = Uuid::new_v4();
        assert_eq!(slots.assign(newcomer), Some(Role::Second));
    }

    #[test]
    fn test_freed_first_slot_never_duplicates_second() {
        let mut slots = SlotTable::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        slots.assign(first);
        slots.assign(second);
        slots.release(first);

        let newcomer = Uuid::new_v4();
        assert_eq!(slots.assign(newcomer), Some(Role::First));
        assert_eq!(slots.role_of(second), Some(Role::Second));
    }
}
