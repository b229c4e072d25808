//! Name and class lookup used to find message recipients
//!
//! Lookups are iterator style: pass the previous match back as `start` to get
//! the next one, `None` to restart from the beginning.
//!
//! Patterns compare case-insensitively and may end in `*` to match any name
//! with that prefix. A handful of procedural names resolve relative to the
//! message instead of by lookup:
//! - `!activator` - the entity that started the chain
//! - `!caller` - the entity that fired the output
//! - `!self` - same as `!caller`

use crate::identity::EntityId;
use std::collections::HashSet;

/// Lookup protocol implemented by whatever owns the entities
pub trait EntityResolver {
    /// Next live entity after `start` whose name matches `pattern`
    fn find_by_name(
        &self,
        pattern: &str,
        start: Option<EntityId>,
        activator: Option<EntityId>,
        caller: Option<EntityId>,
    ) -> Option<EntityId>;

    /// Next live entity after `start` whose class matches `pattern`
    fn find_by_class(&self, pattern: &str, start: Option<EntityId>) -> Option<EntityId>;

    /// Name of a live entity
    fn name_of(&self, id: EntityId) -> Option<&str>;

    /// Class name of a live entity
    fn class_of(&self, id: EntityId) -> Option<&str>;

    /// Whether `id` still refers to a live entity
    fn is_alive(&self, id: EntityId) -> bool {
        self.class_of(id).is_some()
    }
}

/// Compare a name against a pattern with an optional trailing `*`
pub fn names_match(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => {
            name.len() >= prefix.len()
                && name.is_char_boundary(prefix.len())
                && name[..prefix.len()].eq_ignore_ascii_case(prefix)
        }
        None => !name.is_empty() && name.eq_ignore_ascii_case(pattern),
    }
}

/// Resolve a procedural name
///
/// Returns `None` when `pattern` is not procedural, otherwise the single
/// match (only on the first call of an iteration, `start == None`).
pub fn procedural_target(
    pattern: &str,
    start: Option<EntityId>,
    activator: Option<EntityId>,
    caller: Option<EntityId>,
) -> Option<Option<EntityId>> {
    if !pattern.starts_with('!') {
        return None;
    }
    if start.is_some() {
        return Some(None);
    }
    let found = if pattern.eq_ignore_ascii_case("!activator") {
        activator
    } else if pattern.eq_ignore_ascii_case("!caller") || pattern.eq_ignore_ascii_case("!self") {
        caller
    } else {
        None
    };
    Some(found)
}

/// Every live entity whose name matches `pattern`, in lookup order
pub fn find_all_by_name<R: EntityResolver + ?Sized>(
    resolver: &R,
    pattern: &str,
    activator: Option<EntityId>,
    caller: Option<EntityId>,
) -> Vec<EntityId> {
    collect(|start| resolver.find_by_name(pattern, start, activator, caller))
        .into_iter()
        .filter(|id| resolver.is_alive(*id))
        .collect()
}

/// Every live entity whose class matches `pattern`, in lookup order
pub fn find_all_by_class<R: EntityResolver + ?Sized>(resolver: &R, pattern: &str) -> Vec<EntityId> {
    collect(|start| resolver.find_by_class(pattern, start))
}

fn collect(mut next: impl FnMut(Option<EntityId>) -> Option<EntityId>) -> Vec<EntityId> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    let mut start = None;
    while let Some(id) = next(start) {
        if !seen.insert(id) {
            break;
        }
        found.push(id);
        start = Some(id);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match() {
        assert!(names_match("door_a", "DOOR_A"));
        assert!(!names_match("door_a", "door_ab"));
        assert!(names_match("light_*", "light_1"));
        assert!(names_match("light_*", "light_"));
        assert!(!names_match("light_*", "lamp_1"));
        assert!(names_match("*", "anything"));
        assert!(!names_match("", ""));
    }

    #[test]
    fn test_procedural_target() {
        let activator = Some(EntityId::new(1, 0));
        let caller = Some(EntityId::new(2, 0));

        assert_eq!(procedural_target("door", None, activator, caller), None);
        assert_eq!(procedural_target("!activator", None, activator, caller), Some(activator));
        assert_eq!(procedural_target("!CALLER", None, activator, caller), Some(caller));
        assert_eq!(procedural_target("!self", None, activator, caller), Some(caller));
        assert_eq!(procedural_target("!self", caller, activator, caller), Some(None));
        assert_eq!(procedural_target("!player", None, activator, caller), Some(None));
    }
}
