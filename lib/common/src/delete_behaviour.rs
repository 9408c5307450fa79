use std::fmt::{Display, Formatter};
use std::ops::{BitOr, BitOrAssign};

/// Controls what else is removed when an entity is deleted.
///
/// Blank nodes that are no longer referenced after a deletion are always collected, regardless
/// of the behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeleteBehaviour(u8);

impl DeleteBehaviour {
    /// Only removes the quads of the entity and collects orphaned blank nodes.
    pub const NONE: Self = Self(0);
    /// Also deletes blank children of the entity that are still referenced elsewhere.
    pub const DELETE_CHILDREN: Self = Self(1);
    /// Also removes every quad that references the deleted entity as object.
    pub const NULLIFY_CHILDREN: Self = Self(1 << 1);

    /// Whether all flags of `other` are set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for DeleteBehaviour {
    fn default() -> Self {
        Self::NULLIFY_CHILDREN
    }
}

impl BitOr for DeleteBehaviour {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DeleteBehaviour {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Display for DeleteBehaviour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut flags = Vec::new();
        if self.contains(Self::DELETE_CHILDREN) {
            flags.push("DeleteChildren");
        }
        if self.contains(Self::NULLIFY_CHILDREN) {
            flags.push("NullifyChildren");
        }

        if flags.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&flags.join(" | "))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::DeleteBehaviour;

    #[test]
    fn combined_flags_contain_both() {
        let behaviour = DeleteBehaviour::DELETE_CHILDREN | DeleteBehaviour::NULLIFY_CHILDREN;
        assert!(behaviour.contains(DeleteBehaviour::DELETE_CHILDREN));
        assert!(behaviour.contains(DeleteBehaviour::NULLIFY_CHILDREN));
        assert_eq!(behaviour.to_string(), "DeleteChildren | NullifyChildren");
    }

    #[test]
    fn default_nullifies_children() {
        let behaviour = DeleteBehaviour::default();
        assert!(behaviour.contains(DeleteBehaviour::NULLIFY_CHILDREN));
        assert!(!behaviour.contains(DeleteBehaviour::DELETE_CHILDREN));
    }

    #[test]
    fn none_is_empty() {
        assert!(DeleteBehaviour::NONE.is_empty());
        assert_eq!(DeleteBehaviour::NONE.to_string(), "None");
    }
}
