use std::fmt;

use quiz_core::ALL_GROUP;

/// Which questions a quiz run draws from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupSelection {
    /// Every loaded question.
    #[default]
    All,
    /// Only members of the named group.
    Named(String),
}

impl GroupSelection {
    /// Map a name as shown in the group picker back to a selection.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name == ALL_GROUP {
            Self::All
        } else {
            Self::Named(name.to_string())
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::All => ALL_GROUP,
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for GroupSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
