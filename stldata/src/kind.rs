use serde::{Deserialize, Serialize};
use std::fmt;

/// The six selectable property kinds.
///
/// Declaration order is the stable sort order of a property set (kind first,
/// then identifier) and therefore part of seeded reproducibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Authority,
    Civics,
    Ethics,
    Origin,
    Species,
    Trait,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 6] = [
        PropertyKind::Authority,
        PropertyKind::Civics,
        PropertyKind::Ethics,
        PropertyKind::Origin,
        PropertyKind::Species,
        PropertyKind::Trait,
    ];

    /// The key naming this kind inside `potential`/`possible` blocks.
    pub fn script_key(self) -> &'static str {
        match self {
            PropertyKind::Authority => "authority",
            PropertyKind::Civics => "civics",
            PropertyKind::Ethics => "ethics",
            PropertyKind::Origin => "origin",
            PropertyKind::Species => "species",
            PropertyKind::Trait => "trait",
        }
    }

    pub fn from_script_key(key: &str) -> Option<PropertyKind> {
        PropertyKind::ALL
            .into_iter()
            .find(|kind| kind.script_key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Authority => "Authority",
            PropertyKind::Civics => "Civics",
            PropertyKind::Ethics => "Ethics",
            PropertyKind::Origin => "Origin",
            PropertyKind::Species => "Species",
            PropertyKind::Trait => "Trait",
        };
        f.write_str(name)
    }
}
