use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Category of a named biomedical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Disease,
    Drug,
    Gene,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Disease, EntityKind::Drug, EntityKind::Gene];

    /// Collection searched by the `search` root field
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Disease => "diseases",
            EntityKind::Drug => "knownDrugs",
            EntityKind::Gene => "genes",
        }
    }

    /// GraphQL result type the search hit is narrowed to
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Disease => "Disease",
            EntityKind::Drug => "Drug",
            EntityKind::Gene => "Target",
        }
    }

    /// Name of the identifier scheme downstream queries expect
    pub fn id_label(&self) -> &'static str {
        match self {
            EntityKind::Disease => "efoId",
            EntityKind::Drug => "chemblId",
            EntityKind::Gene => "ensemblId",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Disease => write!(f, "Disease"),
            EntityKind::Drug => write!(f, "Drug"),
            EntityKind::Gene => write!(f, "Gene"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_ascii_lowercase().as_str() {
            "disease" => Ok(EntityKind::Disease),
            "drug" => Ok(EntityKind::Drug),
            "gene" | "target" => Ok(EntityKind::Gene),
            _ => Err(Error::invalid_argument(format!(
                "entity kind must be one of Disease, Drug, Gene; got '{label}'"
            ))),
        }
    }
}
