use std::sync::Arc;
use tracing::{debug, info};

use crate::entity::EntityKind;
use crate::error::{Error, Result};
use crate::executor::{QueryExecutor, StructuredQuery};
use crate::flatten::flatten;

/// Maps free-text entity names to canonical identifiers through `search` lookups.
#[derive(Clone)]
pub struct EntityResolver {
    executor: Arc<dyn QueryExecutor>,
}

impl EntityResolver {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    pub async fn resolve(&self, name: &str, kind: EntityKind) -> Result<String> {
        debug!(kind = %kind, name, "Resolving entity identifier");

        let query = build_lookup_query(name, kind);
        let data = self.executor.execute(&query).await?;

        let id = flatten(&data)
            .into_iter()
            .find(|leaf| !leaf.is_null())
            .map(|leaf| leaf.to_string())
            .ok_or_else(|| Error::not_found(format!("no {kind} matching '{name}'")))?;

        info!(kind = %kind, name, id = %id, "Resolved entity identifier");
        Ok(id)
    }

    /// Resolve with an untyped kind label; unknown labels fail before any query is sent.
    pub async fn resolve_label(&self, name: &str, kind_label: &str) -> Result<String> {
        let kind: EntityKind = kind_label.parse()?;
        self.resolve(name, kind).await
    }
}

/// Template for the identifier lookup of `name` within the collection of `kind`.
pub fn build_lookup_query(name: &str, kind: EntityKind) -> StructuredQuery {
    StructuredQuery::new(format!(
        r#"query {label}Lookup {{
  search(queryString: {name}, entityNames: "{collection}") {{
    hits {{
      object {{
        ... on {type_name} {{
          id
        }}
      }}
    }}
  }}
}}"#,
        label = kind.id_label(),
        // JSON string literals are valid GraphQL string literals
        name = serde_json::Value::from(name),
        collection = kind.collection(),
        type_name = kind.type_name(),
    ))
}
