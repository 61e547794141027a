use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::tools::{Tool, ToolRegistry};
use graph::{
    flatten, truncate, EntityKind, EntityResolver, Error, NestedValue, QueryExecutor, Result,
    StructuredQuery,
};

/// Looks up the canonical identifier of one entity kind.
pub struct ResolveIdTool {
    resolver: EntityResolver,
    kind: EntityKind,
    name: String,
    description: String,
}

impl ResolveIdTool {
    pub fn new(resolver: EntityResolver, kind: EntityKind) -> Self {
        let (tool_name, plural) = match kind {
            EntityKind::Disease => ("get-disease-id", "diseases"),
            EntityKind::Drug => ("get-drug-id", "drugs"),
            EntityKind::Gene => ("get-gene-id", "genes"),
        };
        let id = kind.id_label();

        Self {
            resolver,
            kind,
            name: tool_name.to_string(),
            description: format!(
                "Useful for when you need to get the {id} of user-submitted {plural}. \
                 This {id} is required for subsequent GraphQL queries to OpenTargets."
            ),
        }
    }
}

#[async_trait]
impl Tool for ResolveIdTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": format!("Name of the {} as written by the user", self.kind.to_string().to_lowercase())
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let name = required_str(&args, "name")?;
        let id = self.resolver.resolve(name, self.kind).await?;
        Ok(Value::String(id))
    }
}

/// Submits an ad-hoc GraphQL query and returns the raw `data` container.
pub struct GraphQlTool {
    executor: Arc<dyn QueryExecutor>,
}

impl GraphQlTool {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tool for GraphQlTool {
    fn name(&self) -> &str {
        "graphql"
    }

    fn description(&self) -> &str {
        "Submit a GraphQL query to the Open Targets Platform endpoint and return the JSON response data. \
         The input must be a complete, valid GraphQL query."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "GraphQL query text"}
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = StructuredQuery::new(required_str(&args, "query")?);
        let data = self.executor.execute(&query).await?;
        Ok(data.into())
    }
}

pub struct FlattenTool;

#[async_trait]
impl Tool for FlattenTool {
    fn name(&self) -> &str {
        "flatten"
    }

    fn description(&self) -> &str {
        "Flatten nested JSON objects and arrays of arbitrary depth into a single list of values. \
         Works well for flattening GraphQL outputs."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "value": {"description": "Nested JSON value to flatten"}
            },
            "required": ["value"]
        })
    }

    async fn execute(&self, mut args: Value) -> Result<Value> {
        let value = NestedValue::from(args["value"].take());
        let leaves: Vec<Value> = flatten(&value).into_iter().map(Value::from).collect();
        Ok(Value::Array(leaves))
    }
}

pub struct SubsetListTool;

#[async_trait]
impl Tool for SubsetListTool {
    fn name(&self) -> &str {
        "subset-list"
    }

    fn description(&self) -> &str {
        "Return the first n elements of the input list. The first argument is the list, \
         and the second argument is the number of elements to return."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "items": {"type": "array", "description": "List to subset"},
                "n": {"type": "integer", "description": "Number of leading elements to keep"}
            },
            "required": ["items", "n"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let items = args["items"]
            .as_array()
            .ok_or_else(|| Error::invalid_argument("'items' must be an array"))?;
        let n = args["n"]
            .as_i64()
            .unwrap_or_else(|| if args["n"].is_u64() { i64::MAX } else { 0 });
        Ok(Value::Array(truncate(items, n)))
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_argument(format!("'{key}' must be a string")))
}

/// Registry with the resolver, query, flatten and subset tools.
pub fn default_registry(executor: Arc<dyn QueryExecutor>) -> ToolRegistry {
    let resolver = EntityResolver::new(executor.clone());
    let mut registry = ToolRegistry::new();

    for kind in EntityKind::ALL {
        registry.register(Arc::new(ResolveIdTool::new(resolver.clone(), kind)));
    }
    registry.register(Arc::new(GraphQlTool::new(executor)));
    registry.register(Arc::new(FlattenTool));
    registry.register(Arc::new(SubsetListTool));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingExecutor;

    #[test]
    fn test_default_registry_names() {
        let registry = default_registry(RecordingExecutor::returning(json!({})));
        assert_eq!(
            registry.names(),
            &["get-disease-id", "get-drug-id", "get-gene-id", "graphql", "flatten", "subset-list"]
                .map(String::from)
        );
        assert!(registry.specs()[0].description.contains("efoId"));
        assert!(registry.specs()[2].description.contains("ensemblId"));
    }

    #[tokio::test]
    async fn test_resolve_tool_returns_id() {
        let executor = RecordingExecutor::returning(json!({
            "search": {"hits": [{"object": {"id": "CHEMBL98"}}]}
        }));
        let registry = default_registry(executor.clone());

        let out = registry
            .invoke("get-drug-id", json!({"name": "vorinostat"}))
            .await
            .unwrap();

        assert_eq!(out, json!("CHEMBL98"));
        assert!(executor.queries()[0].contains("... on Drug"));
    }

    #[tokio::test]
    async fn test_graphql_tool_submits_verbatim() {
        let executor = RecordingExecutor::returning(json!({"meta": {"name": "Open Targets"}}));
        let registry = default_registry(executor.clone());
        let query = "query meta { meta { name } }";

        let out = registry.invoke("graphql", json!({"query": query})).await.unwrap();

        assert_eq!(out, json!({"meta": {"name": "Open Targets"}}));
        assert_eq!(executor.queries(), vec![query.to_string()]);
    }

    #[tokio::test]
    async fn test_flatten_tool() {
        let out = FlattenTool
            .execute(json!({"value": {"rows": [{"drug": {"name": "A"}}, {"drug": {"name": "B"}}], "count": 2}}))
            .await
            .unwrap();
        assert_eq!(out, json!(["A", "B", 2]));
    }

    #[tokio::test]
    async fn test_subset_list_tool() {
        let registry = default_registry(RecordingExecutor::returning(json!({})));

        let out = registry
            .invoke("subset-list", json!({"items": ["a", "b", "c"], "n": 2}))
            .await
            .unwrap();
        assert_eq!(out, json!(["a", "b"]));

        let out = registry
            .invoke("subset-list", json!({"items": ["a"], "n": -1}))
            .await
            .unwrap();
        assert_eq!(out, json!([]));
    }
}
