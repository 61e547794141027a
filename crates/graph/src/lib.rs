pub mod entity;
pub mod error;
pub mod executor;
pub mod flatten;
pub mod resolver;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use entity::EntityKind;
pub use error::{Error, Result};
pub use executor::{GraphQlClient, QueryExecutor, StructuredQuery, OPEN_TARGETS_ENDPOINT};
pub use flatten::{flatten, truncate};
pub use resolver::EntityResolver;
pub use value::{NestedValue, Scalar};
