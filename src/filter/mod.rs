mod builder;
mod node;

pub use builder::{CriteriaFilter, FilterMap, NamedQueryFilter};
pub use node::FilterNode;
