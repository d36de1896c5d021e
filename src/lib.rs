pub mod builder;
pub mod error;
pub mod node;
pub mod resolver;
pub mod source;
pub mod storage;
pub mod value;

pub use builder::TreeBuilder;
pub use error::RickError;
pub use node::Node;
pub use resolver::{PlaceholderHandler, ResolverRegistry};
pub use source::Source;
pub use value::{Mapping, Value};
