mod blank_node;
mod entity_id;
mod node;
mod quad;

pub use blank_node::BlankNode;
pub use entity_id::{BlankId, EntityId};
pub use node::Node;
pub use quad::{Quad, SubjectPredicate};
