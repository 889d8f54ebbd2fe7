pub mod block;
pub mod document;
pub mod job;
pub mod query;
pub mod summary;

pub use block::{Block, BlockType, QueryInfo, Relationship, RelationshipType};
pub use document::DocumentRef;
pub use job::{AnalysisSnapshot, JobId, JobMap, JobStatus};
pub use query::{default_queries, QueryDefinition};
pub use summary::QueryResultRecord;
