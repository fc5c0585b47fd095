//! API endpoint implementations.

mod completion;
mod datasources;
mod knowledge_bases;
mod minds;

pub use completion::{model_base_url, CompletionApi, CompletionStream, DEFAULT_MODEL_HOST};
pub use datasources::DatasourcesApi;
pub use knowledge_bases::{KnowledgeBase, KnowledgeBasesApi};
pub use minds::{Mind, MindConfig, MindUpdate, MindsApi};
