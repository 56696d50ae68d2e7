//! Kernel module - infrastructure behind the domain activities.

pub mod ai;
pub mod deps;
pub mod memory_repository;
pub mod page_fetcher;
pub mod pg_repository;
pub mod run_registry;
pub mod test_dependencies;
pub mod traits;
pub mod work_queue;

pub use ai::OpenAICompletionProvider;
pub use deps::ServerDeps;
pub use memory_repository::MemoryUrlRepository;
pub use page_fetcher::HttpPageFetcher;
pub use pg_repository::PgUrlRepository;
pub use run_registry::{RunGuard, RunRegistry};
pub use test_dependencies::{MockCompletionProvider, MockPageFetcher, TestDependencies};
pub use traits::*;
pub use work_queue::{QueueReport, WorkQueue};
