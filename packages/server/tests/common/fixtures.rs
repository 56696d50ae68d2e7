//! Test fixtures: canned pages and pipelines over in-memory storage.

use redirect_core::domains::batches::{Batch, CreateBatchInput};
use redirect_core::kernel::TestDependencies;
use redirect_core::{PipelineConfig, RedirectPipeline};

/// A small page with a title, an H1 and one paragraph of body text
pub fn page_html(title: &str, h1: &str, body: &str) -> String {
    format!(
        r#"<html>
<head>
  <title>{title}</title>
  <meta name="description" content="About {title}">
</head>
<body>
  <h1>{h1}</h1>
  <p>{body}</p>
</body>
</html>"#
    )
}

/// Pipeline over the in-memory repository and mocks of `test_deps`
pub fn memory_pipeline(test_deps: &TestDependencies) -> RedirectPipeline {
    memory_pipeline_with(test_deps, PipelineConfig::default())
}

pub fn memory_pipeline_with(
    test_deps: &TestDependencies,
    config: PipelineConfig,
) -> RedirectPipeline {
    RedirectPipeline::new(test_deps.deps(), config)
}

/// Create a batch through the same validation as the HTTP route
pub async fn create_batch(
    pipeline: &RedirectPipeline,
    name: &str,
    old_urls: &[&str],
    new_urls: &[&str],
) -> Batch {
    let input = CreateBatchInput {
        batch_name: Some(name.to_string()),
        old_urls: Some(old_urls.iter().map(|u| u.to_string()).collect()),
        new_urls: Some(new_urls.iter().map(|u| u.to_string()).collect()),
    };
    let batch = input.validate().expect("fixture batch should be valid");
    pipeline
        .create_batch(batch)
        .await
        .expect("Failed to create batch")
}
