//! Collaborator seams: the batch stage that produces items and the item stages that enrich them.
//!
//! Implement [BatchStage] / [ItemStage] directly, or wrap async closures with [batch_stage],
//! [item_stage], and their text-response variants [text_batch_stage], [text_item_stage],
//! which run the strict parse step from [crate::response] on the raw text.

use std::future::Future;

use async_trait::async_trait;

use crate::config::PipelineConfig;
use crate::error::StageError;
use crate::response;
use crate::types::{Attributes, Item};

/// Produces the initial item set of a run (scored candidates, discovered signals, ...).
#[async_trait]
pub trait BatchStage: Send + Sync {
  fn name(&self) -> &str;

  async fn produce(&self, config: &PipelineConfig) -> Result<Vec<Item>, StageError>;
}

/// Enriches one item with new attributes (a revenue estimate, a drafted message, ...).
#[async_trait]
pub trait ItemStage: Send + Sync {
  fn name(&self) -> &str;

  async fn enrich(&self, item: &Item) -> Result<Attributes, StageError>;
}

/// [BatchStage] backed by an async closure.
pub struct FnBatchStage<F> {
  name: String,
  f: F,
}

/// Wraps `f` as a batch stage named `name`.
pub fn batch_stage<F, Fut>(name: impl Into<String>, f: F) -> FnBatchStage<F>
where
  F: Fn(PipelineConfig) -> Fut + Send + Sync,
  Fut: Future<Output = Result<Vec<Item>, StageError>> + Send + 'static,
{
  FnBatchStage {
    name: name.into(),
    f,
  }
}

#[async_trait]
impl<F, Fut> BatchStage for FnBatchStage<F>
where
  F: Fn(PipelineConfig) -> Fut + Send + Sync,
  Fut: Future<Output = Result<Vec<Item>, StageError>> + Send + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  async fn produce(&self, config: &PipelineConfig) -> Result<Vec<Item>, StageError> {
    (self.f)(config.clone()).await
  }
}

/// [ItemStage] backed by an async closure.
pub struct FnItemStage<F> {
  name: String,
  f: F,
}

/// Wraps `f` as an item stage named `name`. The closure gets its own copy of the item.
pub fn item_stage<F, Fut>(name: impl Into<String>, f: F) -> FnItemStage<F>
where
  F: Fn(Item) -> Fut + Send + Sync,
  Fut: Future<Output = Result<Attributes, StageError>> + Send + 'static,
{
  FnItemStage {
    name: name.into(),
    f,
  }
}

#[async_trait]
impl<F, Fut> ItemStage for FnItemStage<F>
where
  F: Fn(Item) -> Fut + Send + Sync,
  Fut: Future<Output = Result<Attributes, StageError>> + Send + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  async fn enrich(&self, item: &Item) -> Result<Attributes, StageError> {
    (self.f)(item.clone()).await
  }
}

/// Batch stage whose collaborator answers in free text holding a JSON array.
pub struct TextBatchStage<F> {
  name: String,
  id_field: String,
  f: F,
}

/// Wraps a text-producing closure; each array entry becomes an item keyed by `id_field`.
pub fn text_batch_stage<F, Fut>(
  name: impl Into<String>,
  id_field: impl Into<String>,
  f: F,
) -> TextBatchStage<F>
where
  F: Fn(PipelineConfig) -> Fut + Send + Sync,
  Fut: Future<Output = Result<String, StageError>> + Send + 'static,
{
  TextBatchStage {
    name: name.into(),
    id_field: id_field.into(),
    f,
  }
}

#[async_trait]
impl<F, Fut> BatchStage for TextBatchStage<F>
where
  F: Fn(PipelineConfig) -> Fut + Send + Sync,
  Fut: Future<Output = Result<String, StageError>> + Send + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  async fn produce(&self, config: &PipelineConfig) -> Result<Vec<Item>, StageError> {
    let text = (self.f)(config.clone()).await?;
    response::parse_items(&text, &self.id_field)
  }
}

/// Item stage whose collaborator answers in free text holding a JSON object.
pub struct TextItemStage<F> {
  name: String,
  f: F,
}

/// Wraps a text-producing closure; the response must parse to a JSON object.
pub fn text_item_stage<F, Fut>(name: impl Into<String>, f: F) -> TextItemStage<F>
where
  F: Fn(Item) -> Fut + Send + Sync,
  Fut: Future<Output = Result<String, StageError>> + Send + 'static,
{
  TextItemStage {
    name: name.into(),
    f,
  }
}

#[async_trait]
impl<F, Fut> ItemStage for TextItemStage<F>
where
  F: Fn(Item) -> Fut + Send + Sync,
  Fut: Future<Output = Result<String, StageError>> + Send + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  async fn enrich(&self, item: &Item) -> Result<Attributes, StageError> {
    let text = (self.f)(item.clone()).await?;
    response::parse_attributes(&text)
  }
}
