//! Pipeline assembly and lifecycle.
//!
//! ```text
//! ConfigDocument ──► PipelineAssembler ──► Pipeline ──► LifecycleBinder ──► BoundPipeline
//!                          │                                                   │
//!                   ComponentRegistry                               shutdown() / Drop
//!                                                                   install_global()
//! ```
//!
//! The [`PipelineAssembler`] turns a document into a tracer provider with its
//! processors attached in declaration order. The [`LifecycleBinder`] wraps the
//! result so that it is flushed and shut down exactly once, within a bounded
//! wait. Nothing here touches process-wide state unless the caller asks for it
//! through [`BoundPipeline::install_global`].

mod assembler;
mod lifecycle;

pub use assembler::{Pipeline, PipelineAssembler, ProcessorSummary};
pub use lifecycle::{BoundPipeline, LifecycleBinder, ShutdownHandle};
