//! # shardgraph — a sharded graph storage-and-query engine
//!
//! Typed nodes and directed typed relationships, persisted on a pluggable
//! blob backend (local filesystem or S3-style object storage), with an
//! in-process LRU cache, secondary indexes, permission-checked access, and
//! optimistic concurrency control.
//!
//! ## Design principles
//!
//! 1. **Trait-first**: `BlobBackend` is the only contract between the
//!    engine and physical storage.
//! 2. **Clean DTOs**: `Node`, `Relationship`, `Value`, `PropertyMap` cross
//!    every boundary.
//! 3. **Sharding is pure**: identity in, path out, no side effects.
//! 4. **Backend-agnostic query planner**: index selection doesn't know
//!    which concrete `BlobBackend` it's sitting on.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use shardgraph::{AuthContext, GraphConfig, GraphEngine, MemoryBlobBackend, Node, Value};
//!
//! # async fn example() -> shardgraph::Result<()> {
//! let engine = GraphEngine::new(MemoryBlobBackend::new(), GraphConfig::default());
//!
//! let node = Node::new("", "user").with_property("name", Value::from("Ada"));
//! let created = engine.create_node(node).await?;
//!
//! let fetched = engine.get_node(&created.id, &AuthContext::admin()).await?;
//! assert!(fetched.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage backends
//!
//! | Backend | Type | Description |
//! |---------|------|-------------|
//! | Memory | `MemoryBlobBackend` | In-memory, for tests and embedding |
//! | Local filesystem | `LocalFsBackend` | `object_store` local adapter |
//! | Object storage | `S3Backend` (feature `s3`) | `object_store` S3 adapter |

// ============================================================================
// Modules
// ============================================================================

pub mod backend;
pub mod cache;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod permission;
pub mod query;
pub mod shard;
pub mod traversal;
pub mod validate;

// ============================================================================
// Re-exports: the public surface
// ============================================================================

pub use backend::{BlobBackend, LocalFsBackend, MemoryBlobBackend};
#[cfg(feature = "s3")]
pub use backend::S3Backend;

pub use config::{CompoundIndexSpec, DateFormat, GraphConfig, IndexSpec, ShardStrategy};

pub use engine::GraphEngine;

pub use error::{Error, ErrorKind, Result};

pub use model::{AuthContext, Direction, Node, PropertyMap, Relationship, Value};

pub use query::{execute as execute_query, Filter, Operator, Pagination, QueryOutput, QuerySpec, SortDirection, SortKey};

pub use traversal::query_related_nodes;
