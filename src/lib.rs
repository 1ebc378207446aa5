//! Hemmer provider for Mayan EDMS
//!
//! Manages the configuration objects of a [Mayan EDMS](https://www.mayan-edms.com)
//! server (document types, sources, tags, indexes, users' groups and roles,
//! workflows, metadata types) through its v4 REST API, speaking the Hemmer
//! provider protocol over gRPC.
//!
//! # Layout
//!
//! - [`client`]: the REST client and one API trait per entity
//! - [`resources`]: one handler per resource and data source type
//! - [`provider`]: [`MayanEdmsProvider`], routing host calls to the handlers
//! - [`server`]: the gRPC service, handshake and signal handling
//! - [`plan`] and [`validation`]: schema-driven planning and config checks
//! - [`testing`]: a harness and an in-memory Mayan server for tests
//!
//! # Handshake Protocol
//!
//! Once listening, the binary prints a single line to stdout:
//!
//! ```text
//! HEMMER_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `HEMMER_PROVIDER|<protocol_version>|<address>`. Logs go to stderr.
//!
//! # Resources
//!
//! | Type | Identifier |
//! |------|------------|
//! | `mayanedms_document_type` | numeric id |
//! | `mayanedms_webform_source` | numeric id |
//! | `mayanedms_watchfolder_source` | numeric id |
//! | `mayanedms_stagingfolder_source` | numeric id |
//! | `mayanedms_tag` | numeric id |
//! | `mayanedms_index_template` | numeric id |
//! | `mayanedms_index_template_node` | `<index>-<node>` |
//! | `mayanedms_group` | numeric id |
//! | `mayanedms_role` | numeric id |
//! | `mayanedms_workflow_template` | numeric id |
//! | `mayanedms_workflow_template_state` | `<workflow>-<state>` |
//! | `mayanedms_workflow_template_transition` | `<workflow>-<transition>` |
//! | `mayanedms_metadata_type` | numeric id |
//!
//! Data sources: `mayanedms_document_type` (by label) and
//! `mayanedms_metadata_type` (by name).

#![warn(clippy::all)]

pub mod client;
pub mod composite_id;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod reconcile;
pub mod resources;
pub mod schema;
pub mod server;
pub mod state;
pub mod testing;
pub mod types;
pub mod validation;

/// Types generated from `proto/provider.proto`.
#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated {
    tonic::include_proto!("hemmer.provider.v1");
}

pub use client::{ClientConfig, ClientError, HttpClient, MayanClient};
pub use composite_id::CompositeId;
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::MayanEdmsProvider;
pub use schema::ProviderSchema;
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, ProviderService, ServeOptions,
};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
    HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use validation::{is_valid, validate, validate_result};
