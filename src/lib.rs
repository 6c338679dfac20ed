//! graphql client with secondary rate limit retries
//!
//! this crate runs graphql queries and mutations against a single http
//! endpoint. response types describe their selection through [`Operation`];
//! the client builds the document, posts it, waits out `403` +
//! `Retry-After` rate limits, and binds `data` back into the caller's value.
//!
//! ## quick start
//!
//! ```no_run
//! use gqlclient::{Client, ClientConfig, Field, Operation, SelectionSet, Variables};
//! use serde::Deserialize;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct ViewerQuery {
//!     viewer: Viewer,
//! }
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Viewer {
//!     login: String,
//! }
//!
//! impl Operation for ViewerQuery {
//!     fn selection() -> SelectionSet {
//!         SelectionSet::new([Field::object("viewer", "User", [Field::scalar("login", "String")])])
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("https://api.github.com/graphql"))?;
//! let mut query = ViewerQuery::default();
//! client
//!     .query(&CancellationToken::new(), &mut query, &Variables::new())
//!     .await?;
//! println!("{}", query.viewer.login);
//! # Ok(())
//! # }
//! ```

mod bind;
mod client;
mod config;
mod error;
mod graphql;
mod operation;
mod query;
mod retry;
mod selection;

pub use bind::bind;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use graphql::{
    decode_envelope, GraphQlError, GraphQlErrors, GraphQlLocation, GraphQlResponse, WireRequest,
};
pub use operation::{Operation, OperationKind, Variables};
pub use query::{build_mutation, build_query};
pub use retry::RetryPolicy;
pub use selection::{Field, SelectionSet, TypeRef};
