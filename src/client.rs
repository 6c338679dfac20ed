//! main client
//!
//! entry points for queries and mutations, plus the dispatcher that runs one
//! operation end to end: build, encode, transmit with rate limit retries,
//! decode, bind.

use crate::bind::bind;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::graphql::{decode_envelope, GraphQlError, GraphQlErrors, GraphQlResponse, WireRequest};
use crate::operation::{Operation, OperationKind, Variables};
use crate::retry::{self, RetryPolicy, Step};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// longest response body kept in [`Error::HttpStatus`]
const BODY_SNIPPET_LIMIT: usize = 1024;

/// graphql client bound to a single endpoint
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    url: Url,
    http: reqwest::Client,
}

/// status, headers and body of one http exchange
#[derive(Debug)]
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: String,
}

impl Client {
    /// create a new client
    ///
    /// uses the prebuilt transport from the config when there is one,
    /// otherwise builds a default `reqwest::Client`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let url = config.validate()?.clone();
        let http = config.build_http_client()?;

        Ok(Self {
            config: Arc::new(config),
            url,
            http,
        })
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// graphql endpoint this client posts to
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// run a query built from `T`'s selection and bind the response into `target`
    ///
    /// allows one retry after a secondary rate limit, with no time budget.
    pub async fn query<T: Operation>(
        &self,
        ctx: &CancellationToken,
        target: &mut T,
        variables: &Variables,
    ) -> Result<()> {
        self.query_with_retry(ctx, target, variables, 0, 1).await
    }

    /// run a query with a tunable secondary rate limit budget
    ///
    /// up to `retry_count` retries are made while the server answers 403 with
    /// `Retry-After`; a non-zero `timeout_secs` bounds the whole call.
    pub async fn query_with_retry<T: Operation>(
        &self,
        ctx: &CancellationToken,
        target: &mut T,
        variables: &Variables,
        timeout_secs: u64,
        retry_count: u32,
    ) -> Result<()> {
        let policy = RetryPolicy::new(timeout_secs, retry_count);
        self.dispatch(ctx, OperationKind::Query, target, variables, policy)
            .await
    }

    /// run a mutation; mutations are sent exactly once
    pub async fn mutate<T: Operation>(
        &self,
        ctx: &CancellationToken,
        target: &mut T,
        variables: &Variables,
    ) -> Result<()> {
        self.dispatch(ctx, OperationKind::Mutation, target, variables, RetryPolicy::once())
            .await
    }

    /// send a hand-written document and return the raw `data`
    ///
    /// the document is parsed locally first; only variable values are taken
    /// from `variables`, their declared types are ignored.
    pub async fn execute_raw(
        &self,
        ctx: &CancellationToken,
        query: &str,
        variables: &Variables,
    ) -> Result<Option<serde_json::Value>> {
        self.execute_raw_with(ctx, query, variables, |url, body| self.send(url, body))
            .await
    }

    async fn dispatch<T: Operation>(
        &self,
        ctx: &CancellationToken,
        kind: OperationKind,
        target: &mut T,
        variables: &Variables,
        policy: RetryPolicy,
    ) -> Result<()> {
        self.dispatch_with(ctx, kind, target, variables, policy, |url, body| {
            self.send(url, body)
        })
        .await
    }

    async fn send(&self, url: Url, body: Vec<u8>) -> Result<Reply> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = if status == StatusCode::OK {
            response.text().await?
        } else {
            // best effort, the status is what gets reported
            response.text().await.unwrap_or_default()
        };
        Ok(Reply {
            status,
            headers,
            body,
        })
    }
}

impl Client {
    pub(crate) async fn dispatch_with<T, F, Fut>(
        &self,
        ctx: &CancellationToken,
        kind: OperationKind,
        target: &mut T,
        variables: &Variables,
        policy: RetryPolicy,
        send: F,
    ) -> Result<()>
    where
        T: Operation,
        F: FnMut(Url, Vec<u8>) -> Fut,
        Fut: Future<Output = Result<Reply>>,
    {
        let query = kind.build(&T::selection(), variables)?;
        let envelope = self
            .transmit_with(ctx, &query, variables, policy, send)
            .await?;

        if let Some(data) = &envelope.data {
            bind(data, target)?;
        }
        into_result(envelope.errors)
    }

    pub(crate) async fn execute_raw_with<F, Fut>(
        &self,
        ctx: &CancellationToken,
        query: &str,
        variables: &Variables,
        send: F,
    ) -> Result<Option<serde_json::Value>>
    where
        F: FnMut(Url, Vec<u8>) -> Fut,
        Fut: Future<Output = Result<Reply>>,
    {
        graphql_parser::parse_query::<&str>(query).map_err(|err| Error::Build(err.to_string()))?;
        let envelope = self
            .transmit_with(ctx, query, variables, RetryPolicy::once(), send)
            .await?;
        into_result(envelope.errors)?;
        Ok(envelope.data)
    }

    async fn transmit_with<F, Fut>(
        &self,
        ctx: &CancellationToken,
        query: &str,
        variables: &Variables,
        policy: RetryPolicy,
        mut send: F,
    ) -> Result<GraphQlResponse<serde_json::Value>>
    where
        F: FnMut(Url, Vec<u8>) -> Fut,
        Fut: Future<Output = Result<Reply>>,
    {
        let body = WireRequest {
            query,
            variables: variables.wire_values(),
        }
        .to_body()?;

        let endpoint = self.url.as_str();
        let mut state = policy.start();
        let reply = loop {
            state.check_deadline(endpoint)?;

            let attempt = state.attempt();
            debug!(attempt, url = endpoint, "sending graphql request");
            let reply = tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(Error::Cancelled),
                reply = send(self.url.clone(), body.clone()) => reply?,
            };
            debug!(attempt, http_status = reply.status.as_u16(), "graphql response received");

            match state.next(reply.status, &reply.headers)? {
                Step::Done => break reply,
                Step::Wait(wait) => {
                    warn!(
                        attempt,
                        wait_secs = wait.as_secs(),
                        url = endpoint,
                        "secondary rate limit reached, retrying"
                    );
                    retry::wait(wait, ctx).await?;
                }
            }
        };

        if reply.status != StatusCode::OK {
            let retry_after = if reply.status == StatusCode::FORBIDDEN {
                retry::retry_after(&reply.headers)?.map(|wait| wait.as_secs())
            } else {
                None
            };
            return Err(Error::HttpStatus {
                status: reply.status.as_u16(),
                body: body_snippet(&reply.body),
                retry_after,
            });
        }

        decode_envelope(&reply.body)
    }
}

fn into_result(errors: Vec<GraphQlError>) -> Result<()> {
    match GraphQlErrors::new(errors) {
        Some(errors) => {
            debug!(count = errors.len(), "graphql errors in response");
            Err(Error::GraphQl(errors))
        }
        None => Ok(()),
    }
}

fn body_snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_SNIPPET_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
