//! GraphQL gateway over HTTP
//!
//! One endpoint, schema-typed query/mutation documents with variables.
//! Authentication is a short-lived bearer token obtained via the `apiKeyUser`
//! exchange and cached; the cache refreshes proactively at a fixed margin
//! before the token's nominal expiry, never reactively on a 401.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::Gateway;
use crate::config::Credentials;
use crate::error::{LiftgateError, LiftgateResult};
use crate::models::{LockHandle, Run, RunHandle, Stack, StackDetail};

/// Nominal lifetime of a platform-issued JWT
const TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Refresh this long before the nominal expiry
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(10 * 60);

const TOKEN_EXCHANGE: &str = "\
mutation GetToken($id: ID!, $secret: String!) {
    apiKeyUser(id: $id, secret: $secret) {
        jwt
    }
}";

const LIST_STACKS: &str = "\
query ListStacks {
    stacks {
        id
        name
        description
        state
        labels
        lockedBy
        space { id name }
    }
}";

const STACK_DETAIL: &str = "\
query GetStack($id: ID!) {
    stack(id: $id) {
        id
        name
        description
        repository
        branch
        projectRoot
        state
        lockedBy
        labels
        autodeploy
        attachedPolicies { id name type }
        runs(first: 10) {
            id
            state
            type
            createdAt
            finishedAt
            triggeredBy
            delta { addCount changeCount deleteCount }
        }
        resources {
            id
            address
            type
        }
    }
}";

const LIST_STACK_DETAILS: &str = "\
query ListStackDetails {
    stacks {
        id
        name
        labels
        state
        lockedBy
        attachedPolicies { id name }
        runs(first: 5) {
            id
            state
            type
            createdAt
        }
    }
}";

const RUN_DETAIL: &str = "\
query GetRun($id: ID!) {
    run(id: $id) {
        id
        state
        type
        createdAt
        finishedAt
        triggeredBy
        delta { addCount changeCount deleteCount }
        policyReceipts {
            policy { name type }
            outcome
            denies
            warnings
        }
    }
}";

const TRIGGER_RUN: &str = "\
mutation TriggerRun($stackId: ID!, $commitSha: String) {
    runTrigger(stack: $stackId, commitSha: $commitSha) {
        id
        state
        createdAt
    }
}";

const CONFIRM_RUN: &str = "\
mutation ConfirmRun($id: ID!) {
    runConfirm(id: $id) {
        id
        state
    }
}";

const CANCEL_RUN: &str = "\
mutation CancelRun($id: ID!, $note: String) {
    runCancel(id: $id, note: $note) {
        id
        state
    }
}";

const LOCK_STACK: &str = "\
mutation LockStack($id: ID!, $note: String) {
    stackLock(id: $id, note: $note) {
        id
        lockedBy
    }
}";

const UNLOCK_STACK: &str = "\
mutation UnlockStack($id: ID!) {
    stackUnlock(id: $id) {
        id
        lockedBy
    }
}";

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    jwt: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Fresh means usable past the refresh margin; a token inside the margin
    /// is treated as expired so callers refresh before the platform does.
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Gateway implementation talking to the platform's GraphQL endpoint
pub struct HttpGateway {
    agent: ureq::Agent,
    graphql_url: String,
    credentials: Credentials,
    token: RefCell<Option<CachedToken>>,
}

impl HttpGateway {
    pub fn new(credentials: Credentials) -> Self {
        let graphql_url = format!("{}/graphql", credentials.endpoint.trim_end_matches('/'));
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(30))
                .build(),
            graphql_url,
            credentials,
            token: RefCell::new(None),
        }
    }

    /// Get a cached bearer token, exchanging the API key for a fresh one when
    /// the cache is empty or inside the refresh margin.
    fn token(&self) -> LiftgateResult<String> {
        let now = Instant::now();
        if let Some(cached) = self.token.borrow().as_ref() {
            if cached.is_fresh(now) {
                return Ok(cached.jwt.clone());
            }
        }

        let data = self.post(
            "apiKeyUser",
            TOKEN_EXCHANGE,
            serde_json::json!({
                "id": self.credentials.api_key_id,
                "secret": self.credentials.api_key_secret,
            }),
            None,
        )?;
        let jwt = data
            .pointer("/apiKeyUser/jwt")
            .and_then(|v| v.as_str())
            .ok_or_else(|| remote("apiKeyUser", "response carried no token"))?
            .to_string();

        *self.token.borrow_mut() = Some(CachedToken {
            jwt: jwt.clone(),
            expires_at: now + TOKEN_LIFETIME,
        });
        Ok(jwt)
    }

    /// Execute an authenticated GraphQL document and return its data payload
    fn execute(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> LiftgateResult<serde_json::Value> {
        let jwt = self.token()?;
        self.post(operation, query, variables, Some(&jwt))
    }

    fn post(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
        bearer: Option<&str>,
    ) -> LiftgateResult<serde_json::Value> {
        let mut request = self.agent.post(&self.graphql_url);
        if let Some(jwt) = bearer {
            request = request.set("Authorization", &format!("Bearer {jwt}"));
        }

        let response = request
            .send_json(serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .map_err(|e| remote(operation, transport_cause(e)))?;

        let payload: GraphQlResponse = response
            .into_json()
            .map_err(|e| remote(operation, format!("malformed response body: {e}")))?;

        if let Some(errors) = payload.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(remote(operation, messages.join("; ")));
        }

        payload
            .data
            .ok_or_else(|| remote(operation, "response carried no data"))
    }

    /// Pull one field out of a data payload into a typed record, rejecting
    /// shapes that do not deserialize.
    fn field<T: DeserializeOwned>(
        operation: &str,
        mut data: serde_json::Value,
        key: &str,
    ) -> LiftgateResult<T> {
        let value = data
            .get_mut(key)
            .map(serde_json::Value::take)
            .filter(|v| !v.is_null())
            .ok_or_else(|| remote(operation, format!("response missing field '{key}'")))?;
        serde_json::from_value(value)
            .map_err(|e| remote(operation, format!("unexpected response shape: {e}")))
    }
}

impl Gateway for HttpGateway {
    fn list_stacks(&self) -> LiftgateResult<Vec<Stack>> {
        let data = self.execute("stacks", LIST_STACKS, serde_json::json!({}))?;
        Self::field("stacks", data, "stacks")
    }

    fn stack_detail(&self, id: &str) -> LiftgateResult<StackDetail> {
        let data = self.execute("stack", STACK_DETAIL, serde_json::json!({ "id": id }))?;
        Self::field("stack", data, "stack")
    }

    fn list_stack_details(&self) -> LiftgateResult<Vec<StackDetail>> {
        let data = self.execute("stacks", LIST_STACK_DETAILS, serde_json::json!({}))?;
        Self::field("stacks", data, "stacks")
    }

    fn run(&self, id: &str) -> LiftgateResult<Run> {
        let data = self.execute("run", RUN_DETAIL, serde_json::json!({ "id": id }))?;
        Self::field("run", data, "run")
    }

    fn trigger_run(&self, stack_id: &str, commit_sha: Option<&str>) -> LiftgateResult<Run> {
        let data = self.execute(
            "runTrigger",
            TRIGGER_RUN,
            serde_json::json!({ "stackId": stack_id, "commitSha": commit_sha }),
        )?;
        Self::field("runTrigger", data, "runTrigger")
    }

    fn confirm_run(&self, run_id: &str) -> LiftgateResult<RunHandle> {
        let data = self.execute("runConfirm", CONFIRM_RUN, serde_json::json!({ "id": run_id }))?;
        Self::field("runConfirm", data, "runConfirm")
    }

    fn cancel_run(&self, run_id: &str, note: &str) -> LiftgateResult<RunHandle> {
        let data = self.execute(
            "runCancel",
            CANCEL_RUN,
            serde_json::json!({ "id": run_id, "note": note }),
        )?;
        Self::field("runCancel", data, "runCancel")
    }

    fn lock_stack(&self, stack_id: &str, note: &str) -> LiftgateResult<LockHandle> {
        let data = self.execute(
            "stackLock",
            LOCK_STACK,
            serde_json::json!({ "id": stack_id, "note": note }),
        )?;
        Self::field("stackLock", data, "stackLock")
    }

    fn unlock_stack(&self, stack_id: &str) -> LiftgateResult<LockHandle> {
        let data = self.execute("stackUnlock", UNLOCK_STACK, serde_json::json!({ "id": stack_id }))?;
        Self::field("stackUnlock", data, "stackUnlock")
    }
}

fn remote(operation: &str, cause: impl Into<String>) -> LiftgateError {
    LiftgateError::RemoteOperationFailed {
        operation: operation.to_string(),
        cause: cause.into(),
    }
}

fn transport_cause(error: ureq::Error) -> String {
    match error {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let body = body.trim();
            if body.is_empty() {
                format!("HTTP {code}")
            } else {
                let mut snippet: String = body.chars().take(200).collect();
                if snippet.len() < body.len() {
                    snippet.push_str("...");
                }
                format!("HTTP {code}: {snippet}")
            }
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}
