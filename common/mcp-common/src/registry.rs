//! Tool registry: definitions, argument validation and dispatch
//!
//! A [`ToolRegistry`] is built once per session and is read-only while
//! serving. Registration is append-only and rejects duplicate names.
//!
//! Dispatch fails closed. Unknown tools, arguments that do not deserialize
//! into the tool's parameter type, and arguments rejected by
//! [`ToolArgs::validate`] all produce an `isError` result without the
//! handler ever running. Handlers themselves are wrapped with
//! [`with_error_envelope`] so their failures and panics become results
//! named after the operation. A bare handler that panics is still caught at
//! the dispatch boundary and reported under its tool name.
//!
//! ```rust,ignore
//! let mut registry = ToolRegistry::new();
//! registry.register(
//!     "peek_page",
//!     "Preview the first lines of a page",
//!     with_error_envelope("peek page", move |p: PeekPageParams| peek(client.clone(), p)),
//! )?;
//! let result = registry.dispatch(invocation).await;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use rmcp::model::{CallToolResult, JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn, Instrument};

use crate::result::{error_result, text_success};

/// Parameter types accepted by registered tools
///
/// The JSON schema advertised in `tools/list` is derived from the type, and
/// incoming arguments are deserialized into it before the handler runs.
/// Constraints that a schema alone cannot enforce go in `validate`.
pub trait ToolArgs: DeserializeOwned + JsonSchema + Send + 'static {
    /// Check semantic constraints, returning a message naming the field
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Configuration errors raised while building a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two tools were registered under the same name
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    /// The parameter type did not produce an object schema
    #[error("input schema for tool '{name}' is unusable: {reason}")]
    InvalidSchema { name: String, reason: String },
}

/// One incoming tool call
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: JsonObject,
    /// Correlation id of the request that carried the call, for tracing
    pub correlation_id: Option<String>,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

type BoxedHandler = Arc<dyn Fn(JsonObject) -> BoxFuture<'static, CallToolResult> + Send + Sync>;

struct RegisteredTool {
    definition: Tool,
    handler: BoxedHandler,
}

/// Name-indexed set of tools in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool whose arguments deserialize into `A`
    pub fn register<A, F, Fut>(
        &mut self,
        name: &'static str,
        description: &'static str,
        handler: F,
    ) -> Result<&mut Self, RegistryError>
    where
        A: ToolArgs,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallToolResult> + Send + 'static,
    {
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateTool(name.to_string()));
        }

        let definition = Tool::new(name, description, input_schema::<A>(name)?);

        let handler = Arc::new(handler);
        let boxed: BoxedHandler = Arc::new(move |arguments: JsonObject| {
            let handler = Arc::clone(&handler);
            async move {
                match parse_arguments::<A>(arguments) {
                    Ok(args) => handler(args).await,
                    Err(reason) => {
                        debug!(tool = name, %reason, "rejected tool arguments");
                        error_result(format!("Invalid arguments for {}: {}", name, reason))
                    }
                }
            }
            .boxed()
        });

        self.by_name.insert(name.to_string(), self.tools.len());
        self.tools.push(RegisteredTool {
            definition,
            handler: boxed,
        });
        Ok(self)
    }

    /// Tool definitions in registration order
    pub fn definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run one invocation to completion
    ///
    /// Always returns a result; nothing a handler does can escape as an
    /// error or a panic.
    pub async fn dispatch(&self, invocation: ToolInvocation) -> CallToolResult {
        let ToolInvocation {
            tool_name,
            arguments,
            correlation_id,
        } = invocation;

        let Some(&index) = self.by_name.get(&tool_name) else {
            warn!(tool = %tool_name, "call for unknown tool");
            return error_result(format!("Unknown tool: {}", tool_name));
        };

        let span = tracing::info_span!(
            "tool_call",
            tool = %tool_name,
            correlation_id = correlation_id.as_deref().unwrap_or("-"),
        );
        let future = (self.tools[index].handler)(arguments);

        match AssertUnwindSafe(future).catch_unwind().instrument(span).await {
            Ok(result) => result,
            Err(_) => {
                error!(tool = %tool_name, "tool handler panicked");
                error_result(format!("Failed to {}: handler panicked", tool_name))
            }
        }
    }
}

/// Wrap a fallible handler so its outcome becomes a result envelope
///
/// `Ok(text)` becomes a success with one text item; `Err(e)` becomes an
/// `isError` result reading `Failed to <operation>: <e>`. A panic inside
/// the handler reads `Failed to <operation>: handler panicked`.
pub fn with_error_envelope<A, F, Fut, E>(
    operation: &'static str,
    handler: F,
) -> impl Fn(A) -> BoxFuture<'static, CallToolResult> + Send + Sync + 'static
where
    A: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    move |args: A| {
        let started = std::panic::catch_unwind(AssertUnwindSafe(|| handler(args)));
        async move {
            let outcome = match started {
                Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
                Err(panic) => Err(panic),
            };
            match outcome {
                Ok(Ok(text)) => text_success(text),
                Ok(Err(err)) => {
                    warn!(operation, error = %err, "tool call failed");
                    error_result(format!("Failed to {}: {}", operation, err))
                }
                Err(_) => {
                    error!(operation, "tool handler panicked");
                    error_result(format!("Failed to {}: handler panicked", operation))
                }
            }
        }
        .boxed()
    }
}

fn parse_arguments<A: ToolArgs>(arguments: JsonObject) -> Result<A, String> {
    let args: A = serde_json::from_value(Value::Object(arguments)).map_err(|e| e.to_string())?;
    args.validate()?;
    Ok(args)
}

fn input_schema<A: JsonSchema>(name: &str) -> Result<Arc<JsonObject>, RegistryError> {
    let schema = schemars::schema_for!(A);
    match serde_json::to_value(&schema) {
        Ok(Value::Object(mut object)) => {
            object.remove("$schema");
            Ok(Arc::new(object))
        }
        Ok(other) => Err(RegistryError::InvalidSchema {
            name: name.to_string(),
            reason: format!("expected an object schema, got {}", other),
        }),
        Err(e) => Err(RegistryError::InvalidSchema {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}
