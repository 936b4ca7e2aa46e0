//! Playground session driven synchronously against in-memory collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mcplay_core::{
    ChatStoreError, ClientConfig, Credentials, InMemoryChatRepository, MessageRole, ModelParams,
    NoopEmitter, Provider, ServerConfig, ToolCallResult, ToolCapabilities, ToolDescriptor,
    ToolHintRegistry, ToolServerConnector, ToolServerError, ToolServerSession,
};
use mcplay_runtime::{BridgeError, PlaygroundSession, SessionError, SessionParts};
use serde_json::{Map, Value, json};

#[derive(Clone, Default)]
struct AnalyticsConnector {
    calls: Arc<Mutex<Vec<String>>>,
    closes: Arc<Mutex<usize>>,
}

#[async_trait]
impl ToolServerConnector for AnalyticsConnector {
    async fn connect(
        &self,
        config: &ServerConfig,
    ) -> Result<Arc<dyn ToolServerSession>, ToolServerError> {
        Ok(Arc::new(AnalyticsSession {
            name: config.name.clone(),
            calls: Arc::clone(&self.calls),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct AnalyticsSession {
    name: String,
    calls: Arc<Mutex<Vec<String>>>,
    closes: Arc<Mutex<usize>>,
}

#[async_trait]
impl ToolServerSession for AnalyticsSession {
    fn server_name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolServerError> {
        Ok(vec![
            ToolDescriptor::new("list_ga_accounts"),
            ToolDescriptor::new("run_ga_report").with_input_schema(json!({
                "type": "object",
                "properties": {
                    "property_id": { "type": "string" },
                    "metrics": { "type": "array" }
                },
                "required": ["property_id"]
            })),
        ])
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, ToolServerError> {
        self.calls.lock().unwrap().push(name.to_string());
        match name {
            "list_ga_accounts" => Ok(ToolCallResult::success(json!([{
                "type": "text",
                "text": r#"[{"property_id":"123","display_name":"Acme - Web"}]"#
            }]))),
            "run_ga_report" if arguments.get("property_id") == Some(&json!("123")) => Ok(
                ToolCallResult::success(json!([{ "type": "text", "text": "42 sessions" }])),
            ),
            _ => Err(ToolServerError::Server {
                code: -32000,
                message: "Permission Denied".to_string(),
            }),
        }
    }

    async fn close(&self) -> Result<(), ToolServerError> {
        *self.closes.lock().unwrap() += 1;
        Ok(())
    }
}

fn open(connector: &AnalyticsConnector) -> PlaygroundSession {
    let config = ClientConfig {
        servers: vec![ServerConfig::new("ga4", "http://localhost:8002/sse")],
        ..ClientConfig::default()
    };
    PlaygroundSession::open(SessionParts {
        connector: Arc::new(connector.clone()),
        repository: Arc::new(InMemoryChatRepository::new()),
        emitter: Arc::new(NoopEmitter::new()),
        config,
        hints: ToolHintRegistry::with_analytics_defaults(),
    })
    .unwrap()
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[test]
fn test_connect_lists_tools_and_parameters() {
    let connector = AnalyticsConnector::default();
    let session = open(&connector);

    let status = session.connect().unwrap();
    assert_eq!(status.connected_servers, vec!["ga4".to_string()]);
    assert_eq!(status.tool_count, 2);

    let params = session.tool_parameters("run_ga_report").unwrap().unwrap();
    let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["property_id: string (required)", "metrics: array"]
    );
    assert!(session.tool_parameters("missing").unwrap().is_none());
}

#[test]
fn test_invoke_in_chat_records_tool_turns() {
    let connector = AnalyticsConnector::default();
    let session = open(&connector);
    session.connect().unwrap();
    let chat = session.create_chat().unwrap();

    let result = session
        .invoke_in_chat(chat.chat_id, "run_ga_report", args(json!({ "property_id": "123" })))
        .unwrap();
    assert_eq!(result.text(), "42 sessions");

    let err = session
        .invoke_in_chat(chat.chat_id, "run_ga_report", args(json!({ "property_id": "999" })))
        .unwrap_err();
    assert!(err.to_string().contains("Permission Denied"));

    let history = session.get_chat(chat.chat_id).unwrap().unwrap().messages;
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|turn| turn.role == MessageRole::Tool));
    assert_eq!(history[0].content, "42 sessions");
    assert!(!history[0].tool_call.as_ref().unwrap().is_error);
    assert!(history[1].tool_call.as_ref().unwrap().is_error);
}

#[test]
fn test_invoke_in_unknown_chat_makes_no_call() {
    let connector = AnalyticsConnector::default();
    let session = open(&connector);
    session.connect().unwrap();

    let missing = mcplay_core::ChatId::generate();
    let err = session
        .invoke_in_chat(missing, "list_ga_accounts", Map::new())
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Chat(ChatStoreError::SessionNotFound(id)) if id == missing
    ));
    assert!(connector.calls.lock().unwrap().is_empty());
}

#[test]
fn test_property_options_come_from_provider_tool() {
    let connector = AnalyticsConnector::default();
    let session = open(&connector);
    session.connect().unwrap();

    assert!(
        session
            .hint_for("run_ga_report")
            .capabilities
            .contains(ToolCapabilities::NEEDS_PROPERTY)
    );
    let options = session.property_options("run_ga_report").unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].display_name, "Acme - Web");
    assert_eq!(*connector.calls.lock().unwrap(), vec!["list_ga_accounts"]);

    assert!(session.property_options("list_ga_accounts").unwrap().is_empty());
}

#[test]
fn test_chat_lifecycle() {
    let session = open(&AnalyticsConnector::default());

    let first = session.create_named_chat("first").unwrap();
    let second = session.create_chat().unwrap();
    assert_eq!(session.current_index().unwrap(), Some(0));

    session.select_chat(first.chat_id).unwrap();
    assert_eq!(session.current_index().unwrap(), Some(1));

    session.delete_chat(first.chat_id).unwrap();
    assert_eq!(
        session.current_chat().unwrap().map(|c| c.chat_id),
        Some(second.chat_id)
    );
    session.delete_chat(first.chat_id).unwrap();
    assert_eq!(session.list_chats().unwrap().len(), 1);
}

#[test]
fn test_provider_change_resets_connection() {
    let connector = AnalyticsConnector::default();
    let session = open(&connector);
    session.connect().unwrap();

    let mut params = session.model_params();
    params.temperature = 0.2;
    session.set_model_params(params).unwrap();
    assert!(session.status().unwrap().is_connected());

    let mut bedrock = ModelParams::for_provider(Provider::Bedrock);
    bedrock.credentials = Credentials::Bedrock {
        region_name: "us-east-1".to_string(),
        aws_access_key: "key".to_string(),
        aws_secret_key: "secret".to_string(),
    };
    session.set_model_params(bedrock).unwrap();
    assert!(!session.status().unwrap().is_connected());
    assert_eq!(*connector.closes.lock().unwrap(), 1);

    let mut invalid = session.model_params();
    invalid.max_tokens = 10;
    assert!(matches!(
        session.set_model_params(invalid),
        Err(SessionError::InvalidModel(_))
    ));
}

#[test]
fn test_shutdown_disconnects_once() {
    let connector = AnalyticsConnector::default();
    let session = open(&connector);
    session.connect().unwrap();

    session.shutdown();
    session.shutdown();

    assert_eq!(*connector.closes.lock().unwrap(), 1);
    assert!(matches!(
        session.tools(),
        Err(SessionError::Bridge(BridgeError::ShutDown))
    ));
    drop(session);
    assert_eq!(*connector.closes.lock().unwrap(), 1);
}
