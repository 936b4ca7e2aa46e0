//! Connection manager behavior against in-memory tool servers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mcplay_core::{
    AppEvent, AppEventEmitter, CollisionPolicy, McpError, ServerConfig, ToolCallResult,
    ToolDescriptor, ToolErrorKind, ToolServerConnector, ToolServerError, ToolServerSession,
};
use mcplay_mcp::{ConnectionManager, ConnectionOptions, McpService};
use serde_json::{Map, Value, json};

/// How a fake server answers `tools/call`.
#[derive(Clone)]
enum Reply {
    Text(String),
    Remote(String),
    Hang,
}

#[derive(Clone)]
struct FakeServer {
    tools: Vec<ToolDescriptor>,
    reply: Reply,
    refuse: bool,
    /// `tools/list` and close both fail.
    broken: bool,
}

impl FakeServer {
    fn with_tools(names: &[&str]) -> Self {
        Self {
            tools: names.iter().map(|n| ToolDescriptor::new(*n)).collect(),
            reply: Reply::Text("ok".to_string()),
            refuse: false,
            broken: false,
        }
    }

    fn replying(mut self, reply: Reply) -> Self {
        self.reply = reply;
        self
    }

    fn broken() -> Self {
        Self {
            broken: true,
            ..Self::with_tools(&["foo"])
        }
    }

    fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::with_tools(&[])
        }
    }
}

#[derive(Default)]
struct Log {
    connects: Vec<String>,
    calls: Vec<(String, String)>,
    closes: Vec<String>,
}

#[derive(Clone, Default)]
struct FakeConnector {
    servers: Arc<Mutex<HashMap<String, FakeServer>>>,
    log: Arc<Mutex<Log>>,
}

impl FakeConnector {
    fn with(servers: &[(&str, FakeServer)]) -> Self {
        let connector = Self::default();
        {
            let mut map = connector.servers.lock().unwrap();
            for (name, server) in servers {
                map.insert((*name).to_string(), server.clone());
            }
        }
        connector
    }

    fn connects(&self) -> Vec<String> {
        self.log.lock().unwrap().connects.clone()
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.log.lock().unwrap().calls.clone()
    }

    fn closes(&self) -> Vec<String> {
        self.log.lock().unwrap().closes.clone()
    }
}

#[async_trait]
impl ToolServerConnector for FakeConnector {
    async fn connect(
        &self,
        config: &ServerConfig,
    ) -> Result<Arc<dyn ToolServerSession>, ToolServerError> {
        self.log.lock().unwrap().connects.push(config.name.clone());
        let server = self
            .servers
            .lock()
            .unwrap()
            .get(&config.name)
            .cloned()
            .ok_or_else(|| ToolServerError::Transport("connection refused".to_string()))?;
        if server.refuse {
            return Err(ToolServerError::Transport("connection refused".to_string()));
        }
        Ok(Arc::new(FakeSession {
            name: config.name.clone(),
            server,
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeSession {
    name: String,
    server: FakeServer,
    log: Arc<Mutex<Log>>,
}

#[async_trait]
impl ToolServerSession for FakeSession {
    fn server_name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolServerError> {
        if self.server.broken {
            return Err(ToolServerError::Protocol("bad tools/list".to_string()));
        }
        Ok(self.server.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        _arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, ToolServerError> {
        self.log
            .lock()
            .unwrap()
            .calls
            .push((self.name.clone(), name.to_string()));
        match &self.server.reply {
            Reply::Text(text) => Ok(ToolCallResult::success(
                json!([{ "type": "text", "text": text }]),
            )),
            Reply::Remote(message) => Err(ToolServerError::Server {
                code: -32000,
                message: message.clone(),
            }),
            Reply::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    async fn close(&self) -> Result<(), ToolServerError> {
        self.log.lock().unwrap().closes.push(self.name.clone());
        if self.server.broken {
            return Err(ToolServerError::Transport("close failed".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingEmitter {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

impl AppEventEmitter for RecordingEmitter {
    fn emit(&self, event: AppEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn clone_box(&self) -> Box<dyn AppEventEmitter> {
        Box::new(self.clone())
    }
}

fn config(name: &str) -> ServerConfig {
    ServerConfig::new(name, format!("http://localhost/{name}/mcp"))
}

fn manager(connector: &FakeConnector, policy: CollisionPolicy) -> ConnectionManager {
    ConnectionManager::with_options(
        Arc::new(connector.clone()),
        ConnectionOptions {
            collision_policy: policy,
            ..ConnectionOptions::default()
        },
    )
}

fn two_servers() -> FakeConnector {
    FakeConnector::with(&[
        (
            "A",
            FakeServer::with_tools(&["foo"]).replying(Reply::Text("from A".to_string())),
        ),
        (
            "B",
            FakeServer::with_tools(&["foo", "bar"]).replying(Reply::Text("from B".to_string())),
        ),
    ])
}

#[tokio::test]
async fn test_last_wins_routes_to_later_server() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::LastWins);

    let catalog = manager
        .connect_all(vec![config("A"), config("B")])
        .await
        .unwrap();

    assert_eq!(catalog.names(), vec!["foo", "bar"]);
    assert_eq!(catalog.get("foo").unwrap().server(), "B");

    let result = manager.invoke("foo", Map::new()).await.unwrap();
    assert_eq!(result.text(), "from B");
    assert_eq!(
        connector.calls(),
        vec![("B".to_string(), "foo".to_string())]
    );
}

#[tokio::test]
async fn test_connect_all_is_all_or_nothing() {
    let connector = FakeConnector::with(&[
        ("A", FakeServer::with_tools(&["foo"])),
        ("B", FakeServer::refusing()),
        ("C", FakeServer::with_tools(&["baz"])),
    ]);
    let manager = manager(&connector, CollisionPolicy::LastWins);

    let err = manager
        .connect_all(vec![config("A"), config("B"), config("C")])
        .await
        .unwrap_err();

    match &err {
        McpError::Connection { server, url, .. } => {
            assert_eq!(server, "B");
            assert_eq!(url, "http://localhost/B/mcp");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!manager.is_connected().await);
    assert!(manager.catalog().await.is_empty());
    // C is never attempted; A is closed again.
    assert_eq!(connector.connects(), vec!["A", "B"]);
    assert_eq!(connector.closes(), vec!["A"]);
}

#[tokio::test]
async fn test_failed_tool_listing_closes_session() {
    let connector = FakeConnector::with(&[
        ("A", FakeServer::with_tools(&["foo"])),
        ("B", FakeServer::broken()),
    ]);
    let manager = manager(&connector, CollisionPolicy::LastWins);

    let err = manager
        .connect_all(vec![config("A"), config("B")])
        .await
        .unwrap_err();

    assert!(matches!(err, McpError::Connection { ref server, .. } if server == "B"));
    // B's failing close does not stop A from being closed.
    assert_eq!(connector.closes(), vec!["B", "A"]);
    assert!(!manager.is_connected().await);
}

#[tokio::test]
async fn test_unknown_tool_makes_no_calls() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::LastWins);
    manager
        .connect_all(vec![config("A"), config("B")])
        .await
        .unwrap();

    let err = manager.invoke("missing", Map::new()).await.unwrap_err();
    assert_eq!(err, McpError::ToolNotFound("missing".to_string()));
    assert!(connector.calls().is_empty());
}

#[tokio::test]
async fn test_invoke_while_disconnected_is_not_found() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::LastWins);

    let err = manager.invoke("foo", Map::new()).await.unwrap_err();
    assert!(matches!(err, McpError::ToolNotFound(_)));
    assert!(connector.connects().is_empty());
}

#[tokio::test]
async fn test_reconnect_replaces_sessions() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::LastWins);
    manager.add_server(config("A")).await.unwrap();
    manager.add_server(config("B")).await.unwrap();

    let first = manager.reconnect().await.unwrap();
    let second = manager.reconnect().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(connector.closes(), vec!["A", "B"]);
    assert_eq!(
        manager.status().await.connected_servers,
        vec!["A".to_string(), "B".to_string()]
    );
}

#[tokio::test]
async fn test_disconnect_is_idempotent_and_reconnect_restores_catalog() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::LastWins);
    let configs = vec![config("A"), config("B")];

    let first = manager.connect_all(configs.clone()).await.unwrap();
    manager.disconnect_all().await;
    manager.disconnect_all().await;
    assert!(!manager.is_connected().await);
    assert_eq!(connector.closes(), vec!["A", "B"]);

    let second = manager.connect_all(configs).await.unwrap();
    assert_eq!(first.names(), second.names());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reject_policy_fails_connect() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::Reject);

    let err = manager
        .connect_all(vec![config("A"), config("B")])
        .await
        .unwrap_err();

    assert!(matches!(err, McpError::ToolCollision { ref tool, .. } if tool == "foo"));
    assert!(!manager.is_connected().await);
    assert_eq!(connector.closes(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_namespace_policy_routes_remote_names() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::Namespace);
    manager
        .connect_all(vec![config("A"), config("B")])
        .await
        .unwrap();

    let result = manager.invoke("A.foo", Map::new()).await.unwrap();
    assert_eq!(result.text(), "from A");
    assert_eq!(
        connector.calls(),
        vec![("A".to_string(), "foo".to_string())]
    );
}

#[tokio::test]
async fn test_remove_server_reaggregates() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::LastWins);
    manager
        .connect_all(vec![config("A"), config("B")])
        .await
        .unwrap();

    manager.remove_server("B").await.unwrap();

    let catalog = manager.catalog().await;
    assert_eq!(catalog.names(), vec!["foo"]);
    assert_eq!(catalog.get("foo").unwrap().server(), "A");
    assert_eq!(connector.closes(), vec!["B"]);

    let err = manager.remove_server("B").await.unwrap_err();
    assert_eq!(err, McpError::ServerNotFound("B".to_string()));
}

#[tokio::test]
async fn test_duplicate_and_invalid_configs() {
    let connector = two_servers();
    let manager = manager(&connector, CollisionPolicy::LastWins);

    manager.add_server(config("A")).await.unwrap();
    assert_eq!(
        manager.add_server(config("A")).await.unwrap_err(),
        McpError::DuplicateServer("A".to_string())
    );
    assert!(matches!(
        manager
            .add_server(ServerConfig::new("bad", "ftp://example.com"))
            .await,
        Err(McpError::InvalidConfig(_))
    ));
    assert!(matches!(
        manager.connect_all(vec![config("A"), config("A")]).await,
        Err(McpError::DuplicateServer(_))
    ));
    assert!(connector.connects().is_empty());
}

#[tokio::test]
async fn test_remote_error_message_is_preserved() {
    let connector = FakeConnector::with(&[(
        "ga4",
        FakeServer::with_tools(&["run_ga_report"])
            .replying(Reply::Remote("Permission Denied".to_string())),
    )]);
    let manager = manager(&connector, CollisionPolicy::LastWins);
    manager.connect_all(vec![config("ga4")]).await.unwrap();

    let err = manager.invoke("run_ga_report", Map::new()).await.unwrap_err();
    match err {
        McpError::ToolExecution {
            tool,
            server,
            kind,
            message,
        } => {
            assert_eq!(tool, "run_ga_report");
            assert_eq!(server, "ga4");
            assert_eq!(kind, ToolErrorKind::Remote);
            assert_eq!(message, "Permission Denied");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_invoke_times_out() {
    let connector = FakeConnector::with(&[(
        "slow",
        FakeServer::with_tools(&["wait"]).replying(Reply::Hang),
    )]);
    let manager = ConnectionManager::with_options(
        Arc::new(connector.clone()),
        ConnectionOptions {
            tool_timeout: Duration::from_millis(50),
            ..ConnectionOptions::default()
        },
    );
    manager.connect_all(vec![config("slow")]).await.unwrap();

    let err = manager.invoke("wait", Map::new()).await.unwrap_err();
    assert!(matches!(
        err,
        McpError::ToolExecution {
            kind: ToolErrorKind::Timeout,
            ..
        }
    ));
    // The session stays usable after a timed-out call.
    assert!(manager.is_connected().await);
}

#[tokio::test]
async fn test_service_emits_lifecycle_events() {
    let connector = two_servers();
    let emitter = RecordingEmitter::default();
    let service = McpService::new(
        Arc::new(connector.clone()),
        ConnectionOptions::default(),
        Arc::new(emitter.clone()),
    );

    service
        .configure(vec![config("A"), config("B")])
        .await
        .unwrap();
    service.connect().await.unwrap();
    service.remove_server("A").await.unwrap();
    service.disconnect().await;

    let names: Vec<&str> = emitter
        .events
        .lock()
        .unwrap()
        .iter()
        .map(AppEvent::event_name)
        .collect();
    assert_eq!(
        names,
        vec!["servers_connected", "server_removed", "servers_disconnected"]
    );
}

#[tokio::test]
async fn test_service_reports_connection_failure() {
    let connector = FakeConnector::with(&[("down", FakeServer::refusing())]);
    let emitter = RecordingEmitter::default();
    let service = McpService::new(
        Arc::new(connector),
        ConnectionOptions::default(),
        Arc::new(emitter.clone()),
    );

    assert!(service.connect_all(vec![config("down")]).await.is_err());

    let events = emitter.events.lock().unwrap();
    match events.as_slice() {
        [AppEvent::ConnectionFailed { error }] => {
            assert_eq!(error.server_name.as_deref(), Some("down"));
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test]
async fn test_service_rejects_non_object_arguments() {
    let service = McpService::new(
        Arc::new(two_servers()),
        ConnectionOptions::default(),
        Arc::new(RecordingEmitter::default()),
    );
    service
        .connect_all(vec![config("A"), config("B")])
        .await
        .unwrap();

    assert!(service.invoke_value("bar", Value::Null).await.is_ok());
    assert!(matches!(
        service.invoke_value("bar", json!([1, 2])).await,
        Err(McpError::InvalidConfig(_))
    ));
}
