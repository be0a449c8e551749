//! Integration tests for the conversation client.
//!
//! These run the client against a scripted chat client and a file-backed
//! exchange log in a temporary directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parley::{
    ConversationClient, DiagnosticLog, ExchangeLog, FileExchangeLog, MasterLog, Message,
    MockChatClient, CONVERSATION_ENDED, DEFAULT_TEMPERATURE, SINGLE_INTERACTION_KEY,
};

struct TestEnv {
    client: ConversationClient,
    mock: Arc<MockChatClient>,
    log: Arc<FileExchangeLog>,
    _dir: tempfile::TempDir,
}

fn setup_test_env(mock: MockChatClient) -> TestEnv {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let log = Arc::new(FileExchangeLog::open(dir.path()).expect("Failed to open exchange log"));
    let mock = Arc::new(mock);
    let client = ConversationClient::new("integration", mock.clone(), log.clone());

    TestEnv {
        client,
        mock,
        log,
        _dir: dir,
    }
}

fn read_master(path: &Path) -> MasterLog {
    let content = fs::read_to_string(path).expect("Master log should exist");
    serde_json::from_str(&content).expect("Master log should be valid JSON")
}

fn entry_file_count(env: &TestEnv) -> usize {
    fs::read_dir(env.log.conversations_dir())
        .expect("Conversations dir should exist")
        .count()
}

#[tokio::test]
async fn test_unknown_conversation_has_empty_history_and_end_is_noop() {
    let env = setup_test_env(MockChatClient::with_responses(Vec::<String>::new()));

    assert!(env.client.get_conversation_history("nope").await.is_empty());
    assert!(!env.client.end_conversation("nope").await.unwrap());
    assert_eq!(env.log.snapshot().await.total_entries(), 0);
    assert_eq!(entry_file_count(&env), 0);
}

#[tokio::test]
async fn test_started_conversation_is_empty() {
    let env = setup_test_env(MockChatClient::with_responses(Vec::<String>::new()));

    let id = env.client.start_conversation().await;
    assert!(env.client.get_conversation_history(&id).await.is_empty());
    assert_eq!(env.client.active_conversations().await, vec![id]);
}

#[tokio::test]
async fn test_one_turn_appends_user_and_assistant() {
    let env = setup_test_env(MockChatClient::with_responses(["hello"]));
    let id = env.client.start_conversation().await;

    let reply = env
        .client
        .request_completion(&[Message::user("hi")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .expect("Completion should succeed");

    assert_eq!(reply, "hello");
    assert_eq!(
        env.client.get_conversation_history(&id).await,
        vec![Message::user("hi"), Message::assistant("hello")]
    );
}

#[tokio::test]
async fn test_history_accumulates_and_is_sent_with_each_turn() {
    let env = setup_test_env(MockChatClient::with_responses(["a1", "a2", "a3"]));
    let id = env.client.start_conversation().await;

    for (i, prompt) in ["q1", "q2", "q3"].iter().enumerate() {
        env.client
            .request_completion(&[Message::user(*prompt)], Some(&id), DEFAULT_TEMPERATURE)
            .await
            .unwrap();
        assert_eq!(env.client.get_conversation_history(&id).await.len(), 2 * (i + 1));
    }

    let requests = env.mock.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].messages, vec![Message::user("q1")]);
    assert_eq!(
        requests[1].messages,
        vec![Message::user("q1"), Message::assistant("a1"), Message::user("q2")]
    );
    assert_eq!(requests[2].messages.len(), 5);
    assert_eq!(requests[2].temperature, DEFAULT_TEMPERATURE);
}

#[tokio::test]
async fn test_every_completion_logs_exactly_one_entry() {
    let env = setup_test_env(MockChatClient::with_responses(["one", "two", "three"]));
    let id = env.client.start_conversation().await;

    env.client
        .request_completion(&[Message::user("solo")], None, DEFAULT_TEMPERATURE)
        .await
        .unwrap();
    env.client
        .request_completion(&[Message::user("first")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .unwrap();
    env.client
        .request_completion(&[Message::user("second")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .unwrap();

    let master = read_master(env.log.master_log_path());
    assert_eq!(master.total_entries(), 3);
    assert_eq!(master.entries(SINGLE_INTERACTION_KEY).len(), 1);
    assert_eq!(master.entries(SINGLE_INTERACTION_KEY)[0].response(), "one");

    let entries = master.entries(&id);
    assert_eq!(entries.len(), 2);
    // Entries carry the caller's input, not the outbound history.
    assert_eq!(entries[1].messages(), &[Message::user("second")]);
    assert_eq!(entries[1].response(), "three");
    assert!(entries.iter().all(|e| e.module() == "integration"));

    assert_eq!(entry_file_count(&env), 3);
}

#[tokio::test]
async fn test_clear_one_conversation_leaves_others() {
    let env = setup_test_env(MockChatClient::with_responses(["a", "b"]));
    let first = env.client.start_conversation().await;
    let second = env.client.start_conversation().await;

    env.client
        .request_completion(&[Message::user("x")], Some(&first), DEFAULT_TEMPERATURE)
        .await
        .unwrap();
    env.client
        .request_completion(&[Message::user("y")], Some(&second), DEFAULT_TEMPERATURE)
        .await
        .unwrap();

    env.client.clear_conversation_history(Some(&first)).await;

    assert!(env.client.get_conversation_history(&first).await.is_empty());
    assert_eq!(env.client.get_conversation_history(&second).await.len(), 2);
    assert_eq!(env.client.active_conversations().await.len(), 2);

    env.client.clear_conversation_history(None).await;
    assert!(env.client.get_conversation_history(&second).await.is_empty());
    assert!(env.client.active_conversations().await.is_empty());
    // Clearing memory never touches the logs.
    assert_eq!(env.log.snapshot().await.total_entries(), 2);
}

#[tokio::test]
async fn test_end_conversation_logs_final_history_and_forgets_it() {
    let env = setup_test_env(MockChatClient::with_responses(["hello", "bye"]));
    let id = env.client.start_conversation().await;

    env.client
        .request_completion(&[Message::user("hi")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .unwrap();
    env.client
        .request_completion(&[Message::user("leaving")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .unwrap();
    let before = env.client.get_conversation_history(&id).await;

    assert!(env.client.end_conversation(&id).await.unwrap());

    assert!(env.client.get_conversation_history(&id).await.is_empty());
    assert!(env.client.active_conversations().await.is_empty());

    let master = read_master(env.log.master_log_path());
    let entries = master.entries(&id);
    assert_eq!(entries.len(), 3);
    let last = &entries[2];
    assert_eq!(last.response(), CONVERSATION_ENDED);
    assert_eq!(last.messages(), before.as_slice());
    assert_eq!(entry_file_count(&env), 3);

    // A second end is a no-op.
    assert!(!env.client.end_conversation(&id).await.unwrap());
    assert_eq!(env.log.snapshot().await.entries(&id).len(), 3);
}

#[tokio::test]
async fn test_remote_failure_propagates_and_leaves_history_unchanged() {
    let env = setup_test_env(MockChatClient::scripted([
        Ok("fine".to_string()),
        Err("503 upstream unavailable".to_string()),
    ]));
    let id = env.client.start_conversation().await;

    env.client
        .request_completion(&[Message::user("first")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .unwrap();
    let before = env.client.get_conversation_history(&id).await;

    let err = env
        .client
        .request_completion(&[Message::user("second")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .expect_err("Remote failure should surface");

    assert!(err.is_remote_call());
    assert!(err.to_string().contains("503 upstream unavailable"));
    assert_eq!(env.client.get_conversation_history(&id).await, before);
    assert_eq!(env.log.snapshot().await.total_entries(), 1);
}

/// Put a non-empty directory where the master log goes so saving it fails.
fn block_master_log(env: &TestEnv) {
    let path = env.log.master_log_path();
    if path.is_file() {
        fs::remove_file(path).unwrap();
    }
    fs::create_dir(path).unwrap();
    fs::write(path.join("occupied"), "x").unwrap();
}

fn unblock_master_log(env: &TestEnv) {
    fs::remove_dir_all(env.log.master_log_path()).unwrap();
}

#[tokio::test]
async fn test_log_write_failure_surfaces_and_records_nothing() {
    let env = setup_test_env(MockChatClient::with_responses(["r1"]));
    let id = env.client.start_conversation().await;

    block_master_log(&env);
    let err = env
        .client
        .request_completion(&[Message::user("q1")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .expect_err("Log write failure should surface");

    assert!(!err.is_remote_call());
    assert_eq!(env.log.snapshot().await.total_entries(), 0);
    assert_eq!(entry_file_count(&env), 0);
    // The turn itself succeeded, so the history keeps it.
    assert_eq!(env.client.get_conversation_history(&id).await.len(), 2);
}

#[tokio::test]
async fn test_end_conversation_retry_after_log_failure_logs_once() {
    let env = setup_test_env(MockChatClient::with_responses(["hello"]));
    let id = env.client.start_conversation().await;
    env.client
        .request_completion(&[Message::user("hi")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .unwrap();

    block_master_log(&env);
    assert!(env.client.end_conversation(&id).await.is_err());
    assert_eq!(env.client.active_conversations().await, vec![id.clone()]);
    assert_eq!(env.log.snapshot().await.entries(&id).len(), 1);

    unblock_master_log(&env);
    assert!(env.client.end_conversation(&id).await.unwrap());

    let master = read_master(env.log.master_log_path());
    let ended = master
        .entries(&id)
        .iter()
        .filter(|e| e.response() == CONVERSATION_ENDED)
        .count();
    assert_eq!(ended, 1);
    assert_eq!(master.entries(&id).len(), 2);
    assert_eq!(entry_file_count(&env), 2);
    assert!(env.client.active_conversations().await.is_empty());
}

#[tokio::test]
async fn test_master_log_survives_client_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let log = Arc::new(FileExchangeLog::open(dir.path()).unwrap());
        let client = ConversationClient::new(
            "first-run",
            Arc::new(MockChatClient::with_responses(["r1"])),
            log,
        );
        client
            .request_completion(&[Message::user("q1")], None, DEFAULT_TEMPERATURE)
            .await
            .unwrap();
    }

    let log = Arc::new(FileExchangeLog::open(dir.path()).unwrap());
    let client = ConversationClient::new(
        "second-run",
        Arc::new(MockChatClient::with_responses(["r2"])),
        log.clone(),
    );
    client
        .request_completion(&[Message::user("q2")], None, DEFAULT_TEMPERATURE)
        .await
        .unwrap();

    let master = read_master(log.master_log_path());
    let modules: Vec<&str> = master
        .entries(SINGLE_INTERACTION_KEY)
        .iter()
        .map(|e| e.module())
        .collect();
    assert_eq!(modules, vec!["first-run", "second-run"]);
}

#[tokio::test]
async fn test_diagnostics_go_to_the_client_log_file() {
    let env = setup_test_env(MockChatClient::scripted([
        Ok("reply".to_string()),
        Err("connection reset".to_string()),
    ]));
    let log_root = env.log.conversations_dir().parent().unwrap();
    let diagnostics = DiagnosticLog::create(log_root, "integration", false).unwrap();
    let client = ConversationClient::new("integration", env.mock.clone(), env.log.clone())
        .with_diagnostics(diagnostics.dispatch());

    let id = client.start_conversation().await;
    client
        .request_completion(&[Message::user("tell me a story")], Some(&id), DEFAULT_TEMPERATURE)
        .await
        .unwrap();
    let _ = client
        .request_completion(&[Message::user("again")], Some(&id), DEFAULT_TEMPERATURE)
        .await;
    client.end_conversation(&id).await.unwrap();

    let text = fs::read_to_string(diagnostics.path()).unwrap();
    assert!(text.contains(&format!("Started new conversation: {id}")));
    assert!(text.contains(&format!("Updated conversation {id} history. Current length: 2")));
    assert!(text.contains("Generated response for prompt: tell me a story..."));
    assert!(text.contains("Error getting completion"));
    assert!(text.contains("connection reset"));
    assert!(text.contains(&format!("Ended conversation: {id}")));
    assert!(text.contains("module=integration"));
}
