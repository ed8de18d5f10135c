//! End-to-end scenarios for the chat session core.

use std::time::Duration;

use chatroom_core::chat::{
    Author, ChatConfig, ChatError, ChatManager, ReplyConfig, ReplyScheduler, SendPolicy,
    SharedStore,
};

fn manager(config: ChatConfig) -> ChatManager {
    ChatManager::new(config).unwrap_or_else(|e| unreachable!("config rejected: {e}"))
}

#[tokio::test(start_paused = true)]
async fn test_alpha_receives_templated_reply() {
    let mut chat = manager(ChatConfig::default());
    let alpha = chat.create_session("Alpha").unwrap_or_default();
    chat.select_session(Some(alpha)).unwrap_or_default();

    let ticket = chat.send_message("hi").unwrap_or_else(|e| unreachable!("{e}"));
    assert_eq!(ticket.template_index, Some(0));

    // Past the upper bound L + R of the reply delay.
    tokio::time::sleep(Duration::from_millis(2501)).await;
    tokio::task::yield_now().await;

    let messages = chat.visible_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].author(), Author::User);
    assert_eq!(messages[1].author(), Author::Counterpart);
    assert_eq!(messages[1].content(), "Understood: \"hi\". I am here to help you.");
    assert!(messages[0].created_at() < messages[1].created_at());
}

#[tokio::test(start_paused = true)]
async fn test_deleting_session_with_outstanding_reply() {
    let mut chat = manager(ChatConfig::default());
    let alpha = chat.create_session("Alpha").unwrap_or_default();
    let _beta = chat.create_session("Beta").unwrap_or_default();
    chat.select_session(Some(alpha)).unwrap_or_default();

    let _ = chat.send_message("hi");
    assert!(chat.is_replying());
    assert!(chat.delete_session(alpha));

    tokio::time::sleep(Duration::from_secs(3)).await;
    chat.drain_replies().await;

    let store = chat.store().read();
    assert_eq!(store.len(), 1);
    assert!(!store.contains(alpha));
    assert!(store.active_session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_twenty_five_messages_with_page_of_twenty() {
    let config = ChatConfig::default().with_send_policy(SendPolicy::AllowOverlap);
    let mut chat = manager(config);
    let alpha = chat.create_session("Alpha").unwrap_or_default();
    chat.select_session(Some(alpha)).unwrap_or_default();

    for i in 0..25 {
        let outcome = chat
            .store()
            .write()
            .append_message(alpha, format!("m{i}"), Author::User);
        assert!(outcome.message_id().is_some());
    }

    let visible = chat.visible_messages();
    assert_eq!(visible.len(), 20);
    assert_eq!(visible.first().map(|m| m.content().to_string()), Some("m5".to_string()));
    assert_eq!(visible.last().map(|m| m.content().to_string()), Some("m24".to_string()));
    assert!(chat.has_more());

    chat.load_older();
    assert_eq!(chat.visible_messages().len(), 25);
    assert!(!chat.has_more());
}

#[tokio::test(start_paused = true)]
async fn test_appends_to_active_session_keep_window() {
    let config = ChatConfig::default()
        .with_send_policy(SendPolicy::AllowOverlap)
        .with_reply(ReplyConfig::default().with_delay(Duration::from_millis(5), Duration::ZERO));
    let mut chat = manager(config);
    let alpha = chat.create_session("Alpha").unwrap_or_default();
    let beta = chat.create_session("Beta").unwrap_or_default();
    chat.select_session(Some(alpha)).unwrap_or_default();
    chat.load_older();
    chat.load_older();

    for i in 0..30 {
        let _ = chat.send_message(&format!("m{i}"));
    }
    chat.drain_replies().await;
    assert_eq!(chat.window_size(), 60);
    assert_eq!(chat.visible_messages().len(), 60);

    chat.select_session(Some(beta)).unwrap_or_default();
    assert_eq!(chat.window_size(), 20);
    chat.select_session(Some(alpha)).unwrap_or_default();
    assert_eq!(chat.window_size(), 20);
    assert_eq!(chat.visible_messages().len(), 20);
}

#[tokio::test(start_paused = true)]
async fn test_separate_schedulers_rotate_independently() {
    let store = SharedStore::default();
    let id = store.write().create_session("Alpha");
    let first = ReplyScheduler::new(store.clone(), ReplyConfig::default())
        .unwrap_or_else(|e| unreachable!("{e}"));
    let second = ReplyScheduler::new(store.clone(), ReplyConfig::default())
        .unwrap_or_else(|e| unreachable!("{e}"));

    assert_eq!(first.schedule(id, "a").template_index, Some(0));
    assert_eq!(first.schedule(id, "b").template_index, Some(1));
    assert_eq!(second.schedule(id, "c").template_index, Some(0));

    first.drain().await;
    second.drain().await;
    assert_eq!(store.read().session(id).map(|s| s.messages().len()), Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_debounced_search_applies_final_keystroke_only() {
    let mut chat = manager(ChatConfig::default());
    for name in ["Alpha", "Beta", "Alphabet soup", "Gamma"] {
        let _ = chat.create_session(name);
    }

    let start = tokio::time::Instant::now();
    for typed in ["g", "ga", "a", "al", "alph"] {
        chat.set_search_query(typed);
        tokio::time::sleep(Duration::from_millis(120)).await;
    }
    assert_eq!(chat.applied_query().generation, 0);
    assert_eq!(chat.filtered_sessions().len(), 4);

    assert!(chat.search_applied().await);
    let applied_after = start.elapsed();
    let applied = chat.applied_query();
    assert_eq!(applied.generation, 1);
    assert_eq!(applied.query, "alph");
    // Last keystroke at 480ms, quiet period 300ms.
    assert!(applied_after >= Duration::from_millis(780));

    let names: Vec<String> = chat.filtered_sessions().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Alpha".to_string(), "Alphabet soup".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_validation_errors_at_boundary() {
    let mut chat = manager(ChatConfig::default());
    assert!(matches!(chat.create_session(""), Err(ChatError::EmptyName)));
    assert!(matches!(chat.send_message("hi"), Err(ChatError::NoActiveSession)));
    assert!(chat.store().read().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_switch_through_shared_store_resets_window() {
    let mut chat = manager(ChatConfig::default());
    let alpha = chat.create_session("Alpha").unwrap_or_default();
    let beta = chat.create_session("Beta").unwrap_or_default();
    for i in 0..50 {
        let _ = chat
            .store()
            .write()
            .append_message(beta, format!("b{i}"), Author::User);
    }

    chat.select_session(Some(alpha)).unwrap_or_default();
    let _ = chat.load_older();
    let _ = chat.load_older();
    assert_eq!(chat.window_size(), 60);

    assert!(chat.store().write().set_active_session(Some(beta)).is_ok());
    assert_eq!(chat.window_size(), 20);
    assert_eq!(chat.visible_messages().len(), 20);
    assert!(chat.has_more());
}

#[test]
fn test_manager_requires_runtime() {
    assert!(matches!(
        ChatManager::new(ChatConfig::default()),
        Err(ChatError::NoRuntime)
    ));
}
