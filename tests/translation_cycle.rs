//! End-to-end translation cycles against a mock Youdao endpoint

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use seltrans::config::{Config, DisplayStyle, ProviderConfig};
use seltrans::dispatcher::{Action, Dispatcher, PHANTOM_KEY, SCRATCH_NAME, SCRATCH_SYNTAX};
use seltrans::host::{BufferHost, PointerEvent, Region, ViewId};
use seltrans::task::{FAILED_MESSAGE, SUCCEED_MESSAGE};

const VIEW: ViewId = ViewId(7);

fn config(api_url: &str, style: DisplayStyle) -> Config {
    let mut config = Config {
        separator: ", ".to_string(),
        ..Config::default()
    };
    config.providers.insert(
        "youdao".to_string(),
        ProviderConfig {
            api_url: api_url.to_string(),
            app_id: "app".to_string(),
            app_key: "secret".to_string(),
            from: "en".to_string(),
            to: "zh-CHS".to_string(),
            style,
            ..ProviderConfig::default()
        },
    );
    config
}

fn setup(host: BufferHost, config: Config) -> (Arc<BufferHost>, Dispatcher) {
    let host = Arc::new(host);
    let dispatcher = Dispatcher::from_config(host.clone(), config).unwrap();
    (host, dispatcher)
}

async fn mock_translation(server: &mut ServerGuard, q: &str, body: &str) -> mockito::Mock {
    server
        .mock("POST", "/api")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), q.into()),
            Matcher::UrlEncoded("appKey".into(), "app".into()),
            Matcher::UrlEncoded("signType".into(), "v3".into()),
            Matcher::UrlEncoded("from".into(), "en".into()),
            Matcher::UrlEncoded("to".into(), "zh-CHS".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn translate(dispatcher: &Dispatcher) {
    let worker = dispatcher
        .run(VIEW, "youdao", Action::Translate)
        .expect("translation should be scheduled");
    worker.await.unwrap();
    assert_eq!(dispatcher.pump_ui(), 1);
}

#[tokio::test]
async fn test_translate_copy_insert_sequence() {
    let mut server = Server::new_async().await;
    let mock = mock_translation(
        &mut server,
        "hello",
        r#"{"errorCode":"0","translation":["你好"],"basic":{"explains":["int. 喂"]}}"#,
    )
    .await;

    let buffer = BufferHost::new("  ,hello,  ").with_selection(Region::new(0, 11));
    let (host, dispatcher) = setup(buffer, config(&format!("{}/api", server.url()), DisplayStyle::Popup));

    translate(&dispatcher).await;
    mock.assert_async().await;

    let task = dispatcher.tasks().get(VIEW);
    assert_eq!(task.result_text.as_deref(), Some("你好"));
    assert_eq!(task.status.as_deref(), Some(SUCCEED_MESSAGE));
    assert!(task.source_text.is_empty());
    assert_eq!(host.progress().as_deref(), Some(SUCCEED_MESSAGE));

    let (anchor, content) = host.popup().expect("popup shown");
    assert_eq!(anchor, 5);
    assert!(content.contains("## 原文：\nhello\n"));
    assert!(content.contains("- 你好\n"));

    dispatcher.run(VIEW, "youdao", Action::Copy);
    assert_eq!(host.clipboard(), "你好");
    let task = dispatcher.tasks().get(VIEW);
    assert_eq!(task.region, Some(Region::new(0, 11)));
    assert_eq!(task.result_text.as_deref(), Some("你好"));

    dispatcher.run(VIEW, "youdao", Action::Insert);
    assert_eq!(host.text(), "  ,hello,  \n你好\n");
    let task = dispatcher.tasks().get(VIEW);
    assert_eq!(task.region, None);
    assert_eq!(task.result_text, None);

    // nothing left to insert
    dispatcher.run(VIEW, "youdao", Action::Insert);
    assert_eq!(host.text(), "  ,hello,  \n你好\n");
    assert_eq!(host.statuses().last().map(String::as_str), Some("No translation to insert."));
}

#[tokio::test]
async fn test_replace_via_result_link() {
    let mut server = Server::new_async().await;
    let _mock = mock_translation(&mut server, "world", r#"{"translation":["世界"]}"#).await;

    let buffer = BufferHost::new("hello world").with_cursor(8);
    let (host, dispatcher) = setup(buffer, config(&format!("{}/api", server.url()), DisplayStyle::Phantom));

    translate(&dispatcher).await;
    let (region, _) = host.phantom(PHANTOM_KEY).expect("phantom shown");
    assert_eq!(region, Region::new(6, 11));

    dispatcher.navigate(VIEW, "youdao", "replace");
    assert_eq!(host.text(), "hello 世界");
    assert!(host.phantom(PHANTOM_KEY).is_none());
    assert_eq!(dispatcher.tasks().get(VIEW).result_text, None);
}

#[tokio::test]
async fn test_connection_failure() {
    // nothing listens on port 1
    let buffer = BufferHost::new("hello").with_selection(Region::new(0, 5));
    let (host, dispatcher) = setup(buffer, config("http://127.0.0.1:1/api", DisplayStyle::Popup));

    translate(&dispatcher).await;

    let task = dispatcher.tasks().get(VIEW);
    assert_eq!(task.result_text, None);
    assert_eq!(task.region, None);
    assert!(task.source_text.is_empty());

    let failures: Vec<String> = host
        .statuses()
        .into_iter()
        .filter(|s| s == "连接失败，请检查你的网络状态")
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(host.statuses().len(), 1);
    assert_eq!(host.progress().as_deref(), Some(FAILED_MESSAGE));
    assert!(host.popup().is_none());

    // the session stays usable
    dispatcher.run(VIEW, "youdao", Action::Copy);
    assert_eq!(host.statuses().last().map(String::as_str), Some("No translation to copy."));
}

#[tokio::test]
async fn test_unanswered_request_times_out() {
    // accepts connections and never writes a response
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _stalled = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let buffer = BufferHost::new("hello").with_selection(Region::new(0, 5));
    let (host, dispatcher) = setup(buffer, config(&format!("http://{}/api", addr), DisplayStyle::Popup));

    translate(&dispatcher).await;

    assert_eq!(host.statuses(), vec!["连接超时，请检查你的网络状态".to_string()]);
    assert_eq!(host.progress().as_deref(), Some(FAILED_MESSAGE));
    assert!(host.popup().is_none());
    assert_eq!(dispatcher.tasks().get(VIEW).result_text, None);
}

#[tokio::test]
async fn test_malformed_response_is_request_failure() {
    let mut server = Server::new_async().await;
    let _mock = mock_translation(&mut server, "hello", "<html>busy</html>").await;

    let buffer = BufferHost::new("hello").with_selection(Region::new(0, 5));
    let (host, dispatcher) = setup(buffer, config(&format!("{}/api", server.url()), DisplayStyle::Popup));

    translate(&dispatcher).await;

    assert_eq!(host.statuses(), vec!["数据请求失败！".to_string()]);
    assert_eq!(dispatcher.tasks().get(VIEW).result_text, None);
}

#[tokio::test]
async fn test_stale_completion_is_discarded() {
    let mut server = Server::new_async().await;
    let _hello = mock_translation(&mut server, "hello", r#"{"translation":["你好"]}"#).await;
    let _world = mock_translation(&mut server, "world", r#"{"translation":["世界"]}"#).await;

    let buffer = BufferHost::new("hello world").with_selection(Region::new(0, 5));
    let (host, dispatcher) = setup(buffer, config(&format!("{}/api", server.url()), DisplayStyle::Popup));

    let first = dispatcher.run(VIEW, "youdao", Action::Translate).unwrap();
    host.select(Some(Region::new(6, 11)));
    let second = dispatcher.run(VIEW, "youdao", Action::Translate).unwrap();
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(dispatcher.pump_ui(), 2);

    let task = dispatcher.tasks().get(VIEW);
    assert_eq!(task.result_text.as_deref(), Some("世界"));
    assert_eq!(task.region, Some(Region::new(6, 11)));
    let (_, content) = host.popup().unwrap();
    assert!(content.contains("世界"));
    assert!(!content.contains("你好"));
}

#[tokio::test]
async fn test_view_style_opens_scratch_buffer() {
    let mut server = Server::new_async().await;
    let _mock = mock_translation(&mut server, "hello", r#"{"translation":["你好"]}"#).await;

    let buffer = BufferHost::new("hello").with_selection(Region::new(0, 5));
    let (host, dispatcher) = setup(buffer, config(&format!("{}/api", server.url()), DisplayStyle::View));

    translate(&dispatcher).await;

    let scratch = host.scratch_buffers();
    assert_eq!(scratch.len(), 1);
    assert_eq!(scratch[0].name, SCRATCH_NAME);
    assert_eq!(scratch[0].syntax, SCRATCH_SYNTAX);
    assert!(scratch[0].content.contains("\"translation\""));
    assert!(host.popup().is_none());

    dispatcher.run(VIEW, "youdao", Action::Copy);
    assert_eq!(host.clipboard(), "你好");
}

#[tokio::test]
async fn test_fallback_endpoint_without_credentials() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/openapi.do")
        .match_body(Matcher::Exact("q=hello".to_string()))
        .with_status(200)
        .with_body(r#"{"errorCode":0,"translation":["你好"]}"#)
        .create_async()
        .await;

    let mut config = Config::default();
    config.providers.insert(
        "youdao".to_string(),
        ProviderConfig {
            fallback_url: format!("{}/openapi.do", server.url()),
            ..ProviderConfig::default()
        },
    );

    let buffer = BufferHost::new("hello").with_selection(Region::new(0, 5));
    let (_host, dispatcher) = setup(buffer, config);

    translate(&dispatcher).await;
    mock.assert_async().await;
    assert_eq!(dispatcher.tasks().get(VIEW).result_text.as_deref(), Some("你好"));
}

#[tokio::test]
async fn test_menu_selection_feeds_translate() {
    let mut server = Server::new_async().await;
    let mock = mock_translation(&mut server, "world", r#"{"translation":["世界"]}"#).await;

    // caret on "hello", pointer on "world"
    let buffer = BufferHost::new("hello world").with_cursor(1);
    let (_host, dispatcher) = setup(buffer, config(&format!("{}/api", server.url()), DisplayStyle::Popup));

    let entry = dispatcher.menu(VIEW, PointerEvent { x: 8.0, y: 3.0 }).expect("menu entry");
    let command = match entry {
        seltrans::menu::MenuEntry::Item(item) => item.command,
        other => panic!("expected a single item, got {:?}", other),
    };
    assert_eq!(command, "youdao_translator");

    let worker = dispatcher.run_command(VIEW, &command, Action::Translate).unwrap();
    worker.await.unwrap();
    dispatcher.pump_ui();

    mock.assert_async().await;
    assert_eq!(dispatcher.tasks().get(VIEW).result_text.as_deref(), Some("世界"));
}

#[tokio::test]
async fn test_closed_menu_does_not_leak_into_translate() {
    let mut server = Server::new_async().await;
    let hello = mock_translation(&mut server, "hello", r#"{"translation":["你好"]}"#).await;
    let world = server
        .mock("POST", "/api")
        .match_body(Matcher::UrlEncoded("q".into(), "world".into()))
        .with_status(200)
        .with_body(r#"{"translation":["世界"]}"#)
        .expect(0)
        .create_async()
        .await;

    let buffer = BufferHost::new("hello world");
    let (host, dispatcher) = setup(buffer, config(&format!("{}/api", server.url()), DisplayStyle::Popup));

    // menu opened over "world" and closed without a choice
    assert!(dispatcher.menu(VIEW, PointerEvent { x: 8.0, y: 0.0 }).is_some());
    host.select(Some(Region::new(0, 5)));

    translate(&dispatcher).await;

    hello.assert_async().await;
    world.assert_async().await;
    let task = dispatcher.tasks().get(VIEW);
    assert_eq!(task.result_text.as_deref(), Some("你好"));
    assert_eq!(task.region, Some(Region::new(0, 5)));
    assert_eq!(task.pending, None);
}

#[tokio::test]
async fn test_failed_cycle_removes_previous_phantom() {
    let mut server = Server::new_async().await;
    let _hello = mock_translation(&mut server, "hello", r#"{"translation":["你好"]}"#).await;

    let buffer = BufferHost::new("hello world").with_selection(Region::new(0, 5));
    let (host, dispatcher) = setup(buffer, config(&format!("{}/api", server.url()), DisplayStyle::Phantom));

    translate(&dispatcher).await;
    assert!(host.phantom(PHANTOM_KEY).is_some());

    // no mock answers for "world"
    host.select(Some(Region::new(6, 11)));
    translate(&dispatcher).await;

    assert_eq!(host.statuses(), vec!["数据请求失败！".to_string()]);
    assert!(host.phantom(PHANTOM_KEY).is_none());

    dispatcher.navigate(VIEW, "youdao", "hide");
    assert!(host.phantom(PHANTOM_KEY).is_none());
    assert_eq!(dispatcher.tasks().get(VIEW).display, None);
}

#[tokio::test]
async fn test_nothing_to_translate() {
    let buffer = BufferHost::new("  ,,  ").with_selection(Region::new(0, 6)).with_cursor(3);
    let (host, dispatcher) = setup(buffer, config("http://127.0.0.1:1/api", DisplayStyle::Popup));

    assert!(dispatcher.run(VIEW, "youdao", Action::Translate).is_none());
    assert_eq!(host.statuses(), vec!["No words to be translate.".to_string()]);
    assert_eq!(host.progress(), None);
}
