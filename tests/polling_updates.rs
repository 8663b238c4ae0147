mod common;

use std::sync::Arc;

use calendarBot::clients::telegram_client::TelegramUpdate;
use calendarBot::clients::webhook_client::WebhookResult;
use calendarBot::handlers::dispatcher::Dispatcher;
use calendarBot::models::outcome::{HELP_TEXT, PARSE_FAILED_TEXT};
use calendarBot::tasks::polling_loop::dispatch_updates;
use common::{RecordingResponder, RecordingWebhook, ScriptedParser};

fn updates(raw: &str) -> Vec<TelegramUpdate> {
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn updates_are_handled_in_order() {
    let parser = Arc::new(ScriptedParser::new(None));
    let webhook = Arc::new(RecordingWebhook::new(WebhookResult::Accepted));
    let dispatcher = Dispatcher::new(parser.clone(), webhook.clone());
    let responder = RecordingResponder::default();

    let batch = updates(
        r#"[
        {"update_id":1,"message":{"chat":{"id":10},"text":"/help"}},
        {"update_id":2,"message":{"chat":{"id":11},"text":"/start"}},
        {"update_id":3,"message":{"chat":{"id":12}}},
        {"update_id":4},
        {"update_id":5,"message":{"chat":{"id":13},"text":"no dates here"}}
    ]"#,
    );
    dispatch_updates(&dispatcher, &responder, batch).await;

    let replies = responder.replies.lock().await;
    assert_eq!(
        replies.as_slice(),
        &[
            ("10".to_string(), HELP_TEXT.to_string()),
            ("13".to_string(), PARSE_FAILED_TEXT.to_string()),
        ]
    );
    assert_eq!(*parser.seen.lock().unwrap(), vec!["no dates here".to_string()]);
    assert_eq!(webhook.calls().await, 0);
}
