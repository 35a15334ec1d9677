mod common;

use common::{profile_for, STOREFRONT_PAGE};
use replyline::io::ScriptCommandStream;
use replyline::models::{review_state, ReviewId, ReviewState};
use replyline::{
    AppController, Document, HttpTransport, PageDocument, RecordingNotifier, ReplyController,
    Selector,
};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NEW_REPLY: &str = r#"<div class="review-reply" data-reply-id="9"><div class="reply-content"><p>Glad you like it</p></div><button class="btn btn-sm edit-reply-btn" data-reply-id="9">Edit</button><button class="btn btn-sm delete-reply-btn" data-reply-id="9">Delete</button></div>"#;

fn controller(server: &MockServer, notifier: &Arc<RecordingNotifier>) -> ReplyController<PageDocument> {
    let transport = HttpTransport::new(&profile_for(&server.uri())).unwrap();
    ReplyController::new(
        PageDocument::parse(STOREFRONT_PAGE),
        Arc::new(transport),
        notifier.clone(),
    )
}

async fn run_script(
    controller: ReplyController<PageDocument>,
    lines: &[&str],
) -> (ReplyController<PageDocument>, String) {
    let mut session = AppController::new(
        controller.clone(),
        ScriptCommandStream::new(lines.iter().copied()),
        Vec::new(),
    );
    session.run().await.unwrap();
    let output = String::from_utf8(session.output().clone()).unwrap();
    (controller, output)
}

async fn state_of(controller: &ReplyController<PageDocument>, review: &str) -> Option<ReviewState> {
    let document = controller.document();
    let document = document.lock().await;
    review_state(&*document, &ReviewId::new(review))
}

#[tokio::test]
async fn reply_lifecycle_should_round_trip_through_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/review/42/reply/"))
        .and(header("X-CSRFToken", "page-token"))
        .and(body_string_contains("reply_text=Glad+you+like+it"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "reply_html": NEW_REPLY,
            "message": "Reply posted"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/review-reply/9/edit/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "reply_text": "Glad you like it"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/review-reply/9/edit/"))
        .and(body_string_contains("reply_text=Glad+you+love+it"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "reply_html": NEW_REPLY.replace("like", "love"),
            "message": "Reply updated"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/review-reply/9/delete/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "message": "Reply deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::accepting());
    let (controller, output) = run_script(
        controller(&server, &notifier),
        &[
            "click .show-reply-form-btn[data-review-id=42]",
            "type .reply-form[data-review-id=42] Glad you like it",
            "submit .reply-form[data-review-id=42]",
            "wait",
            "state 42",
            "click .edit-reply-btn[data-reply-id=9]",
            "wait",
            "state 42",
            "type .edit-reply-form Glad you love it",
            "submit .edit-reply-form",
            "wait",
            "state 42",
            "click .delete-reply-btn[data-reply-id=9]",
        ],
    )
    .await;

    assert_eq!(
        output,
        "review 42: displayed\nreview 42: editing\nreview 42: displayed\n"
    );
    assert_eq!(
        notifier.alerts(),
        vec!["Reply posted", "Reply updated", "Reply deleted"]
    );
    assert_eq!(state_of(&controller, "42").await, Some(ReviewState::Absent));

    // The compose affordance is back and usable
    run_script(
        controller.clone(),
        &["click .show-reply-form-btn[data-review-id=42]"],
    )
    .await;
    assert_eq!(state_of(&controller, "42").await, Some(ReviewState::Composing));
}

#[tokio::test]
async fn rejected_delete_should_leave_reply_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/review-reply/7/delete/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "status": "error",
            "message": "Not authorized"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::accepting());
    let (controller, _) = run_script(
        controller(&server, &notifier),
        &["click .delete-reply-btn[data-reply-id=7]"],
    )
    .await;

    assert_eq!(notifier.alerts(), vec!["Not authorized"]);
    assert_eq!(state_of(&controller, "43").await, Some(ReviewState::Displayed));
    let document = controller.document();
    assert_eq!(document.lock().await.markup(), STOREFRONT_PAGE);
}

#[tokio::test]
async fn server_failure_should_keep_typed_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/review/42/reply/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::accepting());
    let (controller, _) = run_script(
        controller(&server, &notifier),
        &[
            "click .show-reply-form-btn[data-review-id=42]",
            "type textarea[name=reply_text] Thanks!",
            "submit .reply-form",
        ],
    )
    .await;

    assert_eq!(notifier.alerts(), vec!["Error posting reply"]);
    assert_eq!(state_of(&controller, "42").await, Some(ReviewState::Composing));

    let document = controller.document();
    let document = document.lock().await;
    let textarea = document
        .query(document.root(), &Selector::tag("textarea"))
        .unwrap();
    let button = document
        .query(
            document.root(),
            &Selector::tag("button").with_attr_value("type", "submit"),
        )
        .unwrap();
    assert_eq!(document.value(textarea).as_deref(), Some("Thanks!"));
    assert_eq!(document.attribute(button, "disabled"), None);
    assert_eq!(document.inner_markup(button).as_deref(), Some("Post Reply"));
}
