use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};

use vital_lens::analysis::{
    AnalysisInput, AnalysisResult, Category, IngredientAnalysis, InputKind,
};
use vital_lens::analysis_request::{build_analysis_request, IMAGE_MIME_TYPE};
use vital_lens::analyzer::{
    parse_analysis_text, AnalysisError, AnalysisProvider, GENERIC_FAILURE_MESSAGE,
};
use vital_lens::api_connection::endpoints::Part;
use vital_lens::image_input::ImagePayload;
use vital_lens::presentation::{category_tag, ResultView};
use vital_lens::session::{AppState, Session, SessionError};

enum Reply {
    Success,
    Empty,
    Malformed,
    Transport(&'static str),
}

struct MockProvider {
    reply: Reply,
    seen: Mutex<Vec<AnalysisInput>>,
}

impl MockProvider {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<AnalysisInput> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    async fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult, AnalysisError> {
        self.seen.lock().unwrap().push(input.clone());
        match self.reply {
            Reply::Success => Ok(sugar_result()),
            Reply::Empty => parse_analysis_text(None),
            Reply::Malformed => parse_analysis_text(Some("{\"inferredIntent\": \"x\"}")),
            Reply::Transport(message) => Err(AnalysisError::TransportError(message.to_string())),
        }
    }
}

fn sugar_result() -> AnalysisResult {
    AnalysisResult {
        inferred_intent: "Checking for added sugar.".to_string(),
        reasoning_chain: "Sugar is the second ingredient.".to_string(),
        ingredients: vec![IngredientAnalysis {
            name: "Sugar".to_string(),
            significance: "Raises blood glucose.".to_string(),
            trade_offs: "Taste vs metabolic load.".to_string(),
            category: Category::Sweetener,
        }],
        ingredient_interactions: vec![],
        uncertainty_disclaimer: "Exact amounts are not listed.".to_string(),
        summary: "A sweetened drink.".to_string(),
        suggested_action: "Treat it as an occasional drink.".to_string(),
    }
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn captured_warnings(f: impl FnOnce()) -> String {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = log.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn assert_reset_state(session: &Session) {
    assert_eq!(session.state(), &AppState::Idle);
    assert!(session.result().is_none());
    assert!(session.error().is_none());
    assert_eq!(session.raw_text(), "");
    assert!(session.preview_url().is_none());
}

#[tokio::test]
async fn test_text_submission_end_to_end() {
    let provider = MockProvider::new(Reply::Success);
    let mut session = Session::new();
    assert!(!session.can_submit_text());

    session.set_raw_text("water, sugar, citric acid");
    assert!(session.can_submit_text());
    let ticket = session.submit_text().unwrap();
    assert!(session.is_analyzing());
    assert_eq!(ticket.input, AnalysisInput::text("water, sugar, citric acid"));

    let request = build_analysis_request(&ticket.input, "m");
    assert!(request.contents[0].parts[0]
        .as_text()
        .unwrap()
        .contains("water, sugar, citric acid"));

    let state = session.analyze_with(&provider, ticket).await;
    assert_eq!(state.name(), "result");
    assert_eq!(provider.seen().len(), 1);

    let result = session.result().unwrap();
    let mut view = ResultView::new(result);
    let rendered = view.render(session.preview_url());
    assert!(rendered.contains(&format!("Sugar {}", category_tag(Category::Sweetener))));
    assert!(rendered.contains("[SWEETENER]"));

    view.set_search("sug");
    assert_eq!(view.visible_ingredients().len(), 1);
}

#[tokio::test]
async fn test_image_submission_sends_bare_base64() {
    let provider = MockProvider::new(Reply::Success);
    let mut session = Session::new();
    let image = ImagePayload::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg").unwrap();
    let preview = image.preview_url.clone();

    let ticket = session.select_image(image).unwrap();
    assert_eq!(session.preview_url(), Some(preview.as_str()));
    assert_eq!(ticket.input.kind, InputKind::Image);
    assert!(!ticket.input.content.starts_with("data:"));

    let request = build_analysis_request(&ticket.input, "m");
    match &request.contents[0].parts[0] {
        Part::InlineData { inline_data } => {
            assert_eq!(inline_data.mime_type, IMAGE_MIME_TYPE);
            assert!(!inline_data.data.contains("base64,"));
        }
        other => panic!("expected inline image first, got {:?}", other),
    }

    session.analyze_with(&provider, ticket).await;
    assert!(session.result().is_some());
    assert_eq!(provider.seen()[0].kind, InputKind::Image);
}

#[tokio::test]
async fn test_data_url_image_is_stripped() {
    let mut session = Session::new();
    let image = ImagePayload {
        mime_type: "image/jpeg".to_string(),
        base64: "data:image/jpeg;base64,/9j/4AAQ".to_string(),
        preview_url: "data:image/jpeg;base64,/9j/4AAQ".to_string(),
    };
    let ticket = session.select_image(image).unwrap();
    assert_eq!(ticket.input.content, "/9j/4AAQ");
}

#[tokio::test]
async fn test_failures_route_to_error_state() {
    let cases = [
        (Reply::Empty, GENERIC_FAILURE_MESSAGE.to_string()),
        (Reply::Transport("connection reset"), "connection reset".to_string()),
    ];
    for (reply, expected) in cases {
        let provider = MockProvider::new(reply);
        let mut session = Session::new();
        session.set_raw_text("salt");
        let ticket = session.submit_text().unwrap();
        session.analyze_with(&provider, ticket).await;
        assert_eq!(session.error(), Some(expected.as_str()));
        assert!(session.result().is_none());
    }

    let provider = MockProvider::new(Reply::Malformed);
    let mut session = Session::new();
    session.set_raw_text("salt");
    let ticket = session.submit_text().unwrap();
    session.analyze_with(&provider, ticket).await;
    let message = session.error().unwrap();
    assert!(message.starts_with("Malformed analysis response"), "{}", message);
}

#[test]
fn test_blank_text_is_refused() {
    let mut session = Session::new();
    session.set_raw_text("   \n ");
    assert!(!session.can_submit_text());
    assert_eq!(session.submit_text(), Err(SessionError::EmptyInput));
    assert_eq!(session.state(), &AppState::Idle);
}

#[test]
fn test_no_second_analysis_while_in_flight() {
    let mut session = Session::new();
    session.set_raw_text("salt");
    session.submit_text().unwrap();
    assert_eq!(session.submit_text(), Err(SessionError::AnalysisInFlight));
    let image = ImagePayload::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg").unwrap();
    assert_eq!(
        session.select_image(image),
        Err(SessionError::AnalysisInFlight)
    );
}

#[test]
fn test_result_state_requires_reset_before_new_analysis() {
    let mut session = Session::new();
    session.set_raw_text("salt");
    let ticket = session.submit_text().unwrap();
    assert!(session.settle(ticket.id, Ok(sugar_result())));
    session.set_raw_text("sugar");
    assert_eq!(session.submit_text(), Err(SessionError::NotIdle("result")));
}

#[test]
fn test_reset_from_every_state() {
    let mut session = Session::new();
    session.reset();
    assert_reset_state(&session);

    session.set_raw_text("salt");
    let ticket = session.submit_text().unwrap();
    session.settle(ticket.id, Ok(sugar_result()));
    session.reset();
    assert_reset_state(&session);

    let image = ImagePayload::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg").unwrap();
    let ticket = session.select_image(image).unwrap();
    session.settle(ticket.id, Err(AnalysisError::TransportError("down".into())));
    assert_eq!(session.error(), Some("down"));
    session.reset();
    assert_reset_state(&session);
}

#[test]
fn test_stale_response_after_reset_is_ignored() {
    let mut session = Session::new();
    session.set_raw_text("salt");
    let ticket = session.submit_text().unwrap();
    session.reset();

    assert!(!session.settle(ticket.id, Ok(sugar_result())));
    assert_reset_state(&session);
}

#[test]
fn test_stale_response_does_not_overwrite_newer_request() {
    let mut session = Session::new();
    session.set_raw_text("salt");
    let first = session.submit_text().unwrap();
    session.reset();

    session.set_raw_text("sugar");
    let second = session.submit_text().unwrap();
    assert!(second.id > first.id);

    assert!(!session.settle(first.id, Err(AnalysisError::EmptyResponse(None))));
    assert_eq!(
        session.state(),
        &AppState::Analyzing {
            request_id: second.id
        }
    );

    assert!(session.settle(second.id, Ok(sugar_result())));
    assert!(session.result().is_some());
    assert!(!session.settle(second.id, Err(AnalysisError::EmptyResponse(None))));
    assert!(session.result().is_some());
}

#[tokio::test]
async fn test_reset_while_provider_call_is_pending() {
    let provider = std::sync::Arc::new(MockProvider::new(Reply::Success));
    let mut session = Session::new();
    session.set_raw_text("water, sugar");
    let ticket = session.submit_text().unwrap();

    let worker = {
        let provider = provider.clone();
        let input = ticket.input.clone();
        tokio::spawn(async move { provider.analyze(&input).await })
    };
    session.reset();

    let outcome = worker.await.unwrap();
    assert!(outcome.is_ok());
    assert!(!session.settle(ticket.id, outcome));
    assert_reset_state(&session);
}

#[test]
fn test_refused_submissions_log_warnings() {
    let blank = captured_warnings(|| {
        let mut session = Session::new();
        session.set_raw_text("  ");
        assert_eq!(session.submit_text(), Err(SessionError::EmptyInput));
    });
    assert!(blank.contains("WARN"), "{}", blank);
    assert!(blank.contains("Submission refused"), "{}", blank);
    assert!(blank.contains("Ingredient text is empty"), "{}", blank);

    let busy = captured_warnings(|| {
        let mut session = Session::new();
        session.set_raw_text("salt");
        session.submit_text().unwrap();
        let image = ImagePayload::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg").unwrap();
        assert_eq!(
            session.select_image(image),
            Err(SessionError::AnalysisInFlight)
        );
    });
    assert!(busy.contains("Submission refused"), "{}", busy);
    assert!(busy.contains("state=\"analyzing\""), "{}", busy);
}

#[test]
fn test_accepted_submission_logs_no_warning() {
    let log = captured_warnings(|| {
        let mut session = Session::new();
        session.set_raw_text("salt");
        session.submit_text().unwrap();
    });
    assert!(!log.contains("Submission refused"), "{}", log);
}
