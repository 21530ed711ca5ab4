//! State machine tests for the TUI App.
//!
//! Each test builds an App over a `MockService` and a `MemoryClipboard`,
//! then simulates key events. Generation runs on a worker thread, so tests
//! poll until the app is idle again.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use reviewgen_core::{Category, Preset};
use reviewgen_service::mock::MockService;
use reviewgen_service::ServiceError;
use reviewgen_session::state::FAILURE_MESSAGE;
use reviewgen_session::{MemoryClipboard, SessionConfig};
use reviewgen_tui::app::{App, Mode};

const TWO_REVIEWS: &str = "###REVIEW### Sharp and kind. ###END### ###REVIEW### Ships on time. ###END###";

type TestApp = App<MockService, MemoryClipboard>;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn make_app_with(service: MockService, config: SessionConfig, presets: Vec<Preset>) -> TestApp {
    App::new(service, config, presets, MemoryClipboard::new()).unwrap()
}

fn make_app() -> TestApp {
    make_app_with(
        MockService::success(TWO_REVIEWS),
        SessionConfig::default(),
        Vec::new(),
    )
}

fn type_text(app: &mut TestApp, text: &str) {
    for c in text.chars() {
        app.handle_key(char_key(c));
    }
}

/// Enter sample text through the editor and save it.
fn set_sample(app: &mut TestApp, text: &str) {
    app.handle_key(char_key('i'));
    type_text(app, text);
    app.handle_key(ctrl('s'));
}

fn wait_for_idle(app: &mut TestApp) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while app.is_generating() {
        assert!(Instant::now() < deadline, "generation did not finish");
        std::thread::sleep(Duration::from_millis(10));
        app.poll_generation();
    }
}

#[test]
fn starts_in_normal_mode() {
    let app = make_app();
    assert!(matches!(app.mode(), Mode::Normal));
    assert!(!app.is_input_mode());
    assert!(!app.needs_polling());
    assert!(app.state().items().is_empty());
}

#[test]
fn edit_sample_saves_on_ctrl_s() {
    let mut app = make_app();
    app.handle_key(char_key('i'));
    assert!(matches!(app.mode(), Mode::EditSample { .. }));
    assert!(app.is_input_mode());

    type_text(&mut app, "Great");
    app.handle_key(key(KeyCode::Enter));
    type_text(&mut app, "tutorx");
    app.handle_key(key(KeyCode::Backspace));
    app.handle_key(ctrl('s'));

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.state().sample_text(), "Great\ntutor");
}

#[test]
fn edit_sample_esc_discards() {
    let mut app = make_app();
    set_sample(&mut app, "kept");
    app.handle_key(char_key('e'));
    type_text(&mut app, " more");
    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.state().sample_text(), "kept");
}

#[test]
fn generate_fills_list() {
    let mut app = make_app();
    set_sample(&mut app, "Great mentor");
    app.handle_key(char_key('g'));
    assert!(app.is_generating());
    assert!(app.needs_polling());

    wait_for_idle(&mut app);

    let items = app.state().items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text, "Sharp and kind.");
    assert_eq!(items[1].text, "Ships on time.");
    assert_eq!(app.selected_item().unwrap().text, "Sharp and kind.");
    assert_eq!(app.status_message(), Some("Generated 2 reviews"));

    let requests = app.service().inner().requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Great mentor"));
}

#[test]
fn generate_with_empty_text_is_rejected() {
    let mut app = make_app();
    app.handle_key(char_key('g'));
    assert!(!app.is_generating());
    assert!(app.status_message().unwrap().contains("empty"));
    assert!(app.service().inner().requests().is_empty());
}

#[test]
fn second_generate_while_busy_is_refused() {
    let mut app = make_app();
    set_sample(&mut app, "text");
    app.handle_key(char_key('g'));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(
        app.status_message(),
        Some("Generation already in progress")
    );
    wait_for_idle(&mut app);
    assert_eq!(app.service().inner().requests().len(), 1);
}

#[test]
fn failure_shows_diagnostic() {
    let mut app = make_app_with(
        MockService::failure(ServiceError::Transport("connection refused".into())),
        SessionConfig::default(),
        Vec::new(),
    );
    set_sample(&mut app, "text");
    app.handle_key(char_key('g'));
    wait_for_idle(&mut app);

    assert!(app.state().items().is_empty());
    assert_eq!(app.state().diagnostic(), Some(FAILURE_MESSAGE));
    assert!(app.status_message().is_none());
    assert!(!app.needs_polling());

    // A failed generation can be retried right away.
    app.handle_key(char_key('g'));
    assert!(app.is_generating());
    wait_for_idle(&mut app);
    assert_eq!(app.service().inner().requests().len(), 2);
}

#[test]
fn navigate_and_copy_selected() {
    let mut app = make_app();
    set_sample(&mut app, "text");
    app.handle_key(char_key('g'));
    wait_for_idle(&mut app);

    app.handle_key(char_key('j'));
    assert_eq!(app.selected_item().unwrap().text, "Ships on time.");
    app.handle_key(char_key('y'));

    assert_eq!(app.status_message(), Some("Copied!"));
    assert_eq!(app.clipboard().contents(), Some("Ships on time."));
    let id = app.selected_item().unwrap().id.clone();
    assert!(app.state().is_copied(&id, Instant::now()));
    assert!(app.needs_polling());

    // Acknowledgment expires after the configured window.
    app.tick(Instant::now() + Duration::from_secs(3));
    assert!(!app.state().is_copied(&id, Instant::now()));
    assert!(!app.needs_polling());
}

#[test]
fn copy_all_joins_latest_batch() {
    let mut app = make_app();
    set_sample(&mut app, "text");
    app.handle_key(char_key('g'));
    wait_for_idle(&mut app);

    app.handle_key(char_key('Y'));
    assert_eq!(
        app.clipboard().contents(),
        Some("Sharp and kind.\n\nShips on time.")
    );
}

#[test]
fn copy_with_no_items_does_nothing() {
    let mut app = make_app();
    app.handle_key(char_key('y'));
    assert_eq!(app.status_message(), Some("Nothing to copy"));
    app.handle_key(char_key('Y'));
    assert_eq!(app.status_message(), Some("Nothing to copy"));
    assert!(app.clipboard().writes().is_empty());
}

#[test]
fn category_picker_selects() {
    let mut app = make_app();
    app.handle_key(char_key('c'));
    assert!(matches!(app.mode(), Mode::CategoryPick { selected: 0 }));
    app.handle_key(char_key('j'));
    app.handle_key(char_key('j'));
    app.handle_key(key(KeyCode::Enter));
    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.state().category(), Category::ALL[2]);

    app.handle_key(char_key('c'));
    app.handle_key(char_key('1'));
    assert_eq!(app.state().category(), Category::ALL[0]);

    app.handle_key(char_key('c'));
    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.state().category(), Category::ALL[0]);
}

#[test]
fn brackets_cycle_category() {
    let mut app = make_app();
    let start = app.state().category();
    app.handle_key(char_key(']'));
    assert_eq!(app.state().category(), start.next());
    app.handle_key(char_key('['));
    assert_eq!(app.state().category(), start);
}

#[test]
fn generated_items_use_category_at_request_time() {
    let mut app = make_app();
    set_sample(&mut app, "text");
    app.handle_key(char_key('c'));
    app.handle_key(char_key('2'));
    let requested = app.state().category();
    app.handle_key(char_key('g'));
    app.handle_key(char_key(']'));
    wait_for_idle(&mut app);

    assert_ne!(app.state().category(), requested);
    assert!(app.state().items().iter().all(|i| i.category == requested));
}

#[test]
fn preset_picker_without_presets_shows_message() {
    let mut app = make_app();
    app.handle_key(char_key('p'));
    assert!(matches!(app.mode(), Mode::Normal));
    assert!(app.status_message().unwrap().contains("No presets"));
}

#[test]
fn preset_picker_loads_text() {
    let presets = vec![
        Preset::new("Mentor", "Patient and clear."),
        Preset::new("Teammate", "Always helps out."),
    ];
    let mut app = make_app_with(
        MockService::success(TWO_REVIEWS),
        SessionConfig::default(),
        presets,
    );
    app.handle_key(char_key('p'));
    assert!(matches!(app.mode(), Mode::PresetPick { .. }));
    app.handle_key(char_key('j'));
    app.handle_key(key(KeyCode::Enter));

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.state().sample_text(), "Always helps out.");
    assert_eq!(app.state().selected_preset(), Some("Teammate"));
    assert_eq!(app.status_message(), Some("Loaded preset: Teammate"));
    assert!(!app.is_generating());
}

#[test]
fn preset_with_auto_generate_starts_generation() {
    let config = SessionConfig {
        auto_generate_on_preset: true,
        ..SessionConfig::default()
    };
    let mut app = make_app_with(
        MockService::success(TWO_REVIEWS),
        config,
        vec![Preset::new("Mentor", "Patient and clear.")],
    );
    app.handle_key(char_key('p'));
    app.handle_key(key(KeyCode::Enter));
    assert!(app.is_generating());
    wait_for_idle(&mut app);
    assert_eq!(app.state().items().len(), 2);
}

#[test]
fn render_smoke_test() {
    let mut app = make_app();
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();

    set_sample(&mut app, "Great mentor");
    app.handle_key(char_key('g'));
    wait_for_idle(&mut app);
    app.handle_key(char_key('c'));
    terminal.draw(|f| app.render(f)).unwrap();

    let buffer = terminal.backend().buffer().clone();
    let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
    assert!(content.contains("reviewgen"));
    assert!(content.contains("Category"));
}
