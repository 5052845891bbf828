use std::time::{Duration, Instant};

use tempfile::TempDir;

use repotype::session::practice::PracticeSession;
use repotype::session::typing::{Key, KeyOutcome, TypingStatus};
use repotype::store::progress::ProgressStore;

const SOURCE: &str = "fn main() {\n    run();\n}\n";

fn type_str(session: &mut PracticeSession, text: &str) -> Option<KeyOutcome> {
    let mut last = None;
    for ch in text.chars() {
        let key = if ch == '\n' { Key::Enter } else { Key::Char(ch) };
        last = Some(session.handle_key(key));
    }
    last
}

#[test]
fn paused_session_survives_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ProgressStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let t0 = Instant::now();

    let mut session = PracticeSession::new(3, 11, "src/main.rs", Some(SOURCE));
    session.start(t0);
    type_str(&mut session, "fn mian");
    session.on_tick(t0 + Duration::from_secs(4));
    session.pause();
    assert!(session.has_progress());
    store.save(&session.to_saved_progress()).unwrap();

    let saved = store.load(3, 11).unwrap();
    let mut reopened = PracticeSession::new(3, 11, "src/main.rs", Some(SOURCE));
    assert!(reopened.restore(saved));
    assert_eq!(reopened.status(), TypingStatus::Paused);
    assert_eq!(reopened.stats(), session.stats());
    assert_eq!(reopened.stats().elapsed_seconds, 4);
    assert_eq!(reopened.stats().typo_count, 2);
    assert_eq!(
        reopened.machine().typed_text_lines(),
        session.machine().typed_text_lines()
    );

    let t1 = t0 + Duration::from_secs(100);
    reopened.resume(t1);
    for _ in 0..3 {
        assert_eq!(reopened.handle_key(Key::Backspace), KeyOutcome::Backspaced);
    }
    let outcome = type_str(&mut reopened, "ain() {\nrun();\n}\n");
    assert_eq!(outcome, Some(KeyOutcome::Completed { correct: true }));
    assert_eq!(reopened.status(), TypingStatus::Completed);
    assert!(!reopened.has_progress());
}

#[test]
fn progress_for_edited_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = ProgressStore::with_base_dir(dir.path().to_path_buf()).unwrap();

    let mut session = PracticeSession::new(1, 2, "lib.rs", Some("abcdef\n"));
    session.start(Instant::now());
    type_str(&mut session, "abcde");
    session.pause();
    store.save(&session.to_saved_progress()).unwrap();

    let mut edited = PracticeSession::new(1, 2, "lib.rs", Some("abc\n"));
    let saved = store.load(1, 2).unwrap();
    assert!(!edited.restore(saved));
    assert_eq!(edited.status(), TypingStatus::Ready);
    assert_eq!(edited.stats().correct_type_count, 0);
}

#[test]
fn progress_is_scoped_to_its_file() {
    let dir = TempDir::new().unwrap();
    let store = ProgressStore::with_base_dir(dir.path().to_path_buf()).unwrap();

    let mut session = PracticeSession::new(1, 2, "a.rs", Some("abc\n"));
    session.start(Instant::now());
    type_str(&mut session, "a");
    session.pause();
    store.save(&session.to_saved_progress()).unwrap();

    assert!(store.load(1, 3).is_none());
    let mut other = PracticeSession::new(1, 3, "b.rs", Some("abc\n"));
    assert!(!other.restore(store.load(1, 2).unwrap()));

    store.remove(1, 2).unwrap();
    assert!(store.load(1, 2).is_none());
    store.remove(1, 2).unwrap();
}

#[test]
fn completion_result_reflects_session() {
    let t0 = Instant::now();
    let mut session = PracticeSession::new(1, 2, "a.txt", Some("ab\n"));
    session.start(t0);
    type_str(&mut session, "xb");
    session.on_tick(t0 + Duration::from_secs(2));
    type_str(&mut session, "\n");

    let result = session.result();
    assert_eq!(result.file_path, "a.txt");
    assert_eq!(result.correct, 2);
    assert_eq!(result.incorrect, 1);
    assert_eq!(result.accuracy, 66.7);
    assert_eq!(result.elapsed_secs, 2);
    assert_eq!(result.total_chars, 3);

    // stats freeze once the file is finished
    session.on_tick(t0 + Duration::from_secs(60));
    assert_eq!(session.stats().elapsed_seconds, 2);
}

#[test]
fn binary_content_is_unsupported() {
    let mut session = PracticeSession::new(1, 2, "logo.png", Some("\u{0}PNG\u{1}"));
    assert_eq!(session.status(), TypingStatus::Unsupported);
    session.start(Instant::now());
    assert_eq!(session.status(), TypingStatus::Unsupported);
    assert_eq!(session.handle_key(Key::Char('a')), KeyOutcome::Ignored);

    let missing = PracticeSession::new(1, 3, "empty", None);
    assert_eq!(missing.status(), TypingStatus::Unsupported);
}
