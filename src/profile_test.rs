use super::*;
use crate::protocol::now_ms;

fn record(student: &str, word: &str, correct: bool) -> AssessmentRecord {
    AssessmentRecord {
        student_id: student.into(),
        word_tested: word.into(),
        test_type: TestType::Recognition,
        date_completed: now_ms(),
        responses: vec![ResponseOutcome {
            word: word.into(),
            response: if correct { word.into() } else { "pass".into() },
            is_correct: correct,
            response_time: 1200,
        }],
        score: None,
        notes: None,
    }
}

#[tokio::test]
async fn memory_store_accumulates_per_student() {
    let store = MemoryProfileStore::new();
    store.persist_assessment(&record("stu-1", "the", true)).await.unwrap();
    store.persist_assessment(&record("stu-1", "of", false)).await.unwrap();
    store.persist_assessment(&record("stu-2", "and", true)).await.unwrap();

    let progress = store.get_student_progress("stu-1").await.unwrap();
    assert_eq!(progress.assessments.len(), 2);
    assert_eq!(progress.assessments[0].word_tested, "the");

    let other = store.get_student_progress("stu-2").await.unwrap();
    assert_eq!(other.assessments.len(), 1);
}

#[tokio::test]
async fn unknown_student_gets_empty_history() {
    let store = MemoryProfileStore::new();
    let progress = store.get_student_progress("nobody").await.unwrap();
    assert_eq!(progress.student_id, "nobody");
    assert!(progress.assessments.is_empty());
}

#[tokio::test]
async fn memory_store_counts_session_reports() {
    let store = MemoryProfileStore::new();
    let report = SessionReport {
        session_id: "s-1".into(),
        room: "r1".into(),
        test_type: TestType::Spelling,
        fry_level: 1,
        words_tested: vec!["the".into()],
        responses: Vec::new(),
        ended_at: now_ms(),
    };
    store.persist_test_session(&report).await.unwrap();
    assert_eq!(store.session_count().await, 1);
}

#[test]
fn assessment_record_serializes_camel_case() {
    let value = serde_json::to_value(record("stu-1", "because", true)).unwrap();
    assert_eq!(value["studentId"], "stu-1");
    assert_eq!(value["wordTested"], "because");
    assert_eq!(value["testType"], "recognition");
    assert_eq!(value["responses"][0]["isCorrect"], true);
    assert_eq!(value["responses"][0]["responseTime"], 1200);
    assert!(value.get("notes").is_none());
}

#[test]
fn http_store_trims_trailing_slash() {
    let store = HttpProfileStore::new("http://localhost:9100/".into(), None).unwrap();
    assert_eq!(store.base_url, "http://localhost:9100");
}
