use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::QUESTION_OPTION_COUNT;
use crate::db::{self, tables};
use crate::entitlement::GatedAccess;
use crate::error::{AppError, Result};
use crate::extractors::Identity;
use crate::gated::fetch_gated;
use crate::models::{grade, TestRecord, TestResultRecord};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    /// Chosen option index per question, null where unanswered
    pub answers: Vec<Option<u8>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub id: String,
    #[serde(flatten)]
    pub result: TestResultRecord,
}

fn result_key(test_id: &str, uid: &str) -> String {
    format!("{test_id}/{uid}")
}

/// Submit a completed attempt.
///
/// Entitlement is re-checked through the gated content fetch, grading runs
/// server-side against the private question set, and the second attempt for
/// the same user and test is rejected.
pub async fn submit_attempt(
    State(state): State<AppState>,
    identity: Identity,
    Path(test_id): Path<String>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<Json<AttemptResponse>> {
    let content = match fetch_gated::<TestRecord>(&state, Some(&identity), &test_id).await? {
        GatedAccess::NotFound => return Err(AppError::ContentNotFound),
        GatedAccess::NotEntitled => return Err(AppError::NotEntitled),
        GatedAccess::Entitled(content) => content,
    };

    if payload.answers.len() > content.questions_data.len() {
        return Err(AppError::InvalidInput(
            "More answers than questions".to_string(),
        ));
    }
    if payload
        .answers
        .iter()
        .flatten()
        .any(|&answer| usize::from(answer) >= QUESTION_OPTION_COUNT)
    {
        return Err(AppError::InvalidInput(
            "Answer index out of range".to_string(),
        ));
    }

    let summary = grade(&content.questions_data, &payload.answers);
    let record = TestResultRecord {
        user_id: identity.uid.clone(),
        test_id: test_id.clone(),
        score: summary.score,
        percentage: summary.percentage,
        total_questions: summary.total_questions,
        correct_answers: summary.correct_answers,
        wrong_answers: summary.wrong_answers,
        answers: payload.answers,
        created_at: Utc::now().timestamp(),
    };

    let db = state.db.clone();
    let result_id = Uuid::now_v7().to_string();
    let stored = record.clone();
    let stored_id = result_id.clone();
    let key = result_key(&test_id, &identity.uid);
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut index = write_txn.open_table(tables::RESULT_INDEX)?;
            if index.get(key.as_str())?.is_some() {
                return Err(AppError::AttemptAlreadyRecorded);
            }
            index.insert(key.as_str(), stored_id.as_str())?;
            drop(index);

            let mut results = write_txn.open_table(tables::TEST_RESULTS)?;
            let bytes = db::encode(&stored)?;
            results.insert(stored_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!(
        "Attempt recorded for user {} on test {}: {}/{}",
        identity.uid,
        test_id,
        record.score,
        record.total_questions
    );

    Ok(Json(AttemptResponse {
        id: result_id,
        result: record,
    }))
}

/// The caller's stored result for a test, 404 when none is recorded
pub async fn my_result(
    State(state): State<AppState>,
    identity: Identity,
    Path(test_id): Path<String>,
) -> Result<Json<AttemptResponse>> {
    let db = state.db.clone();
    let key = result_key(&test_id, &identity.uid);
    let found = tokio::task::spawn_blocking(move || -> Result<Option<(String, TestResultRecord)>> {
        let read_txn = db.begin_read()?;
        let index = read_txn.open_table(tables::RESULT_INDEX)?;
        let Some(result_id) = index.get(key.as_str())?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };

        let results = read_txn.open_table(tables::TEST_RESULTS)?;
        let record: Option<TestResultRecord> = results
            .get(result_id.as_str())?
            .map(|bytes| db::decode(bytes.value()))
            .transpose()?;

        Ok(record.map(|record| (result_id, record)))
    })
    .await??;

    let (id, result) = found.ok_or(AppError::ResultNotFound)?;
    Ok(Json(AttemptResponse { id, result }))
}
