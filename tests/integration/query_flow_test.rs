// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_test_app, create_test_app_without_session, fast_engine, FailingSink, Step, BASE_URL,
};
use jobcount::application::use_cases::query_use_case::RunError;
use jobcount::domain::models::report::{FailureKind, RunStatus};
use jobcount::domain::services::query_engine::QueryEngine;
use jobcount::domain::services::session_manager::SessionError;
use jobcount::domain::services::term_source::{TermSource, TermSourceError};
use jobcount::engines::traits::EngineError;
use jobcount::infrastructure::csv_result_sink::read_all;
use jobcount::utils::retry_policy::RetryPolicy;
use std::fs;
use std::future::pending;
use std::time::Duration;

fn inline(terms: &[&str]) -> TermSource {
    TermSource::Inline(terms.iter().map(|t| t.to_string()).collect())
}

#[tokio::test]
async fn test_two_terms_are_appended_in_order() {
    let app = create_test_app(vec![Step::Count(19), Step::Count(203)]).await;

    let report = app
        .query_use_case(fast_engine())
        .execute(
            &inline(&["Ice Sculptor,Honolulu", "Panda Fluffer,Greater Tokyo"]),
            pending(),
        )
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Completed);
    let rows = read_all(&app.output).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(
        (rows[0].job_title.as_str(), rows[0].location.as_str(), rows[0].count),
        ("Ice Sculptor", "Honolulu", 19)
    );
    assert_eq!(
        (rows[1].job_title.as_str(), rows[1].location.as_str(), rows[1].count),
        ("Panda Fluffer", "Greater Tokyo", 203)
    );
    assert!(rows[0].ts < rows[1].ts);
    assert!(fs::read_to_string(&app.output)
        .unwrap()
        .starts_with("job_title,location,ts,count\n"));
    assert!(app.backend.is_closed());
}

#[tokio::test]
async fn test_failed_term_is_reported_not_written() {
    let app = create_test_app(vec![Step::Count(19), Step::NoCount]).await;

    let report = app
        .query_use_case(fast_engine())
        .execute(
            &inline(&["Ice Sculptor,Honolulu", "Panda Fluffer,Greater Tokyo"]),
            pending(),
        )
        .await
        .unwrap();

    assert_eq!(
        report.status(),
        RunStatus::CompletedWithFailures { failed: 1, total: 2 }
    );
    assert_eq!(report.status().exit_code(), 2);
    assert_eq!(report.failures[0].kind, FailureKind::ExtractionFailed);
    assert_eq!(report.failures[0].term.job_title, "Panda Fluffer");
    assert_eq!(read_all(&app.output).unwrap().len(), 1);
}

#[tokio::test]
async fn test_every_term_produces_one_row_in_input_order() {
    let titles: Vec<String> = (0..12).map(|i| format!("Title {i},City {i}")).collect();
    let app = create_test_app((0..12).map(Step::Count).collect()).await;

    let report = app
        .query_use_case(fast_engine())
        .execute(&TermSource::Inline(titles), pending())
        .await
        .unwrap();

    assert_eq!(report.observations.len(), 12);
    let rows = read_all(&app.output).unwrap();
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.job_title, format!("Title {i}"));
        assert_eq!(row.count, i as u64);
    }
    assert!(rows.windows(2).all(|w| w[0].ts < w[1].ts));
}

#[tokio::test]
async fn test_input_file_terms() {
    let app = create_test_app(vec![Step::Count(5), Step::Count(6)]).await;
    let input = app.dir.path().join("terms.csv");
    fs::write(&input, "job_title,location\nIce Sculptor,London\n,Nowhere\nPanda Fluffer,Tokyo\n").unwrap();

    let report = app
        .query_use_case(fast_engine())
        .execute(&TermSource::File(input), pending())
        .await
        .unwrap();

    assert_eq!(report.total_terms, 2);
    assert_eq!(
        app.backend.searched(),
        ["Ice Sculptor,London", "Panda Fluffer,Tokyo"]
    );
}

#[tokio::test]
async fn test_bad_input_fails_before_session_or_backend() {
    let app = create_test_app(vec![Step::Count(1)]).await;

    let conflict = TermSource::from_args(
        Some(vec!["Ice Sculptor,Honolulu".to_string()]),
        Some(app.dir.path().join("terms.csv")),
    );
    assert!(matches!(conflict, Err(TermSourceError::InputConflict(_))));

    let err = app
        .query_use_case(fast_engine())
        .execute(&inline(&["Ice Sculptor,Honolulu", "no comma here"]), pending())
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Input(TermSourceError::MalformedTerm { .. })));
    assert_eq!(app.credentials.loads(), 0);
    assert_eq!(app.provider.created(), 0);
    assert!(!app.output.exists());
}

#[tokio::test]
async fn test_missing_session_aborts_before_backend() {
    let app = create_test_app_without_session(vec![Step::Count(1)]);

    let err = app
        .query_use_case(fast_engine())
        .execute(&inline(&["Ice Sculptor,Honolulu"]), pending())
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Session(SessionError::NoSession { .. })));
    assert!(err.to_string().contains("jobcount login"));
    assert_eq!(app.provider.created(), 0);
}

#[tokio::test]
async fn test_corrupt_credentials_behave_as_missing() {
    let app = create_test_app_without_session(vec![Step::Count(1)]);
    fs::create_dir_all(app.cookie_path().parent().unwrap()).unwrap();
    fs::write(app.cookie_path(), b"[{\"name\": \"li_at\", \"val").unwrap();

    let err = app
        .query_use_case(fast_engine())
        .execute(&inline(&["Ice Sculptor,Honolulu"]), pending())
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Session(SessionError::NoSession { .. })));
    assert_eq!(app.provider.created(), 0);
}

#[tokio::test]
async fn test_rejected_session_aborts_before_any_query() {
    let app = create_test_app(vec![Step::Count(1)]).await;
    app.backend.reject_session();

    let err = app
        .query_use_case(fast_engine())
        .execute(&inline(&["Ice Sculptor,Honolulu"]), pending())
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Session(SessionError::SessionInvalid { .. })));
    assert!(app.backend.searched().is_empty());
    assert!(app.backend.is_closed());
    assert!(!app.output.exists());
}

#[tokio::test]
async fn test_schema_mismatch_aborts_before_session() {
    let app = create_test_app(vec![Step::Count(1)]).await;
    fs::create_dir_all(app.output.parent().unwrap()).unwrap();
    let foreign = "title,where,when,n\nChef,Paris,yesterday,3\n";
    fs::write(&app.output, foreign).unwrap();

    let err = app
        .query_use_case(fast_engine())
        .execute(&inline(&["Ice Sculptor,Honolulu"]), pending())
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Sink(_)));
    assert_eq!(app.credentials.loads(), 0);
    assert_eq!(fs::read_to_string(&app.output).unwrap(), foreign);
}

#[tokio::test]
async fn test_transient_failure_is_retried_once() {
    let app = create_test_app(vec![
        Step::Fail(EngineError::HttpStatus(503)),
        Step::Count(19),
        Step::Fail(EngineError::Timeout),
        Step::Fail(EngineError::Timeout),
        Step::Count(7),
    ])
    .await;

    let report = app
        .query_use_case(fast_engine())
        .execute(
            &inline(&["Ice Sculptor,Honolulu", "Panda Fluffer,Tokyo", "Chef,Paris"]),
            pending(),
        )
        .await
        .unwrap();

    assert_eq!(report.observations.len(), 2);
    assert!(matches!(
        report.failures[0].kind,
        FailureKind::Transient { attempts: 2, .. }
    ));
    assert_eq!(report.failures[0].term.job_title, "Panda Fluffer");
    assert_eq!(app.backend.searched().len(), 5);
}

#[tokio::test]
async fn test_session_revoked_mid_batch_keeps_written_rows() {
    let app = create_test_app(vec![Step::Count(19), Step::Revoke, Step::Count(3)]).await;

    let report = app
        .query_use_case(fast_engine())
        .execute(
            &inline(&["Ice Sculptor,Honolulu", "Panda Fluffer,Tokyo", "Chef,Paris"]),
            pending(),
        )
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Aborted);
    assert_eq!(report.status().exit_code(), 3);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::SessionInvalid);
    assert!(report.aborted.as_deref().unwrap().contains("jobcount login"));
    assert_eq!(app.backend.searched().len(), 2);

    let rows = read_all(&app.output).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].count, 19);
}

#[tokio::test]
async fn test_write_failure_names_the_term_and_aborts() {
    let app = create_test_app(vec![Step::Count(19), Step::Count(203), Step::Count(7)]).await;
    let sink = FailingSink::new(&app.output, 2);

    let report = app
        .query_use_case_with_sink(fast_engine(), sink)
        .execute(
            &inline(&["Ice Sculptor,Honolulu", "Panda Fluffer,Greater Tokyo", "Chef,Paris"]),
            pending(),
        )
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Aborted);
    assert_eq!(report.observations.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.skipped(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.index, 1);
    assert_eq!(failure.term.job_title, "Panda Fluffer");
    assert!(matches!(
        &failure.kind,
        FailureKind::WriteFailed { message } if message.contains("disk full")
    ));
    assert!(failure.to_string().contains("WriteFailed"));
    assert!(report.aborted.as_deref().unwrap().contains("Panda Fluffer"));

    assert_eq!(app.backend.searched().len(), 2);
    assert_eq!(read_all(&app.output).unwrap().len(), 1);
    assert!(app.backend.is_closed());
}

#[tokio::test]
async fn test_runs_only_ever_append() {
    let app = create_test_app(vec![Step::Count(19), Step::Count(20), Step::Count(21)]).await;

    app.query_use_case(fast_engine())
        .execute(&inline(&["Ice Sculptor,Honolulu"]), pending())
        .await
        .unwrap();
    let first_run = fs::read(&app.output).unwrap();

    app.query_use_case(fast_engine())
        .execute(&inline(&["Ice Sculptor,Honolulu", "Ice Sculptor,Honolulu"]), pending())
        .await
        .unwrap();
    let second_run = fs::read(&app.output).unwrap();

    assert_eq!(&second_run[..first_run.len()], &first_run[..]);
    let counts: Vec<u64> = read_all(&app.output).unwrap().iter().map(|o| o.count).collect();
    assert_eq!(counts, [19, 20, 21]);
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_keeps_exactly_the_completed_rows() {
    let app = create_test_app(vec![Step::Count(1), Step::Count(2), Step::Count(3)]).await;
    let engine = QueryEngine::new(
        BASE_URL,
        Duration::from_secs(10),
        Duration::from_secs(5),
        RetryPolicy::none(),
    )
    .unwrap();

    let report = app
        .query_use_case(engine)
        .execute(
            &inline(&["a,x", "b,x", "c,x"]),
            tokio::time::sleep(Duration::from_secs(15)),
        )
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Aborted);
    assert_eq!(report.observations.len(), 2);
    assert_eq!(read_all(&app.output).unwrap().len(), 2);
    assert_eq!(app.backend.searched().len(), 2);
}

#[tokio::test]
async fn test_empty_file_batch_does_nothing() {
    let app = create_test_app(vec![]).await;
    let input = app.dir.path().join("terms.csv");
    fs::write(&input, "job_title,location\n").unwrap();

    let report = app
        .query_use_case(fast_engine())
        .execute(&TermSource::File(input), pending())
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Completed);
    assert_eq!(app.provider.created(), 0);
    assert!(!app.output.exists());
}
