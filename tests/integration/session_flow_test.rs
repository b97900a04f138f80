// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, create_test_app_without_session, fast_engine, Step};
use jobcount::application::use_cases::query_use_case::RunError;
use jobcount::application::use_cases::session_use_case::{ClearCookiesUseCase, LoginUseCase};
use jobcount::domain::services::session_manager::SessionError;
use jobcount::domain::services::term_source::TermSource;
use std::future::pending;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_login_saves_session_for_the_next_query() {
    let app = create_test_app_without_session(vec![Step::Count(42)]);
    app.backend.complete_login_after(4);

    let session = LoginUseCase::new(app.sessions.clone(), app.provider.clone(), Duration::from_secs(60))
        .execute()
        .await
        .unwrap();

    assert!(app.cookie_path().exists());
    assert_eq!(session.cookies()[0].value, "fresh-login");
    assert!(app.backend.is_closed());

    let report = app
        .query_use_case(fast_engine())
        .execute(
            &TermSource::Inline(vec!["Ice Sculptor,Honolulu".to_string()]),
            pending(),
        )
        .await
        .unwrap();

    assert_eq!(report.observations[0].count, 42);
    assert_eq!(app.backend.installed.lock()[0].value, "fresh-login");
}

#[tokio::test(start_paused = true)]
async fn test_login_timeout_saves_nothing() {
    let app = create_test_app_without_session(vec![]);
    app.backend.complete_login_after(usize::MAX);

    let err = LoginUseCase::new(app.sessions.clone(), app.provider.clone(), Duration::from_secs(5))
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Session(SessionError::LoginTimeout(_))));
    assert!(!app.cookie_path().exists());
    assert!(app.backend.is_closed());
}

#[tokio::test]
async fn test_clear_cookies_forces_a_new_login() {
    let app = create_test_app(vec![Step::Count(1)]).await;
    let clear = ClearCookiesUseCase::new(app.sessions.clone());

    assert!(clear.execute().await.unwrap());
    assert!(!clear.execute().await.unwrap());
    assert!(!app.cookie_path().exists());

    let err = app
        .query_use_case(fast_engine())
        .execute(
            &TermSource::Inline(vec!["Ice Sculptor,Honolulu".to_string()]),
            pending(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::Session(SessionError::NoSession { .. })));
}
