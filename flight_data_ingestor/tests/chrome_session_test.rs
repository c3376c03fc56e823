//! Smoke test against a real local Chromium. Ignored by default: it needs
//! a browser binary (override the path with `FLIGHT_CHROME_PATH`).

use std::time::Duration;

use flight_data_ingestor::session::{ChromeLauncher, SessionFactory, SessionOptions};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore = "requires a local Chromium installation"]
async fn launches_navigates_and_reads_text() {
    let launcher = ChromeLauncher::new(SessionOptions::default());
    let session = launcher.open().await.expect("browser should launch");

    session
        .navigate("data:text/html,<body><p>hello crawler</p></body>")
        .await
        .expect("navigation should succeed");
    session
        .wait_for_quiescence(Duration::from_secs(10))
        .await
        .expect("page should settle");

    let text = session.page_text().await.expect("text should be readable");
    assert!(text.contains("hello crawler"));

    session.close().await.expect("browser should shut down");
}

#[tokio::test]
#[serial]
#[ignore = "requires a local Chromium installation"]
async fn query_rows_reads_table_cells() {
    let launcher = ChromeLauncher::new(SessionOptions::default());
    let session = launcher.open().await.expect("browser should launch");

    session
        .navigate(
            "data:text/html,<table><tbody><tr><td>KE</td><td>1234</td></tr></tbody></table>",
        )
        .await
        .expect("navigation should succeed");
    session
        .wait_for_quiescence(Duration::from_secs(10))
        .await
        .expect("page should settle");

    let rows = session
        .query_rows("table tbody tr")
        .await
        .expect("rows should be readable");
    assert_eq!(rows, vec![vec!["KE".to_string(), "1234".to_string()]]);

    session.close().await.expect("browser should shut down");
}
