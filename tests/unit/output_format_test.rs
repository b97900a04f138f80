use chrono::{TimeZone, Utc};
use jobcount::domain::models::observation::Observation;
use jobcount::domain::models::search_term::SearchTerm;
use jobcount::domain::repositories::result_repository::ResultRepository;
use jobcount::infrastructure::csv_result_sink::{read_all, CsvResultSink};

#[tokio::test]
async fn test_output_matches_documented_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.csv");
    let sink = CsvResultSink::new(&path);

    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap();
    sink.append(&Observation::new(
        &SearchTerm::new("Ice Sculptor", "Honolulu, HI"),
        1234,
        ts,
    ))
    .await
    .unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "job_title,location,ts,count\nIce Sculptor,\"Honolulu, HI\",2024-05-01T12:30:45.000Z,1234\n"
    );
    assert_eq!(read_all(&path).unwrap()[0].location, "Honolulu, HI");
}
