//! Stage-ordering behavior of the transformation pipeline, driven through a
//! mocked completion client.

use std::io::{Cursor, Write};

use mockall::Sequence;
use zip::write::FileOptions;
use zip::ZipWriter;

use api_alchemist::completion::MockCompletionClient;
use api_alchemist::config::TransformConfig;
use api_alchemist::error::AlchemistError;
use api_alchemist::pipeline::{run_transform, CONVERT_INSTRUCTION, REVIEW_INSTRUCTION};

fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        let options = FileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

#[tokio::test]
async fn stage_two_receives_stage_one_reply_in_order() {
    let archive = build_zip(&[("a.py", "print(1)")]);
    let config = TransformConfig::default();

    let mut client = MockCompletionClient::new();
    let mut seq = Sequence::new();

    client
        .expect_complete()
        .withf(|instruction, content| {
            instruction == CONVERT_INSTRUCTION && content.contains("# File: a.py")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("stage one reply".to_string()));

    client
        .expect_complete()
        .withf(|instruction, content| {
            instruction == REVIEW_INSTRUCTION && content == "stage one reply"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("final code".to_string()));

    let report = run_transform(&client, &config, &archive).await.unwrap();
    assert_eq!(report.source_files, 1);
    assert!(!report.archive.is_empty());
}

#[tokio::test]
async fn http_error_in_stage_one_aborts_before_stage_two() {
    let archive = build_zip(&[("a.py", "print(1)")]);
    let config = TransformConfig::default();

    let mut client = MockCompletionClient::new();

    client
        .expect_complete()
        .withf(|instruction, _| instruction == CONVERT_INSTRUCTION)
        .times(1)
        .returning(|_, _| {
            Err(AlchemistError::HttpStatus {
                status: 502,
                body: "bad gateway".to_string(),
            })
        });

    client
        .expect_complete()
        .withf(|instruction, _| instruction == REVIEW_INSTRUCTION)
        .times(0);

    let result = run_transform(&client, &config, &archive).await;
    assert!(matches!(result, Err(AlchemistError::HttpStatus { status: 502, .. })));
}

#[tokio::test]
async fn network_failure_in_stage_two_aborts_the_run() {
    let archive = build_zip(&[("a.py", "print(1)")]);
    let config = TransformConfig::default();

    let mut client = MockCompletionClient::new();
    let mut seq = Sequence::new();

    client
        .expect_complete()
        .withf(|instruction, _| instruction == CONVERT_INSTRUCTION)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("stage one reply".to_string()));

    client
        .expect_complete()
        .withf(|instruction, _| instruction == REVIEW_INSTRUCTION)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| {
            Err(AlchemistError::NetworkFailure {
                reason: "connection reset".to_string(),
            })
        });

    let result = run_transform(&client, &config, &archive).await;
    assert!(matches!(result, Err(AlchemistError::NetworkFailure { .. })));
}

#[tokio::test]
async fn invalid_archive_makes_no_completion_call() {
    let config = TransformConfig::default();

    // No expectations: any completion call would panic the mock.
    let client = MockCompletionClient::new();

    let result = run_transform(&client, &config, b"not a zip").await;
    assert!(matches!(result, Err(AlchemistError::InvalidArchive { .. })));
}
