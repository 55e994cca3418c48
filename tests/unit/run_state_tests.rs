/*!
 * Tests for durable run-state counters
 */

use cityfeed::errors::StartupError;
use cityfeed::run_state::{RunState, RunStateMode};

use crate::common;

#[test]
fn test_loadChunked_withWhitespaceAroundNumber_shouldParse() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "run_count.txt", " 2 \n").unwrap();

    let state = RunState::load_chunked(&path).unwrap();

    assert_eq!(state.current_position(), 2);
    assert_eq!(state.path(), path.as_path());
}

#[test]
fn test_loadChunked_withNegativeNumber_shouldBeInvalid() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "run_count.txt", "-1").unwrap();

    assert!(matches!(
        RunState::load_chunked(&path),
        Err(StartupError::InvalidRunState { .. })
    ));
}

#[test]
fn test_advance_withMissingParentDirectory_shouldCreateIt() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("outputs").join("run_count.txt");

    let mut state = RunState::load_chunked(&path).unwrap();
    state.advance().unwrap();

    assert_eq!(common::read_counter(&path).unwrap(), 1);
}

#[test]
fn test_claimPage_calledRepeatedly_shouldHandOutConsecutivePages() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "run_number.txt", "1").unwrap();

    let pages: Vec<u64> = (0..3).map(|_| RunState::claim_page(&path).unwrap()).collect();

    assert_eq!(pages, vec![1, 2, 3]);
    assert_eq!(common::read_counter(&path).unwrap(), 4);
}

#[test]
fn test_loadPaginated_withExistingFile_shouldBePaginated() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "run_number.txt", "7").unwrap();

    let state = RunState::load_paginated(&path).unwrap();

    assert_eq!(state.mode(), RunStateMode::Paginated);
    assert_eq!(state.current_position(), 7);
}

#[test]
fn test_chunk_withEmptyList_shouldBeNone() {
    let dir = common::create_temp_dir().unwrap();
    let state = RunState::load_chunked(dir.path().join("run_count.txt")).unwrap();

    assert_eq!(state.chunk(0, 25), None);
}
