use roster_core::db::open_db_in_memory;
use roster_core::{
    Collection, MemoryRecordRepository, Record, RecordRepository, RecordService,
    SqliteRecordRepository, DEFAULT_PAGE_SIZE,
};
use std::collections::HashSet;

fn sqlite_service(collection: Collection) -> RecordService<SqliteRecordRepository> {
    let repo = SqliteRecordRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    RecordService::new(repo, collection)
}

fn memory_service(collection: Collection) -> RecordService<MemoryRecordRepository> {
    RecordService::new(MemoryRecordRepository::new(), collection)
}

fn seed<R: RecordRepository>(service: &RecordService<R>, titles: &[&str]) {
    for title in titles {
        service.create(Record::new(*title)).unwrap();
    }
}

fn titles(records: &[Record]) -> Vec<&str> {
    records.iter().map(|record| record.title.as_str()).collect()
}

fn check_two_page_walk<R: RecordRepository>(service: RecordService<R>) {
    seed(&service, &["Gamma", "Alpha", "Beta"]);

    let first = service.list(2, None).unwrap();
    assert_eq!(titles(&first.items), vec!["Alpha", "Beta"]);
    assert_eq!(first.next_page_token.as_deref(), Some("Beta"));

    let second = service.list(2, Some("Beta")).unwrap();
    assert_eq!(titles(&second.items), vec!["Gamma"]);
    assert_eq!(second.next_page_token, None);
}

fn check_empty_collection<R: RecordRepository>(service: RecordService<R>) {
    for token in [None, Some(""), Some("Beta"), Some("zzz")] {
        let page = service.list(DEFAULT_PAGE_SIZE, token).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next_page());
    }
}

fn check_exactly_full_last_page<R: RecordRepository>(service: RecordService<R>) {
    seed(&service, &["a", "b", "c", "d"]);

    let first = service.list(2, None).unwrap();
    assert_eq!(first.next_page_token.as_deref(), Some("b"));

    let second = service.list(2, first.next_page_token.as_deref()).unwrap();
    assert_eq!(titles(&second.items), vec!["c", "d"]);
    assert_eq!(second.next_page_token, None);
}

fn check_chained_tokens_enumerate_everything_once<R: RecordRepository>(
    service: RecordService<R>,
) {
    let expected = (0..37)
        .map(|index| format!("title-{:03}", (index * 17) % 37))
        .collect::<Vec<_>>();
    for title in &expected {
        service.create(Record::new(title.as_str())).unwrap();
    }

    let mut seen = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = service.list(DEFAULT_PAGE_SIZE, token.as_deref()).unwrap();
        assert!(page.items.len() <= DEFAULT_PAGE_SIZE as usize);
        seen.extend(page.items.into_iter().map(|record| record.title));
        match page.next_page_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    let mut sorted = expected.clone();
    sorted.sort();
    assert_eq!(seen, sorted);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), expected.len());
}

#[test]
fn sqlite_two_page_walk_matches_scenario() {
    check_two_page_walk(sqlite_service(Collection::STUDENTS));
}

#[test]
fn memory_two_page_walk_matches_scenario() {
    check_two_page_walk(memory_service(Collection::STUDENTS));
}

#[test]
fn sqlite_empty_collection_yields_empty_page() {
    check_empty_collection(sqlite_service(Collection::TRAINEES));
}

#[test]
fn memory_empty_collection_yields_empty_page() {
    check_empty_collection(memory_service(Collection::TRAINEES));
}

#[test]
fn sqlite_exactly_full_last_page_has_no_token() {
    check_exactly_full_last_page(sqlite_service(Collection::STUDENTS));
}

#[test]
fn memory_exactly_full_last_page_has_no_token() {
    check_exactly_full_last_page(memory_service(Collection::STUDENTS));
}

#[test]
fn sqlite_chained_tokens_enumerate_everything_once() {
    check_chained_tokens_enumerate_everything_once(sqlite_service(Collection::TRAINEES));
}

#[test]
fn memory_chained_tokens_enumerate_everything_once() {
    check_chained_tokens_enumerate_everything_once(memory_service(Collection::TRAINEES));
}

#[test]
fn fewer_than_limit_returns_all_without_token() {
    let service = sqlite_service(Collection::STUDENTS);
    seed(&service, &["Beta", "Alpha"]);

    let page = service.list(DEFAULT_PAGE_SIZE, None).unwrap();
    assert_eq!(titles(&page.items), vec!["Alpha", "Beta"]);
    assert_eq!(page.next_page_token, None);
}

#[test]
fn empty_token_skips_only_untitled_records() {
    let service = memory_service(Collection::STUDENTS);
    seed(&service, &["", "Alpha"]);

    let from_start = service.list(DEFAULT_PAGE_SIZE, None).unwrap();
    assert_eq!(titles(&from_start.items), vec!["", "Alpha"]);

    let after_empty = service.list(DEFAULT_PAGE_SIZE, Some("")).unwrap();
    assert_eq!(titles(&after_empty.items), vec!["Alpha"]);
}

#[test]
fn ordering_is_byte_lexicographic() {
    let service = sqlite_service(Collection::STUDENTS);
    seed(&service, &["beta", "Beta", "alpha", "Alpha"]);

    let page = service.list(DEFAULT_PAGE_SIZE, None).unwrap();
    assert_eq!(titles(&page.items), vec!["Alpha", "Beta", "alpha", "beta"]);
}

#[test]
fn zero_limit_falls_back_to_default_page_size() {
    let service = memory_service(Collection::STUDENTS);
    let many = (0..12).map(|index| format!("t{index:02}")).collect::<Vec<_>>();
    for title in &many {
        service.create(Record::new(title.as_str())).unwrap();
    }

    let page = service.list(0, None).unwrap();
    assert_eq!(page.items.len(), DEFAULT_PAGE_SIZE as usize);
    assert_eq!(page.next_page_token.as_deref(), Some("t09"));
}
