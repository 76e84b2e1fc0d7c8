use choreboard_core::db::open_db_in_memory;
use choreboard_core::repo::family_repo::SqliteFamilyRepository;
use choreboard_core::service::active_view::RECENT_COMPLETIONS_LIMIT;
use choreboard_core::{
    ChoreDraft, Clock, FamilyId, FamilyService, FixedClock, SqliteChoreService,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;

const USER: i64 = 10;

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn seed_family(conn: &Connection) -> FamilyId {
    let families = FamilyService::new(SqliteFamilyRepository::try_new(conn).unwrap());
    families
        .create_family(USER, "Home", at(2025, 1, 1, 8))
        .unwrap()
        .id
}

fn create(
    service: &SqliteChoreService<'_>,
    family_id: FamilyId,
    title: &str,
    frequency: &str,
    weight: i64,
    priority: i64,
) -> i64 {
    let draft = ChoreDraft {
        title: Some(title.to_string()),
        frequency: Some(frequency.to_string()),
        weight: Some(weight),
        priority: Some(priority),
        ..ChoreDraft::default()
    };
    service
        .create_chore(family_id, USER, &draft, at(2025, 1, 1, 8))
        .unwrap()
        .chore
        .id
}

#[test]
fn completed_chore_leaves_pending_until_next_period() {
    let conn = open_db_in_memory().unwrap();
    let family_id = seed_family(&conn);
    let service = SqliteChoreService::from_connection(&conn).unwrap();
    let trash = create(&service, family_id, "Trash", "weekly", 1, 3);
    let laundry = create(&service, family_id, "Laundry", "weekly", 2, 3);
    let clock = FixedClock::new(at(2025, 1, 8, 9));

    service
        .complete(trash, family_id, USER, clock.now())
        .unwrap();
    let view = service.active_view(family_id, clock.now()).unwrap();

    let pending: Vec<_> = view.pending.iter().map(|status| status.chore.id).collect();
    assert_eq!(pending, [laundry]);
    assert_eq!(view.pending[0].period_key, "2025-W02");
    assert_eq!(view.pending[0].due_at, at(2025, 1, 13, 0));
    assert!(!view.pending[0].is_completed);
    assert_eq!(view.recently_completed.len(), 1);
    assert_eq!(view.recently_completed[0].completion.chore_id, trash);

    clock.advance(Duration::days(7));
    let next_week = service.active_view(family_id, clock.now()).unwrap();
    let pending: Vec<_> = next_week
        .pending
        .iter()
        .map(|status| status.chore.id)
        .collect();
    assert_eq!(pending, [laundry, trash]);
    assert!(next_week
        .pending
        .iter()
        .all(|status| status.period_key == "2025-W03"));
    assert_eq!(next_week.recently_completed.len(), 1);
}

#[test]
fn pending_is_ordered_by_priority_weight_then_title() {
    let conn = open_db_in_memory().unwrap();
    let family_id = seed_family(&conn);
    let service = SqliteChoreService::from_connection(&conn).unwrap();
    create(&service, family_id, "Bathroom", "weekly", 2, 3);
    create(&service, family_id, "Attic", "semiannual", 2, 3);
    create(&service, family_id, "Dishes", "daily", 1, 5);
    create(&service, family_id, "Oven", "monthly", 4, 3);

    let view = service
        .active_view(family_id, at(2025, 8, 1, 12))
        .unwrap();

    let titles: Vec<_> = view
        .pending
        .iter()
        .map(|status| status.chore.title.as_str())
        .collect();
    assert_eq!(titles, ["Dishes", "Oven", "Attic", "Bathroom"]);

    let attic = &view.pending[2];
    assert_eq!(attic.period_key, "2025-H2");
    assert_eq!(attic.due_at, at(2026, 1, 1, 0));
    let oven = &view.pending[1];
    assert_eq!(oven.period_key, "2025-08");
    assert_eq!(oven.due_at, at(2025, 9, 1, 0));
}

#[test]
fn inactive_chores_are_never_pending() {
    let conn = open_db_in_memory().unwrap();
    let family_id = seed_family(&conn);
    let service = SqliteChoreService::from_connection(&conn).unwrap();
    let draft = ChoreDraft {
        title: Some("Retired".to_string()),
        frequency: Some("daily".to_string()),
        weight: Some(1),
        priority: Some(1),
        is_active: Some(false),
        ..ChoreDraft::default()
    };
    service
        .create_chore(family_id, USER, &draft, at(2025, 1, 1, 8))
        .unwrap();

    let view = service.active_view(family_id, at(2025, 1, 2, 8)).unwrap();
    assert!(view.pending.is_empty());
    assert!(view.recently_completed.is_empty());
}

#[test]
fn recent_feed_is_capped_and_spans_chores() {
    let conn = open_db_in_memory().unwrap();
    let family_id = seed_family(&conn);
    let service = SqliteChoreService::from_connection(&conn).unwrap();
    let dishes = create(&service, family_id, "Dishes", "daily", 1, 1);
    let plants = create(&service, family_id, "Plants", "weekly", 1, 1);
    let start = at(2025, 1, 6, 9);
    for day in 0..3 {
        service
            .complete(dishes, family_id, USER, start + Duration::days(day))
            .unwrap();
    }
    service
        .complete(plants, family_id, USER, start + Duration::days(3))
        .unwrap();

    let view = service
        .active_view(family_id, start + Duration::days(3))
        .unwrap();

    assert_eq!(
        view.recently_completed.len(),
        RECENT_COMPLETIONS_LIMIT as usize
    );
    assert_eq!(view.recently_completed[0].completion.chore_id, plants);
    assert_eq!(
        service.recent_completions(family_id, 10).unwrap().len(),
        4
    );
    let titles: Vec<_> = view
        .pending
        .iter()
        .map(|status| status.chore.title.as_str())
        .collect();
    assert_eq!(titles, ["Dishes"]);
}
