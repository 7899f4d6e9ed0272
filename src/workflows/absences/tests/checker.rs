use super::common::*;
use std::sync::Arc;

use crate::workflows::absences::checker::ChildAbsenceConflictChecker;
use crate::workflows::absences::domain::ConflictType;
use crate::workflows::absences::repository::RepositoryError;

#[tokio::test]
async fn full_day_absence_conflicts_with_every_schedule() {
    let day = date(2025, 9, 22);
    let checker = build_checker(vec![full_day_absence("abs-1", day, day)]);

    for schedule in [morning(), afternoon()] {
        let conflicts = checker
            .check_conflicts_for_schedule(&company(), &child(), &schedule, day)
            .await
            .expect("check succeeds");

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::FullDayAbsence);
        assert_eq!(conflicts[0].absence.id.0, "abs-1");
    }
}

#[tokio::test]
async fn schedule_absence_only_covers_linked_schedules() {
    let day = date(2025, 9, 22);
    let checker = build_checker(vec![schedule_absence(
        "abs-2",
        day,
        date(2025, 9, 26),
        vec![afternoon()],
    )]);

    let afternoon_conflicts = checker
        .check_conflicts_for_schedule(&company(), &child(), &afternoon(), day)
        .await
        .expect("check succeeds");
    assert_eq!(afternoon_conflicts.len(), 1);
    assert_eq!(
        afternoon_conflicts[0].conflict_type,
        ConflictType::ScheduleSpecificAbsence
    );

    let morning_conflicts = checker
        .check_conflicts_for_schedule(&company(), &child(), &morning(), day)
        .await
        .expect("check succeeds");
    assert!(morning_conflicts.is_empty());
}

#[tokio::test]
async fn date_outside_declared_window_yields_no_conflicts() {
    let checker = build_checker(vec![full_day_absence(
        "abs-3",
        date(2025, 9, 22),
        date(2025, 9, 23),
    )]);

    let conflicts = checker
        .check_conflicts_for_schedule(&company(), &child(), &morning(), date(2025, 9, 24))
        .await
        .expect("check succeeds");

    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn overlapping_absences_both_emit_conflicts_in_repository_order() {
    let day = date(2025, 9, 22);
    let checker = build_checker(vec![
        full_day_absence("abs-4", day, day),
        schedule_absence("abs-5", day, day, vec![afternoon()]),
    ]);

    let conflicts = checker
        .check_conflicts_for_schedule(&company(), &child(), &afternoon(), day)
        .await
        .expect("check succeeds");

    let ids: Vec<&str> = conflicts
        .iter()
        .map(|conflict| conflict.absence.id.0.as_str())
        .collect();
    assert_eq!(ids, vec!["abs-4", "abs-5"]);
    assert_eq!(conflicts[0].conflict_type, ConflictType::FullDayAbsence);
    assert_eq!(
        conflicts[1].conflict_type,
        ConflictType::ScheduleSpecificAbsence
    );
}

#[tokio::test]
async fn has_active_absence_ignores_schedule_linkage() {
    let day = date(2025, 9, 22);
    let checker = build_checker(vec![schedule_absence(
        "abs-6",
        day,
        day,
        vec![afternoon()],
    )]);

    assert!(checker
        .has_active_absence(&company(), &child(), day)
        .await
        .expect("check succeeds"));
    assert!(!checker
        .has_active_absence(&company(), &child(), date(2025, 9, 23))
        .await
        .expect("check succeeds"));
}

#[tokio::test]
async fn has_active_absence_for_schedule_applies_schedule_filter() {
    let day = date(2025, 9, 22);
    let checker = build_checker(vec![schedule_absence(
        "abs-7",
        day,
        day,
        vec![afternoon()],
    )]);

    assert!(checker
        .has_active_absence_for_schedule(&company(), &child(), &afternoon(), day)
        .await
        .expect("check succeeds"));
    assert!(!checker
        .has_active_absence_for_schedule(&company(), &child(), &morning(), day)
        .await
        .expect("check succeeds"));
}

#[tokio::test]
async fn child_without_absences_reports_nothing() {
    let day = date(2025, 9, 22);
    let checker = build_checker(Vec::new());

    assert!(!checker
        .has_active_absence(&company(), &child(), day)
        .await
        .expect("check succeeds"));
    let conflicts = checker
        .check_conflicts_for_schedule(&company(), &child(), &morning(), day)
        .await
        .expect("check succeeds");
    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn repository_fault_propagates_unchanged() {
    let checker = ChildAbsenceConflictChecker::new(Arc::new(UnavailableAbsenceRepository));

    let err = checker
        .check_conflicts_for_schedule(&company(), &child(), &morning(), date(2025, 9, 22))
        .await
        .expect_err("outage surfaces");

    assert!(matches!(err, RepositoryError::Unavailable(_)));
}
