use std::sync::Arc;

use chrono::NaiveDate;

use super::domain::{
    AbsenceConflict, AbsenceType, ChildId, CompanyId, ConflictType, ScheduleId,
};
use super::repository::{ChildAbsenceRepository, RepositoryError};

/// Decides whether a child's transportation activity is impacted by an
/// absence, and how. Stateless and read-only; existence of the child or
/// schedule is assumed, not re-checked.
pub struct ChildAbsenceConflictChecker<R> {
    repository: Arc<R>,
}

impl<R> ChildAbsenceConflictChecker<R>
where
    R: ChildAbsenceRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Classify every active absence that covers the given schedule on the
    /// given date. Absences that do not cover the schedule contribute no
    /// entry; two covering absences yield two conflicts. Repository order is
    /// preserved and an empty list is a valid answer, not an error.
    pub async fn check_conflicts_for_schedule(
        &self,
        company_id: &CompanyId,
        child_id: &ChildId,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<Vec<AbsenceConflict>, RepositoryError> {
        let absences = self
            .repository
            .find_active_absences_for_child(company_id, child_id, date)
            .await?;

        let conflicts = absences
            .into_iter()
            .filter(|absence| absence.covers_schedule(schedule_id, date))
            .map(|absence| {
                let conflict_type = match absence.absence_type {
                    AbsenceType::FullDay => ConflictType::FullDayAbsence,
                    AbsenceType::SpecificSchedule => ConflictType::ScheduleSpecificAbsence,
                };
                AbsenceConflict {
                    absence,
                    conflict_type,
                }
            })
            .collect();

        Ok(conflicts)
    }

    /// Cheap existence check: true iff any absence is active for the child on
    /// that date, regardless of schedule coverage.
    pub async fn has_active_absence(
        &self,
        company_id: &CompanyId,
        child_id: &ChildId,
        date: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        let absences = self
            .repository
            .find_active_absences_for_child(company_id, child_id, date)
            .await?;

        Ok(!absences.is_empty())
    }

    /// Existence check against the schedule-filtered repository query.
    /// Callers needing the conflict type must use
    /// [`check_conflicts_for_schedule`](Self::check_conflicts_for_schedule).
    pub async fn has_active_absence_for_schedule(
        &self,
        company_id: &CompanyId,
        child_id: &ChildId,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        let absences = self
            .repository
            .find_active_absences_for_schedule(company_id, child_id, schedule_id, date)
            .await?;

        Ok(!absences.is_empty())
    }
}
