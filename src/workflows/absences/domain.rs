use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the tenant owning an aggregate. Every query is
/// scoped by company; the core passes it through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Identifier wrapper for a transported child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildId(pub String);

/// Identifier wrapper for a driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub String);

/// Identifier wrapper for a recurring transportation schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(pub String);

/// Identifier wrapper for a planned route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(pub String);

/// Identifier wrapper for a child absence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsenceId(pub String);

/// Identifier wrapper for a driver absence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverAbsenceId(pub String);

/// Error raised when an absence window is declared back to front.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("absence starts {start} after it ends {end}")]
pub struct InvalidDateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Granularity of a declared child absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsenceType {
    /// The child is away for the whole day; every schedule is affected.
    FullDay,
    /// Only the linked schedules are affected.
    SpecificSchedule,
}

impl AbsenceType {
    pub const fn label(self) -> &'static str {
        match self {
            AbsenceType::FullDay => "full_day",
            AbsenceType::SpecificSchedule => "specific_schedule",
        }
    }
}

/// A declared absence of a child over an inclusive date range.
///
/// Immutable once created; cancellation and administrative edits are handled
/// by the owning aggregate elsewhere. Repositories only hand out absences
/// that are still active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub id: AbsenceId,
    pub company_id: CompanyId,
    pub child_id: ChildId,
    pub absence_type: AbsenceType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Linked schedules; populated for `SpecificSchedule` absences.
    pub schedule_ids: Vec<ScheduleId>,
}

impl Absence {
    pub fn new(
        id: AbsenceId,
        company_id: CompanyId,
        child_id: ChildId,
        absence_type: AbsenceType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        schedule_ids: Vec<ScheduleId>,
    ) -> Result<Self, InvalidDateRange> {
        if start_date > end_date {
            return Err(InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            id,
            company_id,
            child_id,
            absence_type,
            start_date,
            end_date,
            schedule_ids,
        })
    }

    /// Inclusive on both ends of the declared window.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Business predicate deciding whether this absence affects a schedule on
    /// a given date. Full-day absences are schedule-agnostic; schedule-specific
    /// absences only cover the schedules they were declared against.
    pub fn covers_schedule(&self, schedule_id: &ScheduleId, date: NaiveDate) -> bool {
        if !self.is_active_on(date) {
            return false;
        }

        match self.absence_type {
            AbsenceType::FullDay => true,
            AbsenceType::SpecificSchedule => self.schedule_ids.contains(schedule_id),
        }
    }
}

/// Lifecycle state of a driver absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverAbsenceStatus {
    Active,
    Cancelled,
}

impl DriverAbsenceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DriverAbsenceStatus::Active => "active",
            DriverAbsenceStatus::Cancelled => "cancelled",
        }
    }
}

/// A declared absence of a driver over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverAbsence {
    pub id: DriverAbsenceId,
    pub company_id: CompanyId,
    pub driver_id: DriverId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: DriverAbsenceStatus,
}

impl DriverAbsence {
    pub fn new(
        id: DriverAbsenceId,
        company_id: CompanyId,
        driver_id: DriverId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, InvalidDateRange> {
        if start_date > end_date {
            return Err(InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            id,
            company_id,
            driver_id,
            start_date,
            end_date,
            status: DriverAbsenceStatus::Active,
        })
    }
}

/// Execution state of a planned route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl RouteStatus {
    /// Live routes still need a present driver; terminal states do not.
    pub const fn is_live(self) -> bool {
        matches!(self, RouteStatus::Planned | RouteStatus::InProgress)
    }

    pub const fn label(self) -> &'static str {
        match self {
            RouteStatus::Planned => "planned",
            RouteStatus::InProgress => "in_progress",
            RouteStatus::Completed => "completed",
            RouteStatus::Cancelled => "cancelled",
        }
    }
}

/// A route assigned to one driver on one calendar date within one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub company_id: CompanyId,
    pub date: NaiveDate,
    pub driver_id: DriverId,
    pub status: RouteStatus,
}

/// Recurring pickup/dropoff window for a child. The conflict core only ever
/// references schedules by id; the full shape exists for fixtures and demos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub company_id: CompanyId,
    pub child_id: ChildId,
    pub days_of_week: Vec<Weekday>,
    pub pickup_time: NaiveTime,
    pub dropoff_time: NaiveTime,
}

impl Schedule {
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        self.days_of_week.contains(&date.weekday())
    }
}

/// How an absence collides with planned transportation activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictType {
    FullDayAbsence,
    ScheduleSpecificAbsence,
}

impl ConflictType {
    pub const fn label(self) -> &'static str {
        match self {
            ConflictType::FullDayAbsence => "full_day_absence",
            ConflictType::ScheduleSpecificAbsence => "schedule_specific_absence",
        }
    }
}

/// Derived, read-only pairing of an absence with its classification.
/// Computed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceConflict {
    pub absence: Absence,
    pub conflict_type: ConflictType,
}
