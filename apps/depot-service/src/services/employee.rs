//! # Employee Service
//!
//! Staff records and daily attendance. Hiring needs `Create`; any
//! logged-in user can check an employee in or out.
//!
//! ## Attendance Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  (employee, day) ── no record ──► check_in ──► { in: 08:55, out: - }   │
//! │                                                   │                     │
//! │                     check_in again ◄──────────────┤ AlreadyCheckedIn   │
//! │                                                   │                     │
//! │                                     check_out ────┴──► { in, out }      │
//! │                                                                         │
//! │  check_out with no record for today ──► NotCheckedIn                    │
//! │  Checking out again moves the check-out time.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::error::ApiResult;
use crate::services::Gate;
use crate::state::Session;
use crate::AppContext;
use depot_core::validation::{validate_employee, validate_name, validate_search_query};
use depot_core::{
    Action, AttendanceRecord, AuditAction, AuditModule, CoreError, Employee, Money,
};
use depot_db::{NewAuditEntry, NewEmployee};

/// Shift assigned to new hires.
const DEFAULT_SHIFT: &str = "Day";

pub struct EmployeeService {
    ctx: AppContext,
}

impl EmployeeService {
    pub fn new(ctx: AppContext) -> Self {
        EmployeeService { ctx }
    }

    // =========================================================================
    // Staff
    // =========================================================================

    /// Hires an employee dated today on the day shift.
    pub async fn hire_employee(
        &self,
        session: &Session,
        name: &str,
        age: i64,
        position: &str,
        salary: Money,
    ) -> ApiResult<Employee> {
        Gate::check(session, Action::Create)?;

        let position = validate_employee(name, age, position, salary)?;
        let new = NewEmployee {
            name: validate_name("name", name)?,
            age,
            position,
            salary,
            shift: DEFAULT_SHIFT.to_string(),
            hire_date: self.ctx.today(),
        };

        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        let employee = db.employees().insert(&mut tx, &new).await?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Create,
                    AuditModule::Employees,
                    employee.id,
                    session.username.as_str(),
                    format!("Hired {} as {}", employee.name, employee.position),
                ),
                self.ctx.now(),
            )
            .await?;

        tx.commit().await?;

        info!(id = employee.id, name = %employee.name, position = %employee.position, "Employee hired");
        Ok(employee)
    }

    pub async fn list_employees(&self, session: &Session) -> ApiResult<Vec<Employee>> {
        Gate::check(session, Action::Read)?;

        let mut conn = self.ctx.db().acquire().await?;
        Ok(self.ctx.db().employees().list(&mut conn).await?)
    }

    /// Case-insensitive match on name, position or id.
    pub async fn search_employees(&self, session: &Session, query: &str) -> ApiResult<Vec<Employee>> {
        let query = validate_search_query(query)?.to_lowercase();
        let employees = self.list_employees(session).await?;

        Ok(employees
            .into_iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&query)
                    || e.position.as_str().to_lowercase().contains(&query)
                    || e.id.to_string().contains(&query)
            })
            .collect())
    }

    /// Sum of monthly salaries.
    pub async fn payroll_total(&self, session: &Session) -> ApiResult<Money> {
        Gate::check(session, Action::ViewReports)?;

        let mut conn = self.ctx.db().acquire().await?;
        Ok(self.ctx.db().employees().payroll_total(&mut conn).await?)
    }

    // =========================================================================
    // Attendance
    // =========================================================================

    pub async fn check_in(&self, session: &Session, employee_id: i64) -> ApiResult<AttendanceRecord> {
        Gate::check(session, Action::Read)?;

        let db = self.ctx.db();
        let now = self.ctx.now();
        let mut tx = db.begin_write().await?;

        if db.employees().get(&mut tx, employee_id).await?.is_none() {
            return Err(CoreError::EmployeeNotFound(employee_id).into());
        }
        if db.attendance().find(&mut tx, employee_id, now.date()).await?.is_some() {
            return Err(CoreError::AlreadyCheckedIn(employee_id).into());
        }

        let record = db
            .attendance()
            .insert_check_in(&mut tx, employee_id, now.date(), now.time())
            .await?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Create,
                    AuditModule::Attendance,
                    employee_id,
                    session.username.as_str(),
                    format!("Check-in at {}", now.format("%H:%M")),
                ),
                now,
            )
            .await?;

        tx.commit().await?;

        info!(employee_id, date = %now.date(), "Checked in");
        Ok(record)
    }

    pub async fn check_out(&self, session: &Session, employee_id: i64) -> ApiResult<AttendanceRecord> {
        Gate::check(session, Action::Read)?;

        let db = self.ctx.db();
        let now = self.ctx.now();
        let mut tx = db.begin_write().await?;

        let mut record = db
            .attendance()
            .find(&mut tx, employee_id, now.date())
            .await?
            .filter(|r| r.check_in.is_some())
            .ok_or(CoreError::NotCheckedIn(employee_id))?;

        db.attendance()
            .set_check_out(&mut tx, employee_id, now.date(), now.time())
            .await?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Update,
                    AuditModule::Attendance,
                    employee_id,
                    session.username.as_str(),
                    format!("Check-out at {}", now.format("%H:%M")),
                ),
                now,
            )
            .await?;

        tx.commit().await?;

        record.check_out = Some(now.time());
        info!(employee_id, minutes = ?record.minutes_worked(), "Checked out");
        Ok(record)
    }

    /// Attendance newest day first, for one employee or everyone.
    pub async fn attendance_report(
        &self,
        session: &Session,
        employee_id: Option<i64>,
    ) -> ApiResult<Vec<AttendanceRecord>> {
        Gate::check(session, Action::Read)?;

        let mut conn = self.ctx.db().acquire().await?;
        Ok(self.ctx.db().attendance().list(&mut conn, employee_id).await?)
    }
}
