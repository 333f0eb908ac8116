//! # Employee Repository
//!
//! Staff records. Employees are hired and listed, never removed.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::{Employee, Money, Position};

/// Validated fields for a new hire.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub age: i64,
    pub position: Position,
    pub salary: Money,
    pub shift: String,
    pub hire_date: NaiveDate,
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: i64,
    name: String,
    age: i64,
    position: String,
    salary_cents: i64,
    shift: String,
    hire_date: NaiveDate,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = DbError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let position = row
            .position
            .parse::<Position>()
            .map_err(|e| DbError::corrupt("employees", e))?;

        Ok(Employee {
            id: row.id,
            name: row.name,
            age: row.age,
            position,
            salary: Money::from_cents(row.salary_cents),
            shift: row.shift,
            hire_date: row.hire_date,
        })
    }
}

/// Repository for employee operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeRepository;

impl EmployeeRepository {
    pub async fn list(&self, conn: &mut SqliteConnection) -> DbResult<Vec<Employee>> {
        let rows: Vec<EmployeeRow> = sqlx::query_as(
            r#"
            SELECT id, name, age, position, salary_cents, shift, hire_date
            FROM employees
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    pub async fn get(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Employee>> {
        let row: Option<EmployeeRow> = sqlx::query_as(
            r#"
            SELECT id, name, age, position, salary_cents, shift, hire_date
            FROM employees
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(Employee::try_from).transpose()
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        employee: &NewEmployee,
    ) -> DbResult<Employee> {
        debug!(name = %employee.name, position = %employee.position, "Inserting employee");

        let id = sqlx::query(
            r#"
            INSERT INTO employees (name, age, position, salary_cents, shift, hire_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&employee.name)
        .bind(employee.age)
        .bind(employee.position.as_str())
        .bind(employee.salary.cents())
        .bind(&employee.shift)
        .bind(employee.hire_date)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(Employee {
            id,
            name: employee.name.clone(),
            age: employee.age,
            position: employee.position,
            salary: employee.salary,
            shift: employee.shift.clone(),
            hire_date: employee.hire_date,
        })
    }

    /// Sum of all monthly salaries.
    pub async fn payroll_total(&self, conn: &mut SqliteConnection) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(salary_cents), 0) FROM employees")
            .fetch_one(&mut *conn)
            .await?;

        Ok(Money::from_cents(cents))
    }
}
