//! Supplier and employee records

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::EntityId;
use crate::core::store::{Collection, Store};
use crate::entities::employee::Employee;
use crate::entities::supplier::Supplier;

fn supplier_from_row(row: &Row<'_>) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get(0)?,
        name: row.get(1)?,
        eta_days: row.get(2)?,
        contact: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        department_id: row.get(2)?,
        hourly_rate: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub(crate) fn load_supplier(conn: &Connection, id: &str) -> ShopResult<Option<Supplier>> {
    Ok(conn
        .query_row(
            "SELECT id, name, eta_days, contact, created_at FROM suppliers WHERE id = ?1",
            params![id],
            supplier_from_row,
        )
        .optional()?)
}

pub(crate) fn load_employee(conn: &Connection, id: &str) -> ShopResult<Option<Employee>> {
    Ok(conn
        .query_row(
            "SELECT id, name, department_id, hourly_rate, created_at FROM employees WHERE id = ?1",
            params![id],
            employee_from_row,
        )
        .optional()?)
}

/// Suppliers and staff
pub struct Directory<'a> {
    store: &'a Store,
}

impl<'a> Directory<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn create_supplier(&self, supplier: &Supplier) -> ShopResult<()> {
        if supplier.name.trim().is_empty() {
            return Err(ShopError::Validation {
                field: "name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        self.store.transact(|tx| {
            tx.execute(
                "INSERT INTO suppliers (id, name, eta_days, contact, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    supplier.id,
                    supplier.name,
                    supplier.eta_days,
                    supplier.contact,
                    supplier.created_at,
                ],
            )?;
            tx.touch(Collection::Suppliers, supplier.id);
            Ok(())
        })
    }

    pub fn get_supplier(&self, id: &EntityId) -> ShopResult<Option<Supplier>> {
        load_supplier(self.store.conn(), &id.to_string())
    }

    /// Resolve a supplier by full ID or exact name (case-insensitive)
    pub fn find_supplier(&self, id_or_name: &str) -> ShopResult<Supplier> {
        let found = match id_or_name.parse::<EntityId>() {
            Ok(id) => self.get_supplier(&id)?,
            Err(_) => self
                .store
                .conn()
                .query_row(
                    "SELECT id, name, eta_days, contact, created_at FROM suppliers
                     WHERE name = ?1 COLLATE NOCASE",
                    params![id_or_name],
                    supplier_from_row,
                )
                .optional()?,
        };
        found.ok_or_else(|| ShopError::SupplierNotFound(id_or_name.to_string()))
    }

    pub fn list_suppliers(&self) -> ShopResult<Vec<Supplier>> {
        let mut stmt = self
            .store
            .conn()
            .prepare("SELECT id, name, eta_days, contact, created_at FROM suppliers ORDER BY name")?;
        let suppliers = stmt
            .query_map([], supplier_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(suppliers)
    }

    pub fn create_employee(&self, employee: &Employee) -> ShopResult<()> {
        if employee.name.trim().is_empty() {
            return Err(ShopError::Validation {
                field: "name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if let Some(rate) = employee.hourly_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ShopError::Validation {
                    field: "hourlyRate".to_string(),
                    message: format!("must be a non-negative amount (got {})", rate),
                });
            }
        }
        self.store.transact(|tx| {
            tx.execute(
                "INSERT INTO employees (id, name, department_id, hourly_rate, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    employee.id,
                    employee.name,
                    employee.department_id,
                    employee.hourly_rate,
                    employee.created_at,
                ],
            )?;
            tx.touch(Collection::Employees, employee.id);
            Ok(())
        })
    }

    pub fn get_employee(&self, id: &EntityId) -> ShopResult<Option<Employee>> {
        load_employee(self.store.conn(), &id.to_string())
    }

    pub fn find_employee(&self, id_or_name: &str) -> ShopResult<Employee> {
        let found = match id_or_name.parse::<EntityId>() {
            Ok(id) => self.get_employee(&id)?,
            Err(_) => self
                .store
                .conn()
                .query_row(
                    "SELECT id, name, department_id, hourly_rate, created_at FROM employees
                     WHERE name = ?1 COLLATE NOCASE",
                    params![id_or_name],
                    employee_from_row,
                )
                .optional()?,
        };
        found.ok_or_else(|| ShopError::EmployeeNotFound(id_or_name.to_string()))
    }

    pub fn list_employees(&self) -> ShopResult<Vec<Employee>> {
        let mut stmt = self.store.conn().prepare(
            "SELECT id, name, department_id, hourly_rate, created_at FROM employees ORDER BY name",
        )?;
        let employees = stmt
            .query_map([], employee_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(employees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_supplier_roundtrip_and_lookup() {
        let store = Store::open_in_memory().unwrap();
        let dir = Directory::new(&store);
        let mut supplier = Supplier::new("Brass & Co", 7, Utc::now());
        supplier.contact = Some("orders@brass.example".to_string());
        dir.create_supplier(&supplier).unwrap();

        assert_eq!(dir.get_supplier(&supplier.id).unwrap().unwrap(), supplier);
        assert_eq!(dir.find_supplier("brass & co").unwrap().id, supplier.id);
        assert!(matches!(
            dir.find_supplier("Nobody"),
            Err(ShopError::SupplierNotFound(_))
        ));
    }

    #[test]
    fn test_employee_rate_validation() {
        let store = Store::open_in_memory().unwrap();
        let dir = Directory::new(&store);
        let mut employee = Employee::new("Ada", Utc::now());
        employee.hourly_rate = Some(-1.0);
        assert!(matches!(
            dir.create_employee(&employee),
            Err(ShopError::Validation { .. })
        ));

        employee.hourly_rate = Some(32.5);
        dir.create_employee(&employee).unwrap();
        assert_eq!(dir.list_employees().unwrap(), vec![employee]);
    }
}
