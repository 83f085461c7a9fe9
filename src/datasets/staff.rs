//! Staff dataset: customers employed by companies.

use crate::core::db::{
    crud, join, ColumnDef, Entity, ForeignKeyDef, JoinQuery, JoinStep, NewEntity, Projection,
    TableDef, View,
};
use crate::core::Result;
use crate::report::Section;
use rusqlite::{Connection, Row, ToSql};

pub const COMPANIES: TableDef = TableDef {
    name: "Companies",
    primary_key: "company_id",
    columns: &[
        ColumnDef::text("company_name"),
        ColumnDef::integer("employee_count"),
    ],
    foreign_keys: &[],
};

pub const CUSTOMERS: TableDef = TableDef {
    name: "Customers",
    primary_key: "customer_id",
    columns: &[
        ColumnDef::text("first_name"),
        ColumnDef::text("second_name"),
        ColumnDef::integer("age"),
        ColumnDef::integer("company_id"),
    ],
    foreign_keys: &[ForeignKeyDef::new("company_id", "Companies", "company_id")],
};

pub const TABLES: &[&TableDef] = &[&COMPANIES, &CUSTOMERS];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub employee_count: i64,
}

impl Entity for Company {
    const TABLE: &'static TableDef = &COMPANIES;
    const MUTABLE_COLUMN: &'static str = "employee_count";
    type Mutable = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Company {
            id: row.get("company_id")?,
            name: row.get("company_name")?,
            employee_count: row.get("employee_count")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewCompany<'a> {
    pub name: &'a str,
    pub employee_count: i64,
}

impl NewEntity for NewCompany<'_> {
    type Entity = Company;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql, &self.employee_count]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub age: i64,
    pub company_id: Option<i64>,
}

impl Entity for Customer {
    const TABLE: &'static TableDef = &CUSTOMERS;
    const MUTABLE_COLUMN: &'static str = "first_name";
    type Mutable = String;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Customer {
            id: row.get("customer_id")?,
            first_name: row.get("first_name")?,
            second_name: row.get("second_name")?,
            age: row.get("age")?,
            company_id: row.get("company_id")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewCustomer<'a> {
    pub first_name: &'a str,
    pub second_name: &'a str,
    pub age: i64,
    pub company_id: Option<i64>,
}

impl NewEntity for NewCustomer<'_> {
    type Entity = Customer;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.first_name as &dyn ToSql,
            &self.second_name,
            &self.age,
            &self.company_id,
        ]
    }
}

pub const EMPLOYER_VIEW: JoinQuery = JoinQuery {
    root: &CUSTOMERS,
    joins: &[JoinStep {
        from: &CUSTOMERS,
        via: "company_id",
        to: &COMPANIES,
    }],
    projection: &[
        Projection::new("Customers", "customer_id"),
        Projection::new("Customers", "first_name"),
        Projection::new("Customers", "second_name"),
        Projection::new("Companies", "company_name"),
    ],
};

/// A customer together with the company that employs them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployerView {
    pub customer_id: i64,
    pub first_name: String,
    pub second_name: String,
    pub company_name: String,
}

impl View for EmployerView {
    const QUERY: &'static JoinQuery = &EMPLOYER_VIEW;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(EmployerView {
            customer_id: row.get("customer_id")?,
            first_name: row.get("first_name")?,
            second_name: row.get("second_name")?,
            company_name: row.get("company_name")?,
        })
    }
}

/// Three companies with one employee each
pub fn seed(conn: &Connection) -> Result<()> {
    let staff = [
        ("Alphabet", 3999, "Milly", "Tomson", 21),
        ("Microsoft", 6500, "Dylan", "Ether", 24),
        ("Valve", 10, "Gabe", "Newell", 57),
    ];

    for (company, employee_count, first_name, second_name, age) in staff {
        let company_id = crud::insert(
            conn,
            &NewCompany {
                name: company,
                employee_count,
            },
        )?;
        crud::insert(
            conn,
            &NewCustomer {
                first_name,
                second_name,
                age,
                company_id: Some(company_id),
            },
        )?;
    }
    Ok(())
}

pub fn showcase(conn: &Connection, view_id: i64) -> Result<Vec<Section>> {
    Ok(vec![
        Section::new("Customers", crud::list_records(conn, &CUSTOMERS)?),
        Section::new("Companies", crud::list_records(conn, &COMPANIES)?),
        Section::new("Employer", join::view_records(conn, &EMPLOYER_VIEW, view_id)?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::create_tables;
    use crate::core::GameDbError;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        create_tables(&conn, TABLES).unwrap();
        seed(&conn).unwrap();
        conn
    }

    #[test]
    fn test_employer_follows_company_key() {
        let conn = seeded();
        let employers = join::view::<EmployerView>(&conn, 3).unwrap();
        assert_eq!(employers.len(), 1);
        assert_eq!(employers[0].first_name, "Gabe");
        assert_eq!(employers[0].company_name, "Valve");
    }

    #[test]
    fn test_rename_customer() {
        let conn = seeded();
        let changed = crud::update_matching::<Customer>(
            &conn,
            &"Dylan".to_string(),
            &"Dylanson".to_string(),
        )
        .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(crud::list::<Customer>(&conn).unwrap()[1].first_name, "Dylanson");
    }

    #[test]
    fn test_referenced_company_cannot_be_deleted() {
        let conn = seeded();
        let err = crud::delete::<Company>(&conn, 1).unwrap_err();
        assert!(matches!(err, GameDbError::Constraint(_)));

        // missing keys are not an error
        assert_eq!(crud::delete::<Customer>(&conn, 5).unwrap(), 0);
        assert_eq!(crud::delete::<Customer>(&conn, 7).unwrap(), 0);
    }

    #[test]
    fn test_unemployed_customer() {
        let conn = seeded();
        let id = crud::insert(
            &conn,
            &NewCustomer {
                first_name: "Haley",
                second_name: "Stone",
                age: 30,
                company_id: None,
            },
        )
        .unwrap();

        let customers = crud::list::<Customer>(&conn).unwrap();
        assert_eq!(customers.len(), 4);
        assert_eq!(customers[3].company_id, None);
        assert_eq!(customers[0].company_id, Some(1));
        assert!(join::view::<EmployerView>(&conn, id).unwrap().is_empty());
    }
}
