//! Shop dataset: customers order products.

use crate::core::db::{
    crud, join, ColumnDef, Entity, ForeignKeyDef, JoinQuery, JoinStep, NewEntity, Projection,
    TableDef, View,
};
use crate::core::Result;
use crate::report::Section;
use rusqlite::{Connection, Row, ToSql};

pub const CUSTOMERS: TableDef = TableDef {
    name: "Customers",
    primary_key: "customer_id",
    columns: &[
        ColumnDef::text("first_name"),
        ColumnDef::text("second_name"),
        ColumnDef::integer("amount_spend"),
    ],
    foreign_keys: &[],
};

pub const PRODUCTS: TableDef = TableDef {
    name: "Products",
    primary_key: "product_id",
    columns: &[
        ColumnDef::text("name"),
        ColumnDef::integer("price"),
        ColumnDef::text("description"),
    ],
    foreign_keys: &[],
};

pub const ORDERS: TableDef = TableDef {
    name: "Orders",
    primary_key: "order_id",
    columns: &[
        ColumnDef::integer("customer_id"),
        ColumnDef::integer("product_id"),
    ],
    foreign_keys: &[
        ForeignKeyDef::new("product_id", "Products", "product_id"),
        ForeignKeyDef::new("customer_id", "Customers", "customer_id"),
    ],
};

pub const TABLES: &[&TableDef] = &[&CUSTOMERS, &PRODUCTS, &ORDERS];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub amount_spend: i64,
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
            amount_spend: row.get("amount_spend")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewCustomer<'a> {
    pub first_name: &'a str,
    pub second_name: &'a str,
    pub amount_spend: i64,
}

impl NewEntity for NewCustomer<'_> {
    type Entity = Customer;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.first_name as &dyn ToSql,
            &self.second_name,
            &self.amount_spend,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub description: String,
}

impl Entity for Product {
    const TABLE: &'static TableDef = &PRODUCTS;
    const MUTABLE_COLUMN: &'static str = "name";
    type Mutable = String;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get("product_id")?,
            name: row.get("name")?,
            price: row.get("price")?,
            description: row.get("description")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub price: i64,
    pub description: &'a str,
}

impl NewEntity for NewProduct<'_> {
    type Entity = Product;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql, &self.price, &self.description]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub product_id: Option<i64>,
}

impl Entity for Order {
    const TABLE: &'static TableDef = &ORDERS;
    const MUTABLE_COLUMN: &'static str = "product_id";
    type Mutable = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get("order_id")?,
            customer_id: row.get("customer_id")?,
            product_id: row.get("product_id")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrder {
    pub customer_id: Option<i64>,
    pub product_id: Option<i64>,
}

impl NewEntity for NewOrder {
    type Entity = Order;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.customer_id as &dyn ToSql, &self.product_id]
    }
}

pub const ORDER_VIEW: JoinQuery = JoinQuery {
    root: &ORDERS,
    joins: &[
        JoinStep {
            from: &ORDERS,
            via: "customer_id",
            to: &CUSTOMERS,
        },
        JoinStep {
            from: &ORDERS,
            via: "product_id",
            to: &PRODUCTS,
        },
    ],
    projection: &[
        Projection::new("Orders", "order_id"),
        Projection::new("Customers", "first_name"),
        Projection::new("Customers", "second_name"),
        Projection::new("Customers", "amount_spend"),
        Projection::new("Products", "name"),
        Projection::new("Products", "price"),
        Projection::new("Products", "description"),
    ],
};

/// An order with the customer who placed it and the product bought
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub order_id: i64,
    pub first_name: String,
    pub second_name: String,
    pub amount_spend: i64,
    pub product_name: String,
    pub price: i64,
    pub description: String,
}

impl View for OrderView {
    const QUERY: &'static JoinQuery = &ORDER_VIEW;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(OrderView {
            order_id: row.get("order_id")?,
            first_name: row.get("first_name")?,
            second_name: row.get("second_name")?,
            amount_spend: row.get("amount_spend")?,
            product_name: row.get("name")?,
            price: row.get("price")?,
            description: row.get("description")?,
        })
    }
}

/// Three customers, three products and one order per customer
pub fn seed(conn: &Connection) -> Result<()> {
    let customers = [
        ("Milly", "Tomson", 221),
        ("Dylan", "Ether", 24),
        ("Gabe", "Newell", 570),
    ];
    let products = [
        ("Pc", 2000, "Gaming Pc"),
        ("Cat", 100, "Living cat"),
        ("Wheels", 20, "Wheels 4 u"),
    ];

    let mut customer_ids = Vec::with_capacity(customers.len());
    for (first_name, second_name, amount_spend) in customers {
        customer_ids.push(crud::insert(
            conn,
            &NewCustomer {
                first_name,
                second_name,
                amount_spend,
            },
        )?);
    }

    let mut product_ids = Vec::with_capacity(products.len());
    for (name, price, description) in products {
        product_ids.push(crud::insert(
            conn,
            &NewProduct {
                name,
                price,
                description,
            },
        )?);
    }

    // Milly buys the cat, Dylan the wheels, Gabe the PC
    for (customer, product) in [(0, 1), (1, 2), (2, 0)] {
        crud::insert(
            conn,
            &NewOrder {
                customer_id: Some(customer_ids[customer]),
                product_id: Some(product_ids[product]),
            },
        )?;
    }
    Ok(())
}

pub fn showcase(conn: &Connection, view_id: i64) -> Result<Vec<Section>> {
    Ok(vec![
        Section::new("Customers", crud::list_records(conn, &CUSTOMERS)?),
        Section::new("Products", crud::list_records(conn, &PRODUCTS)?),
        Section::new("Orders", crud::list_records(conn, &ORDERS)?),
        Section::new("Full_Orders", join::view_records(conn, &ORDER_VIEW, view_id)?),
    ])
}
