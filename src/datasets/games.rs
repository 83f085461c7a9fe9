//! Game store dataset: studios and publishers make games, users pay from
//! wallets, and orders tie a user to a game.

use crate::core::db::{
    crud, join, ColumnDef, Entity, ForeignKeyDef, JoinQuery, JoinStep, NewEntity, Projection,
    TableDef, View,
};
use crate::core::Result;
use crate::report::Section;
use rusqlite::{Connection, Row, ToSql};

pub const STUDIOS: TableDef = TableDef {
    name: "Studios",
    primary_key: "studio_id",
    columns: &[
        ColumnDef::text("studio_name"),
        ColumnDef::integer("employee_count"),
    ],
    foreign_keys: &[],
};

pub const PUBLISHERS: TableDef = TableDef {
    name: "Publishers",
    primary_key: "publisher_id",
    columns: &[
        ColumnDef::text("publisher_name"),
        ColumnDef::integer("games_published"),
    ],
    foreign_keys: &[],
};

pub const GAMES: TableDef = TableDef {
    name: "Games",
    primary_key: "game_id",
    columns: &[
        ColumnDef::integer("publisher_id"),
        ColumnDef::integer("studio_id"),
        ColumnDef::text("game_name"),
        ColumnDef::text("genre"),
    ],
    foreign_keys: &[
        ForeignKeyDef::new("publisher_id", "Publishers", "publisher_id"),
        ForeignKeyDef::new("studio_id", "Studios", "studio_id"),
    ],
};

pub const WALLETS: TableDef = TableDef {
    name: "Wallets",
    primary_key: "wallet_id",
    columns: &[
        ColumnDef::text("payment_method"),
        ColumnDef::integer("balance"),
    ],
    foreign_keys: &[],
};

pub const USERS: TableDef = TableDef {
    name: "Users",
    primary_key: "user_id",
    columns: &[
        ColumnDef::integer("wallet_id"),
        ColumnDef::text("user_name"),
        ColumnDef::integer("user_level"),
        ColumnDef::integer("games_owned"),
    ],
    foreign_keys: &[ForeignKeyDef::new("wallet_id", "Wallets", "wallet_id")],
};

pub const ORDERS: TableDef = TableDef {
    name: "Orders",
    primary_key: "order_id",
    columns: &[
        ColumnDef::integer("game_id"),
        ColumnDef::integer("user_id"),
        ColumnDef::boolean("discount"),
        ColumnDef::integer("price"),
    ],
    foreign_keys: &[
        ForeignKeyDef::new("user_id", "Users", "user_id"),
        ForeignKeyDef::new("game_id", "Games", "game_id"),
    ],
};

/// Tables in creation order, parents first
pub const TABLES: &[&TableDef] = &[&STUDIOS, &PUBLISHERS, &GAMES, &WALLETS, &USERS, &ORDERS];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Studio {
    pub id: i64,
    pub name: String,
    pub employee_count: i64,
}

impl Entity for Studio {
    const TABLE: &'static TableDef = &STUDIOS;
    const MUTABLE_COLUMN: &'static str = "employee_count";
    type Mutable = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Studio {
            id: row.get("studio_id")?,
            name: row.get("studio_name")?,
            employee_count: row.get("employee_count")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewStudio<'a> {
    pub name: &'a str,
    pub employee_count: i64,
}

impl NewEntity for NewStudio<'_> {
    type Entity = Studio;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql, &self.employee_count]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub games_published: i64,
}

impl Entity for Publisher {
    const TABLE: &'static TableDef = &PUBLISHERS;
    const MUTABLE_COLUMN: &'static str = "games_published";
    type Mutable = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Publisher {
            id: row.get("publisher_id")?,
            name: row.get("publisher_name")?,
            games_published: row.get("games_published")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewPublisher<'a> {
    pub name: &'a str,
    pub games_published: i64,
}

impl NewEntity for NewPublisher<'_> {
    type Entity = Publisher;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name as &dyn ToSql, &self.games_published]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: i64,
    pub publisher_id: Option<i64>,
    pub studio_id: Option<i64>,
    pub name: String,
    pub genre: String,
}

impl Entity for Game {
    const TABLE: &'static TableDef = &GAMES;
    const MUTABLE_COLUMN: &'static str = "game_name";
    type Mutable = String;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Game {
            id: row.get("game_id")?,
            publisher_id: row.get("publisher_id")?,
            studio_id: row.get("studio_id")?,
            name: row.get("game_name")?,
            genre: row.get("genre")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewGame<'a> {
    pub publisher_id: Option<i64>,
    pub studio_id: Option<i64>,
    pub name: &'a str,
    pub genre: &'a str,
}

impl NewEntity for NewGame<'_> {
    type Entity = Game;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.publisher_id as &dyn ToSql,
            &self.studio_id,
            &self.name,
            &self.genre,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    pub id: i64,
    pub payment_method: String,
    pub balance: i64,
}

impl Entity for Wallet {
    const TABLE: &'static TableDef = &WALLETS;
    const MUTABLE_COLUMN: &'static str = "balance";
    type Mutable = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Wallet {
            id: row.get("wallet_id")?,
            payment_method: row.get("payment_method")?,
            balance: row.get("balance")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewWallet<'a> {
    pub payment_method: &'a str,
    pub balance: i64,
}

impl NewEntity for NewWallet<'_> {
    type Entity = Wallet;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.payment_method as &dyn ToSql, &self.balance]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub wallet_id: Option<i64>,
    pub name: String,
    pub level: i64,
    pub games_owned: i64,
}

impl Entity for User {
    const TABLE: &'static TableDef = &USERS;
    const MUTABLE_COLUMN: &'static str = "user_level";
    type Mutable = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get("user_id")?,
            wallet_id: row.get("wallet_id")?,
            name: row.get("user_name")?,
            level: row.get("user_level")?,
            games_owned: row.get("games_owned")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub wallet_id: Option<i64>,
    pub name: &'a str,
    pub level: i64,
    pub games_owned: i64,
}

impl NewEntity for NewUser<'_> {
    type Entity = User;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.wallet_id as &dyn ToSql,
            &self.name,
            &self.level,
            &self.games_owned,
        ]
    }
}

/// A purchase. `discount` is stored in a BOOLEAN column but holds the
/// discount amount, so any integer round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub game_id: Option<i64>,
    pub user_id: Option<i64>,
    pub discount: i64,
    pub price: i64,
}

impl Entity for Order {
    const TABLE: &'static TableDef = &ORDERS;
    const MUTABLE_COLUMN: &'static str = "discount";
    type Mutable = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get("order_id")?,
            game_id: row.get("game_id")?,
            user_id: row.get("user_id")?,
            discount: row.get("discount")?,
            price: row.get("price")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrder {
    pub game_id: Option<i64>,
    pub user_id: Option<i64>,
    pub discount: i64,
    pub price: i64,
}

impl NewEntity for NewOrder {
    type Entity = Order;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.game_id as &dyn ToSql,
            &self.user_id,
            &self.discount,
            &self.price,
        ]
    }
}

pub const GAME_VIEW: JoinQuery = JoinQuery {
    root: &GAMES,
    joins: &[
        JoinStep {
            from: &GAMES,
            via: "publisher_id",
            to: &PUBLISHERS,
        },
        JoinStep {
            from: &GAMES,
            via: "studio_id",
            to: &STUDIOS,
        },
    ],
    projection: &[
        Projection::new("Games", "game_id"),
        Projection::new("Games", "game_name"),
        Projection::new("Games", "genre"),
        Projection::new("Studios", "studio_name"),
        Projection::new("Studios", "employee_count"),
        Projection::new("Publishers", "publisher_name"),
        Projection::new("Publishers", "games_published"),
    ],
};

pub const USER_VIEW: JoinQuery = JoinQuery {
    root: &USERS,
    joins: &[JoinStep {
        from: &USERS,
        via: "wallet_id",
        to: &WALLETS,
    }],
    projection: &[
        Projection::new("Users", "user_id"),
        Projection::new("Wallets", "payment_method"),
        Projection::new("Wallets", "balance"),
        Projection::new("Users", "user_name"),
        Projection::new("Users", "user_level"),
        Projection::new("Users", "games_owned"),
    ],
};

pub const ORDER_VIEW: JoinQuery = JoinQuery {
    root: &ORDERS,
    joins: &[
        JoinStep {
            from: &ORDERS,
            via: "game_id",
            to: &GAMES,
        },
        JoinStep {
            from: &ORDERS,
            via: "user_id",
            to: &USERS,
        },
        JoinStep {
            from: &USERS,
            via: "wallet_id",
            to: &WALLETS,
        },
        JoinStep {
            from: &GAMES,
            via: "publisher_id",
            to: &PUBLISHERS,
        },
        JoinStep {
            from: &GAMES,
            via: "studio_id",
            to: &STUDIOS,
        },
    ],
    projection: &[
        Projection::new("Orders", "order_id"),
        Projection::new("Games", "game_name"),
        Projection::new("Games", "genre"),
        Projection::new("Studios", "studio_name"),
        Projection::new("Studios", "employee_count"),
        Projection::new("Publishers", "publisher_name"),
        Projection::new("Publishers", "games_published"),
        Projection::new("Wallets", "payment_method"),
        Projection::new("Wallets", "balance"),
        Projection::new("Users", "user_name"),
        Projection::new("Users", "user_level"),
        Projection::new("Users", "games_owned"),
        Projection::new("Orders", "discount"),
        Projection::new("Orders", "price"),
    ],
};

/// A game with its studio and publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    pub game_id: i64,
    pub game_name: String,
    pub genre: String,
    pub studio_name: String,
    pub employee_count: i64,
    pub publisher_name: String,
    pub games_published: i64,
}

impl View for GameView {
    const QUERY: &'static JoinQuery = &GAME_VIEW;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GameView {
            game_id: row.get("game_id")?,
            game_name: row.get("game_name")?,
            genre: row.get("genre")?,
            studio_name: row.get("studio_name")?,
            employee_count: row.get("employee_count")?,
            publisher_name: row.get("publisher_name")?,
            games_published: row.get("games_published")?,
        })
    }
}

/// A user with their wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub user_id: i64,
    pub payment_method: String,
    pub balance: i64,
    pub user_name: String,
    pub user_level: i64,
    pub games_owned: i64,
}

impl View for UserView {
    const QUERY: &'static JoinQuery = &USER_VIEW;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(UserView {
            user_id: row.get("user_id")?,
            payment_method: row.get("payment_method")?,
            balance: row.get("balance")?,
            user_name: row.get("user_name")?,
            user_level: row.get("user_level")?,
            games_owned: row.get("games_owned")?,
        })
    }
}

/// An order with its game (and the game's studio and publisher) and its
/// user (and the user's wallet)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub order_id: i64,
    pub game: GameSummary,
    pub buyer: UserSummary,
    pub discount: i64,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub game_name: String,
    pub genre: String,
    pub studio_name: String,
    pub employee_count: i64,
    pub publisher_name: String,
    pub games_published: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub payment_method: String,
    pub balance: i64,
    pub user_name: String,
    pub user_level: i64,
    pub games_owned: i64,
}

impl View for OrderView {
    const QUERY: &'static JoinQuery = &ORDER_VIEW;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(OrderView {
            order_id: row.get("order_id")?,
            game: GameSummary {
                game_name: row.get("game_name")?,
                genre: row.get("genre")?,
                studio_name: row.get("studio_name")?,
                employee_count: row.get("employee_count")?,
                publisher_name: row.get("publisher_name")?,
                games_published: row.get("games_published")?,
            },
            buyer: UserSummary {
                payment_method: row.get("payment_method")?,
                balance: row.get("balance")?,
                user_name: row.get("user_name")?,
                user_level: row.get("user_level")?,
                games_owned: row.get("games_owned")?,
            },
            discount: row.get("discount")?,
            price: row.get("price")?,
        })
    }
}

/// Inserts the fixed sample catalogue: four studio/publisher/game triples,
/// four wallet/user pairs and one order per user.
pub fn seed(conn: &Connection) -> Result<()> {
    let catalogue = [
        ("Gearbox", 300, "2K Games", 393, "Borderlands 3", "FPS-Looter"),
        ("Raven Software", 239, "Activision", 1430, "COD: Modern Warfare", "FPS"),
        ("Visceral Games", 80, "Electronic Arts", 2687, "Battlefield 1", "FPS"),
        ("Valve", 360, "Sierra Ent.", 591, "Half-Life", "Action"),
    ];
    let accounts = [
        ("Paypal", 200, "Milly", 22, 350),
        ("BTC", 350, "Dylan", 14, 200),
        ("Paypal", 3000, "Haley", 7, 100),
        ("VISA", 750, "Gabe", 47, 860),
    ];
    let purchases = [(50, 8), (10, 120), (15, 90), (5, 25)];

    let mut game_ids = Vec::with_capacity(catalogue.len());
    for (studio, staff, publisher, published, game, genre) in catalogue {
        let studio_id = crud::insert(
            conn,
            &NewStudio {
                name: studio,
                employee_count: staff,
            },
        )?;
        let publisher_id = crud::insert(
            conn,
            &NewPublisher {
                name: publisher,
                games_published: published,
            },
        )?;
        game_ids.push(crud::insert(
            conn,
            &NewGame {
                publisher_id: Some(publisher_id),
                studio_id: Some(studio_id),
                name: game,
                genre,
            },
        )?);
    }

    let mut user_ids = Vec::with_capacity(accounts.len());
    for (method, balance, name, level, owned) in accounts {
        let wallet_id = crud::insert(
            conn,
            &NewWallet {
                payment_method: method,
                balance,
            },
        )?;
        user_ids.push(crud::insert(
            conn,
            &NewUser {
                wallet_id: Some(wallet_id),
                name,
                level,
                games_owned: owned,
            },
        )?);
    }

    let bought = game_ids.into_iter().zip(user_ids).zip(purchases);
    for ((game_id, user_id), (discount, price)) in bought {
        crud::insert(
            conn,
            &NewOrder {
                game_id: Some(game_id),
                user_id: Some(user_id),
                discount,
                price,
            },
        )?;
    }
    Ok(())
}

/// Every table listing plus the three views for `view_id`
pub fn showcase(conn: &Connection, view_id: i64) -> Result<Vec<Section>> {
    Ok(vec![
        Section::new("Studios", crud::list_records(conn, &STUDIOS)?),
        Section::new("Publishers", crud::list_records(conn, &PUBLISHERS)?),
        Section::new("Games", crud::list_records(conn, &GAMES)?),
        Section::new("Full_Games", join::view_records(conn, &GAME_VIEW, view_id)?),
        Section::new("Wallets", crud::list_records(conn, &WALLETS)?),
        Section::new("Users", crud::list_records(conn, &USERS)?),
        Section::new("Full_Users", join::view_records(conn, &USER_VIEW, view_id)?),
        Section::new("Orders", crud::list_records(conn, &ORDERS)?),
        Section::new("Full_Orders", join::view_records(conn, &ORDER_VIEW, view_id)?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::{create_tables, Value};
    use rusqlite::Connection;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        create_tables(&conn, TABLES).unwrap();
        seed(&conn).unwrap();
        conn
    }

    #[test]
    fn test_views_are_well_formed() {
        for query in [&GAME_VIEW, &USER_VIEW, &ORDER_VIEW] {
            assert!(query.sql().is_ok(), "{:?}", query.root.name);
        }
    }

    #[test]
    fn test_seed_counts() {
        let conn = seeded();
        for table in TABLES {
            assert_eq!(crud::count(&conn, table).unwrap(), 4, "{}", table.name);
        }
    }

    #[test]
    fn test_game_view_by_label() {
        let conn = seeded();
        let games = join::view::<GameView>(&conn, 4).unwrap();
        assert_eq!(
            games,
            vec![GameView {
                game_id: 4,
                game_name: "Half-Life".to_string(),
                genre: "Action".to_string(),
                studio_name: "Valve".to_string(),
                employee_count: 360,
                publisher_name: "Sierra Ent.".to_string(),
                games_published: 591,
            }]
        );
    }

    #[test]
    fn test_user_view() {
        let conn = seeded();
        let users = join::view::<UserView>(&conn, 2).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].payment_method, "BTC");
        assert_eq!(users[0].user_name, "Dylan");
    }

    #[test]
    fn test_order_view_spans_both_branches() {
        let conn = seeded();
        let orders = join::view::<OrderView>(&conn, 1).unwrap();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.game.game_name, "Borderlands 3");
        assert_eq!(order.game.studio_name, "Gearbox");
        assert_eq!(order.game.publisher_name, "2K Games");
        assert_eq!(order.buyer.user_name, "Milly");
        assert_eq!(order.buyer.payment_method, "Paypal");
        assert_eq!((order.discount, order.price), (50, 8));

        let records = join::view_records(&conn, &ORDER_VIEW, 1).unwrap();
        assert_eq!(records[0].names(), ORDER_VIEW.labels());
        assert_eq!(records[0].get("balance"), Some(&Value::Integer(200)));
    }

    #[test]
    fn test_showcase_sections() {
        let conn = seeded();
        let sections = showcase(&conn, 4).unwrap();
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Studios", "Publishers", "Games", "Full_Games", "Wallets", "Users",
                "Full_Users", "Orders", "Full_Orders"
            ]
        );
        assert!(sections.iter().all(|s| !s.records.is_empty()));
    }

    #[test]
    fn test_typed_listing_reads_null_foreign_keys() {
        let conn = seeded();
        crud::insert(
            &conn,
            &NewGame {
                publisher_id: None,
                studio_id: None,
                name: "Indie",
                genre: "Puzzle",
            },
        )
        .unwrap();
        conn.execute(
            "INSERT INTO Users(wallet_id, user_name, user_level, games_owned)
             VALUES (NULL, 'x', 1, 0)",
            [],
        )
        .unwrap();

        let games = crud::list::<Game>(&conn).unwrap();
        assert_eq!(games.len(), 5);
        assert_eq!((games[4].publisher_id, games[4].studio_id), (None, None));
        assert_eq!(games[0].publisher_id, Some(1));

        let users = crud::list::<User>(&conn).unwrap();
        assert_eq!(users[4].wallet_id, None);
        assert_eq!(users[4].name, "x");

        // Inner joins drop the row instead of failing
        assert!(join::view::<GameView>(&conn, 5).unwrap().is_empty());
    }
}
