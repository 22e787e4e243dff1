//! Request-scoped store session
//!
//! Bike queries are built from an `Include` set: every requested relation
//! becomes a `LEFT JOIN` in one statement, and the joined rows are folded
//! back into one `Bike` per id.

use rusqlite::{params, Connection, Row};

use super::errors::StoreResult;
use crate::model::{Bike, BikeType, Include, Owner, WorkOrder};

/// Which bikes a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BikeFilter {
    All,
    Id(i64),
}

/// One open connection, closed on drop
pub struct Session {
    conn: Connection,
}

impl Session {
    pub(super) const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Fetch bikes ordered by id, with the requested relations populated
    pub fn bikes(&self, include: Include, filter: BikeFilter) -> StoreResult<Vec<Bike>> {
        let query = BikeQuery::build(include, filter);
        let mut stmt = self.conn.prepare(&query.sql)?;
        let mut rows = match filter {
            BikeFilter::All => stmt.query([])?,
            BikeFilter::Id(id) => stmt.query(params![id])?,
        };

        let mut bikes: Vec<Bike> = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            if bikes.last().map(|b| b.id) != Some(id) {
                bikes.push(query.read_bike(row)?);
            }

            let Some(col) = query.work_order_col else {
                continue;
            };
            if let Some(order) = read_work_order(row, col)? {
                if let Some(orders) = bikes.last_mut().and_then(|b| b.work_orders.as_mut()) {
                    orders.push(order);
                }
            }
        }

        Ok(bikes)
    }

    /// Fetch one bike with owner, bike type and all work orders
    pub fn find_bike(&self, id: i64) -> StoreResult<Option<Bike>> {
        Ok(self.bikes(Include::ALL, BikeFilter::Id(id))?.into_iter().next())
    }

    /// Count bikes with at least one work order that has not been completed
    pub fn count_bikes_in_service(&self) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM Bikes b
             WHERE EXISTS (
                 SELECT 1 FROM WorkOrders w
                 WHERE w.BikeId = b.Id AND w.DateCompleted IS NULL
             )",
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Round-trip to the database
    pub fn ping(&self) -> StoreResult<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

/// SQL text plus the column offsets of each joined relation
struct BikeQuery {
    sql: String,
    include: Include,
    owner_col: Option<usize>,
    bike_type_col: Option<usize>,
    work_order_col: Option<usize>,
}

const BIKE_COLUMNS: usize = 5;
const OWNER_COLUMNS: usize = 5;
const BIKE_TYPE_COLUMNS: usize = 2;

impl BikeQuery {
    fn build(include: Include, filter: BikeFilter) -> Self {
        let mut select = vec!["b.Id, b.Brand, b.Color, b.OwnerId, b.BikeTypeId"];
        let mut joins = Vec::new();
        let mut next = BIKE_COLUMNS;

        let owner_col = include.contains(Include::OWNER).then(|| {
            select.push("o.Id, o.Name, o.Address, o.Email, o.Telephone");
            joins.push("LEFT JOIN Owners o ON o.Id = b.OwnerId");
            let col = next;
            next += OWNER_COLUMNS;
            col
        });

        let bike_type_col = include.contains(Include::BIKE_TYPE).then(|| {
            select.push("t.Id, t.Name");
            joins.push("LEFT JOIN BikeTypes t ON t.Id = b.BikeTypeId");
            let col = next;
            next += BIKE_TYPE_COLUMNS;
            col
        });

        let work_order_col = include.contains(Include::WORK_ORDERS).then(|| {
            select.push(
                "w.Id, w.BikeId, w.Description, w.DateInitiated, w.DateCompleted, w.UserProfileId",
            );
            joins.push("LEFT JOIN WorkOrders w ON w.BikeId = b.Id");
            next
        });

        let mut sql = format!("SELECT {} FROM Bikes b", select.join(", "));
        for join in &joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if let BikeFilter::Id(_) = filter {
            sql.push_str(" WHERE b.Id = ?1");
        }
        sql.push_str(" ORDER BY b.Id");
        if work_order_col.is_some() {
            sql.push_str(", w.Id");
        }

        Self {
            sql,
            include,
            owner_col,
            bike_type_col,
            work_order_col,
        }
    }

    fn read_bike(&self, row: &Row<'_>) -> rusqlite::Result<Bike> {
        let owner = match self.owner_col {
            Some(col) => read_owner(row, col)?,
            None => None,
        };
        let bike_type = match self.bike_type_col {
            Some(col) => read_bike_type(row, col)?,
            None => None,
        };

        Ok(Bike {
            id: row.get(0)?,
            brand: row.get(1)?,
            color: row.get(2)?,
            owner_id: row.get(3)?,
            owner,
            bike_type_id: row.get(4)?,
            bike_type,
            work_orders: self
                .include
                .contains(Include::WORK_ORDERS)
                .then(Vec::new),
        })
    }
}

// Joined columns are all NULL when the related row is missing.

fn read_owner(row: &Row<'_>, col: usize) -> rusqlite::Result<Option<Owner>> {
    let Some(id) = row.get::<_, Option<i64>>(col)? else {
        return Ok(None);
    };
    Ok(Some(Owner {
        id,
        name: row.get(col + 1)?,
        address: row.get(col + 2)?,
        email: row.get(col + 3)?,
        telephone: row.get(col + 4)?,
    }))
}

fn read_bike_type(row: &Row<'_>, col: usize) -> rusqlite::Result<Option<BikeType>> {
    let Some(id) = row.get::<_, Option<i64>>(col)? else {
        return Ok(None);
    };
    Ok(Some(BikeType {
        id,
        name: row.get(col + 1)?,
    }))
}

fn read_work_order(row: &Row<'_>, col: usize) -> rusqlite::Result<Option<WorkOrder>> {
    let Some(id) = row.get::<_, Option<i64>>(col)? else {
        return Ok(None);
    };
    Ok(Some(WorkOrder {
        id,
        bike_id: row.get(col + 1)?,
        description: row.get(col + 2)?,
        date_initiated: row.get(col + 3)?,
        date_completed: row.get(col + 4)?,
        user_profile_id: row.get(col + 5)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::TestDb;

    #[test]
    fn test_query_joins_only_requested_relations() {
        let query = BikeQuery::build(Include::OWNER, BikeFilter::All);
        assert!(query.sql.contains("JOIN Owners"));
        assert!(!query.sql.contains("JOIN BikeTypes"));
        assert!(!query.sql.contains("JOIN WorkOrders"));
        assert!(!query.sql.contains("WHERE"));
        assert_eq!(query.owner_col, Some(5));

        let query = BikeQuery::build(Include::ALL, BikeFilter::Id(3));
        assert!(query.sql.contains("WHERE b.Id = ?1"));
        assert!(query.sql.ends_with("ORDER BY b.Id, w.Id"));
        assert_eq!(query.bike_type_col, Some(10));
        assert_eq!(query.work_order_col, Some(12));
    }

    #[test]
    fn test_empty_store() {
        let db = TestDb::new();
        let session = db.store.session().unwrap();
        assert!(session.bikes(Include::OWNER, BikeFilter::All).unwrap().is_empty());
        assert_eq!(session.count_bikes_in_service().unwrap(), 0);
        assert_eq!(session.find_bike(999).unwrap(), None);
    }

    #[test]
    fn test_list_with_owner() {
        let db = TestDb::new();
        let a = db.add_owner("A");
        let b = db.add_owner("B");
        let road = db.add_bike_type("Road");
        db.add_bike(a, road);
        db.add_bike(b, road);
        let third = db.add_bike(a, road);
        db.add_work_order(third, false);
        db.add_work_order(third, false);

        let session = db.store.session().unwrap();
        let bikes = session.bikes(Include::OWNER, BikeFilter::All).unwrap();
        assert_eq!(bikes.len(), 3);
        assert!(bikes.windows(2).all(|w| w[0].id < w[1].id));
        assert!(bikes.iter().all(|bike| bike.owner.is_some()));
        assert!(bikes.iter().all(|bike| bike.bike_type.is_none()));
        assert!(bikes.iter().all(|bike| bike.work_orders.is_none()));
        assert_eq!(bikes[1].owner.as_ref().unwrap().name, "B");
    }

    #[test]
    fn test_find_bike_without_work_orders() {
        let db = TestDb::new();
        let owner = db.add_owner("A");
        let kind = db.add_bike_type("Mountain");
        let id = db.add_bike_with_id(1, owner, kind);

        let session = db.store.session().unwrap();
        let bike = session.find_bike(id).unwrap().unwrap();
        assert_eq!(bike.owner.unwrap().name, "A");
        assert_eq!(bike.bike_type.unwrap().name, "Mountain");
        assert_eq!(bike.work_orders, Some(Vec::new()));
        assert_eq!(session.count_bikes_in_service().unwrap(), 0);
    }

    #[test]
    fn test_find_bike_collects_every_work_order() {
        let db = TestDb::new();
        let owner = db.add_owner("A");
        let kind = db.add_bike_type("Road");
        let id = db.add_bike(owner, kind);
        let open = db.add_work_order(id, false);
        let done = db.add_work_order(id, true);
        let other = db.add_bike(owner, kind);
        db.add_work_order(other, false);

        let bike = db.store.session().unwrap().find_bike(id).unwrap().unwrap();
        let orders = bike.work_orders.unwrap();
        assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![open, done]);
        assert!(orders[0].date_completed.is_none());
        assert!(orders[1].date_completed.is_some());
        assert!(orders.iter().all(|o| o.bike_id == id));
    }

    #[test]
    fn test_inventory_counts_distinct_bikes_with_open_orders() {
        let db = TestDb::new();
        let owner = db.add_owner("A");
        let kind = db.add_bike_type("Road");

        let idle = db.add_bike(owner, kind);
        let in_service = db.add_bike(owner, kind);
        db.add_work_order(in_service, false);
        db.add_work_order(in_service, false);
        let finished = db.add_bike(owner, kind);
        db.add_work_order(finished, true);
        let mixed = db.add_bike(owner, kind);
        db.add_work_order(mixed, true);
        db.add_work_order(mixed, false);

        let session = db.store.session().unwrap();
        assert_eq!(session.count_bikes_in_service().unwrap(), 2);
        assert_eq!(session.count_bikes_in_service().unwrap(), 2);
        assert_eq!(
            session.find_bike(idle).unwrap().unwrap().work_orders,
            Some(Vec::new())
        );
    }
}
