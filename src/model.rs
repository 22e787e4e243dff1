//! Domain records
//!
//! Read views of the rows owned by the store. Relations that were not
//! eager-loaded stay `None` and serialize as `null`.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A bike brought in to the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bike {
    pub id: i64,
    pub brand: String,
    pub color: String,
    pub owner_id: i64,
    pub owner: Option<Owner>,
    pub bike_type_id: i64,
    pub bike_type: Option<BikeType>,
    pub work_orders: Option<Vec<WorkOrder>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub telephone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BikeType {
    pub id: i64,
    pub name: String,
}

/// A unit of service work on a bike
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: i64,
    pub bike_id: i64,
    pub description: String,
    pub date_initiated: DateTime<Utc>,
    /// `None` while the work is still open
    pub date_completed: Option<DateTime<Utc>>,
    pub user_profile_id: Option<i64>,
}

/// Set of bike relations to eager-load with a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Include(u8);

impl Include {
    #[cfg(test)]
    pub const NONE: Self = Self(0);
    pub const OWNER: Self = Self(1);
    pub const BIKE_TYPE: Self = Self(1 << 1);
    pub const WORK_ORDERS: Self = Self(1 << 2);
    pub const ALL: Self = Self(Self::OWNER.0 | Self::BIKE_TYPE.0 | Self::WORK_ORDERS.0);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Include {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
