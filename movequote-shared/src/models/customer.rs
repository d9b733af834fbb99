use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::codes::{CodeEnum, OptionalServiceType, PackageType};
use crate::models::order::UserOrder;
use crate::pii::Masked;

/// Identifier generated by the store when a customer row is inserted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CustomerId(pub i32);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer record as persisted. The id is assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub customer_name: Masked<String>,
    pub tel: Masked<String>,
    pub email: Masked<String>,
    pub old_prefecture_id: String,
    pub old_address: Masked<String>,
    pub new_prefecture_id: String,
    pub new_address: Masked<String>,
}

impl From<&UserOrder> for Customer {
    fn from(order: &UserOrder) -> Self {
        Self {
            customer_name: order.customer_name.clone(),
            tel: order.tel.clone(),
            email: order.email.clone(),
            old_prefecture_id: order.old_prefecture_id.clone(),
            old_address: order.old_address.clone(),
            new_prefecture_id: order.new_prefecture_id.clone(),
            new_address: order.new_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerOptionService {
    pub customer_id: CustomerId,
    pub service: OptionalServiceType,
}

impl CustomerOptionService {
    pub fn service_code(&self) -> i32 {
        self.service.code()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerPackage {
    pub customer_id: CustomerId,
    pub package: PackageType,
    pub package_number: i32,
}

impl CustomerPackage {
    pub fn package_code(&self) -> i32 {
        self.package.code()
    }
}

/// Region a move starts from or ends in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prefecture {
    pub id: String,
    pub name: String,
}
