//! Persistence module split across logical submodules: connection
//! management, the profile queries, and one backend per driver.

mod connection;
#[cfg(feature = "mysql")]
mod mysql;
mod profiles;
mod sqlite;

pub use connection::{connect, ConnectionParams, Driver, Handle, DEFAULT_HOST, DEFAULT_PORT};
pub use profiles::{delete_profile, insert_profile, list_profiles, update_profile};

use crate::error::StoreError;
use crate::models::{CustomerProfile, ProfileFields};

/// Statements shared by every backend. MySQL and SQLite both accept `?`
/// placeholders, so the text is identical across drivers.
pub(crate) const SELECT_PROFILES: &str = "SELECT * FROM customer_profiles";
pub(crate) const INSERT_PROFILE: &str = "INSERT INTO customer_profiles (name, business_name, email, phone, address, description) VALUES (?, ?, ?, ?, ?, ?)";
pub(crate) const UPDATE_PROFILE: &str = "UPDATE customer_profiles SET name=?, business_name=?, email=?, phone=?, address=?, description=? WHERE id=?";
pub(crate) const DELETE_PROFILE: &str = "DELETE FROM customer_profiles WHERE id=?";

/// One open database session for a particular driver. Each method runs one
/// statement and auto-commits it.
pub(crate) trait ProfileBackend {
    fn list(&mut self) -> Result<Vec<CustomerProfile>, StoreError>;
    fn insert(&mut self, fields: &ProfileFields) -> Result<i64, StoreError>;
    /// Returns the number of rows the driver reports as affected.
    fn update(&mut self, id: i64, fields: &ProfileFields) -> Result<u64, StoreError>;
    fn delete(&mut self, id: i64) -> Result<u64, StoreError>;
    fn close(self: Box<Self>) -> Result<(), StoreError>;
}
