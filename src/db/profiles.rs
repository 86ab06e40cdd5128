//! The four profile store operations. Each takes the handle explicitly, runs
//! one auto-committed statement through the handle's backend and logs the
//! outcome.

use tracing::{debug, info, warn};

use super::Handle;
use crate::error::StoreError;
use crate::models::{CustomerProfile, ProfileFields};

/// Run the unfiltered `SELECT *`. The result is tagged: callers decide
/// whether a failure degrades to an empty listing.
pub fn list_profiles(handle: &mut Handle) -> Result<Vec<CustomerProfile>, StoreError> {
    match handle.backend.list() {
        Ok(profiles) => {
            debug!(db = %handle.label(), rows = profiles.len(), "fetched customer profiles");
            Ok(profiles)
        }
        Err(err) => {
            warn!(db = %handle.label(), error = %err, "failed to fetch customer profiles");
            Err(err)
        }
    }
}

/// Insert a profile and return the id the storage layer assigned. No
/// validation happens here; blank strings are stored as given.
pub fn insert_profile(handle: &mut Handle, fields: &ProfileFields) -> Result<i64, StoreError> {
    match handle.backend.insert(fields) {
        Ok(id) => {
            info!(db = %handle.label(), id, "profile added");
            Ok(id)
        }
        Err(err) => {
            warn!(db = %handle.label(), error = %err, "failed to add profile");
            Err(err)
        }
    }
}

/// Overwrite every editable column of row `id`. Touching zero rows is not an
/// error: the last writer wins and a missing id is simply a no-op.
pub fn update_profile(
    handle: &mut Handle,
    id: i64,
    fields: &ProfileFields,
) -> Result<(), StoreError> {
    match handle.backend.update(id, fields) {
        Ok(rows) => {
            info!(db = %handle.label(), id, rows, "profile updated");
            Ok(())
        }
        Err(err) => {
            warn!(db = %handle.label(), id, error = %err, "failed to update profile");
            Err(err)
        }
    }
}

/// Remove row `id`; a missing id is a no-op.
pub fn delete_profile(handle: &mut Handle, id: i64) -> Result<(), StoreError> {
    match handle.backend.delete(id) {
        Ok(rows) => {
            info!(db = %handle.label(), id, rows, "profile deleted");
            Ok(())
        }
        Err(err) => {
            warn!(db = %handle.label(), id, error = %err, "failed to delete profile");
            Err(err)
        }
    }
}
