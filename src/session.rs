//! The application session: an explicit context object that owns at most one
//! database handle and consumes user commands synchronously.

use tracing::{info, warn};

use crate::db::{
    connect, delete_profile, insert_profile, list_profiles, update_profile, ConnectionParams,
    Handle,
};
use crate::error::StoreError;
use crate::models::{CustomerProfile, ProfileFields};

/// A user action, produced by a front-end and consumed by [`Session::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileCommand {
    ListRequested,
    InsertRequested(ProfileFields),
    UpdateRequested(i64, ProfileFields),
    DeleteRequested(i64),
}

/// What a successfully dispatched command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Listed(Vec<CustomerProfile>),
    Inserted(i64),
    Updated(i64),
    Deleted(i64),
}

/// Two-state session machine.
#[derive(Debug, Default)]
pub enum Session {
    #[default]
    Disconnected,
    Connected(Handle),
}

impl Session {
    pub fn is_connected(&self) -> bool {
        matches!(self, Session::Connected(_))
    }

    /// Label of the open handle, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Session::Connected(handle) => Some(handle.label()),
            Session::Disconnected => None,
        }
    }

    /// Open a new handle. A handle that is already open is closed first; on
    /// failure the session ends up disconnected.
    pub fn connect(&mut self, params: &ConnectionParams) -> Result<(), StoreError> {
        self.close();
        let handle = connect(params)?;
        *self = Session::Connected(handle);
        Ok(())
    }

    /// Release the handle if one is open. Close errors are logged only: the
    /// session is disconnected either way.
    pub fn close(&mut self) {
        if let Session::Connected(handle) = std::mem::take(self) {
            if let Err(err) = handle.close() {
                warn!(error = %err, "ignoring error while closing session");
            }
        }
    }

    /// Run one command against the open handle. A connection failure drops
    /// the handle; statement failures leave it open.
    pub fn dispatch(&mut self, command: ProfileCommand) -> Result<CommandOutcome, StoreError> {
        let handle = match self {
            Session::Connected(handle) => handle,
            Session::Disconnected => return Err(StoreError::NotConnected),
        };

        let result = run(handle, command);

        if let Err(err) = &result {
            if err.is_connection_lost() {
                info!(error = %err, "connection lost; session is now disconnected");
                // The link is already gone, so skip the explicit close.
                *self = Session::Disconnected;
            }
        }

        result
    }
}

fn run(handle: &mut Handle, command: ProfileCommand) -> Result<CommandOutcome, StoreError> {
    match command {
        ProfileCommand::ListRequested => list_profiles(handle).map(CommandOutcome::Listed),
        ProfileCommand::InsertRequested(fields) => {
            insert_profile(handle, &fields).map(CommandOutcome::Inserted)
        }
        ProfileCommand::UpdateRequested(id, fields) => {
            update_profile(handle, id, &fields).map(|()| CommandOutcome::Updated(id))
        }
        ProfileCommand::DeleteRequested(id) => {
            delete_profile(handle, id).map(|()| CommandOutcome::Deleted(id))
        }
    }
}
