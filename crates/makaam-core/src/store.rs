//! Embedded document store backed by redb.
//!
//! # Table design
//!
//! Every document is stored as JSON bytes under a string key:
//! ```text
//! users        user id           -> User
//! user_emails  lowercased email  -> user id        (uniqueness index)
//! resources    resource id       -> Resource
//! checkins     "{user_id}/{week}" -> Checkin
//! ```
//!
//! The check-in key puts the owner first and the ISO week's Monday second,
//! so a prefix range scan returns one user's check-ins in week order and a
//! duplicate week collides on insert.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::checkin::{self, Checkin};
use crate::error::{MakaamError, Result};
use crate::resource::Resource;
use crate::user::{self, User};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
const USER_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("user_emails");
const RESOURCES: TableDefinition<&str, &[u8]> = TableDefinition::new("resources");
const CHECKINS: TableDefinition<&str, &[u8]> = TableDefinition::new("checkins");

fn store_err(e: impl Into<redb::Error>) -> MakaamError {
    MakaamError::Store(e.into().to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

fn modify_user_in<T>(
    users: &mut redb::Table<'_, &'static str, &'static [u8]>,
    id: Uuid,
    f: impl FnOnce(&mut User) -> Result<T>,
) -> Result<T> {
    let key = id.to_string();
    let mut user: User = {
        let found = users.get(key.as_str()).map_err(store_err)?;
        match found {
            Some(v) => decode(v.value())?,
            None => return Err(MakaamError::UserNotFound(key)),
        }
    };
    let out = f(&mut user)?;
    user.updated_at = chrono::Utc::now();
    let bytes = encode(&user)?;
    users
        .insert(key.as_str(), bytes.as_slice())
        .map_err(store_err)?;
    Ok(out)
}

fn put_checkin(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    entry: &Checkin,
) -> Result<()> {
    let key = entry.store_key();
    if table.get(key.as_str()).map_err(store_err)?.is_some() {
        return Err(MakaamError::CheckinExists {
            week: entry.week_start.to_string(),
        });
    }
    let bytes = encode(entry)?;
    table
        .insert(key.as_str(), bytes.as_slice())
        .map_err(store_err)?;
    Ok(())
}

/// Document counts for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Stats {
    pub users: usize,
    pub admins: usize,
    pub onboarded: usize,
    pub with_roadmap: usize,
    pub resources: usize,
    pub checkins: usize,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct Store {
    db: Database,
}

impl Store {
    /// Open or create the database at `path`, creating all tables.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(store_err)?;
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(USERS).map_err(store_err)?;
        wt.open_table(USER_EMAILS).map_err(store_err)?;
        wt.open_table(RESOURCES).map_err(store_err)?;
        wt.open_table(CHECKINS).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(Self { db })
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Insert a new user. Fails with `EmailTaken` if the email is indexed.
    pub fn create_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let bytes = encode(user)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut emails = wt.open_table(USER_EMAILS).map_err(store_err)?;
            if emails
                .get(user.email.as_str())
                .map_err(store_err)?
                .is_some()
            {
                return Err(MakaamError::EmailTaken(user.email.clone()));
            }
            emails
                .insert(user.email.as_str(), id.as_str())
                .map_err(store_err)?;
            let mut users = wt.open_table(USERS).map_err(store_err)?;
            users
                .insert(id.as_str(), bytes.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    pub fn get_user(&self, id: Uuid) -> Result<User> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let users = rt.open_table(USERS).map_err(store_err)?;
        let key = id.to_string();
        let found = users.get(key.as_str()).map_err(store_err)?;
        let user = match found {
            Some(v) => decode(v.value())?,
            None => return Err(MakaamError::UserNotFound(key)),
        };
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = user::normalize_email(email);
        let rt = self.db.begin_read().map_err(store_err)?;
        let emails = rt.open_table(USER_EMAILS).map_err(store_err)?;
        let users = rt.open_table(USERS).map_err(store_err)?;
        let id = match emails.get(email.as_str()).map_err(store_err)? {
            Some(v) => v.value().to_string(),
            None => return Ok(None),
        };
        let found = users.get(id.as_str()).map_err(store_err)?;
        let user = match found {
            Some(v) => Some(decode(v.value())?),
            None => None,
        };
        Ok(user)
    }

    /// Load, mutate and save a user inside one write transaction, so
    /// concurrent edits of the same document cannot overwrite each other.
    /// Nothing is written when `f` fails. The email must not be changed.
    pub fn modify_user<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut User) -> Result<T>,
    ) -> Result<T> {
        let wt = self.db.begin_write().map_err(store_err)?;
        let out = {
            let mut users = wt.open_table(USERS).map_err(store_err)?;
            modify_user_in(&mut users, id, f)?
        };
        wt.commit().map_err(store_err)?;
        Ok(out)
    }

    /// All users, oldest first.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut out: Vec<User> = self.scan(USERS)?;
        out.sort_by_key(|u| u.created_at);
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    pub fn insert_resource(&self, resource: &Resource) -> Result<()> {
        let id = resource.id.to_string();
        let bytes = encode(resource)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(RESOURCES).map_err(store_err)?;
            table
                .insert(id.as_str(), bytes.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    pub fn get_resource(&self, id: Uuid) -> Result<Resource> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(RESOURCES).map_err(store_err)?;
        let key = id.to_string();
        let found = table.get(key.as_str()).map_err(store_err)?;
        let resource = match found {
            Some(v) => decode(v.value())?,
            None => return Err(MakaamError::ResourceNotFound(key)),
        };
        Ok(resource)
    }

    pub fn update_resource(&self, resource: &Resource) -> Result<()> {
        let id = resource.id.to_string();
        let bytes = encode(resource)?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(RESOURCES).map_err(store_err)?;
            if table.get(id.as_str()).map_err(store_err)?.is_none() {
                return Err(MakaamError::ResourceNotFound(id));
            }
            table
                .insert(id.as_str(), bytes.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    /// Delete a resource and drop it from every user's saved list.
    pub fn delete_resource(&self, id: Uuid) -> Result<()> {
        let key = id.to_string();
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut resources = wt.open_table(RESOURCES).map_err(store_err)?;
            if resources.remove(key.as_str()).map_err(store_err)?.is_none() {
                return Err(MakaamError::ResourceNotFound(key));
            }

            let mut users = wt.open_table(USERS).map_err(store_err)?;
            let mut changed: Vec<(String, Vec<u8>)> = Vec::new();
            for entry in users.iter().map_err(store_err)? {
                let (k, v) = entry.map_err(store_err)?;
                let mut u: User = decode(v.value())?;
                if u.unsave_resource(id) {
                    changed.push((k.value().to_string(), encode(&u)?));
                }
            }
            for (k, v) in &changed {
                users
                    .insert(k.as_str(), v.as_slice())
                    .map_err(store_err)?;
            }
            if !changed.is_empty() {
                tracing::debug!(resource = %id, users = changed.len(), "unsaved deleted resource");
            }
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    pub fn list_resources(&self) -> Result<Vec<Resource>> {
        self.scan(RESOURCES)
    }

    // -----------------------------------------------------------------------
    // Check-ins
    // -----------------------------------------------------------------------

    /// Insert a check-in. Fails with `CheckinExists` for a repeated week.
    pub fn insert_checkin(&self, entry: &Checkin) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(CHECKINS).map_err(store_err)?;
            put_checkin(&mut table, entry)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    /// Insert a check-in and apply `f` to its owner in the same transaction.
    /// Either both are written or neither is. Returns the updated owner.
    pub fn insert_checkin_with_owner(
        &self,
        entry: &Checkin,
        f: impl FnOnce(&mut User) -> Result<()>,
    ) -> Result<User> {
        let wt = self.db.begin_write().map_err(store_err)?;
        let owner = {
            let mut table = wt.open_table(CHECKINS).map_err(store_err)?;
            put_checkin(&mut table, entry)?;
            let mut users = wt.open_table(USERS).map_err(store_err)?;
            modify_user_in(&mut users, entry.user_id, |user| {
                f(user)?;
                Ok(user.clone())
            })?
        };
        wt.commit().map_err(store_err)?;
        Ok(owner)
    }

    /// A user's check-ins, newest week first.
    pub fn list_checkins(&self, user_id: Uuid) -> Result<Vec<Checkin>> {
        let prefix = checkin::user_key_prefix(user_id);
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(CHECKINS).map_err(store_err)?;
        let mut out = Vec::new();
        for entry in table.range(prefix.as_str()..).map_err(store_err)? {
            let (k, v) = entry.map_err(store_err)?;
            if !k.value().starts_with(prefix.as_str()) {
                break;
            }
            out.push(decode::<Checkin>(v.value())?);
        }
        out.reverse();
        Ok(out)
    }

    pub fn delete_checkin(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let key = self
            .list_checkins(user_id)?
            .into_iter()
            .find(|c| c.id == id)
            .map(|c| c.store_key())
            .ok_or_else(|| MakaamError::CheckinNotFound(id.to_string()))?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(CHECKINS).map_err(store_err)?;
            table.remove(key.as_str()).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    pub fn stats(&self) -> Result<Stats> {
        let users = self.list_users()?;
        let checkins: Vec<Checkin> = self.scan(CHECKINS)?;
        Ok(Stats {
            users: users.len(),
            admins: users.iter().filter(|u| u.role.is_admin()).count(),
            onboarded: users.iter().filter(|u| u.onboarding_completed()).count(),
            with_roadmap: users.iter().filter(|u| u.roadmap.is_some()).count(),
            resources: self.list_resources()?.len(),
            checkins: checkins.len(),
        })
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn scan<T: DeserializeOwned>(&self, def: TableDefinition<&str, &[u8]>) -> Result<Vec<T>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(def).map_err(store_err)?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            out.push(decode(v.value())?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
