//! # Staff Directory
//!
//! Cashier and manager accounts with hashed credentials. Cashiers and
//! managers live in separate collections; the role picks the collection
//! so a cashier login never scans manager records and vice versa.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use vela_core::error::CoreError;
use vela_core::validation::validate_business_key;
use vela_core::{Staff, StaffRole, ValidationError};
use vela_ledger::{collections, Ledger};

use crate::auth::CredentialHasher;
use crate::error::TerminalResult;

/// Input for registering a staff member.
#[derive(Debug, Clone)]
pub struct NewStaff {
    /// Business key typed at login (employee code), unique per role.
    pub business_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: StaffRole,
    pub assigned_store_id: Option<String>,
}

/// Partial profile update. `None` fields are untouched; credentials and
/// role are changed through their own flows, never here.
#[derive(Debug, Clone, Default)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub assigned_store_id: Option<Option<String>>,
}

/// The staff management component.
#[derive(Clone)]
pub struct StaffDirectory {
    ledger: Ledger,
    hasher: Arc<dyn CredentialHasher>,
}

impl StaffDirectory {
    pub fn new(ledger: Ledger, hasher: Arc<dyn CredentialHasher>) -> Self {
        StaffDirectory { ledger, hasher }
    }

    /// Registers a staff member, hashing the password before it is
    /// stored. The business id must be unique within the role.
    pub fn add(&self, new: NewStaff) -> TerminalResult<Staff> {
        validate_business_key("business_id", &new.business_id)?;
        validate_business_key("name", &new.name)?;
        if new.password.is_empty() {
            return Err(ValidationError::Required {
                field: "password".to_string(),
            }
            .into());
        }

        let collection = Self::collection(new.role);
        let mut members: Vec<Staff> = self.ledger.get_all(collection)?;

        if members.iter().any(|m| m.business_id == new.business_id) {
            return Err(ValidationError::duplicate("business_id", &new.business_id).into());
        }

        let staff = Staff {
            id: Uuid::new_v4().to_string(),
            business_id: new.business_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            password_hash: self.hasher.hash(&new.password)?,
            role: new.role,
            is_active: true,
            assigned_store_id: new.assigned_store_id,
            last_login: None,
        };

        members.push(staff.clone());
        self.ledger.put_all(collection, &members)?;

        info!(business_id = %staff.business_id, role = ?staff.role, "Staff registered");
        Ok(staff)
    }

    /// Verifies credentials against the role's collection. On success the
    /// member's last login is stamped and they become the current user.
    pub fn authenticate(
        &self,
        role: StaffRole,
        business_id: &str,
        password: &str,
    ) -> TerminalResult<Staff> {
        let collection = Self::collection(role);
        let mut members: Vec<Staff> = self.ledger.get_all(collection)?;

        let member = members
            .iter_mut()
            .find(|m| m.business_id == business_id && m.is_active);

        let Some(member) = member else {
            warn!(business_id, "Login failed: unknown or inactive account");
            return Err(CoreError::state("Invalid credentials").into());
        };

        if !self.hasher.verify(password, &member.password_hash) {
            warn!(business_id, "Login failed: wrong password");
            return Err(CoreError::state("Invalid credentials").into());
        }

        member.last_login = Some(Utc::now());
        let authenticated = member.clone();
        self.ledger.put_all(collection, &members)?;
        self.ledger
            .put_one(collections::CURRENT_USER, &authenticated)?;

        info!(business_id, role = ?role, "Login succeeded");
        Ok(authenticated)
    }

    /// The member authenticated last, if any.
    pub fn current_user(&self) -> TerminalResult<Option<Staff>> {
        Ok(self.ledger.get_one(collections::CURRENT_USER)?)
    }

    /// Ends the current session.
    pub fn logout(&self) -> TerminalResult<()> {
        self.ledger.clear_one(collections::CURRENT_USER)?;
        Ok(())
    }

    /// Lists one role's members.
    pub fn list(&self, role: StaffRole) -> TerminalResult<Vec<Staff>> {
        Ok(self.ledger.get_all(Self::collection(role))?)
    }

    /// Applies a partial profile update.
    pub fn update(
        &self,
        role: StaffRole,
        business_id: &str,
        update: StaffUpdate,
    ) -> TerminalResult<Staff> {
        if let Some(name) = &update.name {
            validate_business_key("name", name)?;
        }

        let collection = Self::collection(role);
        let mut members: Vec<Staff> = self.ledger.get_all(collection)?;

        let member = members
            .iter_mut()
            .find(|m| m.business_id == business_id)
            .ok_or_else(|| CoreError::not_found("Staff", business_id))?;

        if let Some(name) = update.name {
            member.name = name;
        }
        if let Some(email) = update.email {
            member.email = email;
        }
        if let Some(phone) = update.phone {
            member.phone = phone;
        }
        if let Some(assigned) = update.assigned_store_id {
            member.assigned_store_id = assigned;
        }

        let updated = member.clone();
        self.ledger.put_all(collection, &members)?;

        info!(business_id, "Staff profile updated");
        Ok(updated)
    }

    /// Deactivates a member. The record stays so receipts naming them
    /// keep resolving; they just cannot log in anymore.
    pub fn deactivate(&self, role: StaffRole, business_id: &str) -> TerminalResult<Staff> {
        let collection = Self::collection(role);
        let mut members: Vec<Staff> = self.ledger.get_all(collection)?;

        let member = members
            .iter_mut()
            .find(|m| m.business_id == business_id)
            .ok_or_else(|| CoreError::not_found("Staff", business_id))?;

        member.is_active = false;
        let updated = member.clone();
        self.ledger.put_all(collection, &members)?;

        info!(business_id, "Staff deactivated");
        Ok(updated)
    }

    fn collection(role: StaffRole) -> &'static str {
        match role {
            StaffRole::Cashier => collections::CASHIERS,
            StaffRole::Manager => collections::MANAGERS,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::CoreResult;

    /// Deterministic hasher so tests stay fast; Argon2 is exercised in
    /// the auth module's own tests.
    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> CoreResult<String> {
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("plain:{password}")
        }
    }

    fn directory() -> StaffDirectory {
        StaffDirectory::new(Ledger::in_memory(), Arc::new(PlainHasher))
    }

    fn new_staff(business_id: &str, role: StaffRole) -> NewStaff {
        NewStaff {
            business_id: business_id.to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "555-0100".to_string(),
            password: "hunter2".to_string(),
            role,
            assigned_store_id: None,
        }
    }

    #[test]
    fn test_add_hashes_password() {
        let directory = directory();
        let staff = directory.add(new_staff("C-1", StaffRole::Cashier)).unwrap();
        assert_eq!(staff.password_hash, "plain:hunter2");
        assert!(staff.is_active);
        assert!(staff.last_login.is_none());
    }

    #[test]
    fn test_business_id_unique_per_role() {
        let directory = directory();
        directory.add(new_staff("X-1", StaffRole::Cashier)).unwrap();

        let err = directory
            .add(new_staff("X-1", StaffRole::Cashier))
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));

        // Same id under the other role is a different namespace
        directory.add(new_staff("X-1", StaffRole::Manager)).unwrap();
    }

    #[test]
    fn test_authenticate_success_stamps_last_login() {
        let directory = directory();
        directory.add(new_staff("C-1", StaffRole::Cashier)).unwrap();

        let staff = directory
            .authenticate(StaffRole::Cashier, "C-1", "hunter2")
            .unwrap();
        assert!(staff.last_login.is_some());

        let current = directory.current_user().unwrap().unwrap();
        assert_eq!(current.business_id, "C-1");

        // The stamp persisted, not just the returned copy
        let stored = &directory.list(StaffRole::Cashier).unwrap()[0];
        assert!(stored.last_login.is_some());
    }

    #[test]
    fn test_authenticate_failures() {
        let directory = directory();
        directory.add(new_staff("C-1", StaffRole::Cashier)).unwrap();

        assert!(directory
            .authenticate(StaffRole::Cashier, "C-1", "wrong")
            .is_err());
        assert!(directory
            .authenticate(StaffRole::Cashier, "nobody", "hunter2")
            .is_err());
        // A cashier id does not authenticate as manager
        assert!(directory
            .authenticate(StaffRole::Manager, "C-1", "hunter2")
            .is_err());
        assert!(directory.current_user().unwrap().is_none());
    }

    #[test]
    fn test_deactivated_member_cannot_login() {
        let directory = directory();
        directory.add(new_staff("C-1", StaffRole::Cashier)).unwrap();
        directory.deactivate(StaffRole::Cashier, "C-1").unwrap();

        assert!(directory
            .authenticate(StaffRole::Cashier, "C-1", "hunter2")
            .is_err());
        // Record survives for historical lookups
        assert_eq!(directory.list(StaffRole::Cashier).unwrap().len(), 1);
    }

    #[test]
    fn test_update_profile() {
        let directory = directory();
        directory.add(new_staff("C-1", StaffRole::Cashier)).unwrap();

        let updated = directory
            .update(
                StaffRole::Cashier,
                "C-1",
                StaffUpdate {
                    phone: Some("555-0199".to_string()),
                    assigned_store_id: Some(Some("st1".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.phone, "555-0199");
        assert_eq!(updated.assigned_store_id.as_deref(), Some("st1"));
        // Untouched fields survive
        assert_eq!(updated.name, "Alice");
    }

    #[test]
    fn test_logout_clears_current_user() {
        let directory = directory();
        directory.add(new_staff("C-1", StaffRole::Cashier)).unwrap();
        directory
            .authenticate(StaffRole::Cashier, "C-1", "hunter2")
            .unwrap();

        directory.logout().unwrap();
        assert!(directory.current_user().unwrap().is_none());
    }
}
