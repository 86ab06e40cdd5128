//! Domain models that mirror the `customer_profiles` table and get passed
//! between the persistence layer and the front-ends. They stay light-weight
//! data holders so other layers can focus on presentation and persistence.

use std::fmt;

use crate::error::StoreError;

/// Column headers in table order. Shared by the TUI table and the headless
/// `list` output.
pub const PROFILE_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "business_name",
    "email",
    "phone",
    "address",
    "description",
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of `customer_profiles`.
pub struct CustomerProfile {
    /// Primary key assigned by the storage layer. Update and delete flows
    /// address rows exclusively through it.
    pub id: i64,
    pub name: String,
    pub business_name: String,
    pub email: String,
    /// Optional; `NULL` columns come back as empty strings.
    pub phone: String,
    /// Optional multi-line text.
    pub address: String,
    /// Optional multi-line text.
    pub description: String,
}

impl CustomerProfile {
    /// Assemble a profile from its id and editable fields.
    pub fn from_fields(id: i64, fields: ProfileFields) -> Self {
        Self {
            id,
            name: fields.name,
            business_name: fields.business_name,
            email: fields.email,
            phone: fields.phone,
            address: fields.address,
            description: fields.description,
        }
    }

    /// Copy out the six editable attributes, e.g. to seed an edit form.
    pub fn fields(&self) -> ProfileFields {
        ProfileFields {
            name: self.name.clone(),
            business_name: self.business_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            description: self.description.clone(),
        }
    }

    /// String form of every column in [`PROFILE_COLUMNS`] order. Search and
    /// table rendering both work from this.
    pub fn column_values(&self) -> [String; 7] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.business_name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.address.clone(),
            self.description.clone(),
        ]
    }
}

impl fmt::Display for CustomerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.name, self.business_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The editable attributes of a profile, bound in statement order by insert
/// and update.
pub struct ProfileFields {
    pub name: String,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub description: String,
}

impl ProfileFields {
    /// Reject a profile whose name, business name or email is empty.
    ///
    /// The store never calls this; front-ends run it before dispatching an
    /// insert so nothing reaches the database when the gate fails.
    pub fn validate_required(&self) -> Result<(), StoreError> {
        let missing: Vec<&str> = [
            ("Name", &self.name),
            ("Business Name", &self.business_name),
            ("Email", &self.email),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(label, _)| label)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(format!(
                "Please fill in all required fields ({}).",
                missing.join(", ")
            )))
        }
    }
}
