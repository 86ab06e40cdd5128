use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::db::{ConnectionParams, Driver, DEFAULT_PORT};
use crate::models::{CustomerProfile, ProfileFields};
use crate::settings::ConnectionDraft;

use super::helpers::single_line;

/// Fields of the database connection form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum ConnectField {
    #[default]
    Host,
    Port,
    User,
    Password,
    Database,
}

impl ConnectField {
    pub(crate) const ALL: [ConnectField; 5] = [
        ConnectField::Host,
        ConnectField::Port,
        ConnectField::User,
        ConnectField::Password,
        ConnectField::Database,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ConnectField::Host => "Host",
            ConnectField::Port => "Port",
            ConnectField::User => "User",
            ConnectField::Password => "Password",
            ConnectField::Database => "Database",
        }
    }
}

/// Internal representation of the connection form.
#[derive(Clone, Debug)]
pub(crate) struct ConnectForm {
    pub(crate) driver: Driver,
    pub(crate) host: String,
    pub(crate) port: String,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) database: String,
    pub(crate) active: ConnectField,
    pub(crate) error: Option<String>,
}

impl ConnectForm {
    /// Pre-fill from whatever the settings already know.
    pub(crate) fn from_draft(draft: &ConnectionDraft) -> Self {
        let params = draft.with_defaults();
        let active = if params.driver == Driver::Sqlite {
            ConnectField::Database
        } else {
            ConnectField::Host
        };
        Self {
            driver: params.driver,
            host: params.host,
            port: params.port.to_string(),
            user: params.user,
            password: params.password,
            database: params.database,
            active,
            error: None,
        }
    }

    /// Fields the current driver actually uses.
    pub(crate) fn visible_fields(&self) -> &'static [ConnectField] {
        match self.driver {
            Driver::Mysql => &ConnectField::ALL,
            Driver::Sqlite => &[ConnectField::Database],
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = cycle(self.visible_fields(), self.active, 1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = cycle(self.visible_fields(), self.active, -1);
    }

    fn value_mut(&mut self, field: ConnectField) -> &mut String {
        match field {
            ConnectField::Host => &mut self.host,
            ConnectField::Port => &mut self.port,
            ConnectField::User => &mut self.user,
            ConnectField::Password => &mut self.password,
            ConnectField::Database => &mut self.database,
        }
    }

    pub(crate) fn value(&self, field: ConnectField) -> &str {
        match field {
            ConnectField::Host => &self.host,
            ConnectField::Port => &self.port,
            ConnectField::User => &self.user,
            ConnectField::Password => &self.password,
            ConnectField::Database => &self.database,
        }
    }

    /// Append a character to the active field. The port only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.active == ConnectField::Port && !ch.is_ascii_digit() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Check the inputs and build connection parameters. MySQL needs every
    /// field; SQLite only needs the database path.
    pub(crate) fn parse_inputs(&self) -> Result<ConnectionParams> {
        let missing: Vec<&str> = self
            .visible_fields()
            .iter()
            .filter(|field| **field != ConnectField::Port)
            .filter(|field| self.value(**field).is_empty())
            .map(|field| field.label())
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!(
                "Please fill in all connection fields ({}).",
                missing.join(", ")
            ));
        }

        let port_raw = self.port.as_str();
        let port = if port_raw.is_empty() {
            DEFAULT_PORT
        } else {
            port_raw
                .parse::<u16>()
                .context("Port must be a number between 0 and 65535.")?
        };

        Ok(ConnectionParams {
            driver: self.driver,
            host: self.host.clone(),
            port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        })
    }

    /// Render a single line for the form widget. The password is masked.
    pub(crate) fn build_line(&self, field: ConnectField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;
        let display = if value.is_empty() {
            "<required>".to_string()
        } else if field == ConnectField::Password {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, field_style(is_active, value.is_empty())),
        ])
    }

    /// Character count of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: ConnectField) -> usize {
        self.value(field).chars().count()
    }
}

/// Fields of the profile form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum ProfileField {
    #[default]
    Name,
    BusinessName,
    Email,
    Phone,
    Address,
    Description,
}

impl ProfileField {
    pub(crate) const ALL: [ProfileField; 6] = [
        ProfileField::Name,
        ProfileField::BusinessName,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::Address,
        ProfileField::Description,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            ProfileField::Name => "Name",
            ProfileField::BusinessName => "Business Name",
            ProfileField::Email => "Email",
            ProfileField::Phone => "Phone",
            ProfileField::Address => "Address",
            ProfileField::Description => "Description",
        }
    }

    pub(crate) fn is_required(self) -> bool {
        matches!(
            self,
            ProfileField::Name | ProfileField::BusinessName | ProfileField::Email
        )
    }

    /// Address and description accept line breaks.
    pub(crate) fn is_multiline(self) -> bool {
        matches!(self, ProfileField::Address | ProfileField::Description)
    }
}

/// Form state for adding or editing a profile.
#[derive(Clone, Debug, Default)]
pub(crate) struct ProfileForm {
    pub(crate) fields: ProfileFields,
    pub(crate) active: ProfileField,
    pub(crate) error: Option<String>,
}

impl ProfileForm {
    /// Populate the form from an existing profile when editing.
    pub(crate) fn from_profile(profile: &CustomerProfile) -> Self {
        Self {
            fields: profile.fields(),
            active: ProfileField::Name,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = cycle(&ProfileField::ALL, self.active, 1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = cycle(&ProfileField::ALL, self.active, -1);
    }

    pub(crate) fn value(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.fields.name,
            ProfileField::BusinessName => &self.fields.business_name,
            ProfileField::Email => &self.fields.email,
            ProfileField::Phone => &self.fields.phone,
            ProfileField::Address => &self.fields.address,
            ProfileField::Description => &self.fields.description,
        }
    }

    fn value_mut(&mut self, field: ProfileField) -> &mut String {
        match field {
            ProfileField::Name => &mut self.fields.name,
            ProfileField::BusinessName => &mut self.fields.business_name,
            ProfileField::Email => &mut self.fields.email,
            ProfileField::Phone => &mut self.fields.phone,
            ProfileField::Address => &mut self.fields.address,
            ProfileField::Description => &mut self.fields.description,
        }
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    /// Start a new line in the active field when it is multi-line.
    pub(crate) fn push_newline(&mut self) -> bool {
        if !self.active.is_multiline() {
            return false;
        }
        self.value_mut(self.active).push('\n');
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Run the required-field gate and hand back the values to persist.
    pub(crate) fn parse_inputs(&self) -> Result<ProfileFields> {
        self.fields.validate_required()?;
        Ok(self.fields.clone())
    }

    /// Values for an update. Edits are not gated, matching the add-only
    /// validation of the store's callers.
    pub(crate) fn values(&self) -> ProfileFields {
        self.fields.clone()
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field: ProfileField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;
        let display = if value.is_empty() {
            if field.is_required() {
                "<required>".to_string()
            } else {
                "<optional>".to_string()
            }
        } else {
            single_line(value)
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, field_style(is_active, value.is_empty())),
        ])
    }

    /// Displayed character count of the requested field.
    pub(crate) fn value_len(&self, field: ProfileField) -> usize {
        single_line(self.value(field)).chars().count()
    }
}

/// State for confirming a profile deletion.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmProfileDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) business_name: String,
}

impl ConfirmProfileDelete {
    pub(crate) fn from(profile: &CustomerProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            business_name: profile.business_name.clone(),
        }
    }
}

fn field_style(is_active: bool, is_empty: bool) -> Style {
    if is_active {
        Style::default().fg(Color::Yellow)
    } else if is_empty {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

/// Step through `order` starting at `current`, wrapping at either end.
fn cycle<T: Copy + PartialEq>(order: &[T], current: T, step: isize) -> T {
    let len = order.len() as isize;
    let index = order.iter().position(|f| *f == current).unwrap_or(0) as isize;
    order[(index + step).rem_euclid(len) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_form_cycles_through_all_fields() {
        let mut form = ProfileForm::default();
        for expected in ProfileField::ALL.iter().skip(1) {
            form.next_field();
            assert_eq!(form.active, *expected);
        }
        form.next_field();
        assert_eq!(form.active, ProfileField::Name);
        form.previous_field();
        assert_eq!(form.active, ProfileField::Description);
    }

    #[test]
    fn add_form_rejects_blank_required_fields() {
        let mut form = ProfileForm::default();
        for ch in "Ada".chars() {
            form.push_char(ch);
        }
        let err = form.parse_inputs().unwrap_err();
        assert!(err.to_string().contains("Business Name"));
    }

    #[test]
    fn newlines_only_land_in_multiline_fields() {
        let mut form = ProfileForm::default();
        assert!(!form.push_newline());
        form.active = ProfileField::Address;
        form.push_char('A');
        assert!(form.push_newline());
        form.push_char('B');
        assert_eq!(form.fields.address, "A\nB");
        assert_eq!(form.value_len(ProfileField::Address), 3);
    }

    #[test]
    fn connect_form_masks_password_and_filters_port() {
        let mut form = ConnectForm::from_draft(&ConnectionDraft::default());
        assert_eq!(form.host, "localhost");
        assert_eq!(form.port, "3306");

        form.active = ConnectField::Port;
        assert!(!form.push_char('x'));

        form.active = ConnectField::Password;
        form.push_char('p');
        form.push_char('w');
        let line = form.build_line(ConnectField::Password);
        let rendered: String = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(rendered, "Password: **");
    }

    #[test]
    fn connect_form_requires_all_mysql_fields() {
        let form = ConnectForm::from_draft(&ConnectionDraft {
            user: Some("crm".into()),
            ..ConnectionDraft::default()
        });
        let err = form.parse_inputs().unwrap_err().to_string();
        assert!(err.contains("Password"));
        assert!(err.contains("Database"));
        assert!(!err.contains("Host"));
    }

    #[test]
    fn sqlite_connect_form_only_needs_database() {
        let form = ConnectForm::from_draft(&ConnectionDraft {
            driver: Some(Driver::Sqlite),
            database: Some("profiles.sqlite".into()),
            ..ConnectionDraft::default()
        });
        assert_eq!(form.visible_fields(), &[ConnectField::Database]);
        let params = form.parse_inputs().unwrap();
        assert_eq!(params.driver, Driver::Sqlite);
        assert_eq!(params.database, "profiles.sqlite");
    }
}
