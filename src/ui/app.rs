use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use crate::db::ConnectionParams;
use crate::error::StoreError;
use crate::models::PROFILE_COLUMNS;
use crate::session::{CommandOutcome, ProfileCommand, Session};
use crate::settings::{ConnectionDraft, Settings};

use super::forms::{ConfirmProfileDelete, ConnectForm, ProfileField, ProfileForm};
use super::helpers::{centered_rect, profile_column_widths, single_line, surface_error};
use super::screens::ProfilesScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_SIZE: isize = 10;

/// Top-level screens. The connect screen is what the user sees while the
/// session is disconnected.
enum Screen {
    Connect(ConnectForm),
    Profiles(ProfilesScreen),
}

/// Fine-grained modes scoped to the profiles screen.
enum Mode {
    Normal,
    Searching(SearchState),
    AddingProfile(ProfileForm),
    EditingProfile { id: i64, form: ProfileForm },
    ConfirmDelete(ConfirmProfileDelete),
}

/// State for an active inline search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Follow-up work collected while the profiles screen is borrowed.
enum ProfileAction {
    Refresh,
    Disconnect,
}

/// Central application state shared across the TUI.
pub struct App {
    session: Session,
    draft: ConnectionDraft,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app from resolved settings. A complete parameter set counts
    /// as preloaded secrets and connects straight away.
    pub fn new(settings: &Settings) -> Self {
        let mut app = Self {
            session: Session::default(),
            draft: settings.connection.clone(),
            screen: Screen::Connect(ConnectForm::from_draft(&settings.connection)),
            mode: Mode::Normal,
            status: None,
        };

        match settings.connection.complete() {
            Some(params) => app.connect_with(params),
            None => app.set_status(
                "Please connect to the database to manage customer profiles.",
                StatusKind::Info,
            ),
        }

        app
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Close the database handle if one is open.
    pub fn shutdown(&mut self) {
        self.session.close();
    }

    /// Route a key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let next = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::AddingProfile(form) => self.handle_add_profile(code, form),
            Mode::EditingProfile { id, form } => self.handle_edit_profile(code, id, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
        };

        // Losing the connection always lands on the plain connect screen.
        self.mode = match self.screen {
            Screen::Connect(_) => Mode::Normal,
            Screen::Profiles(_) => next,
        };
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        if matches!(self.screen, Screen::Connect(_)) {
            self.handle_connect_key(code, exit);
            return Mode::Normal;
        }
        let Screen::Profiles(profiles) = &mut self.screen else {
            return Mode::Normal;
        };

        let mut action = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => profiles.move_selection(-1),
            KeyCode::Down => profiles.move_selection(1),
            KeyCode::PageUp => profiles.move_selection(-PAGE_SIZE),
            KeyCode::PageDown => profiles.move_selection(PAGE_SIZE),
            KeyCode::Home => profiles.select_first(),
            KeyCode::End => profiles.select_last(),
            KeyCode::Char('f') | KeyCode::Char('/') => {
                return Mode::Searching(SearchState {
                    query: profiles.filter.clone().unwrap_or_default(),
                });
            }
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Mode::AddingProfile(ProfileForm::default());
            }
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                if let Some(profile) = profiles.current_profile().cloned() {
                    self.clear_status();
                    return Mode::EditingProfile {
                        id: profile.id,
                        form: ProfileForm::from_profile(&profile),
                    };
                }
                self.set_status("No profile selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') => {
                if let Some(profile) = profiles.current_profile() {
                    let confirm = ConfirmProfileDelete::from(profile);
                    self.clear_status();
                    return Mode::ConfirmDelete(confirm);
                }
                self.set_status("No profile selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => action = Some(ProfileAction::Refresh),
            KeyCode::Char('d') | KeyCode::Char('D') => action = Some(ProfileAction::Disconnect),
            _ => {}
        }

        match action {
            Some(ProfileAction::Refresh) => {
                self.clear_status();
                self.refresh(None);
            }
            Some(ProfileAction::Disconnect) => {
                self.enter_disconnected();
                self.set_status("Disconnected.", StatusKind::Info);
            }
            None => {}
        }
        Mode::Normal
    }

    fn handle_connect_key(&mut self, code: KeyCode, exit: &mut bool) {
        let Screen::Connect(form) = &mut self.screen else {
            return;
        };

        let mut submitted = None;
        match code {
            KeyCode::Esc => *exit = true,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => submitted = Some(form.parse_inputs()),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        match submitted {
            Some(Ok(params)) => self.connect_with(params),
            Some(Err(err)) => {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
            None => {}
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        let Screen::Profiles(profiles) = &mut self.screen else {
            return Mode::Normal;
        };

        match code {
            KeyCode::Esc => {
                profiles.set_filter(None);
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Up => profiles.move_selection(-1),
            KeyCode::Down => profiles.move_selection(1),
            KeyCode::PageUp => profiles.move_selection(-PAGE_SIZE),
            KeyCode::PageDown => profiles.move_selection(PAGE_SIZE),
            KeyCode::Home => profiles.select_first(),
            KeyCode::End => profiles.select_last(),
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => {}
        }

        if state.query.is_empty() {
            profiles.set_filter(None);
        } else {
            profiles.set_filter(Some(state.query.clone()));
        }

        Mode::Searching(state)
    }

    fn handle_add_profile(&mut self, code: KeyCode, mut form: ProfileForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add profile cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => return self.save_new_profile(form),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::AddingProfile(form)
    }

    fn handle_edit_profile(&mut self, code: KeyCode, id: i64, mut form: ProfileForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => return self.save_existing_profile(id, form),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingProfile { id, form }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmProfileDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.perform_delete(&confirm);
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    /// Ctrl+D inside the edit form asks to delete the record being edited.
    pub(crate) fn handle_ctrl_d(&mut self) -> Result<()> {
        let Mode::EditingProfile { id, form } = &self.mode else {
            return Ok(());
        };

        let listed = match &self.screen {
            Screen::Profiles(profiles) => profiles.profiles.iter().find(|p| p.id == *id),
            Screen::Connect(_) => None,
        };
        let confirm = match listed {
            Some(profile) => ConfirmProfileDelete::from(profile),
            None => ConfirmProfileDelete {
                id: *id,
                name: form.fields.name.clone(),
                business_name: form.fields.business_name.clone(),
            },
        };
        self.mode = Mode::ConfirmDelete(confirm);
        Ok(())
    }

    /// Ctrl+N starts a new line in the address or description field.
    pub(crate) fn handle_ctrl_n(&mut self) -> Result<()> {
        if let Mode::AddingProfile(form) | Mode::EditingProfile { form, .. } = &mut self.mode {
            if form.push_newline() {
                form.error = None;
            }
        }
        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Connect(form) => self.draw_connect_form(frame, content_area, form),
            Screen::Profiles(profiles) => self.draw_profile_table(frame, content_area, profiles),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingProfile(form) => {
                self.draw_profile_form(frame, area, "Add a New Customer Profile", form)
            }
            Mode::EditingProfile { id, form } => {
                self.draw_profile_form(frame, area, &format!("Edit Profile #{id}"), form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_connect_form(&self, frame: &mut Frame, area: Rect, form: &ConnectForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let title = format!("Database Connection ({})", form.driver);
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let fields = form.visible_fields();
        let mut lines: Vec<Line> = fields.iter().map(|f| form.build_line(*f)).collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to connect • Tab to switch • Esc to quit",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        let row = fields.iter().position(|f| *f == form.active).unwrap_or(0);
        let prefix = field_prefix_len(form.active.label());
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row as u16,
        ));
    }

    fn draw_profile_table(&self, frame: &mut Frame, area: Rect, profiles: &ProfilesScreen) {
        let title = format!(
            "Customer Profiles | {} | {} of {}",
            self.session.label().unwrap_or("disconnected"),
            profiles.filtered.len(),
            profiles.profiles.len()
        );
        let block = Block::default().title(title).borders(Borders::ALL);

        if profiles.filtered.is_empty() {
            let message = match &profiles.filter {
                Some(term) if !profiles.profiles.is_empty() => {
                    format!("No profiles match \"{term}\".")
                }
                _ => "No profiles found. Press '+' to add one.".to_string(),
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(PROFILE_COLUMNS.iter().map(|column| Cell::from(*column)))
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = profiles.filtered.iter().map(|profile| {
            Row::new(
                profile
                    .column_values()
                    .into_iter()
                    .map(|value| Cell::from(single_line(&value))),
            )
        });

        let table = Table::new(rows, profile_column_widths())
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = TableState::default();
        state.select(Some(profiles.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search Profiles");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode) {
            (Screen::Connect(_), _) => key_hints(&[
                ("[Tab]", "Next Field"),
                ("[Enter]", "Connect"),
                ("[Esc]", "Quit"),
            ]),
            (_, Mode::Searching(_)) => key_hints(&[
                ("[↑↓]", "Select"),
                ("[Enter]", "Keep Filter"),
                ("[Esc]", "Clear Filter"),
            ]),
            (_, Mode::AddingProfile(_)) => key_hints(&[
                ("[Tab]", "Next Field"),
                ("[Ctrl+N]", "New Line"),
                ("[Enter]", "Add Profile"),
                ("[Esc]", "Cancel"),
            ]),
            (_, Mode::EditingProfile { .. }) => key_hints(&[
                ("[Tab]", "Next Field"),
                ("[Ctrl+N]", "New Line"),
                ("[Enter]", "Update Profile"),
                ("[Ctrl+D]", "Delete Profile"),
                ("[Esc]", "Cancel"),
            ]),
            (_, Mode::ConfirmDelete(_)) => key_hints(&[("[y]", "Delete"), ("[n]", "Keep")]),
            (Screen::Profiles(_), Mode::Normal) => key_hints(&[
                ("[↑↓]", "Select"),
                ("[f]", "Search"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[r]", "Refresh"),
                ("[d]", "Disconnect"),
                ("[q]", "Quit"),
            ]),
        }
    }

    fn draw_profile_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &ProfileForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = ProfileField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        let row = ProfileField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0);
        let prefix = field_prefix_len(form.active.label());
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row as u16,
        ));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmProfileDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Delete Profile")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete profile #{} ({}, {})?",
                confirm.id, confirm.name, confirm.business_name
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press y to delete or n to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn connect_with(&mut self, params: ConnectionParams) {
        self.draft = ConnectionDraft::from(&params);
        match self.session.connect(&params) {
            Ok(()) => {
                let label = self.session.label().unwrap_or_default().to_string();
                self.screen = Screen::Profiles(ProfilesScreen::new(Vec::new()));
                self.set_status(format!("Connected to {label}."), StatusKind::Info);
                self.refresh(None);
            }
            Err(err) => {
                let message = err.to_string();
                let mut form = match mem::replace(
                    &mut self.screen,
                    Screen::Profiles(ProfilesScreen::new(Vec::new())),
                ) {
                    Screen::Connect(form) => form,
                    Screen::Profiles(_) => ConnectForm::from_draft(&self.draft),
                };
                form.error = Some(message.clone());
                self.screen = Screen::Connect(form);
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    /// Drop back to the connect screen, pre-filled with the last parameters.
    fn enter_disconnected(&mut self) {
        self.session.close();
        self.screen = Screen::Connect(ConnectForm::from_draft(&self.draft));
    }

    /// Fetch the full listing again. A failed fetch degrades to an empty table
    /// with the error in the footer; a lost connection ends the session.
    fn refresh(&mut self, focus_id: Option<i64>) {
        let profiles = match self.session.dispatch(ProfileCommand::ListRequested) {
            Ok(CommandOutcome::Listed(profiles)) => profiles,
            Ok(_) => Vec::new(),
            Err(err) => {
                self.set_status(err.to_string(), StatusKind::Error);
                if err.is_connection_lost() {
                    self.enter_disconnected();
                    return;
                }
                Vec::new()
            }
        };

        if let Screen::Profiles(screen) = &mut self.screen {
            screen.set_profiles(profiles, focus_id);
        } else {
            self.screen = Screen::Profiles(ProfilesScreen::new(profiles));
        }
    }

    fn save_new_profile(&mut self, mut form: ProfileForm) -> Mode {
        let fields = match form.parse_inputs() {
            Ok(fields) => fields,
            Err(err) => {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                return Mode::AddingProfile(form);
            }
        };

        match self.session.dispatch(ProfileCommand::InsertRequested(fields)) {
            Ok(outcome) => {
                let focus = match outcome {
                    CommandOutcome::Inserted(id) => Some(id),
                    _ => None,
                };
                self.set_status("Profile added successfully!", StatusKind::Info);
                self.refresh(focus);
                Mode::Normal
            }
            Err(err) => self.store_failure(err, form, Mode::AddingProfile),
        }
    }

    fn save_existing_profile(&mut self, id: i64, form: ProfileForm) -> Mode {
        match self
            .session
            .dispatch(ProfileCommand::UpdateRequested(id, form.values()))
        {
            Ok(_) => {
                self.set_status("Profile updated successfully!", StatusKind::Info);
                self.refresh(Some(id));
                Mode::Normal
            }
            Err(err) => self.store_failure(err, form, |form| Mode::EditingProfile { id, form }),
        }
    }

    fn perform_delete(&mut self, confirm: &ConfirmProfileDelete) {
        match self
            .session
            .dispatch(ProfileCommand::DeleteRequested(confirm.id))
        {
            Ok(_) => {
                self.set_status("Profile deleted successfully!", StatusKind::Info);
                self.refresh(None);
            }
            Err(err) => {
                self.set_status(err.to_string(), StatusKind::Error);
                if err.is_connection_lost() {
                    self.enter_disconnected();
                }
            }
        }
    }

    /// Report a failed mutation. Statement errors keep the form open so the
    /// user can retry; a lost connection returns to the connect screen.
    fn store_failure(
        &mut self,
        err: StoreError,
        mut form: ProfileForm,
        reopen: impl FnOnce(ProfileForm) -> Mode,
    ) -> Mode {
        let message = err.to_string();
        self.set_status(message.clone(), StatusKind::Error);
        if err.is_connection_lost() {
            self.enter_disconnected();
            return Mode::Normal;
        }
        form.error = Some(message);
        reopen(form)
    }
}

fn key_hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, label) in pairs {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::raw(format!(" {label}   ")));
    }
    Line::from(spans)
}

/// Width of the `Label: ` prefix that precedes each form value.
fn field_prefix_len(label: &str) -> u16 {
    (label.len() + 2) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Driver;
    use rusqlite::Connection;
    use tempfile::TempDir;

    const SCHEMA: &str = "CREATE TABLE customer_profiles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        business_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        address TEXT,
        description TEXT
    )";

    struct Fixture {
        dir: TempDir,
        app: App,
    }

    impl Fixture {
        fn new(schema: Option<&str>, seed: &[(&str, &str, &str)]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("profiles.sqlite");
            let conn = Connection::open(&path).unwrap();
            if let Some(schema) = schema {
                conn.execute_batch(schema).unwrap();
                for (name, business, email) in seed {
                    conn.execute(
                        "INSERT INTO customer_profiles (name, business_name, email) VALUES (?1, ?2, ?3)",
                        [name, business, email],
                    )
                    .unwrap();
                }
            }
            drop(conn);

            let settings = Settings {
                connection: ConnectionDraft {
                    driver: Some(Driver::Sqlite),
                    database: Some(path.to_string_lossy().into_owned()),
                    ..ConnectionDraft::default()
                },
                log_dir: dir.path().join("logs"),
            };
            let app = App::new(&settings);
            Self { dir, app }
        }

        fn row_count(&self) -> i64 {
            let conn = Connection::open(self.dir.path().join("profiles.sqlite")).unwrap();
            conn.query_row("SELECT COUNT(*) FROM customer_profiles", [], |row| row.get(0))
                .unwrap()
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.app.handle_key(code).unwrap()
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn profiles(&self) -> &ProfilesScreen {
            match &self.app.screen {
                Screen::Profiles(profiles) => profiles,
                Screen::Connect(_) => panic!("expected the profiles screen"),
            }
        }

        fn status_kind(&self) -> Option<&StatusKind> {
            self.app.status.as_ref().map(|status| &status.kind)
        }
    }

    #[test]
    fn preloaded_settings_connect_and_list() {
        let fixture = Fixture::new(Some(SCHEMA), &[("Ada", "Engines", "ada@example.com")]);
        assert!(fixture.app.is_connected());
        assert_eq!(fixture.profiles().profiles.len(), 1);
    }

    #[test]
    fn add_form_blocks_blank_required_fields() {
        let mut fixture = Fixture::new(Some(SCHEMA), &[]);
        fixture.press(KeyCode::Char('+'));
        fixture.press(KeyCode::Enter);

        assert!(matches!(fixture.app.mode, Mode::AddingProfile(_)));
        assert_eq!(fixture.status_kind(), Some(&StatusKind::Error));
        assert_eq!(fixture.row_count(), 0);

        fixture.type_text("Grace");
        fixture.press(KeyCode::Tab);
        fixture.type_text("Compilers Inc");
        fixture.press(KeyCode::Tab);
        fixture.type_text("grace@example.com");
        fixture.press(KeyCode::Enter);

        assert!(matches!(fixture.app.mode, Mode::Normal));
        assert_eq!(fixture.row_count(), 1);
        let listed = &fixture.profiles().profiles;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Grace");
        assert_eq!(fixture.profiles().current_profile().map(|p| p.id), Some(listed[0].id));
    }

    #[test]
    fn edit_then_delete_selected_profile() {
        let mut fixture = Fixture::new(
            Some(SCHEMA),
            &[
                ("Ada", "Engines", "ada@example.com"),
                ("Alan", "Bombe", "alan@example.com"),
            ],
        );

        fixture.press(KeyCode::Char('e'));
        for _ in 0..3 {
            fixture.press(KeyCode::Tab);
        }
        fixture.type_text("555-0100");
        fixture.press(KeyCode::Enter);

        assert!(matches!(fixture.app.mode, Mode::Normal));
        let first = fixture.profiles().profiles[0].clone();
        assert_eq!(first.phone, "555-0100");
        assert_eq!(fixture.profiles().profiles[1].phone, "");

        fixture.press(KeyCode::Char('-'));
        assert!(matches!(fixture.app.mode, Mode::ConfirmDelete(_)));
        fixture.press(KeyCode::Char('y'));

        assert_eq!(fixture.row_count(), 1);
        assert!(fixture.profiles().profiles.iter().all(|p| p.id != first.id));
    }

    #[test]
    fn ctrl_d_in_edit_form_asks_for_confirmation() {
        let mut fixture = Fixture::new(Some(SCHEMA), &[("Ada", "Engines", "ada@example.com")]);
        fixture.press(KeyCode::Enter);
        fixture.app.handle_ctrl_d().unwrap();
        match &fixture.app.mode {
            Mode::ConfirmDelete(confirm) => assert_eq!(confirm.name, "Ada"),
            _ => panic!("expected delete confirmation"),
        }
        fixture.press(KeyCode::Char('n'));
        assert_eq!(fixture.row_count(), 1);
    }

    #[test]
    fn quit_keys_end_the_loop_only_outside_forms() {
        let mut fixture = Fixture::new(Some(SCHEMA), &[]);
        fixture.press(KeyCode::Char('+'));
        assert!(!fixture.press(KeyCode::Char('q')));
        fixture.app.handle_ctrl_n().unwrap();
        assert!(!fixture.press(KeyCode::Esc));
        assert!(fixture.press(KeyCode::Char('q')));
    }

    #[test]
    fn search_filters_and_clears() {
        let mut fixture = Fixture::new(
            Some(SCHEMA),
            &[
                ("Ada", "Engines", "ada@example.com"),
                ("Grace", "Compilers", "grace@navy.mil"),
            ],
        );
        fixture.press(KeyCode::Char('f'));
        fixture.type_text("NAVY");
        assert_eq!(fixture.profiles().filtered.len(), 1);
        assert_eq!(fixture.profiles().filtered[0].name, "Grace");

        fixture.press(KeyCode::Esc);
        assert_eq!(fixture.profiles().filtered.len(), 2);
    }

    #[test]
    fn failed_listing_degrades_to_empty_table() {
        let mut fixture = Fixture::new(None, &[]);
        assert!(fixture.app.is_connected());
        assert!(fixture.profiles().profiles.is_empty());
        assert_eq!(fixture.status_kind(), Some(&StatusKind::Error));

        fixture.press(KeyCode::Char('+'));
        fixture.type_text("Ada");
        fixture.press(KeyCode::Tab);
        fixture.type_text("Engines");
        fixture.press(KeyCode::Tab);
        fixture.type_text("ada@example.com");
        fixture.press(KeyCode::Enter);

        assert!(fixture.app.is_connected());
        assert!(matches!(fixture.app.mode, Mode::AddingProfile(_)));
    }

    #[test]
    fn disconnect_returns_to_connect_screen() {
        let mut fixture = Fixture::new(Some(SCHEMA), &[]);
        fixture.press(KeyCode::Char('d'));
        assert!(!fixture.app.is_connected());
        assert!(matches!(fixture.app.screen, Screen::Connect(_)));

        fixture.press(KeyCode::Enter);
        assert!(fixture.app.is_connected());
    }
}
