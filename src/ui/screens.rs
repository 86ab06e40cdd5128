use crate::models::CustomerProfile;
use crate::search::filter_profiles;

/// The full listing plus the filtered view the table shows.
pub(crate) struct ProfilesScreen {
    pub(crate) profiles: Vec<CustomerProfile>,
    pub(crate) filtered: Vec<CustomerProfile>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl ProfilesScreen {
    pub(crate) fn new(profiles: Vec<CustomerProfile>) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            profiles,
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    pub(crate) fn apply_filter(&mut self) {
        self.filtered = match &self.filter {
            Some(term) => filter_profiles(&self.profiles, term),
            None => self.profiles.clone(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    /// Replace the listing after a refetch, keeping the filter and moving the
    /// selection onto `focus_id` when it is still displayed.
    pub(crate) fn set_profiles(&mut self, profiles: Vec<CustomerProfile>, focus_id: Option<i64>) {
        self.profiles = profiles;
        self.apply_filter();
        if let Some(id) = focus_id {
            if let Some(idx) = self.filtered.iter().position(|p| p.id == id) {
                self.selected = idx;
            }
        }
    }

    pub(crate) fn current_profile(&self) -> Option<&CustomerProfile> {
        self.filtered.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let len = self.filtered.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self) {
        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: i64, name: &str) -> CustomerProfile {
        CustomerProfile {
            id,
            name: name.to_string(),
            business_name: format!("{name} Co"),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: String::new(),
            address: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn selection_is_clamped_to_filtered_rows() {
        let mut screen = ProfilesScreen::new(vec![
            profile(1, "Ada"),
            profile(2, "Grace"),
            profile(3, "Alan"),
        ]);
        screen.move_selection(10);
        assert_eq!(screen.selected, 2);

        screen.set_filter(Some("grace".into()));
        assert_eq!(screen.filtered.len(), 1);
        assert_eq!(screen.selected, 0);
        assert_eq!(screen.current_profile().map(|p| p.id), Some(2));

        screen.move_selection(-5);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn refetch_keeps_filter_and_focuses_id() {
        let mut screen = ProfilesScreen::new(vec![profile(1, "Ada"), profile(2, "Alan")]);
        screen.set_filter(Some("a".into()));
        screen.set_profiles(
            vec![profile(1, "Ada"), profile(2, "Alan"), profile(5, "Amy")],
            Some(5),
        );
        assert_eq!(screen.filtered.len(), 3);
        assert_eq!(screen.current_profile().map(|p| p.id), Some(5));
    }

    #[test]
    fn empty_listing_has_no_selection() {
        let mut screen = ProfilesScreen::new(Vec::new());
        screen.move_selection(1);
        screen.select_last();
        assert!(screen.current_profile().is_none());
        assert_eq!(screen.selected, 0);
    }
}
