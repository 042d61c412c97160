/// Which row's action menu (edit/delete) is open, if any.
///
/// Outside clicks are forwarded by the view layer as [`ActionMenu::dismiss`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMenu {
    active_id: Option<String>,
}

impl ActionMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn open(&mut self, id: impl Into<String>) {
        self.active_id = Some(id.into());
    }

    pub fn close(&mut self) {
        self.active_id = None;
    }

    /// Close the menu of `id` if it is open, otherwise open it (closing any other)
    pub fn toggle(&mut self, id: &str) {
        if self.is_open(id) {
            self.close();
        } else {
            self.open(id);
        }
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.active_id.as_deref() == Some(id)
    }

    pub fn dismiss(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_switches_between_rows() {
        let mut menu = ActionMenu::new();
        menu.toggle("product-1");
        assert!(menu.is_open("product-1"));

        menu.toggle("product-2");
        assert!(menu.is_open("product-2"));
        assert!(!menu.is_open("product-1"));

        menu.toggle("product-2");
        assert_eq!(menu.active_id(), None);
    }

    #[test]
    fn test_dismiss_closes() {
        let mut menu = ActionMenu::new();
        menu.open("product-1");
        menu.dismiss();
        assert_eq!(menu, ActionMenu::new());
    }
}
