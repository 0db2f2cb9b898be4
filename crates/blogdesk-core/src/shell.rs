//! Dashboard shell state
//!
//! Owned and rendered by the front end; nothing else in this crate reads it.

use crate::gate::Route;
use serde::{Deserialize, Serialize};

/// Sidebar navigation entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavItem {
    /// Dashboard landing page
    #[default]
    Dashboard,
    /// Contact leads
    Contacts,
    /// Scheduled calls
    Schedule,
    /// Blog posts
    Blog,
    /// Admin settings
    Settings,
}

impl NavItem {
    /// Entries in sidebar order
    pub const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::Contacts,
        Self::Schedule,
        Self::Blog,
        Self::Settings,
    ];

    /// Sidebar label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Contacts => "Contact List",
            Self::Schedule => "Schedule List",
            Self::Blog => "Blog",
            Self::Settings => "Setting",
        }
    }

    /// Screen the entry opens
    #[must_use]
    pub const fn route(self) -> Route {
        match self {
            Self::Dashboard => Route::Home,
            Self::Contacts => Route::Contacts,
            Self::Schedule => Route::ScheduledCalls,
            Self::Blog => Route::Blogs,
            Self::Settings => Route::Settings,
        }
    }

    /// Entry that highlights for `route`
    #[must_use]
    pub const fn for_route(route: &Route) -> Option<Self> {
        match route {
            Route::Login => None,
            Route::Home => Some(Self::Dashboard),
            Route::Blogs | Route::NewBlog | Route::EditBlog(_) => Some(Self::Blog),
            Route::Contacts => Some(Self::Contacts),
            Route::ScheduledCalls => Some(Self::Schedule),
            Route::Settings => Some(Self::Settings),
        }
    }
}

/// Sidebar visibility and selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellState {
    /// Whether the sidebar shows labels
    pub sidebar_open: bool,
    /// Highlighted entry
    pub selected: NavItem,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            selected: NavItem::Dashboard,
        }
    }
}

impl ShellState {
    /// Flip the sidebar between open and collapsed
    pub const fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// Highlight `item`
    pub const fn select(&mut self, item: NavItem) {
        self.selected = item;
    }

    /// Highlight the entry matching `route`, if any
    pub fn follow(&mut self, route: &Route) {
        if let Some(item) = NavItem::for_route(route) {
            self.select(item);
        }
    }

    /// Sidebar as text: every label when open, just the selected one when collapsed
    #[must_use]
    pub fn render(&self) -> String {
        if !self.sidebar_open {
            return format!("[{}]", self.selected.label());
        }
        NavItem::ALL
            .iter()
            .map(|item| {
                if *item == self.selected {
                    format!("[{}]", item.label())
                } else {
                    item.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_shell_is_open_on_dashboard() {
        let shell = ShellState::default();
        assert!(shell.sidebar_open);
        assert_eq!(shell.selected, NavItem::Dashboard);
    }

    #[test]
    fn test_follow_route() {
        let mut shell = ShellState::default();
        shell.follow(&Route::EditBlog("1".to_string()));
        assert_eq!(shell.selected, NavItem::Blog);
        shell.follow(&Route::Login);
        assert_eq!(shell.selected, NavItem::Blog);
    }

    #[test]
    fn test_render() {
        let mut shell = ShellState::default();
        shell.select(NavItem::Contacts);
        assert_eq!(
            shell.render(),
            "Dashboard | [Contact List] | Schedule List | Blog | Setting"
        );

        shell.toggle_sidebar();
        assert_eq!(shell.render(), "[Contact List]");
    }

    #[test]
    fn test_nav_routes_round_trip() {
        for item in NavItem::ALL {
            assert_eq!(NavItem::for_route(&item.route()), Some(item));
        }
    }
}
