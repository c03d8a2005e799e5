//! Client-visible routes and the landing page anchors

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Admin,
    AdminLogin,
    NotFound,
}

impl Route {
    /// Resolve a location path; query and fragment are ignored.
    pub fn parse(location: &str) -> Self {
        let path = location
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        let path = path.trim_end_matches('/');

        match path {
            "" => Route::Home,
            "/admin" => Route::Admin,
            "/admin/login" => Route::AdminLogin,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Admin => "/admin",
            Route::AdminLogin => "/admin/login",
            Route::NotFound => "/404",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// In-page sections of the landing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    About,
    Services,
    Portfolio,
    Contact,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [Anchor::About, Anchor::Services, Anchor::Portfolio, Anchor::Contact];

    pub fn id(&self) -> &'static str {
        match self {
            Anchor::About => "about",
            Anchor::Services => "services",
            Anchor::Portfolio => "portfolio",
            Anchor::Contact => "contact",
        }
    }

    pub fn href(&self) -> String {
        format!("#{}", self.id())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Anchor::About => "About",
            Anchor::Services => "Services",
            Anchor::Portfolio => "Portfolio",
            Anchor::Contact => "Contact",
        }
    }

    pub fn from_fragment(fragment: &str) -> Option<Self> {
        let id = fragment.trim_start_matches('#');
        Self::ALL.into_iter().find(|anchor| anchor.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/#contact"), Route::Home);
        assert_eq!(Route::parse("/admin/"), Route::Admin);
        assert_eq!(Route::parse("/admin/login?next=x"), Route::AdminLogin);
        assert_eq!(Route::parse("/pricing"), Route::NotFound);
    }

    #[test]
    fn test_anchors() {
        assert_eq!(Anchor::Services.href(), "#services");
        assert_eq!(Anchor::from_fragment("#portfolio"), Some(Anchor::Portfolio));
        assert_eq!(Anchor::from_fragment("#pricing"), None);
    }
}
