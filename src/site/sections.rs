//! Static content of the landing page

use crate::routes::Anchor;

pub const OWNER_NAME: &str = "Muhammad Ali";
pub const LOCATION: &str = "Leeuwarden, Netherlands";
pub const CONTACT_EMAIL: &str = "info@alijokhio.nl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub anchor: Anchor,
}

impl NavLink {
    pub fn href(&self) -> String {
        self.anchor.href()
    }

    pub fn label(&self) -> &'static str {
        self.anchor.label()
    }
}

/// Top navigation: one link per landing page section
pub fn nav_links() -> Vec<NavLink> {
    Anchor::ALL.into_iter().map(|anchor| NavLink { anchor }).collect()
}

/// Navigation bar state
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    menu_open: bool,
    scrolled: bool,
}

impl Navigation {
    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    /// Following a link closes the mobile menu
    pub fn follow(&mut self, link: &NavLink) -> String {
        self.menu_open = false;
        link.href()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// The bar turns solid once the page is scrolled past 50px
    pub fn on_scroll(&mut self, offset_y: f64) {
        self.scrolled = offset_y > 50.0;
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallToAction {
    pub label: &'static str,
    pub target: Anchor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
    pub tagline: &'static str,
    pub name: &'static str,
    pub intro: &'static str,
    pub actions: [CallToAction; 2],
}

pub fn hero() -> Hero {
    Hero {
        tagline: "Wedding Films & Photography",
        name: OWNER_NAME,
        intro: "Capturing timeless moments with cinematic elegance. \
                Based in Leeuwarden, serving all of the Netherlands.",
        actions: [
            CallToAction {
                label: "View Portfolio",
                target: Anchor::Portfolio,
            },
            CallToAction {
                label: "Get in Touch",
                target: Anchor::Contact,
            },
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub number: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct About {
    pub heading: &'static str,
    pub paragraphs: [&'static str; 2],
    pub stats: [Stat; 3],
}

pub fn about() -> About {
    About {
        heading: "Telling Your Story",
        paragraphs: [
            "I'm Muhammad Ali Jokhio, a passionate photographer and videographer \
             based in Leeuwarden, Netherlands. With over 8 years of experience, \
             I specialize in capturing the most precious moments of your life \
             with a cinematic touch.",
            "From intimate weddings to grand celebrations, corporate events to \
             personal stories, I bring a unique perspective that transforms \
             moments into timeless memories. My approach combines technical \
             expertise with artistic vision to create visuals that truly resonate.",
        ],
        stats: [
            Stat {
                number: "150+",
                label: "Weddings Filmed",
            },
            Stat {
                number: "8+",
                label: "Years Experience",
            },
            Stat {
                number: "200+",
                label: "Happy Couples",
            },
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    pub title: &'static str,
    pub description: &'static str,
}

pub fn services() -> [Service; 4] {
    [
        Service {
            title: "Wedding Films",
            description: "Cinematic wedding films that capture every emotion, from intimate \
                          ceremonies to grand celebrations. Full-day coverage with highlight reels.",
        },
        Service {
            title: "Photography",
            description: "Professional photography for weddings, portraits, and special events. \
                          High-resolution images edited to perfection.",
        },
        Service {
            title: "Video Editing",
            description: "Expert video editing services with color grading, sound design, and \
                          cinematic effects. Transform your footage into art.",
        },
        Service {
            title: "Event Coverage",
            description: "Corporate events, conferences, parties, and special occasions. \
                          Complete photo and video coverage packages.",
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub copyright: String,
    pub links: [Anchor; 3],
}

pub fn footer(year: i32) -> Footer {
    Footer {
        copyright: format!("© {} Made with love in {}", year, LOCATION),
        links: [Anchor::About, Anchor::Portfolio, Anchor::Contact],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_links_cover_every_section() {
        let hrefs: Vec<String> = nav_links().iter().map(NavLink::href).collect();
        assert_eq!(hrefs, vec!["#about", "#services", "#portfolio", "#contact"]);
    }

    #[test]
    fn test_navigation_menu() {
        let mut nav = Navigation::default();
        nav.toggle_menu();
        assert!(nav.is_menu_open());

        let link = nav_links()[3];
        assert_eq!(nav.follow(&link), "#contact");
        assert!(!nav.is_menu_open());

        nav.on_scroll(120.0);
        assert!(nav.is_scrolled());
        nav.on_scroll(10.0);
        assert!(!nav.is_scrolled());
    }

    #[test]
    fn test_footer_year() {
        assert!(footer(2025).copyright.starts_with("© 2025"));
    }
}
