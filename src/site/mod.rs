//! Public site regions
//!
//! Hero, About, Services, Navigation and Footer are static content
//! ([`sections`]); the portfolio gallery and the contact form talk to the
//! backend.

pub mod contact;
pub mod portfolio;
pub mod sections;

pub use contact::{Confirmation, ContactFields, ContactForm};
pub use portfolio::{GalleryState, GalleryTile, PortfolioGallery, TileAction};
pub use sections::{about, footer, hero, nav_links, services, Navigation};
