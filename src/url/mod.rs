//! URL handling module for Byline-Harvest
//!
//! Links on directory, author and articles pages are mostly relative. This module
//! turns them into absolute URLs and derives the URLs of numbered listing pages.

mod resolve;

pub use resolve::{has_scheme, numbered_page_url, resolve};
