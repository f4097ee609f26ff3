//! Scraper for the tax administration's public FAQ listing.
//!
//! [`fetch`] builds the blocking HTTP client and requests listing
//! pages; [`faq`] parses them into [`FaqEntry`] values, cleans the
//! answers, masks contact details and deduplicates across pages.

pub mod error;
pub mod faq;
pub mod fetch;

pub use error::{Result, ScrapeError};
pub use faq::{
    FaqEntry, ScrapeOptions, clean_answer, dedupe, extract_total, mask_contacts, normalize_id,
    parse_page, scrape_all,
};
pub use fetch::{BASE_URL, build_client, fetch_page, page_url};
