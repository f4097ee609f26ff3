//! FAQ extraction: question/answer parsing, answer cleanup, contact
//! masking and pick-best deduplication.

use crate::error::Result;
use crate::fetch::fetch_page;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;
use tracing::debug;

const HASH_PREFIX: &str = "faq-";
const HASH_LENGTH: usize = 12;

/// The site's stock text for questions nobody answered yet.
const PLACEHOLDER_ANSWER: &str = "please fill in an answer";

static QUESTION_HOLDER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".wpfaq-question-holder").expect("Invalid holder selector"));
static QUESTION_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4.wpfaqacctoggle").expect("Invalid question selector"));
static QUESTION_ANCHOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h4.wpfaqacctoggle a[href]").expect("Invalid anchor selector")
});
static ANSWER_BODY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".wpfaqacccontent .wpfaqacccontenti").expect("Invalid answer selector")
});
static ANSWER_WRAPPER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".wpfaqacccontent").expect("Invalid answer wrapper selector")
});
static PAGING_TOTAL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".faqs-paging .displaying-num").expect("Invalid paging selector")
});

/// Prishtina mobile prefixes with optional space, dash or slash between
/// digits. Digit boundaries are checked manually on each match.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"04[3459](?:[\s\-/]?\d){6}").expect("Invalid phone regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("Invalid email regex")
});
static HASHED_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^faq-[0-9a-f]{12}$").expect("Invalid hashed id regex"));
static TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"of\s+(\d+)").expect("Invalid paging total regex"));

/// One question/answer pair. `answer_html` holds the cleaned plain-text
/// answer; the field name is kept for output compatibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer_html: String,
    pub id: String,
}

impl FaqEntry {
    /// Stable dedup key: the hashed id when present, else the question.
    pub fn key(&self) -> &str {
        if self.id.is_empty() {
            &self.question
        } else {
            &self.id
        }
    }

    /// Whether any answer text survived cleanup.
    pub fn has_answer(&self) -> bool {
        !self.answer_html.trim().is_empty()
    }
}

/// Paging controls for a scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub start_page: usize,
    /// Window size in pages; `None` scrapes to the computed end.
    pub pages: Option<usize>,
    pub delay: Duration,
    /// Stop after this many consecutive pages with nothing new.
    pub max_empty_pages: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        ScrapeOptions {
            start_page: 1,
            pages: None,
            delay: Duration::from_millis(100),
            max_empty_pages: 1,
        }
    }
}

/// Redacts local phone numbers and email addresses. The phone pattern
/// must not sit inside a longer digit run, which the regex crate cannot
/// express directly, so the boundary check happens here.
pub fn mask_contacts(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut last = 0;
    for found in PHONE_RE.find_iter(text) {
        let digit_before = text[..found.start()]
            .chars()
            .next_back()
            .is_some_and(|ch| ch.is_ascii_digit());
        let digit_after = text[found.end()..]
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_digit());
        masked.push_str(&text[last..found.start()]);
        if digit_before || digit_after {
            masked.push_str(found.as_str());
        } else {
            masked.push_str("[PHONE]");
        }
        last = found.end();
    }
    masked.push_str(&text[last..]);
    EMAIL_RE.replace_all(&masked, "[EMAIL]").into_owned()
}

/// Short stable id from the source anchor (preferred) or the question
/// text. Ids already in hashed form pass through untouched.
pub fn normalize_id(source_id: Option<&str>, question: &str) -> String {
    let candidate = source_id.unwrap_or("").trim();
    if HASHED_ID_RE.is_match(candidate) {
        return candidate.to_string();
    }
    let base = if !candidate.is_empty() {
        candidate
    } else if !question.is_empty() {
        question
    } else {
        "atk-faq"
    };
    let digest = Sha256::digest(base.as_bytes());
    format!("{HASH_PREFIX}{}", &hex::encode(digest)[..HASH_LENGTH])
}

/// Descendant text nodes, each trimmed, empties dropped, joined by
/// `separator`.
fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn is_placeholder(text: &str) -> bool {
    text.trim().to_lowercase() == PLACEHOLDER_ANSWER
}

/// Collects trimmed text fragments below `element`, skipping paragraphs
/// that hold only the placeholder answer.
fn text_fragments(element: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        } else if let Some(nested) = ElementRef::wrap(child) {
            if nested.value().name() == "p" && is_placeholder(&joined_text(nested, " ")) {
                continue;
            }
            text_fragments(nested, parts);
        }
    }
}

/// Normalizes an answer block into plain text: placeholder paragraphs
/// dropped, top-level paragraphs, list items and divs joined by blank
/// lines, line ends trimmed.
pub fn clean_answer(answer_html: &str) -> String {
    if answer_html.trim().is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(answer_html);
    let root = fragment.root_element();

    let mut blocks: Vec<String> = Vec::new();
    for child in root.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        if !matches!(element.value().name(), "p" | "li" | "div") {
            continue;
        }
        if element.value().name() == "p" && is_placeholder(&joined_text(element, " ")) {
            continue;
        }
        let mut parts = Vec::new();
        text_fragments(element, &mut parts);
        let text = parts.join("\n");
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    if blocks.is_empty() {
        let mut parts = Vec::new();
        text_fragments(root, &mut parts);
        return parts.join("\n").trim().to_string();
    }

    let normalized = blocks.join("\n\n");
    let trimmed: Vec<&str> = normalized.lines().map(str::trim_end).collect();
    trimmed.join("\n").trim().to_string()
}

/// Extracts all question/answer pairs from one listing page.
pub fn parse_page(document: &Html, page: usize) -> Vec<FaqEntry> {
    let mut entries = Vec::new();
    for holder in document.select(&QUESTION_HOLDER) {
        let question = holder
            .select(&QUESTION_TITLE)
            .next()
            .map(|title| mask_contacts(&joined_text(title, " ")))
            .unwrap_or_default();

        let source_id = holder
            .select(&QUESTION_ANCHOR)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .map(|href| match href.split_once('#') {
                Some((_, fragment)) => fragment,
                None => href,
            });

        let content = holder
            .select(&ANSWER_BODY)
            .next()
            .or_else(|| holder.select(&ANSWER_WRAPPER).next());
        let answer_html = content
            .map(|element| clean_answer(element.inner_html().trim()))
            .unwrap_or_default();

        let id = normalize_id(source_id, &question);
        entries.push(FaqEntry {
            question,
            answer_html,
            id,
        });
    }
    debug!(page, entries = entries.len(), "parsed FAQ page");
    entries
}

/// Reads the total item count from the paging widget, when present.
pub fn extract_total(document: &Html) -> Option<usize> {
    let marker = document.select(&PAGING_TOTAL).next()?;
    let text: String = marker.text().collect();
    let captures = TOTAL_RE.captures(&text)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Duplicate-key resolution: a real answer beats the placeholder, then
/// the longer answer wins, then the earlier entry stays.
fn pick_best(current: FaqEntry, candidate: FaqEntry) -> FaqEntry {
    let current_placeholder = is_placeholder(&current.answer_html);
    let candidate_placeholder = is_placeholder(&candidate.answer_html);
    if current_placeholder && !candidate_placeholder {
        return candidate;
    }
    if candidate_placeholder && !current_placeholder {
        return current;
    }
    if candidate.answer_html.trim().len() > current.answer_html.trim().len() {
        candidate
    } else {
        current
    }
}

/// Collapses duplicate keys, keeping the better answer and first-seen
/// key order.
pub fn dedupe(entries: Vec<FaqEntry>) -> Vec<FaqEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, FaqEntry> = HashMap::new();
    for entry in entries {
        match best.entry(entry.key().to_string()) {
            Entry::Occupied(mut slot) => {
                let current = slot.get().clone();
                slot.insert(pick_best(current, entry));
            }
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                slot.insert(entry);
            }
        }
    }
    order.into_iter().filter_map(|key| best.remove(&key)).collect()
}

/// End page of the run: an explicit window wins, otherwise the count
/// from the paging widget, otherwise just the first page.
fn plan_pages(start_page: usize, pages: Option<usize>, total: Option<usize>, per_page: usize) -> usize {
    match pages {
        Some(window) if window > 0 => start_page + window - 1,
        _ => total.map_or(1, |count| count.div_ceil(per_page)),
    }
}

/// Scrapes the listing from `start_page` to the planned end, stopping
/// early once `max_empty_pages` consecutive pages contribute nothing
/// new. Page 1 is always fetched first to learn the paging shape.
pub fn scrape_all(client: &Client, base_url: &str, options: &ScrapeOptions) -> Result<Vec<FaqEntry>> {
    let first_html = fetch_page(client, base_url, 1)?;
    let first_document = Html::parse_document(&first_html);
    let total = extract_total(&first_document);
    let first_entries = parse_page(&first_document, 1);

    let per_page = if first_entries.is_empty() {
        5
    } else {
        first_entries.len()
    };
    let start_page = options.start_page.max(1);
    let total_pages = plan_pages(start_page, options.pages, total, per_page);
    let max_empty = options.max_empty_pages.max(1);
    debug!(?total, per_page, total_pages, "planned scrape run");

    let mut seen: HashSet<String> = HashSet::new();
    let mut collected: Vec<FaqEntry> = Vec::new();
    let mut empty_streak = 0usize;

    for page in start_page..=total_pages {
        let entries = if page == 1 {
            first_entries.clone()
        } else {
            let html = fetch_page(client, base_url, page)?;
            parse_page(&Html::parse_document(&html), page)
        };
        let found = entries.len();
        let fresh: Vec<FaqEntry> = entries
            .into_iter()
            .filter(|entry| !seen.contains(entry.key()))
            .collect();
        debug!(page, found, new = fresh.len(), "scraped page");

        if fresh.is_empty() {
            empty_streak += 1;
            if empty_streak >= max_empty {
                debug!(page, streak = empty_streak, "stopping on consecutive empty pages");
                break;
            }
        } else {
            empty_streak = 0;
            for entry in fresh {
                seen.insert(entry.key().to_string());
                collected.push(entry);
            }
        }
        if !options.delay.is_zero() && page < total_pages {
            thread::sleep(options.delay);
        }
    }

    Ok(dedupe(collected))
}
