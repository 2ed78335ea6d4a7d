use std::collections::HashMap;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{ReliaError, Result};
use crate::models::{Region, Review};

/// Vote counts under ten are spelled out on the page.
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector is valid")
}

struct PageContext {
    review: Selector,
    profile: Selector,
    profile_name: Selector,
    avatar_img: Selector,
    title: Selector,
    text: Selector,
    date: Selector,
    attributes: Selector,
    verified: Selector,
    votes: Selector,
    image_tiles: Selector,
    positive: Selector,
    critical: Selector,
    product_link: Selector,
    by_line: Selector,
    review_id_link: Selector,
    author_id_re: Regex,
    review_id_re: Regex,
    country_re: Regex,
    date_re: Regex,
    digits_re: Regex,
    word_re: Regex,
    manufacturer_id_re: Regex,
}

impl PageContext {
    fn new() -> Self {
        Self {
            review: sel(".review"),
            profile: sel("a.a-profile"),
            profile_name: sel(".a-profile-name"),
            avatar_img: sel(".a-profile-avatar img"),
            title: sel(".review-title"),
            text: sel(".review-text-content"),
            date: sel(".review-date"),
            attributes: sel(".review-format-strip .a-color-secondary"),
            verified: sel(r#"[data-hook="avp-badge"]"#),
            votes: sel(".cr-vote-text"),
            image_tiles: sel("img.review-image-tile"),
            positive: sel(".positive-review"),
            critical: sel(".critical-review"),
            product_link: sel(r#"[data-hook="product-link"]"#),
            by_line: sel(".product-by-line a"),
            review_id_link: sel("a.review-title, .readMore a"),
            author_id_re: Regex::new(r"profile/([^/]+)").expect("static regex is valid"),
            review_id_re: Regex::new(r"customer-reviews/([^/?]+)").expect("static regex is valid"),
            country_re: Regex::new(r"\bin (.+?)\s+on\b").expect("static regex is valid"),
            date_re: Regex::new(r"\bon (.+)$").expect("static regex is valid"),
            digits_re: Regex::new(r"\d+").expect("static regex is valid"),
            word_re: Regex::new(r"\S+").expect("static regex is valid"),
            manufacturer_id_re: Regex::new(r"page/([^?/]+)").expect("static regex is valid"),
        }
    }
}

/// Parses an Amazon product-review page into reviews.
///
/// Reviews that fail to parse are skipped with a warning; an empty or
/// unrecognized page yields an empty list.
pub fn parse_reviews(region: Region, html: &str) -> Vec<Review> {
    let ctx = PageContext::new();
    let page = Html::parse_document(html);

    let mut reviews = Vec::new();
    for element in page.root_element().select(&ctx.review) {
        match parse_review(&ctx, &page, element, region) {
            Ok(review) => reviews.push(review),
            Err(e) => tracing::warn!("Skipping review: {}", e),
        }
    }
    reviews
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn review_id(ctx: &PageContext, element: ElementRef<'_>) -> Option<String> {
    let link = element.select(&ctx.review_id_link).next()?;
    let href = link.value().attr("href")?;
    ctx.review_id_re
        .captures(href)
        .map(|c| c[1].to_string())
}

fn parse_votes(ctx: &PageContext, votes_text: &str) -> u32 {
    if let Some(m) = ctx.digits_re.find(votes_text) {
        return m.as_str().parse().unwrap_or(0);
    }
    if let Some(m) = ctx.word_re.find(votes_text) {
        let word = m.as_str().to_lowercase();
        return NUMBER_WORDS
            .iter()
            .find(|(w, _)| *w == word)
            .map(|(_, n)| *n)
            .unwrap_or(0);
    }
    0
}

fn parse_review(
    ctx: &PageContext,
    page: &Html,
    element: ElementRef<'_>,
    region: Region,
) -> Result<Review> {
    let author_id = element
        .select(&ctx.profile)
        .next()
        .and_then(|p| p.value().attr("href"))
        .and_then(|href| ctx.author_id_re.captures(href))
        .map(|c| c[1].to_string());

    let author_name = element
        .select(&ctx.profile_name)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReliaError::Scrape("failed to parse author name".to_string()))?;

    let author_image_url = element
        .select(&ctx.avatar_img)
        .find(|img| {
            !img.value()
                .classes()
                .any(|class| class == "a-lazy-loaded")
        })
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
        .ok_or_else(|| ReliaError::Scrape("failed to parse author image url".to_string()))?;

    let title = element
        .select(&ctx.title)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReliaError::Scrape("failed to parse title".to_string()))?;

    let text = element
        .select(&ctx.text)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReliaError::Scrape("failed to parse text".to_string()))?;

    let date_line = element
        .select(&ctx.date)
        .next()
        .map(element_text)
        .ok_or_else(|| ReliaError::Scrape("failed to parse date line".to_string()))?;

    let date_text = ctx
        .date_re
        .captures(&date_line)
        .map(|c| c[1].trim().to_string())
        .ok_or_else(|| ReliaError::Scrape("failed to parse date text".to_string()))?;

    let date = NaiveDate::parse_from_str(&date_text, "%B %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(&date_text, "%B %e, %Y"))
        .map_err(|_| ReliaError::Scrape(format!("failed to parse date '{date_text}'")))?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ReliaError::Scrape("failed to parse date".to_string()))?
        .and_utc();

    let country_reviewed_in = ctx
        .country_re
        .captures(&date_line)
        .map(|c| c[1].trim().to_string())
        .ok_or_else(|| ReliaError::Scrape("failed to parse country".to_string()))?;

    let id = review_id(ctx, element)
        .ok_or_else(|| ReliaError::Scrape("failed to parse review id".to_string()))?;

    let mut attributes = HashMap::new();
    if let Some(strip) = element.select(&ctx.attributes).next() {
        for node in strip.text() {
            let mut parts = node.splitn(2, ':');
            if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
                let key = key.trim();
                let value = value.trim();
                if !key.is_empty() && !value.is_empty() {
                    attributes.insert(key.to_string(), value.to_string());
                }
            }
        }
    }

    let verified_purchase = element.select(&ctx.verified).next().is_some();

    let found_helpful_count = element
        .select(&ctx.votes)
        .next()
        .map(|v| parse_votes(ctx, &element_text(v)))
        .unwrap_or(0);

    let images = element
        .select(&ctx.image_tiles)
        .filter_map(|img| img.value().attr("src"))
        .map(str::to_string)
        .collect();

    let positive_review_id = page
        .root_element()
        .select(&ctx.positive)
        .next()
        .and_then(|e| review_id(ctx, e));
    let critical_review_id = page
        .root_element()
        .select(&ctx.critical)
        .next()
        .and_then(|e| review_id(ctx, e));

    let product_name = page
        .root_element()
        .select(&ctx.product_link)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());

    let by_line = page.root_element().select(&ctx.by_line).next();
    let manufacturer_name = by_line.map(element_text).filter(|s| !s.is_empty());
    let manufacturer_id = by_line
        .and_then(|e| e.value().attr("href"))
        .and_then(|href| ctx.manufacturer_id_re.captures(href))
        .map(|c| c[1].to_string());

    Ok(Review {
        author_id,
        author_name,
        author_image_url,
        title,
        text,
        date,
        date_text,
        review_id: id.clone(),
        attributes,
        verified_purchase,
        found_helpful_count,
        is_top_positive_review: positive_review_id.as_deref() == Some(id.as_str()),
        is_top_critical_review: critical_review_id.as_deref() == Some(id.as_str()),
        images,
        country_reviewed_in,
        region,
        product_name,
        manufacturer_name,
        manufacturer_id,
    })
}
