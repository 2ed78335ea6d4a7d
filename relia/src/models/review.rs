use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Retail region a review was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Com,
    Ca,
}

impl Region {
    pub fn domain(&self) -> &'static str {
        match self {
            Region::Com => "www.amazon.com",
            Region::Ca => "www.amazon.ca",
        }
    }
}

/// A scraped product review, as delivered by the parsing stage.
///
/// `date` is the review post date; it travels as Unix seconds on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub author_id: Option<String>,
    pub author_name: String,
    pub author_image_url: String,
    pub title: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
    pub date_text: String,
    pub review_id: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub verified_purchase: bool,
    pub found_helpful_count: u32,
    pub is_top_positive_review: bool,
    pub is_top_critical_review: bool,
    #[serde(default)]
    pub images: Vec<String>,
    pub country_reviewed_in: String,
    pub region: Region,
    pub product_name: Option<String>,
    pub manufacturer_name: Option<String>,
    pub manufacturer_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_review_date_serializes_as_unix_seconds() {
        let review = Review {
            author_id: None,
            author_name: "A. Customer".to_string(),
            author_image_url: String::new(),
            title: "Broke fast".to_string(),
            text: "It broke today.".to_string(),
            date: Utc.with_ymd_and_hms(2023, 9, 26, 0, 0, 0).unwrap(),
            date_text: "September 26, 2023".to_string(),
            review_id: "R1".to_string(),
            attributes: HashMap::new(),
            verified_purchase: true,
            found_helpful_count: 3,
            is_top_positive_review: false,
            is_top_critical_review: false,
            images: Vec::new(),
            country_reviewed_in: "Canada".to_string(),
            region: Region::Ca,
            product_name: None,
            manufacturer_name: None,
            manufacturer_id: None,
        };

        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["date"], serde_json::json!(1695686400));
        assert_eq!(json["region"], serde_json::json!("ca"));

        let back: Review = serde_json::from_value(json).unwrap();
        assert_eq!(back.date, review.date);
    }

    #[test]
    fn test_region_domains() {
        assert_eq!(Region::Com.domain(), "www.amazon.com");
        assert_eq!(Region::Ca.domain(), "www.amazon.ca");
    }
}
