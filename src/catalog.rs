//! Filtering, sorting and pagination of painting lists.
//!
//! These are pure functions over already-loaded rows so the same rules apply
//! to the public gallery and to any admin view built on top of it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Painting;

pub const DEFAULT_PER_PAGE: u32 = 12;
pub const MAX_PER_PAGE: u32 = 48;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    All,
    Available,
    Sold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    TitleAsc,
    TitleDesc,
    PriceAsc,
    PriceDesc,
    YearDesc,
}

/// Query string accepted by `GET /api/paintings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaintingQuery {
    pub folder: Option<Uuid>,
    pub search: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub availability: Availability,
    pub featured: Option<bool>,
    #[serde(default)]
    pub sort: SortOrder,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PageRequest {
    /// 1-based page number; zero is treated as the first page.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

impl PaintingQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn matches(&self, painting: &Painting) -> bool {
        if let Some(folder) = self.folder {
            if painting.folder_id != Some(folder) {
                return false;
            }
        }

        if let Some(year) = self.year {
            if painting.year != Some(year) {
                return false;
            }
        }

        if let Some(featured) = self.featured {
            if painting.featured != featured {
                return false;
            }
        }

        let availability_ok = match self.availability {
            Availability::All => true,
            Availability::Available => painting.is_available(),
            Availability::Sold => !painting.is_available(),
        };
        if !availability_ok {
            return false;
        }

        match self.normalized_search() {
            Some(needle) => [
                Some(painting.title.as_str()),
                painting.description.as_deref(),
                painting.medium.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle)),
            None => true,
        }
    }

    fn normalized_search(&self) -> Option<String> {
        self.search
            .as_ref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    /// Filter, sort and paginate in one pass over the loaded paintings.
    pub fn apply(&self, paintings: Vec<Painting>) -> Page<Painting> {
        let mut matching: Vec<Painting> = paintings.into_iter().filter(|p| self.matches(p)).collect();
        sort_paintings(&mut matching, self.sort);
        paginate(matching, self.page_request())
    }
}

fn newest_first(a: &Painting, b: &Painting) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

/// Missing values go last regardless of direction.
fn compare_present<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_paintings(paintings: &mut [Painting], order: SortOrder) {
    paintings.sort_by(|a, b| {
        let primary = match order {
            SortOrder::Newest => newest_first(a, b),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
            SortOrder::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOrder::TitleDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
            SortOrder::PriceAsc => compare_present(a.price, b.price, false),
            SortOrder::PriceDesc => compare_present(a.price, b.price, true),
            SortOrder::YearDesc => compare_present(a.year, b.year, true),
        };
        primary.then_with(|| newest_first(a, b))
    });
}

pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let page = request.page();
    let per_page = request.per_page();
    let total = items.len() as u64;
    let total_pages = total.div_ceil(u64::from(per_page)) as u32;
    let skip = (u64::from(page) - 1) * u64::from(per_page);

    let items = items
        .into_iter()
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(per_page as usize)
        .collect();

    Page {
        items,
        page,
        per_page,
        total,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn painting(title: &str, age_days: i64) -> Painting {
        let created = Utc::now() - Duration::days(age_days);
        Painting {
            id: Uuid::new_v4(),
            folder_id: None,
            title: title.to_string(),
            description: None,
            medium: None,
            width_cm: None,
            height_cm: None,
            year: None,
            price: None,
            sold: false,
            featured: false,
            image_urls: Vec::new(),
            instagram_media_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn titles(page: &Page<Painting>) -> Vec<&str> {
        page.items.iter().map(|p| p.title.as_str()).collect()
    }

    fn sample() -> Vec<Painting> {
        let folder = Uuid::from_u128(7);

        let mut a = painting("Anemones", 3);
        a.price = Some(900);
        a.year = Some(2021);
        a.medium = Some("Watercolour".to_string());
        a.folder_id = Some(folder);

        let mut b = painting("blue harbour", 1);
        b.price = Some(2500);
        b.year = Some(2024);
        b.sold = true;
        b.featured = true;

        let mut c = painting("Cliffs", 2);
        c.year = Some(2024);
        c.description = Some("Storm over the harbour".to_string());
        c.folder_id = Some(folder);

        vec![a, b, c]
    }

    #[test]
    fn test_default_query_is_newest_first() {
        let page = PaintingQuery::default().apply(sample());
        assert_eq!(titles(&page), vec!["blue harbour", "Cliffs", "Anemones"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_filters() {
        let query = PaintingQuery {
            folder: Some(Uuid::from_u128(7)),
            ..Default::default()
        };
        assert_eq!(titles(&query.apply(sample())), vec!["Cliffs", "Anemones"]);

        let query = PaintingQuery {
            availability: Availability::Sold,
            ..Default::default()
        };
        assert_eq!(titles(&query.apply(sample())), vec!["blue harbour"]);

        let query = PaintingQuery {
            availability: Availability::Available,
            year: Some(2024),
            ..Default::default()
        };
        assert_eq!(titles(&query.apply(sample())), vec!["Cliffs"]);

        let query = PaintingQuery {
            featured: Some(false),
            ..Default::default()
        };
        assert_eq!(query.apply(sample()).total, 2);
    }

    #[test]
    fn test_search_matches_title_description_and_medium() {
        let query = PaintingQuery {
            search: Some("  HARBOUR ".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(&query.apply(sample())), vec!["blue harbour", "Cliffs"]);

        let query = PaintingQuery {
            search: Some("watercolour".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(&query.apply(sample())), vec!["Anemones"]);

        let query = PaintingQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.apply(sample()).total, 3);
    }

    #[test]
    fn test_sort_orders() {
        let mut paintings = sample();

        sort_paintings(&mut paintings, SortOrder::TitleAsc);
        assert_eq!(paintings[0].title, "Anemones");
        assert_eq!(paintings[1].title, "blue harbour");

        sort_paintings(&mut paintings, SortOrder::TitleDesc);
        assert_eq!(paintings[0].title, "Cliffs");

        sort_paintings(&mut paintings, SortOrder::Oldest);
        assert_eq!(paintings[0].title, "Anemones");
    }

    #[test]
    fn test_unpriced_paintings_sort_last() {
        let mut paintings = sample();

        sort_paintings(&mut paintings, SortOrder::PriceAsc);
        let order: Vec<_> = paintings.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(order, vec!["Anemones", "blue harbour", "Cliffs"]);

        sort_paintings(&mut paintings, SortOrder::PriceDesc);
        let order: Vec<_> = paintings.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(order, vec!["blue harbour", "Anemones", "Cliffs"]);
    }

    #[test]
    fn test_year_ties_fall_back_to_newest() {
        let mut paintings = sample();
        sort_paintings(&mut paintings, SortOrder::YearDesc);
        let order: Vec<_> = paintings.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(order, vec!["blue harbour", "Cliffs", "Anemones"]);
    }

    #[test]
    fn test_pagination() {
        let items: Vec<u32> = (1..=25).collect();

        let page = paginate(items.clone(), PageRequest { page: Some(3), per_page: Some(10) });
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);

        let past_end = paginate(items.clone(), PageRequest { page: Some(9), per_page: Some(10) });
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 25);
        assert_eq!(past_end.page, 9);

        let empty = paginate(Vec::<u32>::new(), PageRequest::default());
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.page, 1);
    }

    #[test]
    fn test_page_request_clamping() {
        let request = PageRequest { page: Some(0), per_page: Some(1000) };
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), MAX_PER_PAGE);

        let request = PageRequest { page: None, per_page: Some(0) };
        assert_eq!(request.per_page(), 1);
    }

    #[test]
    fn test_query_deserialization() {
        let query: PaintingQuery = serde_json::from_str(
            r#"{"availability": "available", "sort": "price_desc", "page": 2, "per_page": 6}"#,
        )
        .expect("valid json");

        assert_eq!(query.availability, Availability::Available);
        assert_eq!(query.sort, SortOrder::PriceDesc);
        assert_eq!(query.page_request().page(), 2);
        assert_eq!(query.page_request().per_page(), 6);
    }
}
