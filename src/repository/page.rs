//! Page requests and page results

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{Result, ServiceError};
use crate::patient::Patient;

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// `desc` (any case) is descending, anything else ascending
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Fields a patient listing can be ordered by
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    FirstName,
    LastName,
    Address,
    City,
    State,
    ZipCode,
    PhoneNumber,
    Email,
}

impl SortField {
    /// Parse the wire (camelCase) field name
    pub fn parse(name: &str) -> Option<Self> {
        let field = match name.trim() {
            "id" => SortField::Id,
            "firstName" => SortField::FirstName,
            "lastName" => SortField::LastName,
            "address" => SortField::Address,
            "city" => SortField::City,
            "state" => SortField::State,
            "zipCode" => SortField::ZipCode,
            "phoneNumber" => SortField::PhoneNumber,
            "email" => SortField::Email,
            _ => return None,
        };
        Some(field)
    }

    /// Column name in the `patients` table
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::FirstName => "first_name",
            SortField::LastName => "last_name",
            SortField::Address => "address",
            SortField::City => "city",
            SortField::State => "state",
            SortField::ZipCode => "zip_code",
            SortField::PhoneNumber => "phone_number",
            SortField::Email => "email",
        }
    }

    /// Text columns order case-insensitively (`COLLATE NOCASE` in SQL)
    pub fn is_text(&self) -> bool {
        !matches!(self, SortField::Id)
    }

    /// Ascending comparison of two records on this field; missing values first
    pub fn compare(&self, a: &Patient, b: &Patient) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::FirstName => nocase_cmp(&a.first_name, &b.first_name),
            SortField::LastName => nocase_cmp(&a.last_name, &b.last_name),
            SortField::Address => nocase_cmp_opt(&a.address, &b.address),
            SortField::City => nocase_cmp_opt(&a.city, &b.city),
            SortField::State => nocase_cmp_opt(&a.state, &b.state),
            SortField::ZipCode => nocase_cmp_opt(&a.zip_code, &b.zip_code),
            SortField::PhoneNumber => nocase_cmp_opt(&a.phone_number, &b.phone_number),
            SortField::Email => nocase_cmp_opt(&a.email, &b.email),
        }
    }
}

/// Same folding as SQLite's NOCASE collation: ASCII letters only, then bytes
fn nocase_cmp(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

fn nocase_cmp_opt(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => nocase_cmp(a, b),
        _ => a.is_some().cmp(&b.is_some()),
    }
}

/// Ordering by exactly one field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Sort {
    pub fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }

    /// Parse a `field,direction` query value; a bare field sorts ascending
    pub fn parse(param: &str) -> Result<Self> {
        let mut parts = param.splitn(2, ',');
        let name = parts.next().unwrap_or_default();
        let field = SortField::parse(name).ok_or_else(|| {
            ServiceError::invalid("sort", "sort_field", &format!("Unknown sort field: {}", name.trim()))
        })?;
        let direction = parts.next().map(Direction::parse).unwrap_or_default();
        Ok(Self { field, direction })
    }

    /// Full ordering: the sort field in the requested direction, then id ascending
    pub fn compare(&self, a: &Patient, b: &Patient) -> Ordering {
        let primary = match self.direction {
            Direction::Asc => self.field.compare(a, b),
            Direction::Desc => self.field.compare(b, a),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Request for one page of an ordered result set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: Sort) -> Result<Self> {
        if size == 0 {
            return Err(ServiceError::invalid("size", "min", "Page size must be at least 1"));
        }
        Ok(Self { page, size, sort })
    }

    /// Number of rows preceding this page
    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            sort: Sort::default(),
        }
    }
}

/// One page of results plus the totals needed to navigate the rest
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let total_pages = total_elements.div_ceil(request.size.max(1) as u64);
        Self {
            number_of_elements: content.len(),
            empty: content.is_empty(),
            first: request.page == 0,
            last: request.page as u64 + 1 >= total_pages,
            content,
            total_elements,
            total_pages,
            number: request.page,
            size: request.size,
        }
    }

    /// Convert the content, keeping page metadata
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
            number_of_elements: self.number_of_elements,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}
