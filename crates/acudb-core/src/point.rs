use crate::geom::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Location of a point inside one reference image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub image_id: String,
    pub coord: Vec2,
}

impl Position {
    pub fn new(image_id: impl Into<String>, coord: Vec2) -> Self {
        Self {
            image_id: image_id.into(),
            coord,
        }
    }
}

/// A named acupuncture point. `Point::default()` has an empty id and serves
/// as the "nothing selected" value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    /// Location on the 3D model.
    pub position: Vec3,
    pub positions: Vec<Position>,
    pub color: Color,
    #[serde(skip)]
    pub selected: bool,
}

impl Point {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
    }

    /// True when `filter` is empty or is a case-insensitive prefix of the id
    /// or of any tag.
    pub fn matches(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        let filter = filter.to_lowercase();
        starts_with_lower(&self.id, &filter)
            || self.tags.iter().any(|t| starts_with_lower(t, &filter))
    }

    pub fn position_in(&self, image_id: &str) -> Option<Vec2> {
        self.positions
            .iter()
            .find(|p| p.image_id == image_id)
            .map(|p| p.coord)
    }

    /// Replaces the position for `position.image_id`, or appends it.
    pub fn set_position(&mut self, position: Position) {
        match self.positions.iter_mut().find(|p| p.image_id == position.image_id) {
            Some(existing) => existing.coord = position.coord,
            None => self.positions.push(position),
        }
    }
}

fn starts_with_lower(s: &str, lower_prefix: &str) -> bool {
    s.to_lowercase().starts_with(lower_prefix)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub title: String,
    pub path: String,
}

/// Named preset of visible model groups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct View {
    pub name: String,
    pub groups: Vec<String>,
}

/// Orders point ids by alphabetic prefix, then by the numeric value of a
/// trailing digit run, so that "LI4" < "LI10".
///
/// An id without trailing digits is compared as a prefix with value 0.
/// Ids that tie on both (e.g. "LI4" and "LI04") fall back to plain string
/// order.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    let (prefix_a, digits_a) = split_id(a);
    let (prefix_b, digits_b) = split_id(b);
    prefix_a
        .cmp(prefix_b)
        .then_with(|| compare_digits(digits_a, digits_b))
        .then_with(|| a.cmp(b))
}

pub fn compare_points(a: &Point, b: &Point) -> Ordering {
    compare_ids(&a.id, &b.id)
}

fn split_id(id: &str) -> (&str, &str) {
    let split = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(id.len());
    id.split_at(split)
}

// Compares decimal digit strings by value without parsing, so arbitrarily
// long suffixes cannot overflow. An empty string is 0.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
