use crate::point::Point;

/// Tag-prefix predicate shared by the explorer and image views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseFilter {
    tag: String,
}

impl DatabaseFilter {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_empty(&self) -> bool {
        self.tag.is_empty()
    }

    pub fn accepts(&self, point: &Point) -> bool {
        point.matches(&self.tag)
    }

    pub fn apply<'a>(&'a self, points: &'a [Point]) -> impl Iterator<Item = &'a Point> + 'a {
        points.iter().filter(move |p| self.accepts(p))
    }
}
