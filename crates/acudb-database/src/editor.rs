use crate::database::PointDatabase;
use acudb_core::geom::Vec2;
use acudb_core::point::{Color, Point, Position};

/// Access to whatever image view the user is working in.
pub trait ImageView {
    /// Id of the image currently shown, if any.
    fn active_image(&self) -> Option<String>;

    /// Lets the user pick a coordinate in the active image. `None` when the
    /// pick was cancelled.
    fn select_coordinate(&mut self) -> Option<Vec2>;
}

/// Edits a copy of one point and writes it back with
/// [`PointDatabase::set_point`].
#[derive(Debug, Clone)]
pub struct PointEditor {
    draft: Point,
}

impl PointEditor {
    /// # Panics
    ///
    /// Panics if `id` is not in `db`.
    pub fn open(db: &PointDatabase, id: &str) -> Self {
        Self {
            draft: db.point(id).clone(),
        }
    }

    pub fn draft(&self) -> &Point {
        &self.draft
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Replaces the tags with the comma separated entries of `tags`.
    pub fn set_tags(&mut self, tags: &str) {
        self.draft.tags = tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn set_color(&mut self, color: Color) {
        self.draft.color = color;
    }

    /// Asks `view` for a coordinate in its active image and stores it.
    /// Returns false when there is no active image or the pick was
    /// cancelled.
    pub fn capture_position(&mut self, view: &mut dyn ImageView) -> bool {
        let Some(image) = view.active_image() else {
            return false;
        };
        let Some(coord) = view.select_coordinate() else {
            return false;
        };
        self.draft.set_position(Position::new(image, coord));
        true
    }

    pub fn remove_position(&mut self, image_id: &str) -> bool {
        let before = self.draft.positions.len();
        self.draft.positions.retain(|p| p.image_id != image_id);
        self.draft.positions.len() != before
    }

    pub fn is_modified(&self, db: &PointDatabase) -> bool {
        match db.find_point(&self.draft.id) {
            Some(stored) => !same_content(stored, &self.draft),
            None => true,
        }
    }

    pub fn commit(self, db: &mut PointDatabase) {
        db.set_point(self.draft);
    }
}

fn same_content(a: &Point, b: &Point) -> bool {
    a.description == b.description
        && a.tags == b.tags
        && a.position == b.position
        && a.positions == b.positions
        && a.color == b.color
}
