use crate::database::PointDatabase;

/// Which piece of database state a [`Change`] touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    Data,
    Selection,
    Point,
    Filter,
    View,
    VisibleImage,
}

/// Change notification: the reason plus its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Points, tags, images or views were replaced.
    Data,
    /// Selection flag of one point flipped.
    Selection(String),
    /// Image-space positions of one point changed.
    Point(String),
    Filter(String),
    View(String),
    VisibleImage(String),
}

impl Change {
    pub fn reason(&self) -> Reason {
        match self {
            Change::Data => Reason::Data,
            Change::Selection(_) => Reason::Selection,
            Change::Point(_) => Reason::Point,
            Change::Filter(_) => Reason::Filter,
            Change::View(_) => Reason::View,
            Change::VisibleImage(_) => Reason::VisibleImage,
        }
    }

    pub fn point_id(&self) -> Option<&str> {
        match self {
            Change::Selection(id) | Change::Point(id) => Some(id),
            _ => None,
        }
    }
}

/// Receives every change after the database state is consistent again.
pub trait Observer {
    fn changed(&mut self, db: &PointDatabase, change: &Change);
}

impl<F> Observer for F
where
    F: FnMut(&PointDatabase, &Change),
{
    fn changed(&mut self, db: &PointDatabase, change: &Change) {
        self(db, change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);
