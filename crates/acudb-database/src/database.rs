use crate::change::{Change, Observer, ObserverId};
use crate::options::LoadOptions;
use crate::status::{StatusReporter, TracingStatus};
use crate::xml::{self, DatabaseDocument};
use acudb_core::error::{Error, Result};
use acudb_core::filter::DatabaseFilter;
use acudb_core::mesh::MeshDataset;
use acudb_core::point::{compare_points, Image, Point, Position, View};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Select,
    Deselect,
    /// Deselect everything else, then select.
    Exclusive,
}

/// The point database shared by every view of the application.
///
/// All writes go through the methods below. Each one leaves the derived
/// state (point order, tag list, id index) consistent and then notifies the
/// registered observers synchronously, in registration order.
///
/// Methods taking a point id panic when the id is unknown; callers are
/// expected to check with [`PointDatabase::contains`] first.
#[derive(Default)]
pub struct PointDatabase {
    name: String,
    model_file: Option<String>,
    mesh: Option<MeshDataset>,
    points: Vec<Point>,
    index: HashMap<String, usize>,
    tags: Vec<String>,
    images: Vec<Image>,
    views: Vec<View>,
    filter: DatabaseFilter,
    current_view: String,
    visible_image: String,
    observers: Vec<(ObserverId, Box<dyn Observer>)>,
    next_observer: u64,
}

impl PointDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl Observer + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    pub fn load(&mut self, xml: &str, options: &LoadOptions) -> Result<()> {
        self.load_with_status(xml, options, &TracingStatus)
    }

    /// Replaces the whole database with the contents of `xml`. On error the
    /// current contents are kept and no notification is sent.
    pub fn load_with_status(
        &mut self,
        xml: &str,
        options: &LoadOptions,
        status: &dyn StatusReporter,
    ) -> Result<()> {
        status.report("Reading point database");
        let mut doc = xml::parse_database(xml)?;

        let mesh = match &doc.model_file {
            Some(file) => {
                let path = resolve(options.base_dir.as_deref(), file);
                status.report(&format!("Loading model {}", path.display()));
                Some(acudb_import_obj::import_obj(&path)?)
            }
            None => None,
        };

        if options.random_placement_for_testing {
            match &mesh {
                Some(mesh) => place_randomly(&mut doc, mesh, options.seed),
                None => warn!("random placement requested but the database has no model"),
            }
        }

        self.replace(doc, mesh);
        info!(
            name = %self.name,
            points = self.points.len(),
            tags = self.tags.len(),
            images = self.images.len(),
            views = self.views.len(),
            "loaded point database"
        );
        status.report(&format!("Loaded {} points", self.points.len()));
        self.notify(Change::Data);
        Ok(())
    }

    /// Loads a database file, resolving the model against the file's
    /// directory unless `options.base_dir` says otherwise.
    pub fn load_file(&mut self, path: &Path, options: &LoadOptions) -> Result<()> {
        let xml = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut options = options.clone();
        if options.base_dir.is_none() {
            options.base_dir = path.parent().map(Path::to_path_buf);
        }
        self.load(&xml, &options).map_err(|err| match err {
            Error::Format(fe) if fe.source_name.is_none() => {
                Error::Format(fe.in_source(path.display().to_string()))
            }
            other => other,
        })
    }

    pub fn to_xml(&self) -> String {
        xml::write_database(self)
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_xml()).map_err(|e| Error::io(path, e))?;
        info!(path = ?path, points = self.points.len(), "saved point database");
        Ok(())
    }

    // --- mutations ---

    /// Replaces the point with the same id, keeping its selection state.
    /// The description is trimmed, as it is when loading.
    ///
    /// # Panics
    ///
    /// Panics if no point with `point.id` exists. New points cannot be added
    /// this way.
    pub fn set_point(&mut self, mut point: Point) {
        let idx = self.index_of(&point.id);
        point.selected = self.points[idx].selected;
        if point.description.trim().len() != point.description.len() {
            point.description = point.description.trim().to_string();
        }
        self.points[idx] = point;
        self.rebuild_derived();
        self.notify(Change::Data);
    }

    /// Sets the position of point `id` in `position.image_id`.
    pub fn set_position(&mut self, id: &str, position: Position) {
        let idx = self.index_of(id);
        self.points[idx].set_position(position);
        self.notify(Change::Point(id.to_string()));
    }

    pub fn select(&mut self, id: &str) {
        self.set_flag(id, true);
    }

    pub fn deselect(&mut self, id: &str) {
        self.set_flag(id, false);
    }

    /// Deselects every selected point, one notification per point.
    pub fn clear_selection(&mut self) {
        let selected: Vec<String> = self
            .points
            .iter()
            .filter(|p| p.selected)
            .map(|p| p.id.clone())
            .collect();
        for id in selected {
            self.deselect(&id);
        }
    }

    pub fn set_selected(&mut self, id: &str, mode: SelectionMode) {
        match mode {
            SelectionMode::Select => self.select(id),
            SelectionMode::Deselect => self.deselect(id),
            SelectionMode::Exclusive => {
                // Validate before touching the selection.
                let _ = self.index_of(id);
                self.clear_selection();
                self.select(id);
            }
        }
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        let filter = filter.into();
        self.filter = DatabaseFilter::new(filter.clone());
        self.notify(Change::Filter(filter));
    }

    pub fn set_current_view(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() && !self.views.iter().any(|v| v.name == name) {
            warn!(view = %name, "current view is not defined in the database");
        }
        self.current_view = name.clone();
        self.notify(Change::View(name));
    }

    pub fn set_visible_image(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.visible_image = id.clone();
        self.notify(Change::VisibleImage(id));
    }

    // --- queries ---

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model path as written in the database file.
    pub fn model_file(&self) -> Option<&str> {
        self.model_file.as_deref()
    }

    pub fn mesh(&self) -> Option<&MeshDataset> {
        self.mesh.as_ref()
    }

    /// Points in id order (see [`acudb_core::point::compare_ids`]).
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// # Panics
    ///
    /// Panics if `id` is unknown.
    pub fn point(&self, id: &str) -> &Point {
        &self.points[self.index_of(id)]
    }

    pub fn find_point(&self, id: &str) -> Option<&Point> {
        self.index.get(id).map(|&idx| &self.points[idx])
    }

    pub fn selected_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(|p| p.selected)
    }

    /// Points accepted by the current filter, in id order.
    pub fn filtered_points(&self) -> impl Iterator<Item = &Point> {
        self.filter.apply(&self.points)
    }

    /// Sorted, deduplicated union of all point tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn filter(&self) -> &str {
        self.filter.tag()
    }

    pub fn current_view(&self) -> &str {
        &self.current_view
    }

    pub fn active_view(&self) -> Option<&View> {
        self.views.iter().find(|v| v.name == self.current_view)
    }

    pub fn visible_image(&self) -> &str {
        &self.visible_image
    }

    // --- internals ---

    fn replace(&mut self, doc: DatabaseDocument, mesh: Option<MeshDataset>) {
        self.name = doc.name;
        self.model_file = doc.model_file;
        self.mesh = mesh;
        self.points = doc.points;
        self.images = doc.images;
        self.views = doc.views;
        self.filter = DatabaseFilter::default();
        self.current_view.clear();
        self.visible_image.clear();
        self.rebuild_derived();
    }

    fn set_flag(&mut self, id: &str, selected: bool) {
        let idx = self.index_of(id);
        if self.points[idx].selected == selected {
            return;
        }
        self.points[idx].selected = selected;
        self.notify(Change::Selection(id.to_string()));
    }

    fn rebuild_derived(&mut self) {
        self.points.sort_by(compare_points);
        self.index = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();
        let tags: BTreeSet<&String> = self.points.iter().flat_map(|p| p.tags.iter()).collect();
        self.tags = tags.into_iter().cloned().collect();
    }

    fn index_of(&self, id: &str) -> usize {
        match self.index.get(id) {
            Some(&idx) => idx,
            None => panic!("unknown point id {id:?}"),
        }
    }

    fn notify(&mut self, change: Change) {
        debug!(?change, observers = self.observers.len(), "database changed");
        // Observers only get `&Self`, so none can be added while dispatching.
        let observers = std::mem::take(&mut self.observers);
        let mut dispatch = Dispatch { db: self, observers };
        for (_, observer) in dispatch.observers.iter_mut() {
            observer.changed(dispatch.db, &change);
        }
    }
}

/// Hands the observer list back to the database when dispatch ends, also
/// when an observer panics.
struct Dispatch<'a> {
    db: &'a mut PointDatabase,
    observers: Vec<(ObserverId, Box<dyn Observer>)>,
}

impl Drop for Dispatch<'_> {
    fn drop(&mut self) {
        self.db.observers = std::mem::take(&mut self.observers);
    }
}

impl fmt::Debug for PointDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointDatabase")
            .field("name", &self.name)
            .field("model_file", &self.model_file)
            .field("points", &self.points.len())
            .field("tags", &self.tags.len())
            .field("images", &self.images.len())
            .field("views", &self.views.len())
            .field("filter", &self.filter.tag())
            .field("current_view", &self.current_view)
            .field("visible_image", &self.visible_image)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn resolve(base_dir: Option<&Path>, file: &str) -> PathBuf {
    match base_dir {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}

fn place_randomly(doc: &mut DatabaseDocument, mesh: &MeshDataset, seed: Option<u64>) {
    let vertices = mesh.vertices();
    if vertices.is_empty() {
        return;
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    for point in &mut doc.points {
        point.position = vertices[rng.gen_range(0..vertices.len())];
    }
    debug!(points = doc.points.len(), seed = ?seed, "placed points on random model vertices");
}
