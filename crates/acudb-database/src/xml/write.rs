use crate::database::PointDatabase;
use acudb_core::point::Point;
use std::fmt::Write as _;

pub const FORMAT_VERSION: &str = "0.1";

pub(crate) fn write_database(db: &PointDatabase) -> String {
    let mut w = XmlWriter::new();
    w.line(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    w.open(&format!(
        r#"database version="{FORMAT_VERSION}" name="{}""#,
        escape(db.name())
    ));

    if let Some(file) = db.model_file() {
        w.open("model");
        w.text_element("file", file);
        w.close("model");
    }

    if !db.images().is_empty() {
        w.open("images");
        for image in db.images() {
            w.line(&format!(
                r#"<image id="{}" title="{}" path="{}"/>"#,
                escape(&image.id),
                escape(&image.title),
                escape(&image.path)
            ));
        }
        w.close("images");
    }

    if !db.views().is_empty() {
        w.open("views");
        for view in db.views() {
            w.open(&format!(r#"view name="{}""#, escape(&view.name)));
            for group in &view.groups {
                w.text_element("group", group);
            }
            w.close("view");
        }
        w.close("views");
    }

    w.open("points");
    for point in db.points() {
        write_point(&mut w, point);
    }
    w.close("points");

    w.close("database");
    w.out
}

fn write_point(w: &mut XmlWriter, point: &Point) {
    w.open(&format!(r#"point id="{}""#, escape(&point.id)));

    w.open("tags");
    for tag in &point.tags {
        w.line(&format!(r#"<tag name="{}"/>"#, escape(tag)));
    }
    w.close("tags");

    let p = point.position;
    w.line(&format!(r#"<position x="{}" y="{}" z="{}"/>"#, p.x, p.y, p.z));
    for pos in &point.positions {
        w.line(&format!(
            r#"<image-position image="{}" x="{}" y="{}"/>"#,
            escape(&pos.image_id),
            pos.coord.x,
            pos.coord.y
        ));
    }
    w.text_element("description", &point.description);
    w.text_element("color", &point.color.to_hex());

    w.close("point");
}

struct XmlWriter {
    depth: usize,
    out: String,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            depth: 0,
            out: String::new(),
        }
    }

    fn line(&mut self, s: &str) {
        let _ = writeln!(self.out, "{:indent$}{s}", "", indent = self.depth * 2);
    }

    // `tag` may carry attributes.
    fn open(&mut self, tag: &str) {
        self.line(&format!("<{tag}>"));
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth -= 1;
        self.line(&format!("</{tag}>"));
    }

    fn text_element(&mut self, tag: &str, text: &str) {
        self.line(&format!("<{tag}>{}</{tag}>", escape(text)));
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Attribute normalization would turn these into spaces.
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}
