use acudb_core::error::FormatError;
use acudb_core::geom::{Vec2, Vec3};
use acudb_core::point::{Color, Image, Point, Position, View};
use roxmltree::{Document, Node};
use std::collections::HashSet;

type ReadResult<T> = std::result::Result<T, FormatError>;

/// Contents of a database file before it is merged into a
/// [`crate::PointDatabase`].
#[derive(Debug, Clone, Default)]
pub(crate) struct DatabaseDocument {
    pub name: String,
    pub model_file: Option<String>,
    pub images: Vec<Image>,
    pub views: Vec<View>,
    pub points: Vec<Point>,
}

pub(crate) fn parse_database(xml: &str) -> ReadResult<DatabaseDocument> {
    let doc = Document::parse(xml)
        .map_err(|e| FormatError::at_line(e.to_string(), e.pos().row as usize))?;

    let root = doc.root_element();
    expect_tag(root, "database")?;

    let mut out = DatabaseDocument {
        name: required_attr(root, "name")?.to_string(),
        ..DatabaseDocument::default()
    };

    for child in elements(root) {
        match child.tag_name().name() {
            "model" => out.model_file = Some(parse_model(child)?),
            "images" => {
                for node in elements(child) {
                    let image = parse_image(node)?;
                    if out.images.iter().any(|i| i.id == image.id) {
                        return Err(error(node, format!("duplicate image id {:?}", image.id)));
                    }
                    out.images.push(image);
                }
            }
            "views" => {
                for view in elements(child) {
                    out.views.push(parse_view(view)?);
                }
            }
            "points" => {
                let mut seen = HashSet::new();
                for node in elements(child) {
                    let point = parse_point(node)?;
                    if !seen.insert(point.id.clone()) {
                        return Err(error(node, format!("duplicate point id {:?}", point.id)));
                    }
                    out.points.push(point);
                }
            }
            _ => return Err(unexpected(child, "database")),
        }
    }

    check_image_refs(root, &out.images)?;
    Ok(out)
}

// `<images>` may follow `<points>`, so references are checked once the
// whole catalogue is known.
fn check_image_refs(root: Node<'_, '_>, images: &[Image]) -> ReadResult<()> {
    let positions = root.descendants().filter(|n| n.has_tag_name("image-position"));
    for node in positions {
        let id = required_attr(node, "image")?;
        if !images.iter().any(|i| i.id == id) {
            return Err(error(node, format!("unknown image {id:?}")));
        }
    }
    Ok(())
}

fn parse_model(node: Node<'_, '_>) -> ReadResult<String> {
    let mut file = None;
    for child in elements(node) {
        expect_tag(child, "file")?;
        if file.is_some() {
            return Err(error(child, "more than one <file> in <model>"));
        }
        file = Some(text(child)?);
    }
    file.ok_or_else(|| error(node, "<model> without <file>"))
}

fn parse_image(node: Node<'_, '_>) -> ReadResult<Image> {
    expect_tag(node, "image")?;
    Ok(Image {
        id: required_attr(node, "id")?.to_string(),
        title: required_attr(node, "title")?.to_string(),
        path: required_attr(node, "path")?.to_string(),
    })
}

fn parse_view(node: Node<'_, '_>) -> ReadResult<View> {
    expect_tag(node, "view")?;
    let mut view = View {
        name: required_attr(node, "name")?.to_string(),
        groups: Vec::new(),
    };
    for group in elements(node) {
        expect_tag(group, "group")?;
        view.groups.push(text(group)?);
    }
    Ok(view)
}

fn parse_point(node: Node<'_, '_>) -> ReadResult<Point> {
    expect_tag(node, "point")?;
    let mut point = Point::new(required_attr(node, "id")?);
    if point.id.is_empty() {
        return Err(error(node, "empty point id"));
    }

    let mut position = None;
    let mut description = None;
    let mut color = None;

    for child in elements(node) {
        match child.tag_name().name() {
            "tags" => {
                for tag in elements(child) {
                    expect_tag(tag, "tag")?;
                    point.tags.insert(required_attr(tag, "name")?.to_string());
                }
            }
            "position" => {
                once(&position, child)?;
                position = Some(Vec3::new(
                    number(child, "x")?,
                    number(child, "y")?,
                    number(child, "z")?,
                ));
            }
            "image-position" => {
                let image = required_attr(child, "image")?;
                if point.position_in(image).is_some() {
                    return Err(error(child, format!("second position for image {image:?}")));
                }
                point.positions.push(Position::new(
                    image,
                    Vec2::new(number(child, "x")?, number(child, "y")?),
                ));
            }
            "description" => {
                once(&description, child)?;
                description = Some(text(child)?);
            }
            "color" => {
                once(&color, child)?;
                color = Some(parse_color(child)?);
            }
            _ => return Err(unexpected(child, "point")),
        }
    }

    point.position = position.ok_or_else(|| missing(node, "position"))?;
    point.description = description.ok_or_else(|| missing(node, "description"))?;
    point.color = color.ok_or_else(|| missing(node, "color"))?;
    Ok(point)
}

fn parse_color(node: Node<'_, '_>) -> ReadResult<Color> {
    let value = text(node)?;
    let parsed: svgtypes::Color = value
        .parse()
        .map_err(|_| error(node, format!("invalid color {value:?}")))?;
    Ok(Color::rgba(parsed.red, parsed.green, parsed.blue, parsed.alpha))
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// Character data of a leaf element, trimmed.
fn text(node: Node<'_, '_>) -> ReadResult<String> {
    if let Some(child) = elements(node).next() {
        return Err(error(
            child,
            format!("<{}> must contain text only", node.tag_name().name()),
        ));
    }
    let s: String = node
        .children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    Ok(s.trim().to_string())
}

fn number(node: Node<'_, '_>, attr: &str) -> ReadResult<f32> {
    let raw = required_attr(node, attr)?;
    raw.trim().parse().map_err(|_| {
        error(
            node,
            format!("attribute {attr:?} of <{}> is not a number: {raw:?}", node.tag_name().name()),
        )
    })
}

fn required_attr<'a>(node: Node<'a, '_>, attr: &str) -> ReadResult<&'a str> {
    node.attribute(attr).ok_or_else(|| {
        error(
            node,
            format!("<{}> is missing attribute {attr:?}", node.tag_name().name()),
        )
    })
}

fn expect_tag(node: Node<'_, '_>, tag: &str) -> ReadResult<()> {
    if node.has_tag_name(tag) {
        Ok(())
    } else {
        Err(error(
            node,
            format!("expected <{tag}>, found <{}>", node.tag_name().name()),
        ))
    }
}

fn once<T>(slot: &Option<T>, node: Node<'_, '_>) -> ReadResult<()> {
    match slot {
        Some(_) => Err(error(
            node,
            format!("more than one <{}>", node.tag_name().name()),
        )),
        None => Ok(()),
    }
}

fn missing(node: Node<'_, '_>, tag: &str) -> FormatError {
    let id = node.attribute("id").unwrap_or_default();
    error(node, format!("point {id:?} has no <{tag}>"))
}

fn unexpected(node: Node<'_, '_>, parent: &str) -> FormatError {
    error(
        node,
        format!("unexpected <{}> in <{parent}>", node.tag_name().name()),
    )
}

fn error(node: Node<'_, '_>, message: impl Into<String>) -> FormatError {
    let pos = node.document().text_pos_at(node.range().start);
    FormatError::at_line(message, pos.row as usize)
}
