use acudb_core::error::FormatError;
use acudb_core::geom::Vec3;
use acudb_core::mesh::Material;
use std::collections::HashMap;
use std::path::Path;

type MtlResult<T> = std::result::Result<T, FormatError>;

/// Parses an MTL material library. Texture paths are resolved against
/// `base_dir`.
pub fn parse_mtl(text: &str, base_dir: &Path) -> MtlResult<HashMap<String, Material>> {
    let mut materials = HashMap::new();
    let mut current: Option<Material> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut fields = line.split_whitespace();
        let Some(tag) = fields.next() else {
            continue;
        };
        if tag.starts_with('#') {
            continue;
        }

        let tag = tag.to_ascii_lowercase();
        if tag == "newmtl" {
            if let Some(prev) = current.take() {
                materials.insert(prev.name.clone(), prev);
            }
            let name = fields
                .next()
                .ok_or_else(|| FormatError::at_line("newmtl without a name", line_no))?;
            current = Some(Material::new(name));
            continue;
        }

        let known = matches!(
            tag.as_str(),
            "ka" | "kd" | "ks" | "d" | "tr" | "ns" | "ni" | "map_kd"
        );
        if !known {
            continue;
        }
        let material = current
            .as_mut()
            .ok_or_else(|| FormatError::at_line(format!("{tag} before newmtl"), line_no))?;

        match tag.as_str() {
            "ka" => material.ambient = rgb(&mut fields, line_no)?,
            "kd" => material.diffuse = rgb(&mut fields, line_no)?,
            "ks" => material.specular = rgb(&mut fields, line_no)?,
            // `d -halo 0.5`: the value is the last field.
            "d" => material.dissolve = scalar(fields.last(), line_no)?,
            "tr" => material.dissolve = 1.0 - scalar(fields.last(), line_no)?,
            "ns" => material.specular_exponent = scalar(fields.next(), line_no)?,
            "ni" => material.optical_density = scalar(fields.next(), line_no)?,
            "map_kd" => {
                // Options such as `-bm 1.0` precede the file name.
                let file = fields
                    .last()
                    .ok_or_else(|| FormatError::at_line("map_Kd without a file", line_no))?;
                material.texture = Some(base_dir.join(file));
            }
            _ => unreachable!(),
        }
    }

    if let Some(prev) = current.take() {
        materials.insert(prev.name.clone(), prev);
    }
    Ok(materials)
}

fn rgb<'a>(fields: &mut impl Iterator<Item = &'a str>, line_no: usize) -> MtlResult<Vec3> {
    let r = scalar(fields.next(), line_no)?;
    let g = scalar(fields.next(), line_no)?;
    let b = scalar(fields.next(), line_no)?;
    Ok(Vec3::new(r, g, b))
}

fn scalar(field: Option<&str>, line_no: usize) -> MtlResult<f32> {
    let field = field.ok_or_else(|| FormatError::at_line("missing number", line_no))?;
    field
        .parse()
        .map_err(|_| FormatError::at_line(format!("{field:?} is not a number"), line_no))
}
