use acudb_core::geom::{BBox3, Vec3};
use acudb_core::renderable::RenderableBuffer;
use acudb_database::{LoadOptions, PointDatabase};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "acudb")]
#[command(about = "Inspect and convert acupuncture point databases and body meshes.")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load an OBJ mesh, index it for rendering and print statistics.
    Mesh {
        input: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List the points of a database.
    Points {
        input: PathBuf,
        #[arg(long, default_value = "")]
        filter: String,
        /// Print the groups of this view as well.
        #[arg(long)]
        view: Option<String>,
    },
    /// Load a database and write it back in canonical form.
    Export {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        random_placement: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Mesh { input, report } => mesh(&input, report.as_deref()),
        Command::Points {
            input,
            filter,
            view,
        } => points(&input, &filter, view.as_deref()),
        Command::Export {
            input,
            out,
            random_placement,
            seed,
        } => export(&input, out.as_deref(), random_placement, seed),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Serialize)]
struct MeshReport {
    name: String,
    vertices: usize,
    normals: usize,
    textures: usize,
    faces: usize,
    groups: Vec<GroupReport>,
    buffer_vertices: usize,
    buffer_indices: usize,
    bounding_box: BBox3,
    center: Vec3,
    diagonal: f32,
}

#[derive(Debug, Serialize)]
struct GroupReport {
    name: String,
    material: Option<String>,
    triangles: usize,
}

fn mesh(input: &Path, report: Option<&Path>) -> Result<()> {
    ensure_input_file(input)?;
    let mesh = acudb_import_obj::import_obj(input)?;
    let buffer = RenderableBuffer::build(&mesh).context("index mesh")?;

    let report_data = MeshReport {
        name: mesh.name().to_string(),
        vertices: mesh.vertices().len(),
        normals: mesh.normals().len(),
        textures: mesh.textures().len(),
        faces: mesh.face_count(),
        groups: buffer
            .ranges
            .iter()
            .map(|r| GroupReport {
                name: r.group.clone(),
                material: r.material.as_ref().map(|m| m.name.clone()),
                triangles: r.index_count / 3,
            })
            .collect(),
        buffer_vertices: buffer.vertices.len(),
        buffer_indices: buffer.indices.len(),
        bounding_box: buffer.bounding_box,
        center: buffer.bounding_box.center(),
        diagonal: buffer.bounding_box.diag(),
    };
    let json = serde_json::to_string_pretty(&report_data).context("serialize report")?;

    if let Some(path) = report {
        write_file(path, &json)?;
    } else {
        println!("{json}");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct PointRow<'a> {
    id: &'a str,
    description: &'a str,
    tags: Vec<&'a str>,
    color: String,
    images: Vec<&'a str>,
}

fn points(input: &Path, filter: &str, view: Option<&str>) -> Result<()> {
    let mut db = load(input, &LoadOptions::default())?;
    db.set_filter(filter);

    let rows: Vec<_> = db
        .filtered_points()
        .map(|p| PointRow {
            id: &p.id,
            description: &p.description,
            tags: p.tags.iter().map(String::as_str).collect(),
            color: p.color.to_hex(),
            images: p.positions.iter().map(|pos| pos.image_id.as_str()).collect(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows).context("serialize points")?);

    if let Some(name) = view {
        let Some(view) = db.views().iter().find(|v| v.name == name) else {
            bail!("view {name:?} is not defined in {input:?}");
        };
        println!("{}", serde_json::to_string_pretty(view).context("serialize view")?);
    }
    Ok(())
}

fn export(input: &Path, out: Option<&Path>, random_placement: bool, seed: Option<u64>) -> Result<()> {
    let options = LoadOptions {
        random_placement_for_testing: random_placement,
        seed,
        ..LoadOptions::default()
    };
    let db = load(input, &options)?;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            db.save_file(path)
                .with_context(|| format!("write database: {path:?}"))?;
            info!(points = db.points().len(), out = ?path, "exported database");
        }
        None => print!("{}", db.to_xml()),
    }
    Ok(())
}

fn load(input: &Path, options: &LoadOptions) -> Result<PointDatabase> {
    ensure_input_file(input)?;
    let mut db = PointDatabase::new();
    db.load_file(input, options)
        .with_context(|| format!("load database: {input:?}"))?;
    Ok(db)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(path, contents).with_context(|| format!("write: {path:?}"))
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => bail!("input is not a file: {input:?}"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
