use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Context, Result, eyre};
use meshchunk::chunker::{self, ChunkReport, Chunker, PlaneSlicer};
use meshchunk::errors::ChunkError;
use meshchunk::manifest::Manifest;
use meshchunk::mesh::Mesh;
use meshchunk::scene::{NodeId, PieceMesh, Scene};
use meshchunk::traits::Hierarchy;

/// Cut the solids of a scene into chunks along the root's X axis
#[derive(Debug, clap::Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(clap::Subcommand, Debug)]
enum Subcommand {
    /// Slice and group a scene, optionally writing one STL per chunk.
    Chunk {
        /// JSON scene manifest
        manifest: PathBuf,
        /// Comma-separated cut coordinates; overrides the manifest's `cuts`
        #[arg(short, long)]
        cuts: Option<String>,
        /// Directory to write `Chunk_{i}.stl` files into
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Write ASCII STL instead of binary.
        #[arg(long)]
        ascii: bool,
    },
    /// Print the bound of everything under the root, in root coordinates.
    Bounds {
        /// JSON scene manifest
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match Args::parse().subcommand {
        Subcommand::Chunk {
            manifest,
            cuts,
            out,
            ascii,
        } => chunk(&manifest, cuts, out.as_deref(), ascii),
        Subcommand::Bounds { manifest } => {
            let (scene, root, _) = load_scene(&manifest)?;
            let bound = chunker::measure_bounds(&scene, root)?;
            println!(
                "x: [{}, {}]  y: [{}, {}]  z: [{}, {}]",
                bound.mins.x, bound.maxs.x, bound.mins.y, bound.maxs.y, bound.mins.z, bound.maxs.z
            );
            Ok(())
        },
    }
}

fn load_scene(path: &Path) -> Result<(Scene, NodeId, Manifest)> {
    let manifest = Manifest::load(path).wrap_err("error loading manifest")?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    let (scene, root) = manifest
        .build_scene(base_dir)
        .wrap_err_with(|| format!("error building scene from {}", path.display()))?;
    Ok((scene, root, manifest))
}

fn chunk(path: &Path, cuts: Option<String>, out: Option<&Path>, ascii: bool) -> Result<()> {
    let (mut scene, root, manifest) = load_scene(path)?;
    let cut_text = resolve_cut_text(cuts, manifest.cuts);

    let report = match Chunker::new(PlaneSlicer).run(&mut scene, root, &cut_text) {
        Ok(report) => report,
        Err(e @ (ChunkError::NoCutCoordinates { .. } | ChunkError::NoGeometry { .. })) => {
            // refusals leave the scene as it was
            println!("{e}");
            println!("Sliced into 0 pieces and grouped into 0 chunks.");
            return Ok(());
        },
        Err(e) => return Err(e).wrap_err("error chunking scene"),
    };
    println!("{report}");
    for summary in &report.chunks {
        println!(
            "  {} [{}, {}]: {} piece(s)",
            summary.name,
            summary.range.0,
            summary.range.1,
            summary.pieces.len()
        );
    }

    if let Some(out) = out {
        write_chunks(&scene, &report, out, ascii)?;
    }
    Ok(())
}

/// `--cuts` wins over the manifest. With neither, the empty text is refused by
/// the chunker like any other list without a usable cut.
fn resolve_cut_text(flag: Option<String>, manifest: Option<String>) -> String {
    flag.or(manifest).unwrap_or_default()
}

/// Merge each chunk's fragments in root space and write them out.
fn write_chunks(scene: &Scene, report: &ChunkReport, out: &Path, ascii: bool) -> Result<()> {
    std::fs::create_dir_all(out).wrap_err_with(|| format!("error creating {}", out.display()))?;
    let root_inverse = scene
        .world_transform(report.root)
        .and_then(|world| world.try_inverse())
        .ok_or_else(|| eyre!("root transform is not invertible"))?;

    for summary in &report.chunks {
        let mut polygons = Vec::new();
        for &node in &summary.pieces {
            let (Some(piece), Some(world)) = (scene.piece(node), scene.world_transform(node)) else {
                continue;
            };
            let local: PieceMesh = piece
                .mesh
                .transform(&(root_inverse * world))
                .ok_or_else(|| eyre!("piece {node} has a singular transform"))?;
            polygons.extend(local.polygons);
        }
        let mesh = Mesh::from_polygons(&polygons);

        let file = out.join(format!("{}.stl", summary.name));
        write_stl(&mesh, &summary.name, &file, ascii)?;
        log::info!("wrote {} polygon(s) to {}", mesh.polygons.len(), file.display());
    }
    Ok(())
}

#[cfg(feature = "stl-io")]
fn write_stl(mesh: &PieceMesh, name: &str, file: &Path, ascii: bool) -> Result<()> {
    let bytes = if ascii {
        mesh.to_stl_ascii(name).into_bytes()
    } else {
        mesh.to_stl_binary(name)?
    };
    std::fs::write(file, bytes).wrap_err_with(|| format!("error writing {}", file.display()))
}

#[cfg(not(feature = "stl-io"))]
fn write_stl(_mesh: &PieceMesh, _name: &str, _file: &Path, _ascii: bool) -> Result<()> {
    Err(eyre!("STL export requires the `stl-io` feature"))
}
