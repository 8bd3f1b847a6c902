//! `tdrmesh` command line tool: read a TDR device mesh and write it out in
//! the requested interchange formats.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tdrmesh::convert::{convert, ConvertOptions};
use tdrmesh::parser::tdr::open_tdr;
use tdrmesh::writer::{
    DevsimScriptWriter, DeviceSummary, ExodusModel, ExodusWriter, GmshWriter, TetgenWriter, VTUWriter,
};

/// Convert a TCAD TDR mesh into GMSH, TetGen, Exodus or VTU meshes
#[derive(Parser)]
#[command(name = "tdrmesh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create meshes from a TDR file", long_about = None)]
struct Cli {
    /// The tdr file to read (needs a build with `--features hdf5`)
    #[arg(long)]
    tdr: PathBuf,

    /// The gmsh file to write
    #[arg(long)]
    gmsh: Option<PathBuf>,

    /// The DEVSIM script that recreates the device from the gmsh file
    #[arg(long, requires = "gmsh")]
    gmsh_import: Option<PathBuf>,

    /// Basename of the TetGen .node/.ele/.face files (3-D only)
    #[arg(long)]
    tetgen: Option<PathBuf>,

    /// The Exodus file to write
    #[arg(long)]
    exodus: Option<PathBuf>,

    /// The VTK unstructured grid file to write
    #[arg(long)]
    vtu: Option<PathBuf>,

    /// The device name
    #[arg(long, default_value = "device")]
    device_name: String,

    /// Coordinate scaling factor
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Load node datasets and write them with the mesh
    #[arg(long)]
    load_datasets: bool,

    /// Drop interface faces touching contact nodes
    #[arg(long)]
    drop_interfaces_at_contact: bool,

    /// Print the regions, contacts and interfaces of the device
    #[arg(long)]
    info: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let source = open_tdr(&cli.tdr).with_context(|| format!("opening {}", cli.tdr.display()))?;

    let options = ConvertOptions::default()
        .with_scale(cli.scale)
        .with_load_datasets(cli.load_datasets)
        .with_drop_interfaces_at_contact(cli.drop_interfaces_at_contact);
    let conversion = convert(source.as_ref(), &options)
        .with_context(|| format!("converting {}", cli.tdr.display()))?;
    let mesh = &conversion.mesh;
    info!(
        "Unified mesh: {} nodes, {} elements, {} physical groups",
        mesh.num_nodes(),
        mesh.num_elements(),
        mesh.physical_names.len()
    );

    if cli.info {
        print!("{}", DeviceSummary::from_mesh(&cli.device_name, mesh));
    }

    if let Some(gmsh) = &cli.gmsh {
        GmshWriter::write(mesh, gmsh)?;
        if let Some(script) = &cli.gmsh_import {
            DevsimScriptWriter::write(mesh, &gmsh.to_string_lossy(), &cli.device_name, script)?;
        }
    }

    if let Some(basename) = &cli.tetgen {
        TetgenWriter::write(mesh, basename)?;
    }

    let node_fields = if cli.exodus.is_some() || cli.vtu.is_some() {
        mesh.node_fields(&conversion.datasets)
    } else {
        Vec::new()
    };

    if let Some(exodus) = &cli.exodus {
        let model = ExodusModel::build(mesh, node_fields.clone())?;
        ExodusWriter::write(&model, exodus)?;
    }

    if let Some(vtu) = &cli.vtu {
        VTUWriter::write_vtu(mesh, &node_fields, vtu)?;
    }

    Ok(())
}
