//! Generate the keyboard case scene and write it as JSON, with an optional
//! SVG wireframe preview.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Result, WrapErr};
use keycase_design::{SceneNode, generate_design, load_parameters_file};
use keycase_tessellation::{FlatMesh, MeshConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "keycase", about = "Generate the keyboard case geometry")]
struct Args {
    /// JSON file of parameter overrides. A missing file means all defaults.
    #[arg(long, default_value = "parameters.json")]
    parameters: PathBuf,

    /// Where to write the scene tree.
    #[arg(long, default_value = "output/result.json")]
    output: PathBuf,

    /// Also render an isometric SVG preview to this path.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Samples per patch side.
    #[arg(long)]
    fidelity: Option<usize>,

    /// Only emit the right half instead of mirroring it into a full case.
    #[arg(long)]
    half: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let params = load_parameters_file(&args.parameters)
        .wrap_err_with(|| format!("loading {}", args.parameters.display()))?;
    let config = match args.fidelity {
        Some(fidelity) => MeshConfig::default().with_fidelity(fidelity),
        None => MeshConfig::default(),
    };

    let scene = generate_design(&params, &config)?;
    let right = scene.into_tree();
    let tree = if args.half {
        right
    } else {
        let left = right.mirrored_x();
        SceneNode::Group(vec![right, left])
    };

    let json = serde_json::to_string(&tree)?;
    write_creating_dirs(&args.output, &json)?;
    info!(path = %args.output.display(), meshes = tree.meshes().count(), "wrote scene");

    if let Some(path) = &args.svg {
        let mesh = tree.flatten();
        write_creating_dirs(path, &mesh_to_svg(&mesh, 1200.0, 800.0, "keycase"))?;
        info!(path = %path.display(), triangles = mesh.triangle_count(), "wrote preview");
    }
    Ok(())
}

fn write_creating_dirs(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).wrap_err_with(|| format!("creating {}", dir.display()))?;
    }
    fs::write(path, contents).wrap_err_with(|| format!("writing {}", path.display()))
}

/// Isometric projection onto the screen plane, y pointing down.
fn project([x, y, z]: [f32; 3]) -> (f64, f64) {
    let (x, y, z) = (f64::from(x), f64::from(y), f64::from(z));
    let (tilt, turn): (f64, f64) = (0.6, 0.8);
    let rx = x * turn.cos() - y * turn.sin();
    let ry = x * turn.sin() + y * turn.cos();
    let pz = ry * tilt.sin() + z * tilt.cos();
    (rx, -pz)
}

struct Triangle {
    corners: [(f64, f64); 3],
    depth: f64,
    brightness: f64,
    back_facing: bool,
}

/// Flat-shaded wireframe drawn back to front.
fn mesh_to_svg(mesh: &FlatMesh, width: f64, height: f64, title: &str) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" style=\"background:#1a1a2e\">\n\
         <text x=\"{}\" y=\"20\" font-family=\"monospace\" font-size=\"13\" fill=\"#8892b0\" text-anchor=\"middle\">{title}</text>\n",
        width / 2.0
    );
    if mesh.indices.is_empty() {
        svg.push_str("</svg>\n");
        return svg;
    }

    let projected: Vec<(f64, f64)> = (0..mesh.vertex_count()).map(|v| project(mesh.position(v))).collect();
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for &(px, py) in &projected {
        min_x = min_x.min(px);
        max_x = max_x.max(px);
        min_y = min_y.min(py);
        max_y = max_y.max(py);
    }

    let padding = 40.0;
    let avail_w = width - 2.0 * padding;
    let avail_h = height - 2.0 * padding - 25.0;
    let data_w = (max_x - min_x).max(0.001);
    let data_h = (max_y - min_y).max(0.001);
    let scale = (avail_w / data_w).min(avail_h / data_h);
    let offset_x = padding + (avail_w - data_w * scale) / 2.0;
    let offset_y = padding + 25.0 + (avail_h - data_h * scale) / 2.0;
    let to_screen = |(px, py): (f64, f64)| ((px - min_x) * scale + offset_x, (py - min_y) * scale + offset_y);

    let light = [0.3, -0.5, 0.8];
    let light_len = light.iter().map(|c: &f64| c * c).sum::<f64>().sqrt();

    let mut triangles: Vec<Triangle> = mesh
        .indices
        .chunks_exact(3)
        .map(|t| {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| mesh.position(i as usize).map(f64::from));
            let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let w = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = [u[1] * w[2] - u[2] * w[1], u[2] * w[0] - u[0] * w[2], u[0] * w[1] - u[1] * w[0]];
            let n_len = n.iter().map(|c| c * c).sum::<f64>().sqrt().max(1e-12);
            let dot = n.iter().zip(light).map(|(n, l)| n * l).sum::<f64>() / (n_len * light_len);

            let corners = [t[0], t[1], t[2]].map(|i| projected[i as usize]);
            let [(x0, y0), (x1, y1), (x2, y2)] = corners;
            Triangle {
                corners: corners.map(to_screen),
                depth: (a[2] + b[2] + c[2]) / 3.0,
                brightness: 0.3 + 0.7 * dot.abs().min(1.0),
                // Projected y points down, so a negative area faces away.
                back_facing: (x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0) < 0.0,
            }
        })
        .collect();
    triangles.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    let (stroke_width, stroke_color) = if triangles.len() > 200 { (0.2, "#222240") } else { (0.5, "#2a2a4a") };
    for tri in &triangles {
        let b = tri.brightness;
        let (r, g, bl) = if tri.back_facing {
            ((220.0 * b) as u8, (80.0 * b) as u8, (60.0 * b) as u8)
        } else {
            ((100.0 * b) as u8, (160.0 * b) as u8, (220.0 * b) as u8)
        };
        let [(x0, y0), (x1, y1), (x2, y2)] = tri.corners;
        svg.push_str(&format!(
            "  <polygon points=\"{x0:.1},{y0:.1} {x1:.1},{y1:.1} {x2:.1},{y2:.1}\" \
             fill=\"rgb({r},{g},{bl})\" stroke=\"{stroke_color}\" stroke-width=\"{stroke_width}\"/>\n"
        ));
    }

    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-family=\"monospace\" font-size=\"10\" fill=\"#5a6080\" \
         text-anchor=\"middle\">{} triangles, {} vertices</text>\n</svg>\n",
        width / 2.0,
        height - 8.0,
        triangles.len(),
        mesh.vertex_count()
    ));
    svg
}
