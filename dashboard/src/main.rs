use anyhow::{bail, Context};
use clap::Parser;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::DashboardModel;
use mapvalcore::map::extract_shapes;
use mapvalcore::report::FlatRow;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::DashboardConfig;
use workflow::runner::Runner;

mod gui_bridge;
#[cfg(all(test, unix))]
mod testing;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Lanelet2 map validation dashboard")]
struct Args {
    /// Load dashboard settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Lanelet2 `.osm` map used by --offline and --export-shapes
    #[arg(long)]
    map: Option<PathBuf>,
    /// Validate --map once and write figure.svg and rows.json to the output directory
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Row to select after an offline run
    #[arg(long)]
    select: Option<usize>,
    /// Write the shapes of --map to <map dir>/lanelet/lanelet.json
    #[arg(long, default_value_t = false)]
    export_shapes: bool,
    /// Keep the HTTP bridge alive for the desktop client
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long)]
    bind: Option<SocketAddr>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    if args.export_shapes {
        let map = required_map(&args)?;
        let written = export_shapes(map, &config)?;
        println!("Exported shapes -> {}", written.display());
    }

    let runner = Runner::new(config.clone());
    let gui_bridge = GuiBridge::new(runner);

    if args.offline {
        let map = required_map(&args)?;
        run_offline(&gui_bridge, &config, map, args.select)?;
    }

    if args.serve {
        let bound = gui_bridge.serve(config.bind)?;
        gui_bridge.publish_status(&format!("HTTP bridge running on {bound} (Ctrl+C to stop)..."));
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}

fn required_map(args: &Args) -> anyhow::Result<&Path> {
    match &args.map {
        Some(map) => Ok(map.as_path()),
        None => bail!("--map is required for --offline and --export-shapes"),
    }
}

fn export_shapes(map: &Path, config: &DashboardConfig) -> anyhow::Result<PathBuf> {
    let shapes = extract_shapes(map, &config.map_config())
        .with_context(|| format!("extracting geometry from {}", map.display()))?;
    let dir = map
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("lanelet");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("lanelet.json");
    let json = serde_json::to_string_pretty(&shapes)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn run_offline(
    gui_bridge: &GuiBridge,
    config: &DashboardConfig,
    map: &Path,
    select: Option<usize>,
) -> anyhow::Result<()> {
    let bytes = fs::read(map).with_context(|| format!("reading map {}", map.display()))?;
    let file_name = map
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid map path {}", map.display()))?;

    let mut model = gui_bridge.upload(file_name, &bytes)?;
    if let Some(failure) = &model.failure {
        eprintln!("{}", failure.message);
        if !failure.stdout.is_empty() {
            eprintln!("--- validator stdout ---\n{}", failure.stdout);
        }
        if !failure.stderr.is_empty() {
            eprintln!("--- validator stderr ---\n{}", failure.stderr);
        }
        bail!("offline validation failed");
    }
    if let Some(row) = select {
        model = gui_bridge.select(Some(row))?;
    }
    print_summary(&model);

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let svg_path = config.output_dir.join("figure.svg");
    fs::write(&svg_path, gui_bridge.figure().to_svg()?)
        .with_context(|| format!("writing {}", svg_path.display()))?;
    let rows_path = config.output_dir.join("rows.json");
    fs::write(&rows_path, serde_json::to_string_pretty(&model.rows)?)
        .with_context(|| format!("writing {}", rows_path.display()))?;
    println!(
        "Wrote {} and {}",
        svg_path.display(),
        rows_path.display()
    );
    Ok(())
}

fn print_summary(model: &DashboardModel) {
    println!(
        "Offline run -> report version {}, rows {}, shapes {}",
        model.report_version.as_deref().unwrap_or("?"),
        model.rows.len(),
        model.shape_count
    );
    for warning in &model.warnings {
        println!("warning: {warning}");
    }
    println!("{}", FlatRow::DISPLAY_COLUMNS.join(" | "));
    for row in &model.rows {
        println!("{}", row.display_cells().join(" | "));
    }
    println!("{}", model.status);
}
