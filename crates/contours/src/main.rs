use contours_lib::command::execute_json_batch;
use contours_lib::fixtures;
use contours_lib::harness::TestHarness;
use contours_lib::state::ToolSettings;

struct Args {
    script: String,
    out: Option<String>,
    settings: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contours=info".into()),
        )
        .init();

    let Some(args) = parse_args() else {
        eprintln!("usage: contours --script <commands.json> [--out <mesh.json>] [--settings <settings.json>]");
        std::process::exit(2);
    };

    if let Err(e) = run(&args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let settings = match &args.settings {
        Some(path) => ToolSettings::load_from(std::path::Path::new(path))?,
        None => ToolSettings::load(),
    };
    let json = std::fs::read_to_string(&args.script)
        .map_err(|e| format!("Failed to read script {}: {e}", args.script))?;

    let mut harness = TestHarness::with_surface(
        fixtures::tube(),
        settings,
        fixtures::front_camera(glam::Vec3::ZERO),
    );
    let responses = execute_json_batch(&mut harness, &json)?;
    let failed = responses.iter().filter(|r| !r.success).count();
    tracing::info!("Ran {} commands from {} ({failed} failed)", responses.len(), args.script);

    let report = serde_json::to_string_pretty(&responses).map_err(|e| e.to_string())?;
    println!("{report}");

    if let Some(out) = &args.out {
        let mesh = harness.last_mesh().ok_or("Script did not commit a mesh")?;
        let problems = harness.validate_committed();
        if !problems.is_empty() {
            tracing::warn!("Committed mesh has problems: {problems:?}");
        }
        let json = serde_json::to_string_pretty(mesh).map_err(|e| e.to_string())?;
        std::fs::write(out, json).map_err(|e| format!("Failed to write {out}: {e}"))?;
        tracing::info!("Wrote mesh to {out} ({} vertices, {} faces)", mesh.vertex_count(), mesh.face_count());
    }
    Ok(())
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut script = None;
    let mut out = None;
    let mut settings = None;
    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match args[i].as_str() {
            "--script" => script = value,
            "--out" => out = value,
            "--settings" => settings = value,
            other => {
                tracing::warn!("Ignoring unknown argument {other}");
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    Some(Args {
        script: script?,
        out,
        settings,
    })
}
