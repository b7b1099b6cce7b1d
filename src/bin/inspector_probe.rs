use anyhow::{Context, Result};
use egui::{pos2, vec2, Rect};
use kestrel_inspector::cli::ProbeArgs;
use kestrel_inspector::{
    DocumentTarget, GenericInspector, HandlerRegistry, InspectorConfig, InspectorStats, OptimizedBlockState,
};
use serde::Serialize;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Serialize)]
struct FrameReport {
    frame: u32,
    query: Option<f32>,
    state: OptimizedBlockState,
    last_height: Option<f32>,
    changed: bool,
}

#[derive(Debug, Serialize)]
struct ProbeSummary {
    document: String,
    type_name: String,
    targets: usize,
    frames: Vec<FrameReport>,
    stats: InspectorStats,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

/// `KESTREL_INSPECTOR_LOG` > `RUST_LOG` > warn.
fn init_tracing() {
    let filter = std::env::var("KESTREL_INSPECTOR_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true).init();
}

fn run() -> Result<()> {
    let args = ProbeArgs::parse_from_env()?;
    let mut config = match &args.config {
        Some(path) => InspectorConfig::load(path)?,
        None => InspectorConfig::default(),
    };
    let overrides = args.config_overrides();
    if !overrides.is_empty() {
        tracing::info!(fields = ?overrides.applied_fields(), "applying command line overrides");
        config.apply_overrides(&overrides);
    }
    let document = DocumentTarget::load(&args.document)?;
    let type_name = document.info.type_name.clone();
    let mut targets = vec![document; args.targets];
    let handlers = HandlerRegistry::with_builtin();
    let mut inspector = GenericInspector::new(config);

    let ctx = egui::Context::default();
    ctx.options_mut(|options| options.max_passes = std::num::NonZeroUsize::MIN);
    let screen = Rect::from_min_size(pos2(0.0, 0.0), vec2(args.width, args.viewport_height));
    let mut frames = Vec::with_capacity(args.frames as usize);
    for frame in 0..args.frames {
        let input = egui::RawInput { screen_rect: Some(screen), ..Default::default() };
        let mut report = FrameReport { frame, ..Default::default() };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let query = inspector.query_optimized_layout(&targets, &handlers, false, true);
                report.query = query;
                report.changed = match query {
                    Some(height) => {
                        let content = Rect::from_min_size(pos2(0.0, -args.scroll), vec2(args.width, height));
                        inspector.on_optimized_inspector_gui(ui, &mut targets, &handlers, content, screen)
                    }
                    None => inspector.on_inspector_gui(ui, &mut targets, &handlers),
                };
            });
        });
        report.state = inspector.optimized_block_state();
        report.last_height = inspector.last_height();
        frames.push(report);
    }

    let summary = ProbeSummary {
        document: args.document.display().to_string(),
        type_name,
        targets: targets.len(),
        frames,
        stats: inspector.stats(),
    };
    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize probe summary")?;
    println!("{json}");
    Ok(())
}
