use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use namespot::cli::{CliArgs, Command};
use namespot::monitor;
use namespot::pipeline::{DetectionPipeline, PipelineSettings};
use namespot::settings::{EffectiveSettings, FileConfig};
use namespot::store::ResultStore;
use namespot_camera::{Backend, Configuration};
use namespot_ocr::TextRecognizer;
use namespot_types::DetectionResult;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(args.command, Command::ListBackends) {
        for backend in Configuration::available_backends() {
            println!("{backend}");
        }
        return Ok(());
    }

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::load_default()?,
    };
    let settings = EffectiveSettings::merge(file, &args)?;

    let mut camera = Configuration::from_env()?;
    if let Some(backend) = &settings.backend {
        camera.backend = Backend::from_str(backend)?;
    }
    if let Some(device) = &settings.device {
        camera.device = Some(device.clone());
    }
    if let Some(dir) = &settings.still_dir {
        camera.still_dir = Some(dir.clone());
    }

    let mut source = camera.create_source()?;
    source.configure(camera.resolution, &camera.controls)?;

    let recognizer = build_recognizer(&settings);
    let store = ResultStore::new(&settings.output_dir)?;
    let pipeline_settings = PipelineSettings {
        min_confidence: settings.min_confidence,
        closing_radius: settings.closing_radius,
        settle_delay: settings.settle_delay,
    };

    log::info!(
        "backend={} recognizer={} output={}",
        camera.backend,
        recognizer.name(),
        settings.output_dir.display()
    );
    let mut pipeline = DetectionPipeline::new(source, recognizer, store, pipeline_settings)?;

    match args.command {
        Command::Capture { annotate } => {
            let result = pipeline.capture_and_detect(annotate)?;
            report_detection(&result);
        }
        Command::Monitor { interval, count } => {
            let interval = std::time::Duration::from_secs_f64(interval);
            let cancel = CancellationToken::new();
            let signal_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("interrupt received, stopping after current cycle");
                    signal_cancel.cancel();
                }
            });
            let summary = monitor::run(&mut pipeline, interval, count, cancel).await?;
            println!(
                "{} capture(s), {} with names",
                summary.captures, summary.detections
            );
        }
        Command::ListBackends => unreachable!("handled before pipeline startup"),
    }
    Ok(())
}

fn build_recognizer(settings: &EffectiveSettings) -> Arc<dyn TextRecognizer> {
    #[cfg(feature = "engine-tesseract")]
    {
        Arc::new(namespot_ocr::TesseractRecognizer::new().with_language(settings.language.clone()))
    }
    #[cfg(not(feature = "engine-tesseract"))]
    {
        let _ = settings;
        Arc::new(namespot_ocr::NoopRecognizer)
    }
}

fn report_detection(result: &DetectionResult) {
    if result.names.is_empty() {
        println!("No names detected.");
    } else {
        println!("Detected {} name(s):", result.names.len());
        for (index, name) in result.names.iter().enumerate() {
            println!("  {}. {name}", index + 1);
        }
    }
    println!("Original frame: {}", result.original_path.display());
    if let Some(annotated) = &result.annotated_path {
        println!("Annotated frame: {}", annotated.display());
    }
}
