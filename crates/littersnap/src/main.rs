//! `litsnap` - CLI for littersnap
//!
//! This binary provides the command-line interface for filing littered-area
//! complaints and tracking their resolution.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;

use littersnap::camera::{CameraDevice, CameraError, SpoolCameraDevice, StreamOptions};
use littersnap::cli::{
    Cli, Command, ConfigCommand, DeleteCommand, ExportCommand, ImportCommand, ListCommand,
    MapCommand, OutputFormat, ShowCommand, StatusCommand, SubmitCommand,
};
use littersnap::location::{EnvLocationProvider, FixedLocationProvider, LocationProvider};
use littersnap::{
    dashboard, init_logging, legacy, mapembed, submit, Complaint, Config, Error, Photo, PhotoTray,
    Position, Repository, Status,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    if let Err(e) = run(cli).await {
        // User-actionable notices print bare; everything else with context.
        match e.downcast_ref::<Error>() {
            Some(err) if err.is_user_notice() => eprintln!("{err}"),
            _ => eprintln!("error: {e:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Submit(cmd) => handle_submit(&config, &cmd).await,
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Dashboard(cmd) => handle_dashboard(&config, cmd.json),
        Command::Status(cmd) => handle_status(&config, &cmd),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::Show(cmd) => handle_show(&config, &cmd),
        Command::Map(cmd) => handle_map(&config, &cmd),
        Command::Import(cmd) => handle_import(&config, &cmd),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_submit(config: &Config, cmd: &SubmitCommand) -> anyhow::Result<()> {
    let mut tray = PhotoTray::from_config(&config.camera);

    for path in &cmd.photos {
        let photo = Photo::from_file(path)?;
        if tray.add(photo)? {
            println!("Attached {}", path.display());
        } else {
            println!("Skipped duplicate {}", path.display());
        }
    }

    if cmd.from_camera {
        capture_from_camera(config, cmd, &mut tray).await?;
    }

    let position = resolve_position(config, cmd);

    let mut repo = Repository::open(config.database_path())?;
    let complaint = submit::submit(&mut repo, tray, position, cmd.description.clone())?;

    println!(
        "Filed complaint {} with {} photo(s) at {}.",
        complaint.id,
        complaint.image_count(),
        mapembed::format_position(complaint.latitude, complaint.longitude)
    );
    Ok(())
}

/// Resolve the report position: CLI flags, then the configured default,
/// then the environment. A failure is surfaced once and leaves the report
/// without coordinates, which blocks submission.
fn resolve_position(config: &Config, cmd: &SubmitCommand) -> Option<Position> {
    let resolved = if let (Some(lat), Some(lon)) = (cmd.lat, cmd.lon) {
        FixedLocationProvider::new(lat, lon).and_then(|p| p.current_position())
    } else if let Some(position) = config.default_position() {
        Ok(position)
    } else {
        EnvLocationProvider::new().current_position()
    };

    match resolved {
        Ok(position) => Some(position),
        Err(e) => {
            eprintln!("{}", Error::from(e));
            None
        }
    }
}

/// Run a camera session and accumulate snapped photos into the tray.
async fn capture_from_camera(
    config: &Config,
    cmd: &SubmitCommand,
    tray: &mut PhotoTray,
) -> anyhow::Result<()> {
    let device = SpoolCameraDevice::from_config(config);
    let mut session = device.acquire().await.map_err(Error::from)?;

    if cmd.torch {
        match session.set_torch(true) {
            Ok(()) => println!("Torch on."),
            Err(CameraError::TorchUnsupported) => {
                eprintln!("{}", Error::from(CameraError::TorchUnsupported));
            }
            Err(e) => {
                let _ = session.release().await;
                return Err(Error::from(e).into());
            }
        }
    }

    let captured = if let Some(secs) = cmd.watch_secs {
        let opts = StreamOptions {
            max_shots: cmd.shots,
            window: Duration::from_secs(secs),
        };
        println!(
            "Watching the camera for up to {secs}s (max {} shots)...",
            cmd.shots
        );
        let (tx, mut rx) = mpsc::channel(8);
        let (streamed, added) = tokio::join!(session.stream(tx, opts), async {
            let mut added = 0usize;
            while let Some(photo) = rx.recv().await {
                match tray.add(photo) {
                    Ok(true) => added += 1,
                    Ok(false) => {}
                    Err(e @ Error::TrayFull { .. }) => {
                        eprintln!("{e}");
                        break;
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            added
        });
        let result = streamed.map_err(Error::from);
        let _ = session.release().await;
        result?;
        added
    } else {
        let mut added = 0usize;
        let mut capture_error = None;
        for _ in 0..cmd.shots {
            match session.snap().await {
                Ok(Some(photo)) => match tray.add(photo) {
                    Ok(true) => added += 1,
                    Ok(false) => {}
                    Err(e @ Error::TrayFull { .. }) => {
                        eprintln!("{e}");
                        break;
                    }
                    Err(e) => eprintln!("{e}"),
                },
                Ok(None) => {
                    eprintln!("no new frame in the camera spool");
                    break;
                }
                Err(e) => {
                    capture_error = Some(Error::from(e));
                    break;
                }
            }
        }
        let _ = session.release().await;
        if let Some(e) = capture_error {
            return Err(e.into());
        }
        added
    };

    println!("Captured {captured} photo(s) from the camera.");
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let repo = Repository::open(config.database_path())?;
    let complaints = match cmd.status {
        Some(status) => repo.list_by_status(status.into(), cmd.limit)?,
        None => repo.list(cmd.limit)?,
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&complaints)?),
        OutputFormat::Table => print!("{}", dashboard::render_table(&complaints)),
        OutputFormat::Plain => print!("{}", dashboard::render_lines(&complaints)),
    }
    Ok(())
}

fn handle_dashboard(config: &Config, json: bool) -> anyhow::Result<()> {
    let repo = Repository::open(config.database_path())?;
    let counts = repo.status_counts()?;
    let recent = repo.list(5)?;

    if json {
        let payload = serde_json::json!({
            "counts": counts,
            "total": counts.total(),
            "recent": recent,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("litsnap dashboard");
        println!("-----------------");
        print!("{}", dashboard::render_summary(&counts));
        if !recent.is_empty() {
            println!();
            println!("Recent complaints:");
            print!("{}", dashboard::render_table(&recent));
        }
    }
    Ok(())
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let mut repo = Repository::open(config.database_path())?;
    let status: Status = cmd.status.into();

    if !repo.update_status(&cmd.id, status)? {
        return Err(Error::ComplaintNotFound {
            id: cmd.id.clone(),
        }
        .into());
    }

    println!("Complaint {} is now {}.", cmd.id, status.label());
    print!("{}", dashboard::render_summary(&repo.status_counts()?));
    Ok(())
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This permanently deletes complaint {}.", cmd.id);
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let mut repo = Repository::open(config.database_path())?;
    if !repo.delete(&cmd.id)? {
        return Err(Error::ComplaintNotFound {
            id: cmd.id.clone(),
        }
        .into());
    }

    println!("Deleted complaint {}.", cmd.id);
    print!("{}", dashboard::render_summary(&repo.status_counts()?));
    Ok(())
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let repo = Repository::open(config.database_path())?;
    let complaint = fetch(&repo, &cmd.id)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&complaint)?);
    } else {
        print!("{}", dashboard::render_detail(&complaint));
    }

    if let Some(dir) = &cmd.export_dir {
        std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;
        for (index, photo) in complaint.images.iter().enumerate() {
            let path = dir.join(format!("{}-{index}.{}", complaint.id, photo.extension()));
            std::fs::write(&path, photo.decode()?)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn handle_map(config: &Config, cmd: &MapCommand) -> anyhow::Result<()> {
    let repo = Repository::open(config.database_path())?;
    let complaint = fetch(&repo, &cmd.id)?;

    println!(
        "Complaint {} at {}",
        complaint.id,
        mapembed::format_position(complaint.latitude, complaint.longitude)
    );
    println!(
        "OpenStreetMap: {}",
        mapembed::osm_url(complaint.latitude, complaint.longitude)
    );
    println!(
        "Google Maps:   {}",
        mapembed::gmaps_url(complaint.latitude, complaint.longitude)
    );
    Ok(())
}

fn handle_import(config: &Config, cmd: &ImportCommand) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("reading {}", cmd.file.display()))?;

    let mut repo = Repository::open(config.database_path())?;
    let summary = legacy::import_dump(&mut repo, &json)?;

    println!(
        "Imported {} complaint(s); skipped {} already present, {} invalid.",
        summary.imported, summary.skipped_existing, summary.skipped_invalid
    );
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let repo = Repository::open(config.database_path())?;
    let json = legacy::export_dump(&repo)?;

    match &cmd.file {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {} complaint(s) to {}.", repo.count()?, path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!();
                println!("[Camera]");
                println!("  Spool dir:       {}", config.spool_dir().display());
                println!("  Poll interval:   {}ms", config.camera.poll_interval_ms);
                println!("  Torch available: {}", config.camera.torch_available);
                println!("  Photo bytes:     {}..{}", config.camera.min_photo_bytes, config.camera.max_photo_bytes);
                println!("  Max photos:      {}", config.camera.max_photos);
                println!();
                println!("[Location]");
                match config.default_position() {
                    Some(position) => println!(
                        "  Default:         {}",
                        mapembed::format_position(position.latitude, position.longitude)
                    ),
                    None => println!("  Default:         (not set)"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Load one complaint or fail with a not-found error.
fn fetch(repo: &Repository, id: &str) -> Result<Complaint, Error> {
    repo.get(id)?.ok_or_else(|| Error::ComplaintNotFound {
        id: id.to_string(),
    })
}
