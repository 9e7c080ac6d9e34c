//! Polygon Annotator command-line front end.
//!
//! ```bash
//! # Replay a recorded session and write SVG, PNG, COCO and native JSON
//! polygon-cli replay session.json --out-dir exports
//!
//! # Re-export a saved scene as a ZIP bundle
//! polygon-cli convert canvas_export.polygon.json --format bundle
//!
//! # List formats, write or print the configuration
//! polygon-cli formats
//! polygon-cli config init
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::main();
}

// WASM doesn't use main(), the editor is driven through wasm_bindgen
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process;

    use clap::{Parser, Subcommand};
    use thiserror::Error;

    use polygon_annotator::config::{AppConfig, ConfigError};
    use polygon_annotator::format::{
        ExportOptions, FormatError, FormatRegistry, SceneSnapshot, WarningSeverity,
    };
    use polygon_annotator::model::ObjectShape;
    use polygon_annotator::script::{Script, ScriptError};

    /// Formats written by `replay` when none are requested.
    const DEFAULT_FORMATS: [&str; 4] = ["svg", "png", "coco", "json"];

    /// Polygon Annotator - replay annotation sessions and export scenes
    #[derive(Parser, Debug)]
    #[command(name = "polygon-cli")]
    #[command(version)]
    #[command(about = "Replay annotation sessions and export canvas scenes", long_about = None)]
    struct Args {
        /// Configuration file (defaults to the user config directory)
        #[arg(long, global = true, value_name = "FILE")]
        config: Option<PathBuf>,

        /// More verbose logging (repeat for trace)
        #[arg(short, long, global = true, action = clap::ArgAction::Count)]
        verbose: u8,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Replay an event script and write the resulting exports
        Replay {
            #[arg(value_name = "SCRIPT")]
            script: PathBuf,

            /// Output directory (defaults to the configured export folder)
            #[arg(short, long)]
            out_dir: Option<PathBuf>,

            /// Format ids to write (repeatable)
            #[arg(short, long = "format", value_name = "ID")]
            formats: Vec<String>,

            #[command(flatten)]
            export: ExportArgs,
        },
        /// Re-export a saved native JSON scene
        Convert {
            #[arg(value_name = "SCENE")]
            scene: PathBuf,

            /// Format id to write
            #[arg(short, long, value_name = "ID")]
            format: String,

            /// Output file (defaults to the format's file name in the export folder)
            #[arg(short, long)]
            out: Option<PathBuf>,

            #[command(flatten)]
            export: ExportArgs,
        },
        /// List the registered export formats
        Formats,
        /// Manage the configuration file
        Config {
            #[command(subcommand)]
            action: ConfigAction,
        },
    }

    #[derive(clap::Args, Debug)]
    struct ExportArgs {
        /// Leave the background image out of the exports
        #[arg(long)]
        no_background: bool,

        /// Do not paint the background color in PNG exports
        #[arg(long)]
        transparent: bool,
    }

    impl ExportArgs {
        fn options(&self) -> ExportOptions {
            ExportOptions::new()
                .include_background(!self.no_background)
                .png_background(!self.transparent)
        }
    }

    #[derive(Subcommand, Debug)]
    enum ConfigAction {
        /// Write a default configuration file
        Init {
            /// Overwrite an existing file
            #[arg(long)]
            force: bool,
        },
        /// Print the effective configuration
        Show,
    }

    #[derive(Debug, Error)]
    enum CliError {
        #[error(transparent)]
        Config(#[from] ConfigError),

        #[error(transparent)]
        Script(#[from] ScriptError),

        #[error(transparent)]
        Format(#[from] FormatError),

        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),

        #[error("{0} already exists (use --force to overwrite)")]
        ConfigExists(PathBuf),
    }

    pub fn main() {
        let args = Args::parse();

        let config = match load_config(args.config.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };

        let mut level = config.preferences.log_level;
        for _ in 0..args.verbose {
            level = level.more_verbose();
        }
        init_logging(level.to_level_filter());

        if let Err(e) = run(&args, &config) {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    fn init_logging(level: log::LevelFilter) {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp(None)
            .format_module_path(false)
            .init();
    }

    fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
        match path {
            Some(path) => Ok(AppConfig::load_if_exists(path)?.unwrap_or_default()),
            None => match AppConfig::load_from_default_path() {
                Ok(config) => Ok(config.unwrap_or_default()),
                // Logging is configured from this file, so report on stderr
                Err(e) => {
                    eprintln!("Warning: ignoring default configuration: {}", e);
                    Ok(AppConfig::default())
                }
            },
        }
    }

    fn run(args: &Args, config: &AppConfig) -> Result<(), CliError> {
        match &args.command {
            Command::Replay {
                script,
                out_dir,
                formats,
                export,
            } => replay(config, script, out_dir.as_deref(), formats, &export.options()),
            Command::Convert {
                scene,
                format,
                out,
                export,
            } => convert(config, scene, format, out.as_deref(), &export.options()),
            Command::Formats => {
                list_formats();
                Ok(())
            }
            Command::Config { action } => config_command(args.config.as_deref(), config, action),
        }
    }

    fn replay(
        config: &AppConfig,
        script_path: &Path,
        out_dir: Option<&Path>,
        formats: &[String],
        options: &ExportOptions,
    ) -> Result<(), CliError> {
        let script = Script::load(script_path)?;
        let base_dir = script_path.parent().unwrap_or(Path::new("."));

        let mut editor = script.build_editor(config, base_dir)?;
        let report = script.replay(&mut editor, base_dir)?;
        println!(
            "Replayed {} actions ({} ignored): {} objects",
            report.applied + report.ignored,
            report.ignored,
            editor.objects().len()
        );

        let out_dir = export_dir(config, out_dir);
        std::fs::create_dir_all(&out_dir)?;

        let registry = FormatRegistry::new();
        let ids: Vec<&str> = if formats.is_empty() {
            DEFAULT_FORMATS.to_vec()
        } else {
            formats.iter().map(String::as_str).collect()
        };

        let scene = editor.snapshot();
        for id in ids {
            let format = registry.require(id)?;
            let path = out_dir.join(format.default_filename());
            write_export(&registry, id, &scene, &path, options)?;
        }
        Ok(())
    }

    fn convert(
        config: &AppConfig,
        scene_path: &Path,
        format_id: &str,
        out: Option<&Path>,
        options: &ExportOptions,
    ) -> Result<(), CliError> {
        let registry = FormatRegistry::new();
        let format = registry.require(format_id)?;

        let bytes = std::fs::read(scene_path)?;
        let mut scene = registry.require("json")?.import(&bytes)?;
        load_images(&mut scene, scene_path.parent().unwrap_or(Path::new(".")));

        let path = match out {
            Some(path) => path.to_path_buf(),
            None => {
                let dir = export_dir(config, None);
                std::fs::create_dir_all(&dir)?;
                dir.join(format.default_filename())
            }
        };
        write_export(&registry, format_id, &scene, &path, options)
    }

    /// Decode the background and placed images of a loaded scene so raster
    /// exports can draw them. Failures leave the layer unloaded.
    fn load_images(scene: &mut SceneSnapshot, base_dir: &Path) {
        let layers = scene
            .background
            .iter_mut()
            .chain(scene.objects.iter_mut().filter_map(|o| match &mut o.shape {
                ObjectShape::Image { layer, .. } => Some(layer),
                _ => None,
            }));

        for layer in layers {
            if Path::new(&layer.source).is_relative() {
                layer.source = base_dir.join(&layer.source).display().to_string();
            }
            if let Err(e) = layer.ensure_loaded() {
                log::warn!("Could not load image {}: {}", layer.source, e);
            }
        }
    }

    fn write_export(
        registry: &FormatRegistry,
        id: &str,
        scene: &SceneSnapshot,
        path: &Path,
        options: &ExportOptions,
    ) -> Result<(), CliError> {
        let format = registry.require(id)?;
        let result = format.export(scene, path, options)?;

        for warning in &result.warnings {
            let object = warning.object_id.as_deref().unwrap_or("-");
            match warning.severity {
                WarningSeverity::Info => log::info!("{} [{}]: {}", id, object, warning.message),
                WarningSeverity::Warning | WarningSeverity::Error => {
                    log::warn!("{} [{}]: {}", id, object, warning.message)
                }
            }
        }
        println!(
            "Wrote {} ({} objects) to {}",
            format.display_name(),
            result.objects_exported,
            path.display()
        );
        Ok(())
    }

    fn export_dir(config: &AppConfig, out_dir: Option<&Path>) -> PathBuf {
        match out_dir {
            Some(dir) => dir.to_path_buf(),
            None if !config.preferences.export_folder.is_empty() => {
                PathBuf::from(&config.preferences.export_folder)
            }
            None => PathBuf::from("."),
        }
    }

    fn list_formats() {
        let registry = FormatRegistry::new();
        for format in registry.all() {
            println!(
                "{:<8} {:<14} .{:<5} {}{}",
                format.id(),
                format.display_name(),
                format.extension(),
                format.default_filename(),
                if format.supports_import() {
                    " (importable)"
                } else {
                    ""
                }
            );
        }
    }

    fn config_command(
        path: Option<&Path>,
        config: &AppConfig,
        action: &ConfigAction,
    ) -> Result<(), CliError> {
        match action {
            ConfigAction::Init { force } => {
                let path = match path {
                    Some(path) => path.to_path_buf(),
                    None => AppConfig::default_path().ok_or(ConfigError::NoConfigDir)?,
                };
                if path.exists() && !force {
                    return Err(CliError::ConfigExists(path));
                }
                AppConfig::default().save(&path)?;
                println!("Wrote configuration to {}", path.display());
            }
            ConfigAction::Show => {
                println!("{}", config.to_json().map_err(ConfigError::from)?);
            }
        }
        Ok(())
    }
}
