//! Subcommand implementations

use anyhow::{Context, Result, bail};
use objmap_core::json::{from_json, to_json};
use objmap_core::{MapConfig, MapProfile, Mapper, NullHandling, match_field, similarity};
use objmap_ir::{FieldType, to_pretty_string};
use objmap_schema::{SchemaLoader, TypeRegistry};
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

/// Exit status when `--strict` finds skipped fields
const EXIT_INCOMPLETE: u8 = 2;

pub struct MapArgs<'a> {
    pub types: &'a [std::path::PathBuf],
    pub input: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub profile: Option<&'a Path>,
    pub null_handling: Option<&'a str>,
    pub output: Option<&'a Path>,
    pub pretty: bool,
    pub diagnostics: bool,
    pub strict: bool,
}

fn load_registry(files: &[std::path::PathBuf]) -> Result<TypeRegistry> {
    let registry = TypeRegistry::new();
    let loader = SchemaLoader::new(&registry);
    for file in files {
        loader
            .load_from_file(file)
            .with_context(|| format!("Failed to load types from {}", file.display()))?;
    }
    Ok(registry)
}

fn parse_type(expr: &str) -> Result<FieldType> {
    expr.parse()
        .map_err(|e| anyhow::anyhow!("Invalid type expression '{expr}': {e}"))
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

/// Config from the profile, if any, with the CLI override applied
///
/// Null fields are tolerated unless the profile or the override says otherwise.
fn build_config(profile: Option<&Path>, null_handling: Option<&str>) -> Result<MapConfig> {
    let mut profile = match profile {
        Some(path) => MapProfile::from_file(path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => MapProfile::default(),
    };
    if let Some(policy) = null_handling {
        let policy: NullHandling = policy.parse().map_err(anyhow::Error::msg)?;
        profile.null_handling = Some(policy);
    }
    if profile.null_handling.is_none() {
        profile.null_handling = Some(NullHandling::PropagateNull);
    }
    debug!("Mapping profile: {:?}", profile);
    Ok(MapConfig::from_profile(&profile))
}

pub fn map(args: &MapArgs<'_>) -> Result<ExitCode> {
    let registry = load_registry(args.types)?;
    let source_type = parse_type(args.from)?;
    let target_type = parse_type(args.to)?;
    let config = build_config(args.profile, args.null_handling)?;

    let text = read_input(args.input)?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", args.input))?;
    let source = from_json(&json, &source_type, &registry)
        .with_context(|| format!("Failed to read input as {source_type}"))?;

    info!("Mapping {} -> {}", source_type, target_type);
    let outcome = Mapper::new(&registry)
        .map_with_diagnostics(&source, target_type, &config)
        .context("Mapping failed")?;

    let rendered = if args.pretty {
        to_pretty_string(&outcome.value)
    } else {
        serde_json::to_string_pretty(&to_json(&outcome.value)?)?
    };
    match args.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    if args.diagnostics {
        for skipped in &outcome.diagnostics {
            eprintln!("skipped {skipped}");
        }
    }
    if args.strict && !outcome.is_complete() {
        eprintln!("{} field(s) were not mapped", outcome.diagnostics.len());
        return Ok(ExitCode::from(EXIT_INCOMPLETE));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn types(files: &[std::path::PathBuf]) -> Result<ExitCode> {
    let registry = load_registry(files)?;
    let mut out = String::new();
    for name in registry.type_names() {
        let descriptor = registry.descriptor(&name)?;
        let mut header = name.clone();
        if descriptor.unmappable {
            header.push_str(" (unmappable)");
        }
        if let Some(kind) = descriptor.handle {
            let _ = write!(header, " ({kind})");
        }
        let _ = writeln!(out, "{header}");

        for field in &descriptor.fields {
            let mut line = format!("  {}: {}", field.name, field.field_type);
            if let Some(default) = &field.default {
                let _ = write!(line, " = {default}");
            }
            if let Some(target) = field.rename_target() {
                let _ = write!(line, " [rename {target}]");
            }
            if let Some(converter) = field.converter_name() {
                let _ = write!(line, " [converter {converter}]");
            }
            if !field.settable {
                line.push_str(" [read-only]");
            }
            if field.no_map {
                line.push_str(" [no-map]");
            }
            let _ = writeln!(out, "{line}");
        }
    }
    print!("{out}");
    Ok(ExitCode::SUCCESS)
}

pub fn match_types(files: &[std::path::PathBuf], from: &str, to: &str, floor: Option<f64>) -> Result<ExitCode> {
    let registry = load_registry(files)?;
    let source_fields = registry
        .fields_of(from)
        .with_context(|| format!("Cannot match from '{from}'"))?;
    let dest_fields = registry
        .fields_of(to)
        .with_context(|| format!("Cannot match to '{to}'"))?;
    if dest_fields.is_empty() {
        bail!("'{to}' has no mappable fields");
    }

    let mut config = MapConfig::new();
    if let Some(floor) = floor {
        config = config.with_similarity_floor(floor);
    }
    let floor = config.similarity_floor();

    for field in source_fields.iter() {
        let Some(index) = match_field(field, &dest_fields, floor) else {
            println!("{} -> (none)", field.name);
            continue;
        };
        let dest = &dest_fields[index];
        let wanted = field.rename_target().unwrap_or(&field.name);
        let how = if dest.name == field.name {
            "exact".to_string()
        } else if dest.name == wanted || dest.rename_target() == Some(field.name.as_str()) {
            "rename".to_string()
        } else {
            format!("{:.3}", similarity(wanted, &dest.name))
        };
        println!("{} -> {} ({how})", field.name, dest.name);
    }
    Ok(ExitCode::SUCCESS)
}
