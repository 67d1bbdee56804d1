//! Subcommand handlers. Each writes its documents to `out`; logs go to stderr.

use crate::args::Command;
use crate::config::CliConfig;
use anyhow::{Context, Result};
use dtwin::graph::to_basic_twin;
use dtwin::{Interface, ModelRegistry, TwinDescriptor, TwinSerializer};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn execute(command: &Command, config: &CliConfig, out: &mut impl Write) -> Result<()> {
    let registry = dtwin_models::registry().context("Failed to build the model registry")?;
    let serializer = TwinSerializer::with_config(Arc::new(registry), config.engine.clone());

    match command {
        Command::Models { out: dir } => match dir.as_ref().or(config.output.as_ref()) {
            Some(dir) => export_models(&serializer, dir, out),
            None => print_models(&serializer, out),
        },
        Command::List => list_models(serializer.registry(), out),
        Command::Convert { file } => convert(&serializer, file, out),
        Command::Contents { file } => contents(&serializer, file, out),
    }
}

fn export_models(serializer: &TwinSerializer, dir: &Path, out: &mut impl Write) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    for descriptor in serializer.registry().all() {
        let path = dir.join(format!("{}.json", descriptor.type_name));
        let document = serializer
            .serialize_model(descriptor)
            .with_context(|| format!("Failed to render {}", descriptor.full_model_id()))?;
        fs::write(&path, document).with_context(|| format!("Failed to write {}", path.display()))?;
        writeln!(out, "{}", path.display())?;
    }

    info!(count = serializer.registry().len(), dir = %dir.display(), "model documents exported");
    Ok(())
}

fn print_models(serializer: &TwinSerializer, out: &mut impl Write) -> Result<()> {
    let interfaces = serializer
        .registry()
        .all()
        .map(Interface::from_descriptor)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to render model documents")?;
    render(serializer, &interfaces, out)
}

fn list_models(registry: &ModelRegistry, out: &mut impl Write) -> Result<()> {
    for descriptor in registry.all() {
        writeln!(out, "{}", listing(registry, descriptor))?;
    }
    Ok(())
}

fn listing(registry: &ModelRegistry, descriptor: &'static TwinDescriptor) -> String {
    format!(
        "{}\t{}\tderived={}\trelated={}",
        descriptor.full_model_id(),
        descriptor.type_name,
        registry.derived_types(descriptor).len(),
        registry.related_types(descriptor).len(),
    )
}

fn convert(serializer: &TwinSerializer, file: &Path, out: &mut impl Write) -> Result<()> {
    let twin = read_twin(serializer, file)?;
    let document = serializer.serialize(&*twin).context("Failed to serialize twin")?;
    writeln!(out, "{document}")?;
    Ok(())
}

fn contents(serializer: &TwinSerializer, file: &Path, out: &mut impl Write) -> Result<()> {
    let twin = read_twin(serializer, file)?;
    let basic = to_basic_twin(&*twin).context("Failed to collect twin contents")?;
    render(serializer, &basic, out)
}

fn read_twin(serializer: &TwinSerializer, file: &Path) -> Result<Box<dyn dtwin::DynTwin>> {
    let text = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    serializer.deserialize_any(&text).with_context(|| format!("Failed to read a twin from {}", file.display()))
}

fn render<S: Serialize>(serializer: &TwinSerializer, document: &S, out: &mut impl Write) -> Result<()> {
    if serializer.config().pretty {
        serde_json::to_writer_pretty(&mut *out, document)?;
    } else {
        serde_json::to_writer(&mut *out, document)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn run(command: Command, config: &CliConfig) -> String {
        let mut out = Vec::new();
        execute(&command, config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn list_reports_inheritance_counts() {
        let output = run(Command::List, &CliConfig::default());
        let asset = output.lines().find(|line| line.contains("Asset")).unwrap();

        assert_eq!(output.lines().count(), 8);
        assert!(asset.starts_with("dtmi:dtwin:equipment:Asset;1\tAsset\tderived=2"));
    }

    #[test]
    fn printed_models_form_one_array() {
        let output = run(Command::Models { out: None }, &CliConfig::default());
        let documents: Value = serde_json::from_str(&output).unwrap();

        let ids: Vec<&str> =
            documents.as_array().unwrap().iter().filter_map(|d| d["@id"].as_str()).collect();
        assert_eq!(ids.len(), 8);
        assert!(ids.contains(&"dtmi:dtwin:equipment:Pump;2"));
    }

    #[test]
    fn configured_output_directory_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig { output: Some(dir.path().to_path_buf()), ..CliConfig::default() };

        let output = run(Command::Models { out: None }, &config);
        assert_eq!(output.lines().count(), 8);
        assert!(dir.path().join("Thermostat.json").is_file());
    }
}
