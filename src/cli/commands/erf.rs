//! CLI interface for ERF archives
use std::path::{Path, PathBuf};

use crate::formats::common::ResourceType;
use crate::formats::erf::{ErfFileType, ErfReader, ErfResource, ErfWriter};

pub fn list(archive: &Path) -> anyhow::Result<()> {
    let reader = ErfReader::open(archive)?;
    println!("{:?} ({:?})", archive, reader.file_type());

    let entries = reader.entries();
    for entry in &entries {
        let ext = ResourceType::from_type_id(entry.type_id)
            .map_or("?", ResourceType::extension);
        println!("  {}.{}  {} bytes", entry.res_ref, ext, entry.size);
    }
    println!("{} resources", entries.len());
    Ok(())
}

pub fn extract(archive: &Path, resource: &str, destination: Option<&Path>) -> anyhow::Result<()> {
    let (res_ref, res_type) = split_resource_name(resource)?;
    let reader = ErfReader::open(archive)?;
    let data = reader.get(res_ref, res_type)?;

    let dest = destination.map_or_else(|| PathBuf::from(resource), Path::to_path_buf);
    std::fs::write(&dest, data)?;
    println!("Extracted {} to {:?} ({} bytes)", resource, dest, data.len());
    Ok(())
}

pub fn create(output: &Path, inputs: &[PathBuf]) -> anyhow::Result<()> {
    let file_type = match output.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("mod") => ErfFileType::Mod,
        _ => ErfFileType::Erf,
    };

    let mut writer = ErfWriter::new();
    for input in inputs {
        let name = input
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("Bad input file name: {:?}", input))?;
        let (res_ref, res_type) = split_resource_name(name)?;
        writer.add(ErfResource::new(res_ref, res_type, std::fs::read(input)?));
    }

    writer.save(file_type, output)?;
    println!("Created {:?} with {} resources", output, inputs.len());
    Ok(())
}

/// Split "name.ext" into a resref and its resource type.
fn split_resource_name(name: &str) -> anyhow::Result<(&str, ResourceType)> {
    let (res_ref, ext) = name
        .rsplit_once('.')
        .ok_or_else(|| anyhow::anyhow!("Resource name needs an extension: {}", name))?;
    let res_type = ResourceType::from_extension(ext)
        .ok_or_else(|| anyhow::anyhow!("Unknown resource extension: {}", ext))?;
    Ok((res_ref, res_type))
}
