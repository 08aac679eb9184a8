//! CLI interface for format conversion
use std::path::Path;

use crate::converter;
use crate::formats::common::ResourceType;

pub fn execute(source: &Path, destination: &Path) -> anyhow::Result<()> {
    println!("Converting {:?} to {:?}", source, destination);

    let input = extension_of(source, "source")?;
    let output = extension_of(destination, "destination")?;

    let is_gff = |ext: &str| {
        ResourceType::from_extension(ext).is_some_and(|ty| ty.gff_signature().is_some())
    };

    match (input.as_str(), output.as_str()) {
        ("2da", "json") => {
            println!("Converting 2DA -> JSON");
            converter::convert_twoda_to_json(source, destination)?;
        }
        ("json", "2da") => {
            println!("Converting JSON -> 2DA");
            converter::convert_json_to_twoda(source, destination)?;
        }
        (gff, "json") if is_gff(gff) => {
            println!("Converting GFF -> JSON");
            converter::convert_gff_to_json(source, destination)?;
        }
        ("json", gff) if is_gff(gff) => {
            println!("Converting JSON -> GFF");
            converter::convert_json_to_gff(source, destination)?;
        }
        (gff, "xml") if is_gff(gff) => {
            println!("Converting GFF -> XML");
            converter::convert_gff_to_xml(source, destination)?;
        }
        ("xml", gff) if is_gff(gff) => {
            println!("Converting XML -> GFF");
            converter::convert_xml_to_gff(source, destination)?;
        }
        (input, output) => {
            anyhow::bail!("Unsupported conversion: {} -> {}", input, output);
        }
    }

    println!("Conversion complete");
    Ok(())
}

fn extension_of(path: &Path, what: &str) -> anyhow::Result<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| anyhow::anyhow!("Cannot detect format from {} file extension", what))
}
