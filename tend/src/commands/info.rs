//! Repository description command.

use std::path::PathBuf;

use anyhow::Result;

use crate::formatting::{print_key_value, print_section_header, print_unit_table, SectionStyle};

use super::{canonical_root, create_runtime, load_config, open_repository};

pub fn cmd_info(root: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let root = canonical_root(&root)?;
    let config = load_config(&root, config)?;

    let rt = create_runtime()?;
    let description = rt.block_on(async {
        let (repository, _) = open_repository(&root, &config).await?;
        anyhow::Ok(repository.describe()?)
    })?;

    print_section_header("Repository", SectionStyle::Primary);
    print_key_value("Type", description.repository_type.as_str());
    print_key_value("Root", &description.root.display().to_string());
    print_key_value(
        "Version",
        description.version.as_deref().unwrap_or("(none)"),
    );
    println!();
    print_unit_table(&description.units);

    Ok(())
}
