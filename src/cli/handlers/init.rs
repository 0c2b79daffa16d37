use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io;
use crate::io::storage::FileStorage;
use crate::ops::store::STORAGE_KEY;

const CONFIG_TOML_TEMPLATE: &str = r##"# shareflow settings
# Edit freely, or use: sf config set <section.key> <value>

[embed]
# accent stripe on shared resources (0xRRGGBB)
color = 0xFF9933
footer = "ShareFlow made by iqlip 💖"

[compose]
# display name override for shared resources; empty uses the webhook's own
username = ""

[history]
# tags listed by `sf history tags` without --all
top_tags = 7

[log]
# tracing filter, e.g. "shareflow=debug"; RUST_LOG takes precedence
filter = "warn"
"##;

/// Write the starter config into `data_dir`. Refuses to overwrite unless `force`.
pub fn write_starter_config(data_dir: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_io::config_path(data_dir);
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    fs::create_dir_all(data_dir)?;
    fs::write(&path, CONFIG_TOML_TEMPLATE)?;
    Ok(())
}

pub fn cmd_init(args: InitArgs, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    write_starter_config(data_dir, args.force)?;

    println!("Initialized shareflow in {}", data_dir.display());
    println!("  config: {}", config_io::config_path(data_dir).display());
    println!(
        "  state:  {}",
        FileStorage::new(data_dir).path_for(STORAGE_KEY).display()
    );
    Ok(())
}
