mod cli;
mod settings;
mod workspace;

use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.init {
        Some(path) => {
            let settings = settings::AppSettings::default();
            settings::save_settings_to(path, &settings)?;
            log::info!("wrote default settings to {}", path.display());
            settings
        }
        None => settings::load_settings(),
    };

    let registry = workspace::build_workspace(&settings)?;
    log::debug!("workspace built:\n{}", registry);

    if cli.text {
        print!("{}", registry);
    } else {
        println!("{}", serde_json::to_string_pretty(&registry.describe(cli.filter()))?);
    }
    Ok(())
}
