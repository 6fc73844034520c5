use anyhow::Result;
use clap::Parser;
use console::style;
use log::{debug, info};
use std::process::ExitCode;
use video_spritesheet::cli::Cli;
use video_spritesheet::component::SpriteSheetGenerator;
use video_spritesheet::component::sprite_sheet_generator::{SheetRequest, print_summary};
use video_spritesheet::config::{Settings, save_settings};
use video_spritesheet::init;
use video_spritesheet::signal::setup_shutdown_signal;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("執行失敗: {e:#}");
            eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);
    settings.validate()?;

    if let Some(path) = &cli.write_config {
        save_settings(path, &settings)?;
        println!("Settings written: {}", path.display());
        return Ok(());
    }

    let request = SheetRequest::resolve(
        cli.input.clone(),
        cli.out_dir.clone(),
        cli.base.clone(),
        &settings,
    )?;

    let shutdown_signal = setup_shutdown_signal();
    let generator = SpriteSheetGenerator::new(settings, shutdown_signal);
    let result = generator.run(&request)?;

    print_summary(&result, !cli.no_snippets);
    info!("完成 {} 張精靈圖", result.sheets.len());

    Ok(())
}
