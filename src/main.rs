use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use log::{debug, error, info, LevelFilter};

use clap::{arg, command, ArgAction, ArgMatches};
use clap::parser::ValueSource;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger};

use heroes_data::mp2::MapLoader;
use heroes_data::{AssetConfig, Assets, Result};


fn parse_command_line() -> ArgMatches {
    command!()
        .next_line_help(true)
        .arg(
            arg!(--loglevel <LEVEL>)
                .required(false)
                .default_value("info")
                .value_parser(["trace", "debug", "info", "warn", "error", "off" ])
                .action(ArgAction::Set)
        )
        .arg(
            arg!(--logfile [FILE_NAME])
                .required(false)
                .default_value("heroes_data.log")
                .action(ArgAction::Set)
                .help("Enables logging to a file. Disabled by default")
        )
        .arg(
            arg!(-q --quiet)
                .required(false)
                .action(ArgAction::SetTrue)
                .help("Disables output to the terminal")
        )
        .arg(
            arg!(--config <FILE_NAME>)
                .required(false)
                .action(ArgAction::Set)
                .help("Json file with the asset configuration")
        )
        .arg(
            arg!(--data <DIR>)
                .required(false)
                .action(ArgAction::Set)
                .help("Directory with the game data, overrides the configuration")
        )
        .arg(
            arg!(--map <FILE_NAME>)
                .required(false)
                .action(ArgAction::Set)
                .help("Loads a world map and prints a summary")
        )
        .arg(
            arg!(--icn <NAME>)
                .required(false)
                .action(ArgAction::Set)
                .help("Decodes an icon group from the archive")
        )
        .arg(
            arg!(--export <DIR>)
                .required(false)
                .requires("icn")
                .action(ArgAction::Set)
                .help("Writes the decoded icon group as png files")
        )
        .get_matches()
}


fn initialize_logging(matches: &ArgMatches) {
    let loglevel = match matches.get_one::<String>("loglevel") {
        None => LevelFilter::Off,
        Some(level) => {
            match level.as_str() {
                "trace" => LevelFilter::Trace,
                "debug" => LevelFilter::Debug,
                "info" => LevelFilter::Info,
                "warn" => LevelFilter::Warn,
                "error" => LevelFilter::Error,
                _ => LevelFilter::Off,
            }
        }
    };
    let quiet = matches.get_flag("quiet");
    let term_loglevel = if quiet { LevelFilter::Off } else { loglevel };

    let logfile = match (matches.value_source("logfile"), matches.get_one::<String>("logfile")) {
        (Some(ValueSource::CommandLine), Some(file_name)) => Some(file_name),
        _ => None,
    };

    let result = match logfile.map(File::create) {
        Some(Ok(file)) => CombinedLogger::init(
            vec![
                TermLogger::new(term_loglevel, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
                WriteLogger::new(loglevel, Config::default(), file),
            ]
        ),
        Some(Err(e)) => {
            eprintln!("cannot create the log file: {e}");
            TermLogger::init(term_loglevel, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)
        }
        None => TermLogger::init(term_loglevel, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
    };
    if let Err(e) = result {
        eprintln!("logger initialization failed: {e}");
    }
}


fn load_config(matches: &ArgMatches) -> Result<AssetConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(file_name) => AssetConfig::load(Path::new(file_name))?,
        None => AssetConfig::default(),
    };
    if let Some(dir) = matches.get_one::<String>("data") {
        config.data_dir = PathBuf::from(dir);
    }
    debug!("{config:?}");
    Ok(config)
}


fn show_map(config: &AssetConfig, file_name: &str) -> Result<()> {
    let start = Instant::now();
    let map = MapLoader::from_config(config).load_file(Path::new(file_name))?;
    let header = &map.header;

    info!("{:?} loaded in {:?}", header.name, start.elapsed());
    info!("{:?}, {:?}, victory {:?}, defeat {:?}", header.size, header.difficulty, header.victory, header.defeat);
    info!("{} tiles, {} addons, {} captured objects, {} obelisks",
        map.tiles.len(), map.addon_count, map.captured.len(), map.obelisk_count);
    info!("{} castles, {} heroes, {} signs, {} events, {} riddles, {} dated events, {} rumors",
        map.castles.len(), map.heroes.len(), map.signs.len(), map.events.len(),
        map.riddles.len(), map.dated_events.len(), map.rumors.len());
    for castle in &map.castles {
        info!("  castle {:?} at {:?}, {:?} {:?}", castle.name, castle.position, castle.race, castle.color);
    }
    Ok(())
}


fn show_icn(config: &AssetConfig, group: &str, export: Option<&String>) -> Result<()> {
    let assets = Assets::open(config)?;
    let sprites = assets.sprites(group)?;
    info!("{group}: {} sprites", sprites.len());

    let Some(dir) = export else { return Ok(()) };
    let dir = PathBuf::from(dir);
    fs::create_dir_all(&dir)?;
    let stem = group.trim_end_matches(".ICN").trim_end_matches(".icn");
    for (index, sprite) in sprites.iter().enumerate() {
        let path = dir.join(format!("{stem}_{index:03}.png"));
        sprite.to_rgba_image(&assets.palette).save(&path)?;
        debug!("{path:?}: {}x{}", sprite.width, sprite.height);
    }
    info!("{} png files written to {dir:?}", sprites.len());
    Ok(())
}


fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;

    if let Some(file_name) = matches.get_one::<String>("map") {
        show_map(&config, file_name)?;
    }
    if let Some(group) = matches.get_one::<String>("icn") {
        show_icn(&config, group, matches.get_one::<String>("export"))?;
    }
    Ok(())
}


fn main() -> ExitCode {
    let matches = parse_command_line();
    initialize_logging(&matches);

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
