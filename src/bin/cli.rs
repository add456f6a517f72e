use clap::{Parser, Subcommand};
use mapcompose::logging::init_logging;
use mapcompose::{BuildConfig, FixOptions, PlanarEngine, ProjectPaths, build, fix_file};
use std::path::PathBuf;

/// Сборщик композитной карты из слоёв стран, природы и дорог
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Подробный лог (уровень debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Собрать geo.geojson из исходников проекта
    Build {
        /// Корень проекта
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Порядок слоёв (по умолчанию: <project>/src/layers.yaml)
        #[arg(long)]
        layers: Option<PathBuf>,

        /// Таблица свойств стран (по умолчанию: <project>/src/properties.yaml)
        #[arg(long)]
        properties: Option<PathBuf>,

        /// Параметры прогона (по умолчанию: <project>/src/config.yaml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Каталог стран (по умолчанию: <project>/src/countries)
        #[arg(long)]
        countries: Option<PathBuf>,

        /// Каталог природных слоёв (по умолчанию: <project>/src/nature)
        #[arg(long)]
        nature: Option<PathBuf>,

        /// Каталог дорог (по умолчанию: <project>/src/roads)
        #[arg(long)]
        roads: Option<PathBuf>,

        /// Куда записать результат (по умолчанию: <project>/geo.geojson)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Не перезаписывать исходники стран очищенной версией
        #[arg(long)]
        no_write_back: bool,
    },
    /// Нормализовать один GeoJSON-слой на месте
    Fix {
        /// Путь к слою
        #[arg(short, long)]
        path: PathBuf,

        /// Допуск упрощения
        #[arg(short, long)]
        simplify: Option<f64>,

        /// Сливать по этому свойству, а не всё в одну геометрию
        #[arg(short, long)]
        key: Option<String>,

        /// Быстрое упрощение (Visvalingam) вместо Douglas–Peucker
        #[arg(long)]
        fast: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Command::Build {
            project,
            layers,
            properties,
            config,
            countries,
            nature,
            roads,
            output,
            no_write_back,
        } => {
            let mut paths = ProjectPaths::from_root(project);
            // Переопределения путей поверх раскладки по умолчанию
            if let Some(p) = layers {
                paths.layers = p;
            }
            if let Some(p) = properties {
                paths.properties = p;
            }
            if let Some(p) = config {
                paths.config = p;
            }
            if let Some(p) = countries {
                paths.countries = p;
            }
            if let Some(p) = nature {
                paths.nature = p;
            }
            if let Some(p) = roads {
                paths.roads = p;
            }
            if let Some(p) = output {
                paths.output = p;
            }

            println!("🔍 Загрузка конфигурации...");
            let config = BuildConfig::load(paths)?.with_write_back(!no_write_back);

            println!("Сборка {} слоёв...", config.layers.len());
            let summary = build(&config)?;

            println!(
                "\nГотово! {} объектов ({} стран) записано в {:?}",
                summary.features, summary.countries, summary.output
            );
        }
        Command::Fix {
            path,
            simplify,
            key,
            fast,
        } => {
            let options = FixOptions {
                key,
                simplify,
                high_quality: !fast,
            };
            let count = fix_file(&PlanarEngine, &path, &options)?;
            println!("Готово! {count} объектов в {path:?}");
        }
    }

    Ok(())
}
