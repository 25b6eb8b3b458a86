use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use chrono::NaiveDate;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use coating_quote::catalog::Choice;
use coating_quote::config::Settings;
use coating_quote::pricing::Availability;
use coating_quote::pricing::DuplicatePolicy;
use coating_quote::pricing::QuoteForm;
use coating_quote::pricing::Selection;
use coating_quote::render::format_amount;
use coating_quote::render::QuoteSheet;
use coating_quote::render::VehicleList;
use coating_quote::workbook::Workbook;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(version, about = "Look up vehicles and price coating options from the quote workbook.")]
struct Args {
    /// Workbook with the vehicle and option sheets (.xlsx, .xlsm or .csv).
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More logging (repeatable); `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List brands.
    Brands,

    /// List models of a brand, or of every brand.
    Models {
        #[arg(long)]
        brand: Option<String>,
    },

    /// Show vehicles matching a brand and model; `全部` or `all` matches everything.
    List {
        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the options offered for a vehicle or classification.
    Options {
        #[arg(long, requires = "model", conflicts_with = "classification")]
        brand: Option<String>,

        #[arg(long, requires = "brand")]
        model: Option<String>,

        #[arg(long, required_unless_present = "brand")]
        classification: Option<String>,
    },

    /// Price up to five options for a vehicle.
    Quote {
        #[arg(long)]
        brand: String,

        #[arg(long)]
        model: String,

        /// Option to add, as NAME or NAME:QTY (repeatable).
        #[arg(long = "option", value_name = "NAME[:QTY]")]
        options: Vec<Selection>,

        /// Count a repeated option twice instead of rejecting it.
        #[arg(long)]
        allow_duplicates: bool,

        /// Issue date, defaults to today.
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(data) = &args.data {
        settings.vehicles.file = Some(data.to_owned());
    }
    let workbook = Workbook::load(&settings).context("Failed to load the quote workbook")?;
    let catalog = &workbook.catalog;

    match args.command {
        Command::Brands => {
            for brand in catalog.brands() {
                println!("{}", brand);
            }
        }
        Command::Models { brand } => {
            for model in catalog.models(&Choice::parse(brand.as_deref())) {
                println!("{}", model);
            }
        }
        Command::List { brand, model, format } => {
            let list = VehicleList::new(catalog.filter(&Choice::parse(brand.as_deref()), &Choice::parse(model.as_deref())));
            match format {
                OutputFormat::Text => print!("{}", list.to_text()),
                OutputFormat::Json => println!("{}", list.to_json()?),
            }
        }
        Command::Options { brand, model, classification } => {
            let classification = match (brand, model, classification) {
                (_, _, Some(classification)) => classification,
                (Some(brand), Some(model), None) => match &catalog.find(&brand, &model)?.classification {
                    Some(classification) => classification.to_owned(),
                    None => {
                        println!("{} {} has no classification, no options available", brand, model);
                        return Ok(());
                    }
                },
                _ => bail!("Pass --brand and --model, or --classification"),
            };
            match workbook.prices.offered(&classification) {
                Availability::Options(options) => {
                    for (name, price) in options.iter() {
                        println!("{}\t{}", name, format_amount(&settings.currency, price));
                    }
                }
                Availability::NoOptions => println!("No options available for classification '{}'", classification),
            }
        }
        Command::Quote { brand, model, options, allow_duplicates, date, format } => {
            let vehicle = catalog.find(&brand, &model)?;
            let mut form = QuoteForm::new(&workbook.prices, duplicate_policy(allow_duplicates, &settings));
            form.set_vehicle(vehicle);
            for selection in options {
                let text = selection.to_string();
                form.select(selection).with_context(|| format!("Cannot add option {}", text))?;
            }

            let issued_on = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let sheet = QuoteSheet::new(vehicle, form.quote()?, issued_on);
            match format {
                OutputFormat::Text => print!("{}", sheet.to_text(&settings.currency)),
                OutputFormat::Json => println!("{}", sheet.to_json()?),
            }
        }
    }
    Ok(())
}

/// `--allow-duplicates` overrides the configured policy.
fn duplicate_policy(allow_duplicates: bool, settings: &Settings) -> DuplicatePolicy {
    if allow_duplicates {
        DuplicatePolicy::Sum
    } else {
        settings.duplicate_policy
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("coating-quote").chain(args.iter().copied()))
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn options_by_vehicle_or_classification() {
        let args = parse(&["options", "--brand", "Toyota", "--model", "RAV4"]).unwrap();
        assert!(matches!(args.command, Command::Options { brand: Some(_), model: Some(_), classification: None }));

        let args = parse(&["options", "--classification", "B", "--data", "qiaosi.xlsx"]).unwrap();
        assert_eq!(args.data, Some(PathBuf::from("qiaosi.xlsx")));
        assert!(matches!(args.command, Command::Options { classification: Some(ref class), .. } if class == "B"));

        assert_eq!(parse(&["options"]).err().map(|error| error.kind()), Some(ErrorKind::MissingRequiredArgument));
        assert_eq!(parse(&["options", "--brand", "Toyota"]).err().map(|error| error.kind()), Some(ErrorKind::MissingRequiredArgument));
        assert_eq!(
            parse(&["options", "--brand", "Toyota", "--model", "RAV4", "--classification", "B"]).err().map(|error| error.kind()),
            Some(ErrorKind::ArgumentConflict)
        );
    }

    #[test]
    fn quote_options_and_policy() {
        let args = parse(&["-vv", "quote", "--brand", "Toyota", "--model", "Altis", "--option", "Wax:2", "--option", "Seal", "--date", "2026-10-18"]).unwrap();
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Quote { options, allow_duplicates, date, .. } => {
                assert_eq!(options.iter().map(Selection::to_string).collect::<Vec<String>>(), vec!["Wax x 2", "Seal x 1"]);
                assert!(!allow_duplicates);
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 18));
            }
            _ => panic!("expected the quote command"),
        }

        assert_eq!(parse(&["quote", "--brand", "Toyota", "--model", "Altis", "--option", "Wax:11"]).err().map(|error| error.kind()), Some(ErrorKind::ValueValidation));
        assert!(parse(&["quote", "--brand", "Toyota"]).is_err());
    }

    #[test]
    fn allow_duplicates_overrides_settings() {
        let mut settings = Settings::default();
        assert_eq!(duplicate_policy(false, &settings), DuplicatePolicy::Reject);
        assert_eq!(duplicate_policy(true, &settings), DuplicatePolicy::Sum);

        settings.duplicate_policy = DuplicatePolicy::Sum;
        assert_eq!(duplicate_policy(false, &settings), DuplicatePolicy::Sum);

        let args = parse(&["quote", "--brand", "Honda", "--model", "Fit", "--allow-duplicates"]).unwrap();
        assert!(matches!(args.command, Command::Quote { allow_duplicates: true, .. }));
    }
}
