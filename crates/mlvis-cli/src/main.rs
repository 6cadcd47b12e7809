use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use serde::Serialize;
use std::path::PathBuf;

use mlvis_activations::model::LAYER_NAMES;
use mlvis_cli::activations::filters::{run_filters, write_filters_report};
use mlvis_cli::activations::input::{FiltersConfig, TrainCnnConfig};
use mlvis_cli::activations::trainer::run_training;
use mlvis_cli::classifiers::digits::{run_digits, write_digits_report};
use mlvis_cli::classifiers::input::{DigitsConfig, IrisConfig};
use mlvis_cli::classifiers::iris::{run_iris, write_iris_report};
use mlvis_cli::util::config_to_json;

fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to a JSON configuration file. Missing fields take default values.")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn output_arg(help: &'static str) -> Arg {
    Arg::new("output_file")
        .short('o')
        .long("output_file")
        .value_parser(clap::builder::NonEmptyStringValueParser::new())
        .help(help)
        .value_hint(ValueHint::FilePath)
}

fn data_arg() -> Arg {
    Arg::new("data")
        .short('d')
        .long("data")
        .value_parser(clap::builder::NonEmptyStringValueParser::new())
        .help("URL or local path of the dataset. Overrides the data source in the configuration file.")
        .value_hint(ValueHint::AnyPath)
}

fn cache_dir_arg() -> Arg {
    Arg::new("cache_dir")
        .long("cache-dir")
        .help("Directory where downloaded datasets are cached and reused.")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
}

fn device_arg() -> Arg {
    Arg::new("device")
        .long("device")
        .help("Device to run the network on: cpu, cuda or cuda:N.")
        .value_parser(clap::builder::NonEmptyStringValueParser::new())
        .value_hint(ValueHint::Other)
}

fn show_arg() -> Arg {
    Arg::new("show")
        .long("show")
        .help("Open the plot in the default browser after writing the report.")
        .action(ArgAction::SetTrue)
}

fn print_config_arg() -> Arg {
    Arg::new("print_config")
        .long("print-config")
        .help("Print the effective configuration as JSON and exit.")
        .action(ArgAction::SetTrue)
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("MLVIS_LOG", "error,mlvis=info"))
        .init();

    let matches = Command::new("mlvis")
        .version(clap::crate_version!())
        .about("mlvis - small machine learning visualizations: digits, iris and CNN filters")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("digits")
                .about("Fit logistic regression on the 8x8 digits and plot the confusion matrix")
                .arg(config_arg())
                .arg(data_arg())
                .arg(
                    Arg::new("test_size")
                        .long("test-size")
                        .help("Fraction of samples held out for testing, in (0, 1).")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed of the train/test shuffle.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("model_type")
                        .long("model-type")
                        .help("Override the model type from the JSON config.")
                        .value_parser(["logistic", "logreg", "logistic_regression"])
                        .value_hint(ValueHint::Other),
                )
                .arg(output_arg("HTML report path. Overrides the output_file in the configuration file."))
                .arg(cache_dir_arg())
                .arg(show_arg())
                .arg(print_config_arg()),
        )
        .subcommand(
            Command::new("iris")
                .about("Project the standardized Iris measurements onto two principal components")
                .arg(config_arg())
                .arg(data_arg())
                .arg(output_arg("HTML report path. Overrides the output_file in the configuration file."))
                .arg(cache_dir_arg())
                .arg(show_arg())
                .arg(print_config_arg()),
        )
        .subcommand(
            Command::new("filters")
                .about("Visualize what the filters of a convolutional layer respond to")
                .arg(config_arg())
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained network weights (*.safetensors)")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("image_path")
                        .short('i')
                        .long("image")
                        .help("28x28 image the gradient ascent starts from")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("layer")
                        .short('l')
                        .long("layer")
                        .help("Convolutional layer whose filters are visualized")
                        .value_parser(LAYER_NAMES[..4].to_vec()),
                )
                .arg(
                    Arg::new("steps")
                        .long("steps")
                        .help("Number of gradient ascent steps per filter")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("png_file")
                        .long("png")
                        .help("Also write the filter grid as a PNG image")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(device_arg())
                .arg(output_arg("HTML report path. Overrides the output_file in the configuration file."))
                .arg(show_arg())
                .arg(print_config_arg()),
        )
        .subcommand(
            Command::new("train-cnn")
                .about("Train the MNIST network from the IDX files and save its weights")
                .arg(config_arg())
                .arg(
                    Arg::new("mnist_dir")
                        .short('d')
                        .long("mnist_dir")
                        .help("Directory holding train-/t10k- IDX files, gzipped or raw")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("epochs")
                        .long("epochs")
                        .help("Number of training epochs")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("max_train_samples")
                        .long("max-train-samples")
                        .help("Train on at most this many samples")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(device_arg())
                .arg(output_arg("File path that the safetensors weights will be written to."))
                .arg(print_config_arg()),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("digits", sub_m)) => handle_digits(sub_m),
        Some(("iris", sub_m)) => handle_iris(sub_m),
        Some(("filters", sub_m)) => handle_filters(sub_m),
        Some(("train-cnn", sub_m)) => handle_train_cnn(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

/// Print the effective config; returns true when the run should stop there.
fn print_config<T: Serialize>(config: &T, matches: &ArgMatches) -> Result<bool> {
    let json = config_to_json(config)?;
    if matches.get_flag("print_config") {
        println!("{}", json);
        return Ok(true);
    }
    log::debug!("Effective configuration:\n{}", json);
    Ok(false)
}

fn exit_with(context: &str, e: anyhow::Error) -> ! {
    log::error!("{} failed: {:#}", context, e);
    std::process::exit(1)
}

fn handle_digits(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let config = DigitsConfig::from_arguments(config_path, matches)?;
    if print_config(&config, matches)? {
        return Ok(());
    }

    match run_digits(&config) {
        Ok(result) => {
            println!("Accuracy Score: {}", result.score);
            if matches.get_flag("show") {
                result.plot.show();
            }
            write_digits_report(&config, result).unwrap_or_else(|e| exit_with("Report", e));
            Ok(())
        }
        Err(e) => exit_with("Digits classification", e),
    }
}

fn handle_iris(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let config = IrisConfig::from_arguments(config_path, matches)?;
    if print_config(&config, matches)? {
        return Ok(());
    }

    match run_iris(&config) {
        Ok(result) => {
            let ratios: Vec<String> = result
                .explained_variance_ratio
                .iter()
                .map(|r| format!("{:.4}", r))
                .collect();
            println!("Explained variance ratio: [{}]", ratios.join(", "));
            if matches.get_flag("show") {
                result.plot.show();
            }
            write_iris_report(&config, result).unwrap_or_else(|e| exit_with("Report", e));
            Ok(())
        }
        Err(e) => exit_with("Iris PCA", e),
    }
}

fn handle_filters(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let config = FiltersConfig::from_arguments(config_path, matches)?;
    if print_config(&config, matches)? {
        return Ok(());
    }

    match run_filters(&config) {
        Ok(result) => {
            if matches.get_flag("show") {
                result.plot.show();
            }
            write_filters_report(&config, result).unwrap_or_else(|e| exit_with("Report", e));
            Ok(())
        }
        Err(e) => exit_with("Filter visualization", e),
    }
}

fn handle_train_cnn(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let config = TrainCnnConfig::from_arguments(config_path, matches)?;
    if print_config(&config, matches)? {
        return Ok(());
    }

    match run_training(&config) {
        Ok(summaries) => {
            println!(
                "Trained for {} epochs; weights written to {}",
                summaries.len(),
                config.output_file
            );
            Ok(())
        }
        Err(e) => exit_with("Training", e),
    }
}
