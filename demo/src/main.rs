use std::io::{self, BufRead, Write};

use loopback_demo::config::CONFIG_FILE_NAME;
use loopback_demo::{App, Command, DemoConfig};

fn main() {
    println!("Loopback demo - Starting...");

    // Load configuration
    let config = load_config();

    // Initialize logger
    let logger = initialize_logger(&config);
    logger.info("Loopback demo starting...");

    let mut app = App::new(config, logger.clone());
    run_command_loop(&mut app);

    app.shutdown();
    logger.info("Loopback demo stopped");
}

/// Initializes the main logger from configuration
fn initialize_logger(config: &DemoConfig) -> logging::Logger {
    let log_level = logging::LogLevel::parse_lenient(&config.logging.log_level);
    let stamp = if config.logging.elapsed_stamps {
        logging::StampStyle::Elapsed
    } else {
        logging::StampStyle::WallClock
    };

    if !config.logging.enable_file {
        let logger = if config.logging.enable_console {
            logging::Logger::console(log_level)
        } else {
            logging::Logger::disabled()
        };
        return logger.for_component("Main").with_stamp(stamp);
    }

    let log_path = config.logging.log_file_path.clone().into();
    match logging::Logger::with_component(
        log_path,
        log_level,
        "Main".to_string(),
        config.logging.enable_console,
    ) {
        Ok(logger) => {
            println!(
                "Logging initialized: {} (level: {})",
                config.logging.log_file_path, config.logging.log_level
            );
            logger.with_stamp(stamp)
        }
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            eprintln!("Cannot continue without logging system.");
            std::process::exit(1);
        }
    }
}

/// Loads configuration from file or returns default values
fn load_config() -> DemoConfig {
    // Determine the configuration source in this order:
    // 1. CONFIG environment variable holding JSON
    // 2. First command-line argument
    // 3. loopback.json found by config_loader (CONFIG_PATH, ./config, .)
    if let Ok(json_str) = std::env::var("CONFIG") {
        match DemoConfig::from_json_str("CONFIG", &json_str) {
            Ok(cfg) => {
                println!("Configuration loaded from CONFIG env as JSON string");
                return cfg;
            }
            Err(e) => {
                eprintln!("CONFIG env is not valid JSON: {}", e);
            }
        }
    }

    let config_path = match std::env::args().nth(1) {
        Some(path) => path.into(),
        None => match config_loader::find_config_file(CONFIG_FILE_NAME) {
            Ok(path) => path,
            Err(_) => {
                println!("No {} found, using default values", CONFIG_FILE_NAME);
                return DemoConfig::default();
            }
        },
    };

    match DemoConfig::load_from_file(&config_path) {
        Ok(c) => {
            println!("Configuration loaded from: {}", config_path.display());
            c
        }
        Err(e) => {
            eprintln!(
                " Failed to load configuration from {}: {}",
                config_path.display(),
                e
            );
            eprintln!("Using default values...");
            DemoConfig::default()
        }
    }
}

/// Reads commands until `quit` or end of input
fn run_command_loop(app: &mut App) {
    println!("Type 'help' for commands.");
    println!("{}", app.ui().render());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        let quit = command == Command::Quit;

        match app.execute(command) {
            Ok(output) => output.iter().for_each(|l| println!("{}", l)),
            Err(e) => println!("Error: {}", e),
        }
        if quit {
            break;
        }
        println!("{}", app.ui().render());
    }
}
