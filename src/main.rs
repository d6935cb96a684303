// Entrypoint for the CLI application.
// - Keeps `main` small: load the config, build the API client and hand a
//   session to the UI loop.
// - Configuration problems exit with status 1 after printing guidance.

use env_logger::Env;
use shippo_it::api::ApiClient;
use shippo_it::config::{Config, TemplateRegistry};
use shippo_it::error::ConfigError;
use shippo_it::prompt::DialoguerPrompter;
use shippo_it::session::Session;
use shippo_it::ui::main_menu;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Diagnostics go to stderr; RUST_LOG overrides the default level.
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ConfigError>() {
                Some(config_err) => eprintln!("{}\n", config_err),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::load(&Config::default_path()?)?;
    let prompter = DialoguerPrompter::new();
    let api_key = config.choose_api_key(&prompter)?;
    let api = ApiClient::new(&config.api_url(), &api_key)?;
    let templates = TemplateRegistry::load_default()?;

    // The operator may decline the validator's remarks about the sender,
    // which ends the program without error.
    let Some(session) = Session::initialize(&config, &prompter, &api, &templates)? else {
        return Ok(());
    };

    // Start the interactive menu. This call blocks until the user exits.
    main_menu(&session)
}
