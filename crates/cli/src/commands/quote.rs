use crate::commands::CommandResult;
use pricewire_core::config::{AppConfig, LoadOptions};
use pricewire_core::{Reply, Symbol};
use pricewire_quotes::TwelveDataClient;

pub fn run(raw_symbol: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let symbol = Symbol::from_message_text(raw_symbol);
    if symbol.is_empty() {
        return CommandResult::failure("quote", "no_price", Reply::Help.text(), 1);
    }

    let client = match TwelveDataClient::from_config(&config.quotes) {
        Ok(client) => client,
        Err(error) => return CommandResult::failure("quote", "client_init", error.to_string(), 3),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(client.fetch_price(&symbol)) {
        Ok(Some(price)) => {
            CommandResult::success("quote", Reply::for_lookup(&symbol, Some(price)).text())
        }
        Ok(None) => CommandResult::failure("quote", "no_price", Reply::Help.text(), 1),
        Err(error) => CommandResult::failure("quote", "quote_provider", error.to_string(), 1),
    }
}
