use fxledger::AppCommand;
use fxledger::cli::balance::BalanceCommand;
use fxledger::cli::currency::CurrencyCommand;
use fxledger::cli::goal::GoalCommand;
use fxledger::cli::transaction::TransactionCommand;
use fxledger::core::Ledger;
use fxledger::core::config::AppConfig;
use fxledger::providers::AwesomeApiProvider;
use fxledger::store::DiskStore;
use rust_decimal_macros::dec;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(quotes: &[(&str, &str)]) -> MockServer {
        let mock_server = MockServer::start().await;

        for (symbol, ask) in quotes {
            let body = format!(
                r#"{{"{symbol}USD": {{"code": "{symbol}", "codein": "USD", "bid": "{ask}", "ask": "{ask}"}}}}"#
            );
            Mock::given(method("GET"))
                .and(path(format!("/json/last/{symbol}-USD")))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&mock_server)
                .await;
        }

        // Anything else is an unknown coin.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"status": 404, "code": "CoinNotExists", "message": "moeda nao encontrada"}"#,
            ))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(path: &std::path::Path, base_url: &str, data_path: &std::path::Path) {
        let config_content = format!(
            r#"
        providers:
          awesomeapi:
            base_url: {}
            timeout_secs: 5
        data_path: "{}"
    "#,
            base_url,
            data_path.display()
        );
        std::fs::write(path, config_content).expect("Failed to write config file");
    }
}

async fn run(command: AppCommand, config_path: &Path) -> anyhow::Result<()> {
    fxledger::run_command(command, Some(config_path.to_str().unwrap())).await
}

fn open_ledger(config_path: &Path) -> Ledger {
    let config = AppConfig::load_from_path(config_path).expect("Failed to load config");
    let store = DiskStore::open(&config.data_path().unwrap()).expect("Failed to open store");
    let rates = AwesomeApiProvider::new(&config.providers.awesomeapi).unwrap();
    Ledger::open(&store, Arc::new(rates)).expect("Failed to open ledger")
}

fn add_currency(symbol: &str) -> AppCommand {
    AppCommand::Currency(CurrencyCommand::Add {
        symbol: symbol.to_string(),
        usd_value: None,
    })
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(&[("EUR", "1.0851"), ("USD", "1")]).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    test_utils::write_config(config_path, &mock_server.uri(), data_dir.path());

    let commands = vec![
        add_currency("EUR"),
        add_currency("USD"),
        AppCommand::Balance(BalanceCommand::Add {
            symbol: "EUR".to_string(),
            value: dec!(150),
            share: dec!(0.5),
        }),
        AppCommand::Rate {
            symbol: "EUR".to_string(),
        },
        AppCommand::Portfolio,
        AppCommand::History {
            symbol: "EUR".to_string(),
        },
        AppCommand::Goal(GoalCommand::Add {
            balance_id: 1,
            destination: "USD".to_string(),
            threshold: dec!(0.05),
            initial_value: Some(dec!(100)),
        }),
        AppCommand::Goal(GoalCommand::List),
        AppCommand::Goal(GoalCommand::Execute {
            id: 1,
            destination_value: dec!(162.75),
            commission: None,
        }),
        AppCommand::Transaction(TransactionCommand::List),
        AppCommand::Balance(BalanceCommand::List),
    ];

    for command in commands {
        info!(?command, "Running command");
        let result = run(command, config_path).await;
        assert!(result.is_ok(), "Command failed with: {:?}", result.err());
    }

    let ledger = open_ledger(config_path);

    // One row from `rate`, one from `portfolio`.
    let history = ledger.history("EUR").await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|h| h.usd_value == dec!(1.0851)));

    let goal = ledger.goal(1).await.unwrap().expect("Goal should exist");
    assert!(goal.completed());
    let transaction = ledger
        .transaction(goal.transaction().expect("Goal should be linked"))
        .await
        .unwrap()
        .expect("Transaction should exist");
    assert_eq!(transaction.origin_currency, "EUR");
    assert_eq!(transaction.destination_currency, "USD");
    assert_eq!(transaction.original_currency_value, dec!(150));
    assert_eq!(transaction.destination_currency_value, dec!(162.75));
    assert_eq!(transaction.commission, dec!(1));
}

#[test_log::test(tokio::test)]
async fn test_failed_rate_fetch_records_nothing() {
    let mock_server = test_utils::create_mock_server(&[]).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    test_utils::write_config(config_path, &mock_server.uri(), data_dir.path());

    run(add_currency("XYZ"), config_path).await.unwrap();

    let result = run(
        AppCommand::Rate {
            symbol: "XYZ".to_string(),
        },
        config_path,
    )
    .await;
    let err = result.expect_err("Rate fetch for an unknown coin should fail");
    assert!(format!("{err:#}").contains("HTTP error: 404"));

    let ledger = open_ledger(config_path);
    assert!(ledger.history("XYZ").await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_history_of_unknown_currency_fails() {
    let mock_server = test_utils::create_mock_server(&[]).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    test_utils::write_config(config_path, &mock_server.uri(), data_dir.path());

    for command in [
        AppCommand::History {
            symbol: "XYZ".to_string(),
        },
        AppCommand::Rate {
            symbol: "XYZ".to_string(),
        },
    ] {
        let err = run(command, config_path)
            .await
            .expect_err("Unknown currency should be rejected");
        assert!(format!("{err:#}").contains("Currency XYZ not found"));
    }
}

#[test_log::test(tokio::test)]
async fn test_duplicate_currency_and_cascade_remove() {
    let mock_server = test_utils::create_mock_server(&[("BRL", "0.1834")]).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    test_utils::write_config(config_path, &mock_server.uri(), data_dir.path());

    run(add_currency("BRL"), config_path).await.unwrap();
    let duplicate = run(add_currency("BRL"), config_path).await;
    assert!(
        duplicate
            .unwrap_err()
            .to_string()
            .contains("Currency BRL already exists")
    );

    run(
        AppCommand::Balance(BalanceCommand::Add {
            symbol: "BRL".to_string(),
            value: dec!(900),
            share: dec!(1),
        }),
        config_path,
    )
    .await
    .unwrap();
    run(
        AppCommand::Rate {
            symbol: "BRL".to_string(),
        },
        config_path,
    )
    .await
    .unwrap();
    run(
        AppCommand::Currency(CurrencyCommand::Remove {
            symbol: "BRL".to_string(),
        }),
        config_path,
    )
    .await
    .unwrap();

    let ledger = open_ledger(config_path);
    assert!(ledger.currencies().await.unwrap().is_empty());
    assert!(ledger.balances().await.unwrap().is_empty());
    assert!(ledger.history("BRL").await.unwrap().is_empty());
}

#[test]
fn test_setup_writes_loadable_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("config.yaml");

    fxledger::cli::setup::setup_at_path(&config_path).unwrap();
    let config = AppConfig::load_from_path(&config_path).unwrap();
    assert_eq!(
        config.providers.awesomeapi.base_url,
        "https://economia.awesomeapi.com.br"
    );
    assert!(fs::read_to_string(&config_path).unwrap().contains("fxledger"));
}

#[test_log::test(tokio::test)]
#[ignore = "hits the live AwesomeAPI endpoint"]
async fn test_real_awesomeapi() {
    use fxledger::core::UsdRateProvider;

    let provider = AwesomeApiProvider::new(&Default::default()).unwrap();
    let symbol = "EUR";
    info!(?symbol, "Fetching USD ask from AwesomeAPI");

    match provider.usd_ask(symbol).await {
        Ok(ask) => {
            info!(%ask, "Received successful quote");
            assert!(ask > dec!(0), "Ask should be positive");
        }
        Err(e) => {
            error!("AwesomeAPI request failed: {e}\n{e:?}");
            panic!("AwesomeAPI request failed: {e}");
        }
    }
}
