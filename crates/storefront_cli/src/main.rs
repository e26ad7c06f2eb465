//! CLI probe for the storefront core.
//!
//! # Responsibility
//! - Open a database file, run one list request built from `key=value`
//!   arguments, and print rows plus metadata as JSON.
//! - Exit non-zero with the caller-facing error message on failure.
//!
//! Usage: `storefront_cli <db_path> <categories|products|orders|users> [key=value ...]`

use log::info;
use serde_json::{json, Value};
use std::process::ExitCode;
use storefront_core::{
    core_version, init_logging, open_db_with_config, CategoryService, LogConfig, OrderService,
    ProductService, QueryParams, ResourceError, StoreConfig, UserService,
};

const LOG_DIR_ENV: &str = "STOREFRONT_LOG_DIR";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, resource, pairs) = match args.as_slice() {
        [db_path, resource, pairs @ ..] => (db_path, resource.as_str(), pairs),
        _ => {
            eprintln!(
                "storefront_cli {}\nusage: storefront_cli <db_path> <categories|products|orders|users> [key=value ...]",
                core_version()
            );
            return ExitCode::from(2);
        }
    };

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        let config = LogConfig::new(storefront_core::default_log_level(), log_dir);
        if let Err(err) = init_logging(&config) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config = StoreConfig::default();
    let conn = match open_db_with_config(db_path, &config) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let qs: QueryParams = pairs
        .iter()
        .filter_map(|pair| pair.split_once('='))
        .collect();
    info!("event=cli_list module=cli status=start resource={resource}");

    let result = match resource {
        "categories" => to_json(CategoryService::sqlite(&conn, &config).list_from_query(&[], &qs)),
        "products" => to_json(ProductService::sqlite(&conn, &config).list_from_query(&[], &qs)),
        "orders" => to_json(OrderService::sqlite(&conn, &config).list_from_query(&[], &qs)),
        "users" => to_json(UserService::sqlite(&conn, &config).list_from_query(&[], &qs)),
        other => {
            eprintln!("unknown resource `{other}`");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(body) => {
            println!("{body:#}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let body = json!({
                "status": err.status_code(),
                "error": err.to_string(),
                "fields": err.field_errors(),
            });
            eprintln!("{body:#}");
            ExitCode::FAILURE
        }
    }
}

fn to_json<T: serde::Serialize>(
    result: Result<storefront_core::ListResult<T>, ResourceError>,
) -> Result<Value, ResourceError> {
    let page = result?;
    serde_json::to_value(&page).map_err(|_| ResourceError::Internal)
}
