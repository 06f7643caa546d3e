use std::{env, net::SocketAddr};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppState, Currency, LedgerScope, ServerConfig, build_router, graceful_shutdown,
};

/// The longest a bearer token may stay valid for, one year in minutes.
const MAX_TOKEN_MINUTES: i64 = 60 * 24 * 365;

/// The REST API server for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database, created if it does not exist.
    #[arg(long)]
    db_path: String,

    /// The address to listen on.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone used to decide what "today" is,
    /// e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// How many minutes bearer tokens stay valid for, at most one year.
    #[arg(
        long,
        default_value_t = 15,
        value_parser = clap::value_parser!(u32).range(1..=MAX_TOKEN_MINUTES)
    )]
    token_duration: u32,

    /// The currency the ledger is kept in: USD, EUR, GBP or NZD.
    #[arg(long, default_value = "USD")]
    currency: Currency,

    /// Let every user read every other user's expenses.
    ///
    /// Updating and deleting an expense still requires owning it.
    #[arg(long)]
    shared_ledger: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr: SocketAddr = format!("{}:{}", args.address, args.port)
        .parse()
        .expect("Could not parse the server address");

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let conn = Connection::open(&args.db_path).expect("Could not open the database");

    let config = ServerConfig {
        local_timezone: args.timezone,
        token_duration: Duration::minutes(args.token_duration.into()),
        currency: args.currency,
        ledger_scope: if args.shared_ledger {
            LedgerScope::Shared
        } else {
            LedgerScope::Owner
        },
        ..Default::default()
    };

    let state = match AppState::new(conn, &secret, config) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            std::process::exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(stdout_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Args, MAX_TOKEN_MINUTES};

    fn parse(token_duration: &str) -> Result<Args, clap::Error> {
        Args::try_parse_from([
            "server",
            "--db-path",
            "test.db",
            "--token-duration",
            token_duration,
        ])
    }

    #[test]
    fn token_duration_defaults_to_fifteen_minutes() {
        let args = Args::try_parse_from(["server", "--db-path", "test.db"]).unwrap();

        assert_eq!(args.token_duration, 15);
    }

    #[test]
    fn token_duration_must_be_positive_and_at_most_a_year() {
        assert!(parse("1").is_ok());
        assert!(parse(&MAX_TOKEN_MINUTES.to_string()).is_ok());

        for duration in ["0", "-5", "525601", "4294967295"] {
            assert!(parse(duration).is_err(), "want {duration} to be rejected");
        }
    }
}
