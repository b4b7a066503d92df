//! Building, wrapping and printing errors.
//!
//! Run with `cargo run --example basic`.

use core::time::Duration;

use faultline::{Help, Retry, Verbosity, prelude::*};

#[derive(Debug, thiserror::Error)]
#[error("connection refused by {host}")]
struct ConnectionRefused {
    host: String,
}

fn connect(host: &str) -> Result<(), ConnectionRefused> {
    Err(ConnectionRefused {
        host: host.to_owned(),
    })
}

fn fetch_profile(user: u64) -> Result<String, Error> {
    let database = ErrorBuilder::new()
        .domain("profiles")
        .with_tag("database")
        .user_id(user.to_string());

    connect("db.internal:5432").wrap_err(&database.reason("DB_UNAVAILABLE"))?;
    Err(database.build("unreachable"))
}

fn handle_request(user: u64) -> Result<String, Error> {
    fetch_profile(user).wrap_err_with(|| {
        ErrorBuilder::new()
            .request_id("req-8f2c")
            .with_tag("http")
            .retry(Retry::after(Duration::from_secs(5)))
            .help(Help {
                description: "Service status".to_owned(),
                url: "https://status.example.com".to_owned(),
            })
    })
}

fn main() {
    let Err(error) = handle_request(42) else {
        return;
    };

    println!("Summary:\n{error}\n");
    println!("Reason {:?}, user {:?}", error.reason(), error.user_id());
    println!("Tags {:?}\n", error.tags());
    println!("Full report:\n{}", error.render(Verbosity::Full));

    let validation = errorf!("invalid page size {}", -1);
    println!("{validation:#}");
}
