use std::env;

use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use paythm_core::csv::{read_operations, write_balances};
use paythm_core::{Engine, NewUser};

/// Demo users seeded at startup, mirroring the hosted environment.
const DEMO_USERS: [(&str, &str, &str); 4] = [
    ("Rahul Varma", "rahul@paythm.com", "9000012345"),
    ("Priya Sharma", "priya@paythm.com", "9000054321"),
    ("Mom", "mom@paythm.com", "9876543210"),
    ("Kirana Shop", "shop@paythm.com", "9111122222"),
];

fn seed_demo_users(engine: &Engine) {
    for (name, email, phone) in DEMO_USERS {
        if engine.directory().find_by_email(email).is_some()
            || engine.directory().find_by_phone(phone).is_some()
        {
            continue;
        }
        match engine.register(NewUser {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            bank_name: Some("HDFC Bank".to_string()),
        }) {
            Ok(user) => info!(id = user.id, name, "seeded demo user"),
            Err(e) => warn!(name, "failed to seed demo user: {e}"),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: paythm-core <operations.csv>");

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let engine = Engine::new();
    seed_demo_users(&engine);

    let (op_sender, op_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in read_operations(&path) {
            match result {
                Ok(op) => {
                    op_sender.send(op).await.unwrap();
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    engine.run(ReceiverStream::new(op_receiver)).await;

    write_balances(engine.snapshot());
}
